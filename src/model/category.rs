//! Category definitions used to label attribute slots.

use serde::{Deserialize, Serialize};

/// One category and the labels of its positional attribute slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    /// Category name, as typed in the category column
    #[serde(rename = "nom")]
    pub name: String,

    /// Labels for attribute slots 1..n
    #[serde(rename = "champs")]
    pub labels: Vec<String>,
}

impl CategoryDefinition {
    /// Create a definition from a name and its slot labels.
    pub fn new<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable, ordered set of category definitions.
///
/// Handed to the exporters explicitly; serialized as-is into the page's
/// category data block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryConfig {
    categories: Vec<CategoryDefinition>,
}

/// Category whose records carry radioactive source sub-fields.
pub const SOURCE_CATEGORY: &str = "Source";

impl Default for CategoryConfig {
    fn default() -> Self {
        Self::new(vec![
            CategoryDefinition::new(
                SOURCE_CATEGORY,
                [
                    "Demi-vie (jours)",
                    "Isotope",
                    "Date référence",
                    "Activité ref (Bq)",
                    "Type EDF",
                ],
            ),
            CategoryDefinition::new("Irradiateur", ["Distance 1", "Distance 2"]),
            CategoryDefinition::new("Débitmètre", Vec::<String>::new()),
            CategoryDefinition::new("Banc test MIP-ECM", Vec::<String>::new()),
            CategoryDefinition::new("Oscilloscope", Vec::<String>::new()),
            CategoryDefinition::new("Multimètre", ["Marque/Modèle", "N° série"]),
        ])
    }
}

impl CategoryConfig {
    /// Build a configuration from definitions, keeping their order.
    pub fn new(categories: Vec<CategoryDefinition>) -> Self {
        Self { categories }
    }

    /// Look up a category by exact name.
    pub fn get(&self, name: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Slot labels for a category; unknown categories have none.
    pub fn labels(&self, name: &str) -> &[String] {
        self.get(name).map(|c| c.labels.as_slice()).unwrap_or(&[])
    }

    /// Label for a 0-based attribute slot, `Champ <n>` when the category
    /// does not name it.
    pub fn slot_label(&self, category: &str, slot: usize) -> String {
        match self.labels(category).get(slot) {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("Champ {}", slot + 1),
        }
    }

    /// Iterate over definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.iter()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no category is defined.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
