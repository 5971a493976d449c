//! The portal page (`index.html`).

use super::json::to_embedded_json;
use super::template::{Substitutions, Template};
use crate::error::Result;
use crate::model::{CalibrationRecord, CategoryConfig, EquipmentRecord, FormDescriptor};

/// Placeholders filled in the page template.
pub mod tokens {
    pub const DATA_ETALONS: &str = "DATA_ETALONS";
    pub const DATA_MATERIELS: &str = "DATA_MATERIELS";
    pub const DATA_CONSTATS: &str = "DATA_CONSTATS";
    pub const DATA_CATEGORIES: &str = "DATA_CATEGORIES";
    pub const DATE_ETALONS: &str = "DATE_ETALONS";
    pub const DATE_MATERIELS: &str = "DATE_MATERIELS";
    pub const DATE_CONSTATS: &str = "DATE_CONSTATS";
    pub const NB_ETALONS: &str = "NB_ETALONS";
    pub const NB_MATERIELS: &str = "NB_MATERIELS";
    pub const NB_CONSTATS: &str = "NB_CONSTATS";
    pub const ETIQ_IMG_C: &str = "ETIQ_IMG_C";
    pub const ETIQ_IMG_NC: &str = "ETIQ_IMG_NC";

    /// Every page placeholder.
    pub const ALL: [&str; 12] = [
        DATA_ETALONS,
        DATA_MATERIELS,
        DATA_CONSTATS,
        DATA_CATEGORIES,
        DATE_ETALONS,
        DATE_MATERIELS,
        DATE_CONSTATS,
        NB_ETALONS,
        NB_MATERIELS,
        NB_CONSTATS,
        ETIQ_IMG_C,
        ETIQ_IMG_NC,
    ];
}

/// Everything the page displays.
#[derive(Debug, Clone, Copy)]
pub struct PageData<'a> {
    pub etalons: &'a [CalibrationRecord],
    pub materiels: &'a [EquipmentRecord],
    pub forms: &'a [FormDescriptor],
    pub categories: &'a CategoryConfig,
    /// "Last updated" text per record set
    pub date_etalons: &'a str,
    pub date_materiels: &'a str,
    pub date_constats: &'a str,
    /// Data URIs of the label images, empty when unavailable
    pub label_ok: &'a str,
    pub label_not_ok: &'a str,
}

impl PageData<'_> {
    /// The substitution map for the page template.
    pub fn substitutions(&self) -> Result<Substitutions> {
        let mut subs = Substitutions::new();
        subs.set(tokens::DATA_ETALONS, to_embedded_json(self.etalons)?)
            .set(tokens::DATA_MATERIELS, to_embedded_json(self.materiels)?)
            .set(tokens::DATA_CONSTATS, to_embedded_json(self.forms)?)
            .set(tokens::DATA_CATEGORIES, to_embedded_json(self.categories)?)
            .set(tokens::DATE_ETALONS, self.date_etalons)
            .set(tokens::DATE_MATERIELS, self.date_materiels)
            .set(tokens::DATE_CONSTATS, self.date_constats)
            .set(tokens::NB_ETALONS, self.etalons.len().to_string())
            .set(tokens::NB_MATERIELS, self.materiels.len().to_string())
            .set(tokens::NB_CONSTATS, self.forms.len().to_string())
            .set(tokens::ETIQ_IMG_C, self.label_ok)
            .set(tokens::ETIQ_IMG_NC, self.label_not_ok);
        Ok(subs)
    }
}

/// Render the page template.
pub fn render_page(template: &Template, data: &PageData<'_>) -> Result<String> {
    Ok(template.render(&data.substitutions()?))
}
