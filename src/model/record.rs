//! Exported record structures.
//!
//! Field names on the wire are the short keys the portal page reads.

use crate::validity::Validity;
use serde::{Deserialize, Serialize};

/// A labelled attribute of a calibration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Label from the category definition, or `Champ <n>`
    #[serde(rename = "l")]
    pub label: String,

    /// Display value
    #[serde(rename = "v")]
    pub value: String,
}

impl Attribute {
    /// Create an attribute pair.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Sub-fields specific to radioactive sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFields {
    /// Half-life in days
    #[serde(rename = "tv", skip_serializing_if = "Option::is_none")]
    pub half_life: Option<f64>,

    /// Reference activity in Bq
    #[serde(rename = "a0", skip_serializing_if = "Option::is_none")]
    pub reference_activity: Option<f64>,

    /// Reference date, `DD/MM/YYYY` when the cell is a date
    #[serde(rename = "dr", skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<String>,
}

impl SourceFields {
    /// Whether no sub-field was filled in.
    pub fn is_empty(&self) -> bool {
        self.half_life.is_none() && self.reference_activity.is_none() && self.reference_date.is_none()
    }
}

/// A calibration standard (étalon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Identifier
    pub id: String,

    /// Category name
    #[serde(rename = "cat")]
    pub category: String,

    /// Validity date as displayed
    #[serde(rename = "val")]
    pub validity_date: String,

    /// Validity status derived from `validity_date`
    #[serde(rename = "sv")]
    pub status: Validity,

    /// Site, title-cased
    pub site: String,

    /// Location on site
    #[serde(rename = "loc")]
    pub location: String,

    /// Non-empty attribute slots in column order
    #[serde(rename = "ch")]
    pub attributes: Vec<Attribute>,

    /// Source sub-fields, always present, empty for other categories
    #[serde(rename = "src", default)]
    pub source: SourceFields,

    /// Creation date
    #[serde(rename = "dc")]
    pub created: String,

    /// Last modification date
    #[serde(rename = "dm")]
    pub modified: String,

    /// Created by
    #[serde(rename = "uc")]
    pub created_by: String,

    /// Last modified by
    #[serde(rename = "um")]
    pub modified_by: String,
}

impl CalibrationRecord {
    /// Whether the record belongs to the given category.
    pub fn is_category(&self, category: &str) -> bool {
        self.category == category
    }
}

/// A tracked piece of equipment (matériel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    /// Identifier
    pub id: String,

    /// Description
    #[serde(rename = "des")]
    pub description: String,

    /// Serial number
    #[serde(rename = "ns")]
    pub serial_number: String,

    /// Control number
    #[serde(rename = "nc")]
    pub control_number: String,

    /// Next planned check
    #[serde(rename = "dvp")]
    pub next_check: String,

    /// Validity date as displayed
    #[serde(rename = "val")]
    pub validity_date: String,

    /// Validity status derived from `validity_date`
    #[serde(rename = "sv")]
    pub status: Validity,

    /// Site, title-cased
    #[serde(rename = "cnpe")]
    pub site: String,

    /// Location on site
    #[serde(rename = "loc")]
    pub location: String,

    /// Controller
    #[serde(rename = "ctr")]
    pub controller: String,

    /// Free-text observation
    #[serde(rename = "obs")]
    pub observation: String,
}

/// A form fragment found in the forms directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// File name
    #[serde(rename = "f")]
    pub filename: String,

    /// Relative URL from the page
    pub url: String,

    /// Title
    #[serde(rename = "t")]
    pub title: String,

    /// Description
    #[serde(rename = "d")]
    pub description: String,

    /// Category
    #[serde(rename = "c")]
    pub category: String,

    /// Icon (usually an emoji)
    #[serde(rename = "i")]
    pub icon: String,
}
