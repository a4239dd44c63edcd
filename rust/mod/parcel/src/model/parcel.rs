use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{null_as_default, null_as_empty};

/// Pickup status of a parcel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupStatus {
    #[default]
    #[serde(rename = "belum_diambil")]
    NotPickedUp,
    #[serde(rename = "sudah_diambil")]
    PickedUp,
}

impl PickupStatus {
    /// Value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::NotPickedUp => "belum_diambil",
            PickupStatus::PickedUp => "sudah_diambil",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PickupStatus::NotPickedUp => "not picked up",
            PickupStatus::PickedUp => "picked up",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            PickupStatus::NotPickedUp => PickupStatus::PickedUp,
            PickupStatus::PickedUp => PickupStatus::NotPickedUp,
        }
    }
}

impl std::fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PickupStatus {
    type Err = String;

    /// Accepts the stored values and the English labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '_'], "-").as_str() {
            "belum-diambil" | "not-picked-up" | "waiting" => Ok(PickupStatus::NotPickedUp),
            "sudah-diambil" | "picked-up" | "collected" => Ok(PickupStatus::PickedUp),
            other => Err(format!("unknown pickup status: {}", other)),
        }
    }
}

/// A parcel row as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: String,

    /// Category letter.
    #[serde(rename = "kode_barang", default, deserialize_with = "null_as_empty")]
    pub category: String,

    /// Tracking code, `<category>-<seq>`.
    #[serde(rename = "kode", default, deserialize_with = "null_as_empty")]
    pub code: String,

    #[serde(rename = "nama_barang", default, deserialize_with = "null_as_empty")]
    pub item_name: String,

    /// Billing category copied from the category master at input time.
    #[serde(rename = "kategori", default, deserialize_with = "null_as_empty")]
    pub category_label: String,

    #[serde(rename = "pemilik", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PickupStatus,

    /// RFC 3339 as stored.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
}

impl Parcel {
    pub fn owner_or_dash(&self) -> &str {
        self.owner.as_deref().filter(|o| !o.is_empty()).unwrap_or("-")
    }

    /// Label used for grouping; the letter when no label was stored.
    pub fn group_label(&self) -> &str {
        if self.category_label.is_empty() {
            &self.category
        } else {
            &self.category_label
        }
    }
}

/// Fields written on create and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParcelInput {
    #[serde(rename = "kode")]
    pub code: String,
    #[serde(rename = "kode_barang")]
    pub category: String,
    #[serde(rename = "nama_barang")]
    pub item_name: String,
    #[serde(rename = "kategori")]
    pub category_label: String,
    #[serde(rename = "pemilik")]
    pub owner: Option<String>,
    pub status: PickupStatus,
    pub created_at: String,
}
