use epaket_client::Query;
use epaket_core::AppError;
use serde_json::json;
use tracing::{debug, warn};

use super::ParcelService;
use crate::code::next_code;
use crate::model::{Parcel, ParcelInput, PickupStatus};

impl ParcelService {
    /// The whole parcel collection, newest first.
    pub async fn list_parcels(&self) -> Result<Vec<Parcel>, AppError> {
        self.select_rows(&self.tables.parcels, &Query::new().order("created_at", false))
            .await
    }

    pub async fn get_parcel(&self, id: &str) -> Result<Parcel, AppError> {
        self.get_row(&self.tables.parcels, id).await
    }

    pub async fn create_parcel(&self, input: &ParcelInput) -> Result<Parcel, AppError> {
        let parcel: Parcel = self.insert_row(&self.tables.parcels, input).await?;
        debug!(id = %parcel.id, code = %parcel.code, "parcel created");
        Ok(parcel)
    }

    pub async fn update_parcel(&self, id: &str, input: &ParcelInput) -> Result<Parcel, AppError> {
        self.update_row(&self.tables.parcels, id, input).await
    }

    pub async fn set_status(&self, id: &str, status: PickupStatus) -> Result<Parcel, AppError> {
        self.update_row(&self.tables.parcels, id, &json!({ "status": status }))
            .await
    }

    pub async fn delete_parcel(&self, id: &str) -> Result<(), AppError> {
        self.delete_row(&self.tables.parcels, id).await
    }

    /// Every tracking code stored for a category letter.
    pub async fn category_codes(&self, category: &str) -> Result<Vec<String>, AppError> {
        let rows = self
            .store
            .select(
                &self.tables.parcels,
                &Query::new().select(&["kode"]).eq("kode_barang", category),
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.get("kode").and_then(|v| v.as_str()).map(String::from))
            .collect())
    }

    /// Next free-looking tracking code for a category.
    ///
    /// A failed read counts as "no codes yet" and yields sequence 1.
    pub async fn generate_code(&self, category: &str) -> String {
        let codes = match self.category_codes(category).await {
            Ok(codes) => codes,
            Err(e) => {
                warn!(category, "code lookup failed, starting at 1: {}", e);
                Vec::new()
            }
        };
        next_code(category, &codes)
    }
}
