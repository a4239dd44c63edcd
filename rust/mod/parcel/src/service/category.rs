use epaket_client::Query;
use epaket_core::AppError;
use tracing::debug;

use super::ParcelService;
use crate::model::{CategoryCatalog, CategoryEntry, CategoryInput};

impl ParcelService {
    /// Category master entries ordered by code.
    pub async fn list_categories(&self) -> Result<Vec<CategoryEntry>, AppError> {
        self.select_rows(&self.tables.categories, &Query::new().order("kode", true))
            .await
    }

    /// Load the master table into a lookup map.
    pub async fn load_catalog(&self) -> Result<CategoryCatalog, AppError> {
        let entries = self.list_categories().await?;
        debug!(count = entries.len(), "category catalog loaded");
        Ok(CategoryCatalog::from_entries(entries))
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<CategoryEntry, AppError> {
        self.insert_row(&self.tables.categories, input).await
    }

    pub async fn update_category(&self, id: &str, input: &CategoryInput) -> Result<CategoryEntry, AppError> {
        self.update_row(&self.tables.categories, id, input).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        self.delete_row(&self.tables.categories, id).await
    }
}
