pub mod category;
pub mod parcel;
pub mod stats;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use epaket_client::{Backend, DataStore, Query};
use epaket_core::{AppError, TableNames};

pub use stats::{CategoryCount, DashboardStats, RECENT_LIMIT};

/// Parcel service: typed access to the parcel and category tables.
#[derive(Clone)]
pub struct ParcelService {
    pub(crate) store: Arc<dyn DataStore>,
    pub(crate) tables: TableNames,
}

impl ParcelService {
    pub fn new(store: Arc<dyn DataStore>, tables: TableNames) -> Self {
        Self { store, tables }
    }

    pub fn from_backend(backend: &Backend) -> Self {
        Self::new(backend.store.clone(), backend.config.tables.clone())
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    // ── Generic row helpers ──

    pub(crate) async fn select_rows<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Vec<T>, AppError> {
        let rows = self.store.select(table, query).await?;
        rows.into_iter().map(|row| decode(table, row)).collect()
    }

    pub(crate) async fn get_row<T: DeserializeOwned>(&self, table: &str, id: &str) -> Result<T, AppError> {
        let rows = self.store.select(table, &Query::new().eq("id", id).limit(1)).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", table, id)))?;
        decode(table, row)
    }

    pub(crate) async fn insert_row<I: Serialize, T: DeserializeOwned>(&self, table: &str, input: &I) -> Result<T, AppError> {
        let row = self.store.insert(table, &encode(input)?).await?;
        decode(table, row)
    }

    pub(crate) async fn update_row<I: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        patch: &I,
    ) -> Result<T, AppError> {
        let row = self.store.update(table, id, &encode(patch)?).await?;
        decode(table, row)
    }

    pub(crate) async fn delete_row(&self, table: &str, id: &str) -> Result<(), AppError> {
        self.store.delete(table, id).await?;
        Ok(())
    }
}

fn encode<I: Serialize>(input: &I) -> Result<Value, AppError> {
    serde_json::to_value(input).map_err(|e| AppError::Internal(e.to_string()))
}

fn decode<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, AppError> {
    serde_json::from_value(row).map_err(|e| AppError::Internal(format!("{} row: {}", table, e)))
}
