//! Parcel data screen: full listing with status toggle and delete.

use std::sync::Arc;

use epaket_core::{AppError, Confirm, Notice, Notifier};
use tracing::{debug, warn};

use crate::listing::{Listing, SearchScope};
use crate::model::PickupStatus;
use crate::service::ParcelService;

pub const DELETE_PROMPT: &str = "Delete this parcel?";

pub struct DataView {
    service: ParcelService,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    pub listing: Listing,
    pub loading: bool,
    pub error: Option<String>,
    updating: Option<String>,
}

impl DataView {
    pub fn new(
        service: ParcelService,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
        page_size: usize,
    ) -> Self {
        Self {
            service,
            notifier,
            confirm,
            listing: Listing::new(page_size, SearchScope::All),
            loading: false,
            error: None,
            updating: None,
        }
    }

    /// Fetch the whole collection. On failure the previous rows stay.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let result = self.service.list_parcels().await;
        self.loading = false;

        match result {
            Ok(parcels) => {
                debug!(count = parcels.len(), "parcels loaded");
                self.listing.set_parcels(parcels);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("parcel load failed: {}", e);
                self.error = Some(e.to_string());
                self.notifier.notify(Notice::error(format!("failed to load parcels: {}", e)));
                Err(e)
            }
        }
    }

    /// Id of the row whose status update is in flight.
    pub fn updating_id(&self) -> Option<&str> {
        self.updating.as_deref()
    }

    /// One remote update. The local row changes only on success.
    pub async fn update_status(&mut self, id: &str, status: PickupStatus) -> bool {
        self.updating = Some(id.to_string());
        let result = self.service.set_status(id, status).await;
        self.updating = None;

        match result {
            Ok(_) => {
                self.listing.set_parcel_status(id, status);
                true
            }
            Err(e) => {
                warn!(id, "status update failed: {}", e);
                self.notifier.notify(Notice::error(format!("failed to update status: {}", e)));
                false
            }
        }
    }

    /// Ask once, then delete. Declining issues no remote call.
    pub async fn delete(&mut self, id: &str) -> bool {
        if !self.confirm.confirm(DELETE_PROMPT) {
            return false;
        }

        match self.service.delete_parcel(id).await {
            Ok(()) => {
                if let Some(p) = self.listing.remove(id) {
                    self.notifier.notify(Notice::success(format!("parcel {} deleted", p.code)));
                }
                true
            }
            Err(e) => {
                warn!(id, "delete failed: {}", e);
                self.notifier.notify(Notice::error(format!("failed to delete parcel: {}", e)));
                false
            }
        }
    }
}
