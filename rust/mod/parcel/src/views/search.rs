//! Read-only search screen for residents. Matches on item name only.

use std::sync::Arc;

use epaket_core::{AppError, Notice, Notifier};
use tracing::warn;

use crate::listing::{Listing, SearchScope};
use crate::service::ParcelService;

pub struct SearchView {
    service: ParcelService,
    notifier: Arc<dyn Notifier>,
    pub listing: Listing,
    pub loading: bool,
}

impl SearchView {
    pub fn new(service: ParcelService, notifier: Arc<dyn Notifier>, page_size: usize) -> Self {
        Self {
            service,
            notifier,
            listing: Listing::new(page_size, SearchScope::ItemName),
            loading: false,
        }
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let result = self.service.list_parcels().await;
        self.loading = false;

        match result {
            Ok(parcels) => {
                self.listing.set_parcels(parcels);
                Ok(())
            }
            Err(e) => {
                warn!("search load failed: {}", e);
                self.notifier.notify(Notice::error(format!("failed to load parcels: {}", e)));
                Err(e)
            }
        }
    }
}
