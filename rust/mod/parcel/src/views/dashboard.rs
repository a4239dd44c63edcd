//! Dashboard screen: totals, recent parcels, per-category counts, live refresh.

use std::sync::Arc;

use epaket_client::ChangeFeed;
use epaket_core::{AppError, Notice, Notifier};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::service::{DashboardStats, ParcelService};

pub struct DashboardView {
    service: ParcelService,
    notifier: Arc<dyn Notifier>,
    pickup_fee: u64,
    pub stats: DashboardStats,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardView {
    pub fn new(service: ParcelService, notifier: Arc<dyn Notifier>, pickup_fee: u64) -> Self {
        Self {
            service,
            notifier,
            pickup_fee,
            stats: DashboardStats::default(),
            loading: false,
            error: None,
        }
    }

    /// Full refetch. On failure the previous numbers stay.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let result = self.service.dashboard_stats(self.pickup_fee).await;
        self.loading = false;
        match result {
            Ok(stats) => {
                self.stats = stats;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("dashboard refresh failed: {}", e);
                self.error = Some(e.to_string());
                self.notifier.notify(Notice::error(format!("failed to load dashboard: {}", e)));
                Err(e)
            }
        }
    }

    /// Load, then refetch on every change of the parcel table until
    /// `cancel` fires or the feed ends. `on_update` runs after each load,
    /// failed refreshes included.
    pub async fn watch<F>(&mut self, feed: &dyn ChangeFeed, cancel: CancellationToken, mut on_update: F)
    where
        F: FnMut(&DashboardView),
    {
        let table = self.service.tables().parcels.clone();
        let mut sub = feed.subscribe(&table);
        info!(table = %table, "watching for changes");

        let _ = self.refresh().await;
        on_update(&*self);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("dashboard watch cancelled");
                    break;
                }
                event = sub.next() => {
                    let Some(event) = event else {
                        debug!("change feed closed");
                        break;
                    };
                    debug!(kind = ?event.kind, "change received, refetching");
                    let _ = self.refresh().await;
                    on_update(&*self);
                }
            }
        }
    }
}
