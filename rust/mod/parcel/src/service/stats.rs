use std::collections::BTreeMap;

use epaket_core::AppError;
use serde::Serialize;

use super::ParcelService;
use crate::model::{Parcel, PickupStatus};

/// How many parcels the recent-activity list shows.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Dashboard numbers derived from the full collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub picked_up: usize,
    pub not_picked_up: usize,
    /// `picked_up * pickup_fee`, saturating at `u64::MAX`.
    pub revenue: u64,
    /// Newest first.
    pub recent: Vec<Parcel>,
    /// Per billing label, ordered by label.
    pub per_category: Vec<CategoryCount>,
}

impl DashboardStats {
    /// `parcels` must already be newest first.
    pub fn compute(parcels: &[Parcel], pickup_fee: u64) -> Self {
        let picked_up = parcels.iter().filter(|p| p.status == PickupStatus::PickedUp).count();
        let not_picked_up = parcels.len() - picked_up;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for p in parcels {
            *counts.entry(p.group_label()).or_default() += 1;
        }

        Self {
            total: parcels.len(),
            picked_up,
            not_picked_up,
            revenue: (picked_up as u64).saturating_mul(pickup_fee),
            recent: parcels.iter().take(RECENT_LIMIT).cloned().collect(),
            per_category: counts
                .into_iter()
                .map(|(label, count)| CategoryCount {
                    label: label.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

impl ParcelService {
    pub async fn dashboard_stats(&self, pickup_fee: u64) -> Result<DashboardStats, AppError> {
        let parcels = self.list_parcels().await?;
        Ok(DashboardStats::compute(&parcels, pickup_fee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(id: usize, label: &str, status: PickupStatus) -> Parcel {
        Parcel {
            id: id.to_string(),
            category: "A".into(),
            code: format!("A-{:03}", id),
            item_name: "x".into(),
            category_label: label.into(),
            owner: None,
            status,
            created_at: String::new(),
        }
    }

    #[test]
    fn totals_and_revenue() {
        use PickupStatus::*;
        let parcels: Vec<Parcel> = (1..=7)
            .map(|i| parcel(i, if i <= 4 { "Kecil" } else { "Besar" }, if i % 2 == 0 { PickedUp } else { NotPickedUp }))
            .collect();
        let stats = DashboardStats::compute(&parcels, 2000);
        assert_eq!(stats.total, 7);
        assert_eq!(stats.picked_up, 3);
        assert_eq!(stats.not_picked_up, 4);
        assert_eq!(stats.revenue, 6000);
        assert_eq!(stats.recent.len(), RECENT_LIMIT);
        assert_eq!(stats.recent[0].id, "1");
        assert_eq!(
            stats.per_category,
            vec![
                CategoryCount { label: "Besar".into(), count: 3 },
                CategoryCount { label: "Kecil".into(), count: 4 },
            ]
        );
    }

    #[test]
    fn empty_collection() {
        let stats = DashboardStats::compute(&[], 2000);
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn missing_label_groups_by_letter() {
        let stats = DashboardStats::compute(&[parcel(1, "", PickupStatus::PickedUp)], 500);
        assert_eq!(stats.per_category[0].label, "A");
        assert_eq!(stats.revenue, 500);
    }

    #[test]
    fn huge_fee_saturates() {
        let parcels = vec![parcel(1, "Kecil", PickupStatus::PickedUp), parcel(2, "Kecil", PickupStatus::PickedUp)];
        let stats = DashboardStats::compute(&parcels, u64::MAX);
        assert_eq!(stats.revenue, u64::MAX);
    }
}
