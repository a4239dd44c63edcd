//! Client-side filtering and pagination over a loaded parcel collection.

use std::collections::BTreeSet;

use crate::model::{Parcel, PickupStatus};

/// Which fields the free-text filter looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Item name, tracking code and owner.
    #[default]
    All,
    /// Item name only.
    ItemName,
}

/// Conjunction of filter predicates. Empty components match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParcelFilter {
    pub text: String,
    pub category: Option<String>,
    pub status: Option<PickupStatus>,
    /// Prefix of `created_at`, typically `YYYY-MM-DD`.
    pub date_prefix: String,
}

impl ParcelFilter {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.category.is_none()
            && self.status.is_none()
            && self.date_prefix.is_empty()
    }

    pub fn matches(&self, parcel: &Parcel, scope: SearchScope) -> bool {
        let needle = self.text.trim().to_lowercase();
        let text_ok = needle.is_empty() || {
            let contains = |s: &str| s.to_lowercase().contains(&needle);
            match scope {
                SearchScope::ItemName => contains(&parcel.item_name),
                SearchScope::All => {
                    contains(&parcel.item_name)
                        || contains(&parcel.code)
                        || parcel.owner.as_deref().is_some_and(contains)
                }
            }
        };
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| c.is_empty() || parcel.category == c);
        let status_ok = self.status.map_or(true, |s| parcel.status == s);
        let date_ok = self.date_prefix.is_empty() || parcel.created_at.starts_with(&self.date_prefix);

        text_ok && category_ok && status_ok && date_ok
    }

    /// Matching parcels in collection order.
    pub fn apply<'a>(&self, parcels: &'a [Parcel], scope: SearchScope) -> Vec<&'a Parcel> {
        parcels.iter().filter(|p| self.matches(p, scope)).collect()
    }
}

/// A loaded collection with filter and page state.
///
/// Every filter change puts the page back to 1.
#[derive(Debug, Clone)]
pub struct Listing {
    parcels: Vec<Parcel>,
    filter: ParcelFilter,
    scope: SearchScope,
    page: usize,
    per_page: usize,
}

impl Listing {
    /// `per_page` of zero is treated as one.
    pub fn new(per_page: usize, scope: SearchScope) -> Self {
        Self {
            parcels: Vec::new(),
            filter: ParcelFilter::default(),
            scope,
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// Replace the collection (after a fetch). The page is clamped to the
    /// new page count.
    pub fn set_parcels(&mut self, parcels: Vec<Parcel>) {
        self.parcels = parcels;
        self.page = self.page.clamp(1, self.total_pages().max(1));
    }

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn get(&self, id: &str) -> Option<&Parcel> {
        self.parcels.iter().find(|p| p.id == id)
    }

    pub fn filter(&self) -> &ParcelFilter {
        &self.filter
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    pub fn set_filter(&mut self, filter: ParcelFilter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.filter.text = text.into();
        self.page = 1;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.category = category.filter(|c| !c.is_empty());
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<PickupStatus>) {
        self.filter.status = status;
        self.page = 1;
    }

    pub fn set_date_prefix(&mut self, prefix: impl Into<String>) {
        self.filter.date_prefix = prefix.into();
        self.page = 1;
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(ParcelFilter::default());
    }

    pub fn filtered(&self) -> Vec<&Parcel> {
        self.filter.apply(&self.parcels, self.scope)
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Change the page size; back to page 1.
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    /// `ceil(filtered / per_page)`; zero when nothing matches.
    pub fn total_pages(&self) -> usize {
        self.filtered_count().div_ceil(self.per_page)
    }

    /// The slice of the filtered collection on the current page.
    pub fn page_items(&self) -> Vec<&Parcel> {
        let start = (self.page - 1) * self.per_page;
        self.filtered().into_iter().skip(start).take(self.per_page).collect()
    }

    /// Returns false when already on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page < self.total_pages() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Returns false when already on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a page, clamped to the valid range.
    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    /// Distinct categories present in the loaded collection, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.parcels
            .iter()
            .map(|p| p.category.clone())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Set the status of one loaded parcel. False if the id is not loaded.
    pub fn set_parcel_status(&mut self, id: &str, status: PickupStatus) -> bool {
        match self.parcels.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.status = status;
                true
            }
            None => false,
        }
    }

    /// Drop one loaded parcel.
    pub fn remove(&mut self, id: &str) -> Option<Parcel> {
        let pos = self.parcels.iter().position(|p| p.id == id)?;
        let removed = self.parcels.remove(pos);
        self.page = self.page.clamp(1, self.total_pages().max(1));
        Some(removed)
    }
}
