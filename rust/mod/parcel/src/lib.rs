//! Parcel module: parcel and category model, tracking codes, listings
//! and the view state of each screen.
//!
//! # Usage
//!
//! ```ignore
//! let service = parcel::ParcelService::from_backend(&backend);
//! let mut form = parcel::views::ParcelForm::create(service, notifier);
//! form.load().await?;
//! form.select_category("B").await;
//! form.set_item_name("Tas");
//! form.submit().await;
//! ```

pub mod code;
pub mod listing;
pub mod model;
pub mod service;
pub mod views;

pub use code::{format_code, next_code, sequence_of};
pub use listing::{Listing, ParcelFilter, SearchScope};
pub use model::{CategoryCatalog, CategoryEntry, CategoryInput, Parcel, ParcelInput, PickupStatus};
pub use service::{CategoryCount, DashboardStats, ParcelService};
