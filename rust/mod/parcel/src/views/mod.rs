//! View state for each screen.
//!
//! A view owns what its screen shows (loaded rows, filter, form fields,
//! busy and error flags) and exposes the user actions as async methods.
//! Remote failures become error notices; the view keeps its previous state.

pub mod dashboard;
pub mod data;
pub mod form;
pub mod master;
pub mod search;

pub use dashboard::DashboardView;
pub use data::DataView;
pub use form::{FormMode, ParcelForm, SubmitOutcome};
pub use master::{CategoryForm, CategoryMasterView};
pub use search::SearchView;
