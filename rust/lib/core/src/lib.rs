pub mod config;
pub mod confirm;
pub mod error;
pub mod notice;
pub mod route;
pub mod types;

pub use config::{BackendConfig, TableNames, Tuning};
pub use confirm::{AlwaysConfirm, Confirm, NeverConfirm};
pub use error::AppError;
pub use notice::{Notice, NoticeBoard, NoticeKind, NoticeLog, Notifier};
pub use route::Route;
pub use types::{date_part, merge_patch, new_id, now_rfc3339, today, FieldErrors};
