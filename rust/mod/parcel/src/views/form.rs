//! Create / edit form for a single parcel.

use std::sync::Arc;

use chrono::NaiveDate;
use epaket_core::{date_part, today, AppError, FieldErrors, Notice, Notifier, Route};
use tracing::{info, warn};

use crate::model::{CategoryCatalog, Parcel, ParcelInput, PickupStatus};
use crate::service::ParcelService;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Result of a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Field errors; nothing was sent.
    Invalid,
    /// The remote write failed; an error notice was emitted.
    Failed,
    /// Stored. The form now holds the next code for the same category.
    Created(Parcel),
    /// Stored. Navigate to `next`.
    Updated { next: Route },
}

pub struct ParcelForm {
    service: ParcelService,
    notifier: Arc<dyn Notifier>,
    pub mode: FormMode,
    pub catalog: CategoryCatalog,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub status: PickupStatus,
    pub category: String,
    pub code: String,
    pub item_name: String,
    pub category_label: String,
    pub owner: String,
    pub errors: FieldErrors,
    pub busy: bool,
    loaded_category: Option<String>,
}

impl ParcelForm {
    pub fn create(service: ParcelService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            mode: FormMode::Create,
            catalog: CategoryCatalog::default(),
            date: today(),
            status: PickupStatus::NotPickedUp,
            category: String::new(),
            code: String::new(),
            item_name: String::new(),
            category_label: String::new(),
            owner: String::new(),
            errors: FieldErrors::new(),
            busy: false,
            loaded_category: None,
        }
    }

    pub fn edit(service: ParcelService, notifier: Arc<dyn Notifier>, id: impl Into<String>) -> Self {
        Self {
            mode: FormMode::Edit { id: id.into() },
            ..Self::create(service, notifier)
        }
    }

    /// Form for a `/dashboard/input[/:id]` route.
    pub fn for_route(service: ParcelService, notifier: Arc<dyn Notifier>, route: &Route) -> Option<Self> {
        match route {
            Route::ParcelForm { id: None } => Some(Self::create(service, notifier)),
            Route::ParcelForm { id: Some(id) } => Some(Self::edit(service, notifier, id.clone())),
            _ => None,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    /// Load the category catalog and, in edit mode, the record.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.busy = true;
        let result = self.load_inner().await;
        self.busy = false;
        if let Err(e) = &result {
            warn!("form load failed: {}", e);
            self.notifier.notify(Notice::error(format!("failed to load form: {}", e)));
        }
        result
    }

    async fn load_inner(&mut self) -> Result<(), AppError> {
        self.catalog = self.service.load_catalog().await?;
        if let FormMode::Edit { id } = &self.mode {
            let parcel = self.service.get_parcel(id).await?;
            self.fill(parcel);
        }
        Ok(())
    }

    fn fill(&mut self, parcel: Parcel) {
        self.date = date_part(&parcel.created_at).to_string();
        self.status = parcel.status;
        self.loaded_category = Some(parcel.category.clone());
        self.category = parcel.category;
        self.code = parcel.code;
        self.item_name = parcel.item_name;
        self.category_label = parcel.category_label;
        self.owner = parcel.owner.unwrap_or_default();
    }

    /// Pick a category: generates its next code, takes the billing label
    /// from the catalog and clears the item name.
    pub async fn select_category(&mut self, category: &str) {
        let category = category.trim().to_ascii_uppercase();
        self.code = self.service.generate_code(&category).await;
        self.category_label = self.catalog.label_for(&category);
        self.category = category;
        self.item_name.clear();
        self.errors.clear("category");
    }

    pub fn set_item_name(&mut self, name: impl Into<String>) {
        self.item_name = name.into();
        self.errors.clear("item_name");
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.owner = owner.into();
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
        self.errors.clear("date");
    }

    pub fn set_status(&mut self, status: PickupStatus) {
        self.status = status;
    }

    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();

        if self.date.trim().is_empty() {
            errors.add("date", "date is required");
        } else if NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).is_err() {
            errors.add("date", "date must be YYYY-MM-DD");
        }

        if self.category.is_empty() {
            errors.add("category", "category is required");
        } else if !self.catalog.contains(&self.category)
            && self.loaded_category.as_deref() != Some(self.category.as_str())
        {
            errors.add("category", format!("unknown category {}", self.category));
        } else if self.code.is_empty() {
            errors.add("category", "no tracking code generated; select the category again");
        }

        if self.item_name.trim().is_empty() {
            errors.add("item_name", "item name is required");
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    fn input(&self) -> Result<ParcelInput, AppError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|e| AppError::Validation(format!("date: {}", e)))?;
        let created_at = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::Internal("midnight out of range".into()))?
            .and_utc()
            .to_rfc3339();
        let owner = self.owner.trim();
        Ok(ParcelInput {
            code: self.code.clone(),
            category: self.category.clone(),
            item_name: self.item_name.trim().to_string(),
            category_label: self.category_label.clone(),
            owner: (!owner.is_empty()).then(|| owner.to_string()),
            status: self.status,
            created_at,
        })
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.validate() {
            return SubmitOutcome::Invalid;
        }
        let input = match self.input() {
            Ok(input) => input,
            Err(e) => {
                self.notifier.notify(Notice::error(e.to_string()));
                return SubmitOutcome::Failed;
            }
        };

        self.busy = true;
        let outcome = match self.mode.clone() {
            FormMode::Create => match self.service.create_parcel(&input).await {
                Ok(parcel) => {
                    info!(code = %parcel.code, "parcel added");
                    self.notifier.notify(Notice::success(format!("parcel {} added", parcel.code)));
                    self.code = self.service.generate_code(&self.category).await;
                    self.item_name.clear();
                    self.owner.clear();
                    SubmitOutcome::Created(parcel)
                }
                Err(e) => self.failed(e),
            },
            FormMode::Edit { id } => match self.service.update_parcel(&id, &input).await {
                Ok(parcel) => {
                    info!(code = %parcel.code, "parcel updated");
                    self.notifier.notify(Notice::success("parcel updated"));
                    SubmitOutcome::Updated { next: Route::Listing }
                }
                Err(e) => self.failed(e),
            },
        };
        self.busy = false;
        outcome
    }

    fn failed(&self, e: AppError) -> SubmitOutcome {
        warn!("parcel save failed: {}", e);
        self.notifier.notify(Notice::error(format!("failed to save: {}", e)));
        SubmitOutcome::Failed
    }
}
