//! Category master screen: list, create, edit, delete.

use std::sync::Arc;

use epaket_core::{AppError, Confirm, FieldErrors, Notice, Notifier};
use tracing::warn;

use crate::model::{CategoryEntry, CategoryInput};
use crate::service::ParcelService;

/// Form fields. `editing` holds the id of the entry being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    pub code: String,
    pub name: String,
    pub billing_category: String,
    pub editing: Option<String>,
}

impl CategoryForm {
    fn input(&self) -> CategoryInput {
        CategoryInput {
            code: self.code.trim().to_ascii_uppercase(),
            name: self.name.trim().to_string(),
            billing_category: self.billing_category.trim().to_string(),
        }
    }
}

pub struct CategoryMasterView {
    service: ParcelService,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    pub entries: Vec<CategoryEntry>,
    pub form: CategoryForm,
    pub errors: FieldErrors,
    pub loading: bool,
    pub saving: bool,
}

impl CategoryMasterView {
    pub fn new(service: ParcelService, notifier: Arc<dyn Notifier>, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            service,
            notifier,
            confirm,
            entries: Vec::new(),
            form: CategoryForm::default(),
            errors: FieldErrors::new(),
            loading: false,
            saving: false,
        }
    }

    /// Entries ordered by code.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let result = self.service.list_categories().await;
        self.loading = false;
        match result {
            Ok(entries) => {
                self.entries = entries;
                Ok(())
            }
            Err(e) => {
                warn!("category load failed: {}", e);
                self.notifier.notify(Notice::error(format!("failed to load categories: {}", e)));
                Err(e)
            }
        }
    }

    /// Put an entry into the form. False if the id is not loaded.
    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return false;
        };
        self.form = CategoryForm {
            code: entry.code.clone(),
            name: entry.name.clone(),
            billing_category: entry.billing_category.clone(),
            editing: Some(entry.id.clone()),
        };
        self.errors = FieldErrors::new();
        true
    }

    pub fn reset_form(&mut self) {
        self.form = CategoryForm::default();
        self.errors = FieldErrors::new();
    }

    pub fn validate(&mut self) -> bool {
        let input = self.form.input();
        let mut errors = FieldErrors::new();

        let mut letters = input.code.chars();
        match (letters.next(), letters.next()) {
            (None, _) => errors.add("code", "code is required"),
            (Some(c), None) if c.is_ascii_uppercase() => {
                let taken = self
                    .entries
                    .iter()
                    .any(|e| e.code.eq_ignore_ascii_case(&input.code) && Some(&e.id) != self.form.editing.as_ref());
                if taken {
                    errors.add("code", format!("category {} already exists", input.code));
                }
            }
            _ => errors.add("code", "code must be a single letter A-Z"),
        }
        if input.name.is_empty() {
            errors.add("name", "name is required");
        }
        if input.billing_category.is_empty() {
            errors.add("billing_category", "billing category is required");
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// Create or update, depending on whether an entry is being edited.
    pub async fn save(&mut self) -> bool {
        if !self.validate() {
            return false;
        }
        let input = self.form.input();

        self.saving = true;
        let result = match &self.form.editing {
            Some(id) => self.service.update_category(id, &input).await,
            None => self.service.create_category(&input).await,
        };
        self.saving = false;

        match result {
            Ok(entry) => {
                let verb = if self.form.editing.is_some() { "updated" } else { "added" };
                self.notifier
                    .notify(Notice::success(format!("category {} {}", entry.code, verb)));
                self.reset_form();
                let _ = self.load().await;
                true
            }
            Err(e) => {
                warn!("category save failed: {}", e);
                self.notifier.notify(Notice::error(format!("failed to save category: {}", e)));
                false
            }
        }
    }

    /// Confirm, then delete and refetch.
    pub async fn delete(&mut self, id: &str) -> bool {
        let code = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.code.clone())
            .unwrap_or_else(|| id.to_string());
        if !self.confirm.confirm(&format!("Delete category {}?", code)) {
            return false;
        }

        match self.service.delete_category(id).await {
            Ok(()) => {
                self.notifier.notify(Notice::success(format!("category {} deleted", code)));
                if self.form.editing.as_deref() == Some(id) {
                    self.reset_form();
                }
                let _ = self.load().await;
                true
            }
            Err(e) => {
                warn!(id, "category delete failed: {}", e);
                self.notifier.notify(Notice::error(format!("failed to delete category: {}", e)));
                false
            }
        }
    }
}
