//! Loan renewal workflow

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::book_instance::{BookInstance, RenewalForm, RenewalFormView},
    repository::RecordStore,
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn RecordStore>,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(store: Arc<dyn RecordStore>, config: LoansConfig) -> Self {
        Self { store, config }
    }

    /// Latest due-back date a renewal may set
    fn max_due_back(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(self.config.renewal_max_weeks)
    }

    /// Renewal form for a copy, proposing a date a few weeks out
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewalFormView> {
        let instance = self.store.get_instance(id).await?;

        Ok(RenewalFormView {
            instance,
            due_back: today + Duration::weeks(self.config.renewal_proposed_weeks),
            min_due_back: today,
            max_due_back: self.max_due_back(today),
        })
    }

    /// Check a submitted due-back date against `[today, today + max weeks]`
    pub fn check_due_back(
        &self,
        form: &RenewalForm,
        today: NaiveDate,
    ) -> Result<NaiveDate, ValidationErrors> {
        let max_due_back = self.max_due_back(today);
        let (code, message) = match form.due_back {
            Some(date) if date < today => ("date_in_past", "Invalid date - renewal in past".to_string()),
            Some(date) if date > max_due_back => (
                "date_too_far",
                format!(
                    "Invalid date - renewal more than {} weeks ahead",
                    self.config.renewal_max_weeks
                ),
            ),
            Some(date) => return Ok(date),
            None => ("required", "This field is required".to_string()),
        };

        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add("due_back", error);
        Err(errors)
    }

    /// Apply a renewal. Nothing is written unless the copy is on loan and
    /// the date is valid.
    pub async fn renew(&self, id: Uuid, form: &RenewalForm, today: NaiveDate) -> AppResult<BookInstance> {
        let current = self.store.get_instance(id).await?;
        if !current.is_on_loan() {
            let mut error = ValidationError::new("not_on_loan");
            error.message = Some(format!("Copy is {}, not on loan", current.status).into());
            let mut errors = ValidationErrors::new();
            errors.add("due_back", error);
            return Err(errors.into());
        }

        let due_back = self.check_due_back(form, today)?;
        let instance = self.store.set_due_back(id, due_back).await?;

        tracing::info!("Renewed book instance {} until {}", id, due_back);
        Ok(instance)
    }
}
