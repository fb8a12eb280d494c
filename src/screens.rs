// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! List + form state for crops, activities and expenses.
//!
//! ```text
//! Loading ──load──▶ Idle ──begin_add/begin_edit──▶ Editing
//!                    ▲                               │ submit
//!                    └──── ok (refetch) ── Submitting ◀┘
//!                                          │ err
//!                                          ▼
//!                                       Editing (with error)
//! ```
//!
//! Deleting goes `Idle → Submitting → Idle` and only after confirmation.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::api::{Activities, ApiClient, Crops, Expenses, Resource};
use crate::error::{ApiError, ValidationError};
use crate::models::{ActivityDraft, CropDraft, CropId, ExpenseDraft};
use crate::utils::{coerce_decimal, coerce_f64, coerce_i64};

/// Asks the user before something destructive happens.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Form state for one resource. Fields are set from raw text, the way a user
/// types them.
pub trait FormModel: Default + Clone {
    type Resource: Resource;

    fn from_item(item: &<Self::Resource as Resource>::Item) -> Self;
    fn set(&mut self, field: &str, raw: &str) -> Result<(), ValidationError>;
    fn validate(&self) -> Result<<Self::Resource as Resource>::Draft, ValidationError>;
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(v.to_string())
}

fn date_field(value: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let v = required(value, field)?;
    NaiveDate::parse_from_str(&v, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate { field, value: v })
}

fn optional_date(value: &str, field: &'static str) -> Result<Option<NaiveDate>, ValidationError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    date_field(value, field).map(Some)
}

fn optional_text(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropForm {
    pub name: String,
    pub variety: String,
    pub area: f64,
    pub planting_date: String,
    pub harvest_date: String,
    pub notes: String,
}

impl FormModel for CropForm {
    type Resource = Crops;

    fn from_item(c: &crate::models::Crop) -> Self {
        CropForm {
            name: c.name.clone(),
            variety: c.variety.clone(),
            area: c.area,
            planting_date: crate::utils::opt_date(c.planting_date),
            harvest_date: crate::utils::opt_date(c.harvest_date),
            notes: c.notes.clone().unwrap_or_default(),
        }
    }

    fn set(&mut self, field: &str, raw: &str) -> Result<(), ValidationError> {
        match field {
            "name" => self.name = raw.to_string(),
            "variety" => self.variety = raw.to_string(),
            "area" => self.area = coerce_f64(raw),
            "plantingDate" => self.planting_date = raw.to_string(),
            "harvestDate" => self.harvest_date = raw.to_string(),
            "notes" => self.notes = raw.to_string(),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn validate(&self) -> Result<CropDraft, ValidationError> {
        Ok(CropDraft {
            name: required(&self.name, "name")?,
            variety: required(&self.variety, "variety")?,
            area: self.area,
            planting_date: date_field(&self.planting_date, "plantingDate")?,
            harvest_date: optional_date(&self.harvest_date, "harvestDate")?,
            notes: optional_text(&self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityForm {
    pub r#type: String,
    pub description: String,
    pub date: String,
    pub crop_id: i64,
}

impl FormModel for ActivityForm {
    type Resource = Activities;

    fn from_item(a: &crate::models::Activity) -> Self {
        ActivityForm {
            r#type: a.r#type.clone(),
            description: a.description.clone(),
            date: crate::utils::opt_date(a.date),
            crop_id: a.crop.as_ref().and_then(|c| c.id).unwrap_or(0),
        }
    }

    fn set(&mut self, field: &str, raw: &str) -> Result<(), ValidationError> {
        match field {
            "type" => self.r#type = raw.to_string(),
            "description" => self.description = raw.to_string(),
            "date" => self.date = raw.to_string(),
            "cropId" => self.crop_id = coerce_i64(raw),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn validate(&self) -> Result<ActivityDraft, ValidationError> {
        let r#type = required(&self.r#type, "type")?;
        let date = date_field(&self.date, "date")?;
        if self.crop_id <= 0 {
            return Err(ValidationError::MissingField("crop"));
        }
        Ok(ActivityDraft {
            r#type,
            description: self.description.trim().to_string(),
            date,
            crop_id: self.crop_id,
            crop: CropId { id: self.crop_id },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseForm {
    pub expense_title: String,
    pub amount: rust_decimal::Decimal,
    /// Whether anything was typed into the amount field.
    pub amount_entered: bool,
    pub category: String,
    pub description: String,
    pub expense_date: String,
}

impl FormModel for ExpenseForm {
    type Resource = Expenses;

    fn from_item(e: &crate::models::Expense) -> Self {
        ExpenseForm {
            expense_title: e.expense_title.clone(),
            amount: e.amount_or_zero(),
            amount_entered: true,
            category: e.category.clone(),
            description: e.description.clone().unwrap_or_default(),
            expense_date: crate::utils::opt_date(e.expense_date),
        }
    }

    fn set(&mut self, field: &str, raw: &str) -> Result<(), ValidationError> {
        match field {
            "expenseTitle" => self.expense_title = raw.to_string(),
            "amount" => {
                self.amount = coerce_decimal(raw);
                self.amount_entered = !raw.trim().is_empty();
            }
            "category" => self.category = raw.to_string(),
            "description" => self.description = raw.to_string(),
            "expenseDate" => self.expense_date = raw.to_string(),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn validate(&self) -> Result<ExpenseDraft, ValidationError> {
        let expense_title = required(&self.expense_title, "expenseTitle")?;
        if !self.amount_entered {
            return Err(ValidationError::MissingField("amount"));
        }
        Ok(ExpenseDraft {
            expense_title,
            amount: self.amount,
            category: required(&self.category, "category")?,
            description: optional_text(&self.description),
            expense_date: date_field(&self.expense_date, "expenseDate")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<F> {
    Loading,
    Idle,
    Editing {
        target: Option<i64>,
        form: F,
        error: Option<String>,
    },
    Submitting,
}

type Item<F> = <<F as FormModel>::Resource as Resource>::Item;

pub struct EntityScreen<F: FormModel> {
    state: ScreenState<F>,
    items: Vec<Item<F>>,
    error: Option<String>,
    notice: Option<String>,
}

impl<F: FormModel> Default for EntityScreen<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormModel> EntityScreen<F> {
    pub fn new() -> Self {
        EntityScreen {
            state: ScreenState::Loading,
            items: Vec::new(),
            error: None,
            notice: None,
        }
    }

    pub fn state(&self) -> &ScreenState<F> {
        &self.state
    }

    pub fn items(&self) -> &[Item<F>] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn label() -> &'static str {
        <F::Resource as Resource>::LABEL
    }

    /// Fetch the collection. A failed fetch leaves an empty list and an
    /// error message; an expired session is passed up.
    pub fn load(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let res = api.list::<F::Resource>();
        self.state = ScreenState::Idle;
        self.error = None;
        match res {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(ApiError::SessionExpired) => Err(ApiError::SessionExpired),
            Err(e) => {
                warn!("Failed to fetch {}: {}", <F::Resource as Resource>::PATH, e);
                self.items = Vec::new();
                self.error = Some(format!(
                    "Failed to fetch {}",
                    <F::Resource as Resource>::PATH
                ));
                Ok(())
            }
        }
    }

    pub fn begin_add(&mut self) {
        self.state = ScreenState::Editing {
            target: None,
            form: F::default(),
            error: None,
        };
    }

    /// `false` when no loaded item has that id.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        let Some(item) = self
            .items
            .iter()
            .find(|i| <F::Resource as Resource>::id_of(i) == Some(id))
        else {
            return false;
        };
        self.state = ScreenState::Editing {
            target: Some(id),
            form: F::from_item(item),
            error: None,
        };
        true
    }

    pub fn edit_field(&mut self, field: &str, raw: &str) -> Result<(), ValidationError> {
        match &mut self.state {
            ScreenState::Editing { form, .. } => form.set(field, raw),
            _ => Ok(()),
        }
    }

    /// Submission is only offered once required fields are filled in.
    pub fn can_submit(&self) -> bool {
        matches!(&self.state, ScreenState::Editing { form, .. } if form.validate().is_ok())
    }

    pub fn cancel(&mut self) {
        if matches!(self.state, ScreenState::Editing { .. }) {
            self.state = ScreenState::Idle;
        }
    }

    /// Create or update, then refetch. Validation and server errors return
    /// the screen to `Editing` with the message attached.
    pub fn submit(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let (target, form) = match std::mem::replace(&mut self.state, ScreenState::Submitting) {
            ScreenState::Editing { target, form, .. } => (target, form),
            other => {
                self.state = other;
                return Ok(());
            }
        };
        self.error = None;
        self.notice = None;

        let draft = match form.validate() {
            Ok(d) => d,
            Err(e) => {
                self.state = ScreenState::Editing {
                    target,
                    form,
                    error: Some(e.to_string()),
                };
                return Ok(());
            }
        };

        let res = match target {
            Some(id) => api.update::<F::Resource>(id, &draft).map(|_| "updated"),
            None => api.create::<F::Resource>(&draft).map(|_| "added"),
        };
        match res {
            Ok(verb) => {
                debug!(?target, "{} {}", Self::label(), verb);
                self.notice = Some(format!("{} {} successfully!", Self::label(), verb));
                self.load(api)
            }
            Err(ApiError::SessionExpired) => {
                self.state = ScreenState::Idle;
                Err(ApiError::SessionExpired)
            }
            Err(e) => {
                self.state = ScreenState::Editing {
                    target,
                    form,
                    error: Some(e.user_message()),
                };
                Ok(())
            }
        }
    }

    /// Returns whether anything was deleted. Nothing is sent unless the user
    /// confirms.
    pub fn delete(
        &mut self,
        api: &ApiClient,
        id: i64,
        confirm: &dyn Confirm,
    ) -> Result<bool, ApiError> {
        let prompt = format!(
            "Are you sure you want to delete this {}?",
            Self::label().to_lowercase()
        );
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }
        self.state = ScreenState::Submitting;
        self.error = None;
        self.notice = None;
        match api.delete::<F::Resource>(id) {
            Ok(()) => {
                self.notice = Some(format!("{} deleted successfully!", Self::label()));
                self.load(api)?;
                Ok(true)
            }
            Err(ApiError::SessionExpired) => {
                self.state = ScreenState::Idle;
                Err(ApiError::SessionExpired)
            }
            Err(e) => {
                warn!("delete failed: {}", e);
                self.state = ScreenState::Idle;
                self.error = Some(format!(
                    "Failed to delete {}",
                    Self::label().to_lowercase()
                ));
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_coerce_to_zero() {
        let mut f = CropForm::default();
        f.set("area", "lots").unwrap();
        assert_eq!(f.area, 0.0);
        let mut a = ActivityForm::default();
        a.set("cropId", "x").unwrap();
        assert_eq!(a.crop_id, 0);
    }

    #[test]
    fn crop_form_requires_name_variety_and_planting_date() {
        let mut f = CropForm::default();
        assert_eq!(f.validate(), Err(ValidationError::MissingField("name")));
        f.set("name", "Wheat").unwrap();
        f.set("variety", "Durum").unwrap();
        assert_eq!(
            f.validate(),
            Err(ValidationError::MissingField("plantingDate"))
        );
        f.set("plantingDate", "2025-13-01").unwrap();
        assert!(matches!(
            f.validate(),
            Err(ValidationError::InvalidDate { .. })
        ));
        f.set("plantingDate", "2025-03-01").unwrap();
        let draft = f.validate().unwrap();
        assert_eq!(draft.harvest_date, None);
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn activity_form_needs_a_crop() {
        let mut a = ActivityForm::default();
        a.set("type", "Weeding").unwrap();
        a.set("date", "2025-04-02").unwrap();
        assert_eq!(a.validate(), Err(ValidationError::MissingField("crop")));
        a.set("cropId", "3").unwrap();
        assert_eq!(a.validate().unwrap().crop, CropId { id: 3 });
    }

    #[test]
    fn expense_amount_must_be_entered() {
        let mut e = ExpenseForm::default();
        e.set("expenseTitle", "Diesel").unwrap();
        assert_eq!(e.validate(), Err(ValidationError::MissingField("amount")));
        e.set("amount", "abc").unwrap();
        e.set("category", "Fuel").unwrap();
        e.set("expenseDate", "2025-03-02").unwrap();
        assert!(e.validate().unwrap().amount.is_zero());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut e = ExpenseForm::default();
        assert_eq!(
            e.set("price", "3"),
            Err(ValidationError::UnknownField("price".into()))
        );
    }
}
