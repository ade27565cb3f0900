//! Raw form payloads as submitted by browsers and their validation into
//! domain input values.
//!
//! Every field arrives as text. Validation only enforces what the field types
//! imply: required text, maximum length, date syntax and choice membership.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Festival, FestivalId, FestivalInput, Performer, PerformerInput, MAX_TEXT_CHARS,
};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{} field(s) failed validation", .fields.len())]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub location: String,
}

impl FestivalForm {
    /// Values shown on an empty creation form.
    pub fn initial() -> Self {
        Self::from_input(&FestivalInput::default())
    }

    pub fn from_festival(festival: &Festival) -> Self {
        Self::from_input(&festival.input())
    }

    pub fn from_input(input: &FestivalInput) -> Self {
        Self {
            name: input.name.clone(),
            start: format_date(input.start),
            end: format_date(input.end),
            location: input.location.clone(),
        }
    }

    pub fn validate(&self) -> Result<FestivalInput, FormErrors> {
        let mut errors = FormErrors::default();
        let name = clean_text(&mut errors, "name", &self.name);
        let start = clean_date(&mut errors, "start", &self.start);
        let end = clean_date(&mut errors, "end", &self.end);
        let location = clean_text(&mut errors, "location", &self.location);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(FestivalInput {
            name,
            start,
            end,
            location,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_band: String,
    #[serde(default)]
    pub festival: String,
}

impl PerformerForm {
    pub fn initial() -> Self {
        Self::from_input(&PerformerInput::default())
    }

    pub fn from_performer(performer: &Performer) -> Self {
        Self::from_input(&performer.input())
    }

    pub fn from_input(input: &PerformerInput) -> Self {
        Self {
            name: input.name.clone(),
            is_band: input.is_band.to_string(),
            festival: input
                .festival
                .map(|id| id.0.to_string())
                .unwrap_or_default(),
        }
    }

    /// Checks field syntax only. Whether the chosen festival exists is up to
    /// the caller, which has access to the store.
    pub fn validate(&self) -> Result<PerformerInput, FormErrors> {
        let mut errors = FormErrors::default();
        let name = clean_text(&mut errors, "name", &self.name);
        let is_band = clean_bool_choice(&mut errors, "is_band", &self.is_band);
        let festival = clean_festival_choice(&mut errors, "festival", &self.festival);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(PerformerInput {
            name,
            is_band: is_band.unwrap_or_default(),
            festival,
        })
    }
}

fn clean_text(errors: &mut FormErrors, field: &str, raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return String::new();
    }
    let chars = value.chars().count();
    if chars > MAX_TEXT_CHARS {
        errors.add(
            field,
            format!("Ensure this value has at most {MAX_TEXT_CHARS} characters (it has {chars})."),
        );
    }
    value.to_string()
}

fn clean_date(errors: &mut FormErrors, field: &str, raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok());
    if parsed.is_none() {
        errors.add(field, INVALID_DATE);
    }
    parsed
}

fn clean_bool_choice(errors: &mut FormErrors, field: &str, raw: &str) -> Option<bool> {
    match raw.trim() {
        "" => {
            errors.add(field, REQUIRED);
            None
        }
        "true" | "True" | "1" | "on" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

fn clean_festival_choice(errors: &mut FormErrors, field: &str, raw: &str) -> Option<FestivalId> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(id) => Some(FestivalId(id)),
        Err(_) => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
