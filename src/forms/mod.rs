/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::prelude::*;
use std::collections::BTreeMap;
use validator::{ValidateEmail, ValidateLength};

pub mod account;
pub mod schedule;
pub mod task;

/// Key for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Validation messages per field.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Takes over the errors of a nested form as `{prefix}.{field}`.
    pub fn merge_prefixed(&mut self, prefix: impl std::fmt::Display, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::Validation(self))
        }
    }
}

impl From<FormErrors> for ApplicationError {
    fn from(errors: FormErrors) -> Self {
        ApplicationError::Validation(errors)
    }
}

pub trait Validate: Sized {
    /// Normalizes the submitted values and collects every error.
    fn clean(&mut self, errors: &mut FormErrors);

    fn validated(mut self) -> Result<Self> {
        let mut errors = FormErrors::default();
        self.clean(&mut errors);
        errors.into_result()?;

        Ok(self)
    }
}

/// Trims the value, mapping blank input to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

pub fn required(errors: &mut FormErrors, field: &str, value: &str) -> bool {
    if value.trim().validate_length(Some(1), None, None) {
        true
    } else {
        errors.add(field, "This field is required.");
        false
    }
}

pub fn max_length(errors: &mut FormErrors, field: &str, value: &str, max: u64) {
    if !value.validate_length(None, Some(max), None) {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {max} characters (it has {}).",
                value.chars().count()
            ),
        );
    }
}

pub fn min_length(errors: &mut FormErrors, field: &str, value: &str, min: u64, message: String) {
    if !value.validate_length(Some(min), None, None) {
        errors.add(field, message);
    }
}

pub fn email(errors: &mut FormErrors, field: &str, value: &str) {
    if !value.validate_email() {
        errors.add(field, "Enter a valid email address.");
    }
}
