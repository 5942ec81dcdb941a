// src/handlers/mod.rs
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::PawnError;

pub mod admin;
pub mod error;
pub mod loan;
pub mod pages;
pub mod rates;

pub type Form = HashMap<String, String>;

/// A form field parsed as `T`. Blank or absent fields are `None`.
pub(crate) fn form_field<T: FromStr>(form: &Form, name: &str) -> Result<Option<T>, PawnError> {
    match form.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| PawnError::InvalidNumericInput(name.to_string())),
        None => Ok(None),
    }
}

pub(crate) fn required_field<T: FromStr>(form: &Form, name: &str) -> Result<T, PawnError> {
    form_field(form, name)?.ok_or_else(|| PawnError::InvalidNumericInput(name.to_string()))
}
