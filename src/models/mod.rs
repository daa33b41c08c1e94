//! Data models for the site content collections.
//!
//! These models match the JSON files the static site reads, field for field.

mod collection;
pub mod form;
mod news;
mod opportunity;
mod person;
mod project;
mod research;

pub use collection::*;
pub use form::{FieldValues, FormField};
pub use news::*;
pub use opportunity::*;
pub use person::*;
pub use project::*;
pub use research::*;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AppError;

/// A record inside a collection, identified by a unique `id`.
pub trait ContentItem: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;

    /// Fields of the edit form for this item type.
    fn schema() -> &'static [FormField];

    /// Current values, used to prefill the edit form.
    fn to_fields(&self) -> FieldValues;

    /// Build an item from submitted form values. The id is never taken from the form.
    fn from_fields(id: String, fields: &FieldValues) -> Result<Self, AppError>;

    /// Copy over the keys of `previous` that no form field manages.
    fn keep_unmanaged(&mut self, previous: &Self);
}
