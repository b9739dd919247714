//! Form state
//!
//! Raw user input, one string per schema field, index-aligned with the schema.
//! No validation happens here; whatever the user typed is handed to the
//! encoder as-is.

use crate::encoder::EncodedVector;
use crate::errors::{FormError, PredictionFailed};
use crate::prediction::Prediction;
use crate::schema::FeatureSchema;
use serde::{Serialize, Serializer};
use std::ops::Deref;
use std::sync::Arc;

/// Ordered raw values, one per schema field. Empty string means unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: Vec<String>,
}

impl FormState {
    /// A form with every field unset
    pub fn empty(schema: &FeatureSchema) -> Self {
        Self {
            values: vec![String::new(); schema.len()],
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the value at `index`, leaving every other slot untouched
    pub fn set_field(&mut self, index: usize, value: impl Into<String>) -> Result<(), FormError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(FormError::InvalidIndex { index, len })?;
        *slot = value.into();
        Ok(())
    }

    /// Unset every field
    pub fn reset(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
    }

    /// Replace the whole form with `example`, which must match the form length
    pub fn prefill<S: AsRef<str>>(&mut self, example: &[S]) -> Result<(), FormError> {
        if example.len() != self.values.len() {
            return Err(FormError::LengthMismatch {
                expected: self.values.len(),
                actual: example.len(),
            });
        }

        self.values = example.iter().map(|v| v.as_ref().to_string()).collect();
        Ok(())
    }

    /// Immutable copy of the current values
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot(self.values.iter().cloned().collect())
    }
}

/// Frozen copy of a form taken at submit time. Later edits to the form never
/// reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot(Arc<[String]>);

impl FormSnapshot {
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl Deref for FormSnapshot {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for FormSnapshot {
    fn from(values: Vec<String>) -> Self {
        FormSnapshot(values.into())
    }
}

impl Serialize for FormSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Something that changed and may need redrawing
#[derive(Debug, Clone, Copy)]
pub enum FormEvent<'a> {
    FieldChanged { index: usize, value: &'a str },
    Reset,
    Prefilled,
    SubmitStarted { features: &'a EncodedVector },
    PredictionUpdated { prediction: &'a Prediction, history_len: usize },
    SubmitFailed { error: &'a PredictionFailed },
}

/// Redraw hook invoked after each state change of a session
pub trait FormObserver: Send {
    fn notify(&mut self, event: FormEvent<'_>);
}

impl<F> FormObserver for F
where
    F: FnMut(FormEvent<'_>) + Send,
{
    fn notify(&mut self, event: FormEvent<'_>) {
        self(event)
    }
}
