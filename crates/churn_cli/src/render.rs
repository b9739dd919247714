//! Plain-text rendering of the form, predictions and history

use churn_core::{
    EncodedVector, FeatureSchema, FieldKind, FormEvent, FormObserver, FormState, HistoryEntry,
    HistoryLog, Prediction, USER_NOTICE,
};
use std::fmt::Write as _;
use std::sync::Arc;

pub fn schema_listing(schema: &FeatureSchema) -> String {
    let mut out = String::new();
    for (index, field) in schema.iter().enumerate() {
        let kind = match &field.kind {
            FieldKind::Categorical { options } => options.join(" | "),
            FieldKind::Numeric => "number".to_string(),
        };
        let _ = writeln!(out, "{index:>2}  {:<18} {kind}", field.name);
        if !field.tooltip.is_empty() {
            let _ = writeln!(out, "    {}", field.tooltip);
        }
    }
    out
}

/// Current form values, with a placeholder for unset fields
pub fn form_listing(schema: &FeatureSchema, form: &FormState) -> String {
    let mut out = String::new();
    for (index, field) in schema.iter().enumerate() {
        let value = match form.get(index) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ if field.is_categorical() => format!("<select {}>", field.name),
            _ => "<empty>".to_string(),
        };
        let _ = writeln!(out, "{index:>2}  {:<18} {value}", field.name);
    }
    out
}

pub fn encoding_listing(
    schema: &FeatureSchema,
    form: &FormState,
    encoded: &EncodedVector,
) -> String {
    let mut out = String::new();
    for (index, (field, code)) in schema.iter().zip(encoded.iter()).enumerate() {
        let raw = form.get(index).unwrap_or("");
        let _ = writeln!(out, "{index:>2}  {:<18} {raw:<18} -> {code}", field.name);
    }
    out
}

pub fn prediction_banner(prediction: &Prediction) -> String {
    match prediction {
        Prediction::Churn => format!("[!] {prediction}"),
        Prediction::Stay => format!("[ok] {prediction}"),
        Prediction::Unrecognized(_) => format!("[?] {prediction}"),
    }
}

pub fn history_line(entry: &HistoryEntry) -> String {
    let output = match &entry.output {
        Prediction::Unrecognized(value) => format!("Unrecognized({value})"),
        known => known.label().to_string(),
    };
    format!(
        "{} {} - {}",
        entry.recorded_at.format("%H:%M:%S"),
        output,
        entry.input.join(", ")
    )
}

pub fn history_listing(history: &HistoryLog) -> String {
    if history.is_empty() {
        return "No predictions yet.\n".to_string();
    }

    let mut out = String::from("Prediction History\n");
    for entry in history.iter() {
        let _ = writeln!(out, "  {}", history_line(entry));
    }
    out
}

/// Prints a line for every session change
pub struct TerminalObserver {
    schema: Arc<FeatureSchema>,
}

impl TerminalObserver {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self { schema }
    }

    fn describe(&self, event: FormEvent<'_>) -> String {
        match event {
            FormEvent::FieldChanged { index, value } => {
                let name = self
                    .schema
                    .field(index)
                    .map(|f| f.name.as_str())
                    .unwrap_or("?");
                format!("{name} = {value}")
            }
            FormEvent::Reset => "Form cleared.".to_string(),
            FormEvent::Prefilled => "Example customer loaded.".to_string(),
            FormEvent::SubmitStarted { .. } => "Predicting...".to_string(),
            FormEvent::PredictionUpdated { prediction, .. } => prediction_banner(prediction),
            FormEvent::SubmitFailed { .. } => USER_NOTICE.to_string(),
        }
    }
}

impl FormObserver for TerminalObserver {
    fn notify(&mut self, event: FormEvent<'_>) {
        let line = self.describe(event);
        if matches!(event, FormEvent::SubmitFailed { .. }) {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}
