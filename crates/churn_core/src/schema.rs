//! Feature schema
//!
//! The schema fixes the exact order and meaning of every field sent to the
//! prediction service. Field order and the order of each categorical option
//! list are part of the service contract: an option's position in its list is
//! its numeric code.

use crate::errors::SchemaError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// How a field is encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Closed, ordered set of labels encoded by position
    Categorical { options: Vec<String> },
    /// Free text parsed as a decimal number
    Numeric,
}

/// One named customer attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub tooltip: String,
}

impl FieldDescriptor {
    /// Create a categorical field
    pub fn categorical<I, S>(name: &str, options: I, tooltip: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            kind: FieldKind::Categorical {
                options: options.into_iter().map(Into::into).collect(),
            },
            tooltip: tooltip.to_string(),
        }
    }

    /// Create a numeric field
    pub fn numeric(name: &str, tooltip: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Numeric,
            tooltip: tooltip.to_string(),
        }
    }

    /// Option labels, present only for categorical fields
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::Categorical { options } => Some(options),
            FieldKind::Numeric => None,
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }
}

/// Ordered, immutable list of field descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct FeatureSchema {
    fields: Vec<FieldDescriptor>,
}

impl FeatureSchema {
    /// Build a schema, checking that every categorical field has a non-empty,
    /// duplicate-free option list and that field names are unique.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.to_lowercase()) {
                return Err(SchemaError::DuplicateField {
                    field: field.name.clone(),
                });
            }

            if let Some(options) = field.options() {
                if options.is_empty() {
                    return Err(SchemaError::MissingOptions {
                        field: field.name.clone(),
                    });
                }

                let mut seen = HashSet::new();
                for option in options {
                    if !seen.insert(option.as_str()) {
                        return Err(SchemaError::DuplicateOption {
                            field: field.name.clone(),
                            option: option.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { fields })
    }

    /// The built-in 19-field telco customer schema
    pub fn telco() -> Arc<FeatureSchema> {
        Arc::clone(&TELCO_SCHEMA)
    }

    /// The documented example customer, aligned with [`FeatureSchema::telco`]
    pub fn telco_sample() -> Vec<String> {
        TELCO_SAMPLE.iter().map(|value| value.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    /// Position of the field with the given name, ignoring ASCII case
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(name))
    }
}

impl TryFrom<Vec<FieldDescriptor>> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldDescriptor>) -> Result<Self, Self::Error> {
        FeatureSchema::new(fields)
    }
}

impl From<FeatureSchema> for Vec<FieldDescriptor> {
    fn from(schema: FeatureSchema) -> Self {
        schema.fields
    }
}

impl<'a> IntoIterator for &'a FeatureSchema {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Example customer used by "prefill"
pub const TELCO_SAMPLE: [&str; 19] = [
    "Female",
    "No",
    "Yes",
    "No",
    "5",
    "Yes",
    "No",
    "Fiber optic",
    "No",
    "Yes",
    "No",
    "No",
    "No",
    "Yes",
    "Month-to-month",
    "Yes",
    "Electronic check",
    "70.35",
    "350.5",
];

const YES_NO: [&str; 2] = ["No", "Yes"];
const INTERNET_ADDON: [&str; 3] = ["No", "Yes", "No internet service"];

static TELCO_SCHEMA: Lazy<Arc<FeatureSchema>> = Lazy::new(|| {
    // Checked by `test_telco_schema_is_valid`.
    Arc::new(FeatureSchema {
        fields: telco_fields(),
    })
});

fn telco_fields() -> Vec<FieldDescriptor> {
    use FieldDescriptor as F;

    vec![
        F::categorical("Gender", ["Female", "Male"], "Customer's gender."),
        F::categorical("Senior Citizen", YES_NO, "Is the customer a senior citizen?"),
        F::categorical("Partner", YES_NO, "Does the customer have a partner?"),
        F::categorical("Dependents", YES_NO, "Does the customer have dependents?"),
        F::numeric("Tenure (months)", "Number of months the customer has stayed."),
        F::categorical("Phone Service", YES_NO, "Is phone service active?"),
        F::categorical(
            "Multiple Lines",
            ["No", "Yes", "No phone service"],
            "Does the customer have multiple lines?",
        ),
        F::categorical(
            "Internet Service",
            ["DSL", "Fiber optic", "No"],
            "Type of internet service.",
        ),
        F::categorical("Online Security", INTERNET_ADDON, "Is online security enabled?"),
        F::categorical("Online Backup", INTERNET_ADDON, "Is online backup enabled?"),
        F::categorical(
            "Device Protection",
            INTERNET_ADDON,
            "Does the customer have device protection?",
        ),
        F::categorical("Tech Support", INTERNET_ADDON, "Is tech support active?"),
        F::categorical("Streaming TV", INTERNET_ADDON, "Is streaming TV subscribed?"),
        F::categorical(
            "Streaming Movies",
            INTERNET_ADDON,
            "Is streaming movies subscribed?",
        ),
        F::categorical(
            "Contract",
            ["Month-to-month", "One year", "Two year"],
            "Type of contract.",
        ),
        F::categorical("Paperless Billing", YES_NO, "Is paperless billing active?"),
        F::categorical(
            "Payment Method",
            ["Electronic check", "Mailed check", "Bank transfer", "Credit card"],
            "Customer's payment method.",
        ),
        F::numeric("Monthly Charges", "Current monthly bill amount."),
        F::numeric("Total Charges", "Total charges accumulated."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telco_schema_is_valid() {
        let checked = FeatureSchema::new(telco_fields()).unwrap();
        assert_eq!(checked, *FeatureSchema::telco());
        assert_eq!(checked.len(), 19);
    }

    #[test]
    fn test_telco_field_order() {
        let schema = FeatureSchema::telco();
        let names: Vec<&str> = schema.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names[0], "Gender");
        assert_eq!(names[4], "Tenure (months)");
        assert_eq!(names[14], "Contract");
        assert_eq!(names[18], "Total Charges");

        let numeric: Vec<usize> = schema
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_categorical())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(numeric, vec![4, 17, 18]);
    }

    #[test]
    fn test_sample_matches_schema_length() {
        assert_eq!(FeatureSchema::telco_sample().len(), FeatureSchema::telco().len());
    }

    #[test]
    fn test_index_of_ignores_case() {
        let schema = FeatureSchema::telco();
        assert_eq!(schema.index_of("payment method"), Some(16));
        assert_eq!(schema.index_of(" Gender "), Some(0));
        assert_eq!(schema.index_of("Favourite colour"), None);
    }

    #[test]
    fn test_rejects_empty_options() {
        let err = FeatureSchema::new(vec![FieldDescriptor::categorical(
            "Plan",
            Vec::<String>::new(),
            "",
        )])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingOptions {
                field: "Plan".into()
            }
        );
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = FeatureSchema::new(vec![FieldDescriptor::categorical(
            "Plan",
            ["Basic", "Basic"],
            "",
        )])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateOption { .. }));

        let err = FeatureSchema::new(vec![
            FieldDescriptor::numeric("Age", ""),
            FieldDescriptor::numeric("age", ""),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));

        assert_eq!(FeatureSchema::new(vec![]).unwrap_err(), SchemaError::Empty);
    }

    #[test]
    fn test_schema_json_shape() {
        let schema = FeatureSchema::new(vec![
            FieldDescriptor::categorical("Gender", ["Female", "Male"], "tip"),
            FieldDescriptor::numeric("Tenure", ""),
        ])
        .unwrap();

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json[0]["type"], "categorical");
        assert_eq!(json[0]["options"][1], "Male");
        assert_eq!(json[1]["type"], "numeric");

        let parsed: FeatureSchema = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, schema);

        let invalid = serde_json::json!([{ "name": "Plan", "type": "categorical", "options": [] }]);
        assert!(serde_json::from_value::<FeatureSchema>(invalid).is_err());
    }
}
