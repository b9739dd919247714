//! Type-directed encoding of form values
//!
//! Encoding is total: it never fails and never blocks a submission. Values
//! that cannot be encoded turn into reserved markers and travel to the
//! prediction service unchanged.

use crate::form::FormState;
use crate::schema::{FeatureSchema, FieldKind};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Code for a categorical value that is empty or absent from its option list
pub const UNKNOWN_CATEGORY: f64 = -1.0;

/// Marker for a numeric value that does not parse. Serialized as JSON `null`.
pub const NOT_A_NUMBER: f64 = f64::NAN;

/// Ordered numeric features, index-aligned with the schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EncodedVector(Vec<f64>);

impl EncodedVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }
}

impl From<Vec<f64>> for EncodedVector {
    fn from(values: Vec<f64>) -> Self {
        EncodedVector(values)
    }
}

#[derive(Debug, Clone)]
enum FieldEncoding {
    Categorical(HashMap<String, usize>),
    Numeric,
}

/// Encoder with the option-to-code tables of a schema built up front
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    names: Vec<String>,
    encodings: Vec<FieldEncoding>,
}

impl FeatureEncoder {
    pub fn new(schema: &FeatureSchema) -> Self {
        let names = schema.iter().map(|f| f.name.clone()).collect();
        let encodings = schema
            .iter()
            .map(|field| match &field.kind {
                FieldKind::Categorical { options } => FieldEncoding::Categorical(
                    options
                        .iter()
                        .enumerate()
                        .map(|(code, option)| (option.clone(), code))
                        .collect(),
                ),
                FieldKind::Numeric => FieldEncoding::Numeric,
            })
            .collect();

        Self { names, encodings }
    }

    pub fn len(&self) -> usize {
        self.encodings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encodings.is_empty()
    }

    pub fn encode(&self, form: &FormState) -> EncodedVector {
        self.encode_values(form.values())
    }

    /// Encode raw values. Slots beyond the schema are ignored and missing
    /// trailing slots encode as if unset.
    pub fn encode_values<S: AsRef<str>>(&self, values: &[S]) -> EncodedVector {
        let encoded = self
            .encodings
            .iter()
            .enumerate()
            .map(|(index, encoding)| {
                let raw = values.get(index).map(|v| v.as_ref()).unwrap_or("");
                self.encode_field(index, encoding, raw)
            })
            .collect();

        EncodedVector(encoded)
    }

    /// Number of fields in `encoded` holding the marker for their kind. A
    /// numeric field that parsed to `-1` is not an anomaly.
    pub fn anomaly_count(&self, encoded: &EncodedVector) -> usize {
        self.encodings
            .iter()
            .zip(encoded.iter())
            .filter(|(encoding, value)| match encoding {
                FieldEncoding::Categorical(_) => **value == UNKNOWN_CATEGORY,
                FieldEncoding::Numeric => value.is_nan(),
            })
            .count()
    }

    fn encode_field(&self, index: usize, encoding: &FieldEncoding, raw: &str) -> f64 {
        match encoding {
            FieldEncoding::Categorical(codes) => match codes.get(raw) {
                Some(code) => *code as f64,
                None => {
                    debug!(field = %self.names[index], value = raw, "unrecognized category");
                    UNKNOWN_CATEGORY
                }
            },
            FieldEncoding::Numeric => parse_decimal(raw).unwrap_or_else(|| {
                debug!(field = %self.names[index], value = raw, "unparsable number");
                NOT_A_NUMBER
            }),
        }
    }
}

/// Encode a form against a schema
pub fn encode(schema: &FeatureSchema, form: &FormState) -> EncodedVector {
    FeatureEncoder::new(schema).encode(form)
}

/// Parse a finite decimal number such as `5`, `-3.5`, `.5` or `1e3`.
/// Surrounding whitespace is ignored.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Rust's float grammar also accepts "inf" and "NaN".
    let decimal_chars = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !decimal_chars {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    #[test]
    fn test_parse_decimal_accepts_decimals() {
        assert_eq!(parse_decimal("5"), Some(5.0));
        assert_eq!(parse_decimal("70.35"), Some(70.35));
        assert_eq!(parse_decimal(" -3.5 "), Some(-3.5));
        assert_eq!(parse_decimal(".5"), Some(0.5));
        assert_eq!(parse_decimal("1e3"), Some(1000.0));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for raw in ["", "   ", "abc", "5 months", "inf", "NaN", "-infinity", "1e999", "--1", "1.2.3"] {
            assert_eq!(parse_decimal(raw), None, "{raw:?} should not parse");
        }
    }

    #[test]
    fn test_concrete_gender_and_tenure() {
        let schema = FeatureSchema::telco();
        let mut form = FormState::empty(&schema);
        form.set_field(0, "Male").unwrap();
        form.set_field(4, "5").unwrap();

        let encoded = encode(&schema, &form);
        assert_eq!(encoded.len(), 19);
        assert_eq!(encoded.get(0), Some(1.0));
        assert_eq!(encoded.get(4), Some(5.0));
    }

    #[test]
    fn test_unset_gender_is_sentinel() {
        let schema = FeatureSchema::telco();
        let form = FormState::empty(&schema);
        let encoded = encode(&schema, &form);
        assert_eq!(encoded.get(0), Some(UNKNOWN_CATEGORY));
        assert!(encoded.get(4).unwrap().is_nan());
        assert_eq!(FeatureEncoder::new(&schema).anomaly_count(&encoded), 19);
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let schema = FeatureSchema::new(vec![FieldDescriptor::categorical(
            "Contract",
            ["Month-to-month", "One year"],
            "",
        )])
        .unwrap();
        let encoder = FeatureEncoder::new(&schema);
        assert_eq!(encoder.encode_values(&["One year"]).get(0), Some(1.0));
        assert_eq!(encoder.encode_values(&["one year"]).get(0), Some(UNKNOWN_CATEGORY));
    }

    #[test]
    fn test_sample_encoding() {
        let schema = FeatureSchema::telco();
        let encoder = FeatureEncoder::new(&schema);
        let encoded = encoder.encode_values(&FeatureSchema::telco_sample());
        let expected = [
            0.0, 0.0, 1.0, 0.0, 5.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0,
            70.35, 350.5,
        ];
        assert_eq!(encoded.as_slice(), &expected);
        assert_eq!(encoder.anomaly_count(&encoded), 0);
    }

    #[test]
    fn test_negative_one_charge_is_not_an_anomaly() {
        let schema = FeatureSchema::telco();
        let encoder = FeatureEncoder::new(&schema);
        let mut values = FeatureSchema::telco_sample();
        values[18] = "-1".to_string();
        values[0] = "Other".to_string();
        values[4] = "five".to_string();

        let encoded = encoder.encode_values(&values);
        assert_eq!(encoded.get(18), Some(-1.0));
        assert_eq!(encoded.get(0), Some(UNKNOWN_CATEGORY));
        assert_eq!(encoder.anomaly_count(&encoded), 2);
    }

    #[test]
    fn test_not_a_number_serializes_as_null() {
        let vector = EncodedVector::from(vec![1.0, NOT_A_NUMBER, UNKNOWN_CATEGORY]);
        assert_eq!(serde_json::to_string(&vector).unwrap(), "[1.0,null,-1.0]");
    }
}
