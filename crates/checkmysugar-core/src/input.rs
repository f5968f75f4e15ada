//! # Input Module
//!
//! Coerces submitted form fields into a feature vector.
//!
//! Fields are read by the exact schema names and converted in schema order.
//! The first failing field stops parsing. Failures are typed so the page can
//! show a short message naming the field, never the raw submitted text.

use crate::schema::FeatureSchema;
use std::collections::HashMap;
use thiserror::Error;

/// Why a submission could not become a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The field was absent or blank.
    #[error("{label} is required")]
    MissingField {
        field: &'static str,
        label: &'static str,
    },

    /// The field did not hold a finite number.
    #[error("{label} must be a number")]
    InvalidNumber {
        field: &'static str,
        label: &'static str,
    },

    #[error("expected {expected} values, found {found}")]
    WrongLength { expected: usize, found: usize },
}

impl InputError {
    /// Form field name the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. } | Self::InvalidNumber { field, .. } => Some(*field),
            Self::WrongLength { .. } => None,
        }
    }
}

/// Ordered model inputs, one value per schema feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap `values`, which must have one entry per schema feature.
    pub fn new(schema: &FeatureSchema, values: Vec<f64>) -> Result<Self, InputError> {
        let expected = schema.feature_count();
        if values.len() != expected {
            return Err(InputError::WrongLength {
                expected,
                found: values.len(),
            });
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read every schema feature out of `form`.
pub fn parse_form(
    schema: &FeatureSchema,
    form: &HashMap<String, String>,
) -> Result<FeatureVector, InputError> {
    let values = schema
        .features()
        .map(|feature| {
            let raw = form
                .get(feature.name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .ok_or(InputError::MissingField {
                    field: feature.name,
                    label: feature.label,
                })?;

            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(InputError::InvalidNumber {
                    field: feature.name,
                    label: feature.label,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    FeatureVector::new(schema, values)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pima_form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn complete_form() -> HashMap<String, String> {
        pima_form(&[
            ("Pregnancies", "6"),
            ("Glucose", "148"),
            ("BloodPressure", "72"),
            ("Insulin", "0"),
            ("BMI", "33.6"),
            ("DiabetesPedigreeFunction", "0.627"),
            ("Age", "50"),
        ])
    }

    #[test]
    fn complete_form_parses_in_schema_order() {
        let vector = parse_form(&FeatureSchema::pima(), &complete_form());
        assert_eq!(
            vector.as_ref().map(FeatureVector::values).ok(),
            Some(&[6.0, 148.0, 72.0, 0.0, 33.6, 0.627, 50.0][..])
        );
    }

    #[test]
    fn missing_glucose_reported() {
        let mut form = complete_form();
        form.remove("Glucose");

        let err = parse_form(&FeatureSchema::pima(), &form);
        assert_eq!(
            err,
            Err(InputError::MissingField {
                field: "Glucose",
                label: "Glucose Level (mg/dL)"
            })
        );
    }

    #[test]
    fn blank_field_counts_as_missing() {
        let mut form = complete_form();
        form.insert("BMI".to_string(), "   ".to_string());

        let err = parse_form(&FeatureSchema::pima(), &form);
        assert_eq!(err.err().and_then(|e| e.field()), Some("BMI"));
    }

    #[test]
    fn non_numeric_age_reported() {
        let mut form = complete_form();
        form.insert("Age".to_string(), "abc".to_string());

        let err = parse_form(&FeatureSchema::pima(), &form);
        assert!(matches!(err, Err(InputError::InvalidNumber { field: "Age", .. })));
    }

    #[test]
    fn non_finite_values_rejected() {
        for raw in ["NaN", "inf", "-infinity"] {
            let mut form = complete_form();
            form.insert("Insulin".to_string(), raw.to_string());
            let err = parse_form(&FeatureSchema::pima(), &form);
            assert!(matches!(err, Err(InputError::InvalidNumber { field: "Insulin", .. })));
        }
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        let mut form = complete_form();
        form.insert("Age".to_string(), " 50 \n".to_string());
        assert!(parse_form(&FeatureSchema::pima(), &form).is_ok());
    }

    #[test]
    fn first_failure_wins() {
        let err = parse_form(&FeatureSchema::pima(), &HashMap::new());
        assert_eq!(err.err().and_then(|e| e.field()), Some("Pregnancies"));
    }

    #[test]
    fn messages_do_not_echo_input() {
        let mut form = complete_form();
        form.insert("Age".to_string(), "<script>".to_string());

        let message = parse_form(&FeatureSchema::pima(), &form)
            .err()
            .map(|e| e.to_string());
        assert_eq!(message.as_deref(), Some("Age (years) must be a number"));
    }

    #[test]
    fn wrong_length_rejected() {
        let err = FeatureVector::new(&FeatureSchema::pima(), vec![1.0; 3]);
        assert_eq!(
            err,
            Err(InputError::WrongLength {
                expected: 7,
                found: 3
            })
        );
    }

    proptest! {
        #[test]
        fn any_finite_number_is_accepted(x in -1.0e9f64..1.0e9f64) {
            let text = x.to_string();
            let form: HashMap<String, String> = FeatureSchema::pima()
                .features()
                .map(|f| (f.name.to_string(), text.clone()))
                .collect();

            let vector = parse_form(&FeatureSchema::pima(), &form);
            prop_assert_eq!(vector.map(|v| v.values().to_vec()), Ok(vec![x; 7]));
        }

        #[test]
        fn alphabetic_text_is_invalid(word in "[a-zA-Z]{1,12}") {
            let mut form = complete_form();
            form.insert("Glucose".to_string(), word);

            let err = parse_form(&FeatureSchema::pima(), &form);
            let is_invalid_glucose = matches!(err, Err(InputError::InvalidNumber { field: "Glucose", .. }));
            prop_assert!(is_invalid_glucose);
        }
    }
}
