//! # Schema Module
//!
//! The column table shared by training and serving.
//!
//! The dataset is published as a headerless CSV with nine columns. One of
//! them is ignored, one is the label, and the remaining seven are both the
//! model's features and the form's input fields. Keeping all of that in a
//! single table means the form can never ask for a column the model was not
//! trained on, or in a different order.

use std::collections::BTreeSet;
use thiserror::Error;

// =============================================================================
// COLUMN TABLE
// =============================================================================

/// What a CSV column is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// A model input, shown on the form with a human-readable label.
    Feature { label: &'static str },
    /// Present in the source file but excluded from training.
    Dropped,
    /// The binary outcome the model learns to predict.
    Target,
}

/// One column of the source CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name. For features this is also the form field name.
    pub name: &'static str,
    /// How the column is used.
    pub role: ColumnRole,
}

impl Column {
    pub const fn feature(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            role: ColumnRole::Feature { label },
        }
    }

    pub const fn dropped(name: &'static str) -> Self {
        Self {
            name,
            role: ColumnRole::Dropped,
        }
    }

    pub const fn target(name: &'static str) -> Self {
        Self {
            name,
            role: ColumnRole::Target,
        }
    }
}

/// Pima Indians diabetes columns, in file order.
const PIMA_COLUMNS: &[Column] = &[
    Column::feature("Pregnancies", "Number of Pregnancies"),
    Column::feature("Glucose", "Glucose Level (mg/dL)"),
    Column::feature("BloodPressure", "Blood Pressure (mm Hg)"),
    Column::dropped("SkinThickness"),
    Column::feature("Insulin", "Insulin Level (mu U/mL)"),
    Column::feature("BMI", "Body Mass Index (BMI)"),
    Column::feature("DiabetesPedigreeFunction", "Genetic Risk Factor"),
    Column::feature("Age", "Age (years)"),
    Column::target("Outcome"),
];

// =============================================================================
// ERRORS
// =============================================================================

/// A column table that cannot drive both training and the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("column {index} has an empty name")]
    EmptyName { index: usize },

    #[error("column name '{0}' appears more than once")]
    DuplicateName(&'static str),

    #[error("expected exactly one target column, found {0}")]
    TargetCount(usize),

    #[error("schema has no feature columns")]
    NoFeatures,
}

// =============================================================================
// FEATURE SCHEMA
// =============================================================================

/// A feature column resolved against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    /// Form field name and CSV column name.
    pub name: &'static str,
    /// Label shown next to the form input.
    pub label: &'static str,
    /// Index of the column in a CSV row.
    pub column: usize,
    /// Index of the value in a feature vector.
    pub position: usize,
}

/// Ordered column table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: &'static [Column],
}

impl FeatureSchema {
    /// Wrap a column table. Call [`FeatureSchema::validate`] before use.
    pub const fn new(columns: &'static [Column]) -> Self {
        Self { columns }
    }

    /// The Pima Indians diabetes schema, with `SkinThickness` dropped.
    pub const fn pima() -> Self {
        Self::new(PIMA_COLUMNS)
    }

    /// All columns in file order.
    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    /// Number of columns in a CSV row.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check that the table has unique names, one target and at least one feature.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for (index, column) in self.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(SchemaError::EmptyName { index });
            }
            if !seen.insert(column.name) {
                return Err(SchemaError::DuplicateName(column.name));
            }
        }

        let targets = self
            .columns
            .iter()
            .filter(|c| c.role == ColumnRole::Target)
            .count();
        if targets != 1 {
            return Err(SchemaError::TargetCount(targets));
        }

        if self.feature_count() == 0 {
            return Err(SchemaError::NoFeatures);
        }

        Ok(())
    }

    /// Feature columns in vector order.
    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(column, c)| match c.role {
                ColumnRole::Feature { label } => Some((column, c.name, label)),
                _ => None,
            })
            .enumerate()
            .map(|(position, (column, name, label))| Feature {
                name,
                label,
                column,
                position,
            })
    }

    /// Length of a feature vector.
    pub fn feature_count(&self) -> usize {
        self.features().count()
    }

    /// Index of the target column, if there is one.
    pub fn target_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.role == ColumnRole::Target)
    }

    /// Ordered feature names. Stored with model snapshots.
    pub fn fingerprint(&self) -> Vec<String> {
        self.features().map(|f| f.name.to_string()).collect()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::pima()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pima_schema_is_valid() {
        assert_eq!(FeatureSchema::pima().validate(), Ok(()));
    }

    #[test]
    fn pima_has_seven_features_without_skin_thickness() {
        let schema = FeatureSchema::pima();
        let names: Vec<_> = schema.features().map(|f| f.name).collect();

        assert_eq!(schema.feature_count(), 7);
        assert_eq!(
            names,
            vec![
                "Pregnancies",
                "Glucose",
                "BloodPressure",
                "Insulin",
                "BMI",
                "DiabetesPedigreeFunction",
                "Age",
            ]
        );
        assert!(!names.contains(&"SkinThickness"));
    }

    #[test]
    fn feature_positions_skip_dropped_column() {
        let schema = FeatureSchema::pima();
        let insulin = schema.features().find(|f| f.name == "Insulin");

        assert_eq!(insulin.map(|f| (f.column, f.position)), Some((4, 3)));
        assert_eq!(schema.target_index(), Some(8));
        assert_eq!(schema.column_count(), 9);
    }

    #[test]
    fn duplicate_names_rejected() {
        const COLUMNS: &[Column] = &[
            Column::feature("a", "A"),
            Column::feature("a", "A again"),
            Column::target("y"),
        ];
        let err = FeatureSchema::new(COLUMNS).validate();
        assert_eq!(err, Err(SchemaError::DuplicateName("a")));
    }

    #[test]
    fn missing_target_rejected() {
        const COLUMNS: &[Column] = &[Column::feature("a", "A")];
        let err = FeatureSchema::new(COLUMNS).validate();
        assert_eq!(err, Err(SchemaError::TargetCount(0)));
    }

    #[test]
    fn schema_without_features_rejected() {
        const COLUMNS: &[Column] = &[Column::dropped("x"), Column::target("y")];
        let err = FeatureSchema::new(COLUMNS).validate();
        assert_eq!(err, Err(SchemaError::NoFeatures));
    }

    #[test]
    fn fingerprint_follows_feature_order() {
        let fingerprint = FeatureSchema::pima().fingerprint();
        assert_eq!(fingerprint.first().map(String::as_str), Some("Pregnancies"));
        assert_eq!(fingerprint.last().map(String::as_str), Some("Age"));
    }
}
