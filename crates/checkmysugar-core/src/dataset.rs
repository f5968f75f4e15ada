//! # Dataset Module
//!
//! Turns the raw CSV text into an ndarray training set.
//!
//! The source file has no header and only numeric cells, so rows are split
//! on commas directly. A header line is tolerated when its first cell is the
//! first column name from the schema.

use crate::schema::{ColumnRole, FeatureSchema, SchemaError};
use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors raised while reading training rows.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset contains no rows")]
    Empty,

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: column '{column}' has non-finite or non-numeric value '{value}'")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: label must be 0 or 1, found '{value}'")]
    InvalidLabel { line: usize, value: String },

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Feature matrix and binary labels, one row per record.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// `rows x feature_count` matrix in schema feature order.
    pub records: Array2<f64>,
    /// Class per row: 0 or 1.
    pub targets: Array1<usize>,
}

impl TrainingSet {
    /// Build a training set from already-split arrays.
    pub fn new(records: Array2<f64>, targets: Array1<usize>) -> Self {
        Self { records, targets }
    }

    /// Parse CSV text laid out as described by `schema`.
    ///
    /// Dropped columns must be present and numeric but are discarded.
    pub fn from_csv(text: &str, schema: &FeatureSchema) -> Result<Self, DatasetError> {
        schema.validate()?;

        let columns = schema.columns();
        let feature_count = schema.feature_count();
        let mut values: Vec<f64> = Vec::new();
        let mut targets: Vec<usize> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let cells: Vec<&str> = raw.split(',').map(str::trim).collect();
            if index == 0 && is_header(&cells, schema) {
                continue;
            }
            if cells.len() != columns.len() {
                return Err(DatasetError::ColumnCount {
                    line,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }

            for (column, cell) in columns.iter().zip(&cells) {
                match column.role {
                    ColumnRole::Target => targets.push(parse_label(line, cell)?),
                    ColumnRole::Feature { .. } | ColumnRole::Dropped => {
                        let value = cell
                            .parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite())
                            .ok_or_else(|| DatasetError::InvalidValue {
                                line,
                                column: column.name,
                                value: (*cell).to_string(),
                            })?;
                        if matches!(column.role, ColumnRole::Feature { .. }) {
                            values.push(value);
                        }
                    }
                }
            }
        }

        if targets.is_empty() {
            return Err(DatasetError::Empty);
        }

        let records = Array2::from_shape_vec((targets.len(), feature_count), values)?;
        Ok(Self::new(records, Array1::from_vec(targets)))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of rows labelled 1.
    pub fn positives(&self) -> usize {
        self.targets.iter().filter(|&&t| t == 1).count()
    }

    /// Width of the feature matrix.
    pub fn feature_count(&self) -> usize {
        self.records.ncols()
    }
}

fn is_header(cells: &[&str], schema: &FeatureSchema) -> bool {
    match (cells.first(), schema.columns().first()) {
        (Some(cell), Some(column)) => cell.eq_ignore_ascii_case(column.name),
        _ => false,
    }
}

fn parse_label(line: usize, cell: &str) -> Result<usize, DatasetError> {
    let invalid = || DatasetError::InvalidLabel {
        line,
        value: cell.to_string(),
    };
    match cell {
        "0" => Ok(0),
        "1" => Ok(1),
        _ => match cell.parse::<f64>().map_err(|_| invalid())? {
            v if v == 0.0 => Ok(0),
            v if v == 1.0 => Ok(1),
            _ => Err(invalid()),
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
6,148,72,35,0,33.6,0.627,50,1
1,85,66,29,0,26.6,0.351,31,0
8,183,64,0,0,23.3,0.672,32,1
";

    #[test]
    fn parses_headerless_rows() {
        let set = TrainingSet::from_csv(SAMPLE, &FeatureSchema::pima()).ok();

        assert_eq!(set.as_ref().map(TrainingSet::len), Some(3));
        assert_eq!(set.as_ref().map(TrainingSet::feature_count), Some(7));
        assert_eq!(set.as_ref().map(TrainingSet::positives), Some(2));
        assert_eq!(set.map(|s| s.targets.to_vec()), Some(vec![1, 0, 1]));
    }

    #[test]
    fn drops_skin_thickness_column() {
        let set = TrainingSet::from_csv(SAMPLE, &FeatureSchema::pima())
            .map(|s| s.records.row(0).to_vec())
            .ok();

        // SkinThickness (35) is gone, Insulin (0) follows BloodPressure (72)
        assert_eq!(set, Some(vec![6.0, 148.0, 72.0, 0.0, 33.6, 0.627, 50.0]));
    }

    #[test]
    fn skips_header_and_blank_lines() {
        let text = format!(
            "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome\n\n{SAMPLE}\n"
        );
        let rows = TrainingSet::from_csv(&text, &FeatureSchema::pima()).map(|s| s.len());
        assert_eq!(rows.ok(), Some(3));
    }

    #[test]
    fn empty_text_rejected() {
        let err = TrainingSet::from_csv("\n\n", &FeatureSchema::pima());
        assert!(matches!(err, Err(DatasetError::Empty)));
    }

    #[test]
    fn short_row_rejected_with_line_number() {
        let text = "6,148,72,35,0,33.6,0.627,50,1\n1,85,66\n";
        let err = TrainingSet::from_csv(text, &FeatureSchema::pima());
        assert!(matches!(
            err,
            Err(DatasetError::ColumnCount {
                line: 2,
                expected: 9,
                found: 3
            })
        ));
    }

    #[test]
    fn non_numeric_cell_rejected() {
        let text = "6,148,high,35,0,33.6,0.627,50,1\n";
        let err = TrainingSet::from_csv(text, &FeatureSchema::pima());
        assert!(matches!(
            err,
            Err(DatasetError::InvalidValue {
                line: 1,
                column: "BloodPressure",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_cells_rejected() {
        for cell in ["NaN", "inf", "-inf"] {
            let text = format!("6,148,72,35,{cell},33.6,0.627,50,1\n");
            let err = TrainingSet::from_csv(&text, &FeatureSchema::pima());
            assert!(matches!(
                err,
                Err(DatasetError::InvalidValue {
                    line: 1,
                    column: "Insulin",
                    ..
                })
            ));
        }
    }

    #[test]
    fn non_finite_dropped_column_rejected() {
        let text = "6,148,72,NaN,0,33.6,0.627,50,1\n";
        let err = TrainingSet::from_csv(text, &FeatureSchema::pima());
        assert!(matches!(
            err,
            Err(DatasetError::InvalidValue {
                column: "SkinThickness",
                ..
            })
        ));
    }

    #[test]
    fn non_binary_label_rejected() {
        let text = "6,148,72,35,0,33.6,0.627,50,2\n";
        let err = TrainingSet::from_csv(text, &FeatureSchema::pima());
        assert!(matches!(err, Err(DatasetError::InvalidLabel { line: 1, .. })));
    }

    #[test]
    fn float_labels_accepted() {
        let text = "6,148,72,35,0,33.6,0.627,50,1.0\n1,85,66,29,0,26.6,0.351,31,0.0\n";
        let targets = TrainingSet::from_csv(text, &FeatureSchema::pima()).map(|s| s.targets.to_vec());
        assert_eq!(targets.ok(), Some(vec![1, 0]));
    }
}
