//! # CheckMySugar Core
//!
//! The deterministic prediction engine behind the CheckMySugar form.
//!
//! ## Pipeline
//!
//! ```text
//! CSV text ──► TrainingSet ──► ForestParams::fit ──► RandomForest
//!                                                        │
//! form fields ──► parse_form ──► FeatureVector ──► Predictor::predict
//!                                                        │
//!                                      Banner ◄── Prediction
//! ```
//!
//! Every stage takes the same [`FeatureSchema`], so the columns used for
//! training and the fields read from the form cannot drift apart.
//!
//! This crate performs no I/O. Fetching data, writing snapshots and serving
//! HTTP live in the `checkmysugar` app crate.

pub mod dataset;
pub mod forest;
pub mod formats;
pub mod input;
pub mod page;
pub mod predictor;
pub mod schema;

pub use dataset::{DatasetError, TrainingSet};
pub use forest::{ForestError, ForestParams, MaxFeatures, RandomForest};
pub use formats::{FormatError, decode_snapshot, encode_snapshot};
pub use input::{FeatureVector, InputError, parse_form};
pub use page::{Banner, render_page};
pub use predictor::{Diagnosis, PredictError, Prediction, Predictor};
pub use schema::{Column, ColumnRole, Feature, FeatureSchema, SchemaError};
