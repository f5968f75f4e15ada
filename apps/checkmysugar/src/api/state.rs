//! Shared, read-only server state.

use checkmysugar_core::{FeatureSchema, Predictor};
use std::sync::Arc;

/// Built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub schema: FeatureSchema,
    pub predictor: Arc<dyn Predictor>,
}

impl AppState {
    pub fn new(schema: FeatureSchema, predictor: Arc<dyn Predictor>) -> Self {
        Self { schema, predictor }
    }
}
