//! # Predictor Module
//!
//! The seam between the HTTP handler and the trained model.
//!
//! The server holds an `Arc<dyn Predictor>` built once at startup, so the
//! handler can be exercised with a stub in tests and never touches a global.

use crate::forest::{ForestError, RandomForest};
use crate::input::FeatureVector;
use thiserror::Error;

/// Binary outcome shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnosis {
    Diabetic,
    NotDiabetic,
}

impl Diagnosis {
    /// Map a model class to a diagnosis. Class 1 is the positive outcome.
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(Self::NotDiabetic),
            1 => Some(Self::Diabetic),
            _ => None,
        }
    }

    /// Banner text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Diabetic => "🟥 Diabetic",
            Self::NotDiabetic => "🟩 Not Diabetic",
        }
    }

    /// Banner background color.
    pub fn color(self) -> &'static str {
        match self {
            Self::Diabetic => "#e53935",
            Self::NotDiabetic => "#43a047",
        }
    }
}

/// A single inference result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    /// Share of the ensemble that agreed, 0 to 100.
    pub confidence: u8,
}

impl Prediction {
    pub fn new(diagnosis: Diagnosis, confidence: u8) -> Self {
        Self {
            diagnosis,
            confidence: confidence.min(100),
        }
    }
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model error: {0}")]
    Model(#[from] ForestError),

    #[error("model produced unknown class {0}")]
    UnknownClass(usize),
}

/// Anything that can turn a feature vector into a diagnosis.
///
/// Implementations must be deterministic: the same vector always yields
/// the same prediction.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, PredictError>;
}

impl Predictor for RandomForest {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, PredictError> {
        let (class, confidence) = self.classify(features.values())?;
        let diagnosis = Diagnosis::from_class(class).ok_or(PredictError::UnknownClass(class))?;
        Ok(Prediction::new(diagnosis, confidence))
    }
}

// =============================================================================
// TESTS
// =============================================================================
