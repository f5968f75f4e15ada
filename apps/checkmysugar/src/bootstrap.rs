//! # Startup Bootstrap
//!
//! Everything that happens once before the server accepts requests:
//! fetching the dataset, fitting the forest, writing the model snapshot,
//! and opening a browser tab.
//!
//! Fetch, parse and fit failures are fatal and bubble up as [`AppError`].
//! The snapshot write and browser launch are conveniences; callers log
//! their failures and carry on.

use crate::error::{AppError, Result};
use checkmysugar_core::{
    FeatureSchema, ForestParams, RandomForest, TrainingSet, decode_snapshot, encode_snapshot,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Published Pima Indians diabetes dataset (headerless CSV).
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/jbrownlee/Datasets/master/pima-indians-diabetes.data.csv";

/// Where the training CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Url(DEFAULT_DATA_URL.to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the raw CSV text from `source`.
pub async fn fetch_dataset(source: &DataSource, timeout: Duration) -> Result<String> {
    info!(source = %source, "Loading training data");

    match source {
        DataSource::Url(url) => {
            let fetch_err = |source| AppError::Fetch {
                url: url.clone(),
                source,
            };
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(fetch_err)?;
            let response = client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(fetch_err)?;
            response.text().await.map_err(fetch_err)
        }
        DataSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| AppError::Read {
                    path: path.clone(),
                    source,
                })
        }
    }
}

/// What a training run produced, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingSummary {
    pub rows: usize,
    pub positives: usize,
    pub trees: usize,
    pub accuracy_percent: u8,
}

/// Parse `text` and fit a forest on the blocking pool.
pub async fn train_model(
    schema: FeatureSchema,
    text: String,
    params: ForestParams,
) -> Result<(RandomForest, TrainingSummary)> {
    let (forest, summary) = tokio::task::spawn_blocking(move || -> Result<_> {
        let set = TrainingSet::from_csv(&text, &schema)?;
        let forest = params.fit(&set)?;
        let summary = TrainingSummary {
            rows: set.len(),
            positives: set.positives(),
            trees: forest.n_trees(),
            accuracy_percent: forest.accuracy_percent(&set)?,
        };
        Ok((forest, summary))
    })
    .await??;

    info!(
        rows = summary.rows,
        positives = summary.positives,
        trees = summary.trees,
        seed = params.seed,
        training_accuracy_percent = summary.accuracy_percent,
        "Model trained"
    );
    Ok((forest, summary))
}

/// Encode `forest` and write it to `path`.
pub async fn write_snapshot(path: &Path, schema: &FeatureSchema, forest: &RandomForest) -> Result<()> {
    let bytes = encode_snapshot(schema, forest)?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|source| AppError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), bytes = bytes.len(), "Model snapshot written");
    Ok(())
}

/// Read a snapshot previously written by [`write_snapshot`].
pub async fn load_snapshot(path: &Path, schema: &FeatureSchema) -> Result<RandomForest> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let forest = decode_snapshot(schema, &bytes)?;
    info!(path = %path.display(), trees = forest.n_trees(), "Model snapshot loaded");
    Ok(forest)
}

/// Open `url` in the default browser after `delay`, in the background.
///
/// The launcher is detached, so the task never waits on the browser process.
pub fn open_browser(url: String, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(err) = open::that_detached(&url) {
            warn!(url = %url, error = %err, "Could not open browser");
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_is_pima_url() {
        assert_eq!(DataSource::default(), DataSource::Url(DEFAULT_DATA_URL.to_string()));
    }

    #[test]
    fn source_display() {
        let file = DataSource::File(PathBuf::from("data/pima.csv"));
        assert_eq!(file.to_string(), "data/pima.csv");
        assert!(DataSource::default().to_string().starts_with("https://"));
    }
}
