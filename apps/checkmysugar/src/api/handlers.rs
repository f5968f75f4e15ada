//! HTTP request handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::Html,
};
use checkmysugar_core::{Banner, parse_form, render_page};
use tracing::{debug, error, info};

use super::state::AppState;

/// Banner text when the model itself fails. Details go to the log only.
pub const PREDICTION_FAILED: &str = "prediction failed";

/// GET `/`: the empty form.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(&state.schema, None))
}

/// POST `/`: coerce the fields, predict, and render the form with a banner.
///
/// Always answers 200; failures are shown in the banner.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable form body, treating as empty");
            HashMap::new()
        }
    };

    let banner = evaluate(&state, &fields);
    Html(render_page(&state.schema, Some(&banner)))
}

fn evaluate(state: &AppState, fields: &HashMap<String, String>) -> Banner {
    let features = match parse_form(&state.schema, fields) {
        Ok(features) => features,
        Err(err) => {
            debug!(field = err.field(), error = %err, "Rejected submission");
            return Banner::failure(err);
        }
    };

    match state.predictor.predict(&features) {
        Ok(prediction) => {
            info!(
                diagnosis = ?prediction.diagnosis,
                confidence_percent = prediction.confidence,
                "Prediction served"
            );
            Banner::Diagnosis(prediction)
        }
        Err(err) => {
            error!(error = %err, "Prediction failed");
            Banner::failure(PREDICTION_FAILED)
        }
    }
}
