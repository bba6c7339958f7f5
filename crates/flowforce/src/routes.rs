use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use flowforce_core::constants::{DEFAULT_EVENT, STANDARD_EVENTS};
use flowforce_core::error::ValidationError;
use flowforce_core::forces::{ForceValues, Observation};
use flowforce_core::outputs::create_bundle;
use flowforce_core::parameters::{FootingShape, ParameterOverrides, StructureParameters};
use flowforce_core::session::{self, EventSelection, FileFailure, ProcessedFile, SheetReport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const BUNDLE_FILE_NAME: &str = "flowforce_results.zip";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Internal(String),
    #[error("{}", .0.body_text())]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) | ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(err) => err.status(),
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Deserialize)]
pub struct DefaultsQuery {
    pub shape: Option<String>,
}

pub async fn defaults(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DefaultsQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(query) = query?;
    let shape = query
        .shape
        .as_deref()
        .filter(|shape| !shape.trim().is_empty())
        .map(str::parse::<FootingShape>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let params = state
        .defaults
        .clone()
        .merge(ParameterOverrides {
            shape,
            ..ParameterOverrides::default()
        })
        .resolve();

    let shapes: Vec<_> = FootingShape::ALL
        .iter()
        .map(|shape| {
            json!({
                "value": shape.as_str(),
                "label": shape.label(),
                "drag_coefficient": shape.default_drag_coefficient(),
            })
        })
        .collect();

    Ok(Json(json!({
        "parameters": params,
        "events": STANDARD_EVENTS,
        "default_event": DEFAULT_EVENT,
        "shapes": shapes,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviewRequest {
    pub observation: Observation,
    #[serde(default)]
    pub parameters: ParameterOverrides,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub parameters: StructureParameters,
    pub forces: ForceValues,
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let Json(request) = payload?;
    let params = state.defaults.clone().merge(request.parameters).resolve();
    let forces = session::preview(&request.observation, &params)?;

    Ok(Json(PreviewResponse {
        parameters: params,
        forces,
    }))
}

struct Upload {
    file_name: String,
    content: Vec<u8>,
}

struct CalculationRequest {
    uploads: Vec<Upload>,
    selection: EventSelection,
    params: StructureParameters,
}

async fn read_calculation_request(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<CalculationRequest, ApiError> {
    let mut uploads = Vec::new();
    let mut overrides = ParameterOverrides::default();
    let mut selection = EventSelection::All;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content = field.bytes().await?;
                uploads.push(Upload {
                    file_name,
                    content: content.to_vec(),
                });
            }
            "parameters" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    overrides = serde_json::from_str(&text)
                        .map_err(|err| ApiError::BadRequest(format!("Invalid parameters: {err}")))?;
                }
            }
            "events" => {
                let text = field.text().await?;
                selection = EventSelection::parse(&text);
            }
            other => warn!(field = other, "Ignoring unknown form field"),
        }
    }

    if uploads.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    let params = state.defaults.clone().merge(overrides).resolve();
    params.validate()?;

    Ok(CalculationRequest {
        uploads,
        selection,
        params,
    })
}

fn process_uploads(request: &CalculationRequest) -> (Vec<ProcessedFile>, Vec<FileFailure>) {
    let mut processed = Vec::new();
    let mut failures = Vec::new();

    for upload in &request.uploads {
        match session::process_file(
            &upload.file_name,
            &upload.content,
            &request.selection,
            &request.params,
        ) {
            Ok(file) => processed.push(file),
            Err(err) => {
                warn!(file_name = %upload.file_name, error = %err, "Failed to process upload");
                failures.push(FileFailure {
                    file_name: upload.file_name.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    (processed, failures)
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub parameters: StructureParameters,
    pub events: String,
    pub reports: Vec<SheetReport>,
    pub failures: Vec<FileFailure>,
}

pub async fn calculate(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CalculateResponse>, ApiError> {
    let request = read_calculation_request(&state, multipart).await?;
    let (processed, failures) = process_uploads(&request);
    info!(
        files = request.uploads.len(),
        processed = processed.len(),
        failed = failures.len(),
        "Calculated uploads"
    );

    Ok(Json(CalculateResponse {
        events: request.selection.to_string(),
        reports: processed.into_iter().map(|file| file.report).collect(),
        parameters: request.params,
        failures,
    }))
}

pub async fn bundle(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let request = read_calculation_request(&state, multipart).await?;
    let (processed, failures) = process_uploads(&request);

    if processed.is_empty() {
        let reasons: Vec<String> = failures
            .iter()
            .map(|failure| format!("{}: {}", failure.file_name, failure.error))
            .collect();
        return Err(ApiError::Unprocessable(format!(
            "No files could be processed: {}",
            reasons.join("; ")
        )));
    }

    let bytes = create_bundle(
        &processed,
        &failures,
        &request.params,
        &request.selection,
        Utc::now(),
    )
        .map_err(|err| ApiError::Internal(format!("Failed to build results bundle: {err}")))?;

    let disposition = format!("attachment; filename=\"{BUNDLE_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
