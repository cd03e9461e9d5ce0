use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use college_core::ServiceError;

use super::AppState;
use crate::model::Subject;
use crate::service::AcademicService;

#[derive(Debug, Deserialize)]
struct CreateSubjectRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    year: u32,
    #[serde(default)]
    credits: u32,
}

#[derive(Debug, Deserialize)]
struct UpdateSubjectRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    year: u32,
    #[serde(default)]
    credits: u32,
}

pub fn router(service: Arc<AcademicService>) -> Router {
    Router::new()
        .route("/subjects", post(create_subject).get(list_subjects))
        .route(
            "/subjects/{id}",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
        .with_state(service)
}

// ---------------------------------------------------------------------------
// POST /subjects
// ---------------------------------------------------------------------------

async fn create_subject(
    State(svc): State<AppState>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), ServiceError> {
    let subject = svc.create_subject(req.id, &req.name, req.year, req.credits)?;
    Ok((StatusCode::CREATED, Json(subject)))
}

// ---------------------------------------------------------------------------
// GET /subjects
// ---------------------------------------------------------------------------

async fn list_subjects(State(svc): State<AppState>) -> Result<Json<Vec<Subject>>, ServiceError> {
    Ok(Json(svc.list_subjects()?))
}

// ---------------------------------------------------------------------------
// GET /subjects/{id}
// ---------------------------------------------------------------------------

async fn get_subject(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Subject>, ServiceError> {
    Ok(Json(svc.get_subject(&id)?))
}

// ---------------------------------------------------------------------------
// PUT /subjects/{id}
// ---------------------------------------------------------------------------

async fn update_subject(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSubjectRequest>,
) -> Result<Json<Subject>, ServiceError> {
    Ok(Json(svc.update_subject(&id, &req.name, req.year, req.credits)?))
}

// ---------------------------------------------------------------------------
// DELETE /subjects/{id}
// ---------------------------------------------------------------------------

async fn delete_subject(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_subject(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
