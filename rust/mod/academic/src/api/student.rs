use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use college_core::ServiceError;

use super::AppState;
use crate::model::{Student, SubjectRef};
use crate::service::AcademicService;
use crate::service::student::StudentFilter;

#[derive(Debug, Deserialize)]
struct CreateStudentRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    current_year: Option<u32>,
    #[serde(default)]
    shift: String,
    #[serde(default)]
    subjects: Vec<SubjectRef>,
}

#[derive(Debug, Deserialize)]
struct UpdateStudentRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    current_year: u32,
    #[serde(default)]
    shift: String,
}

/// `?year=&shift=`; empty values mean "no filter".
#[derive(Debug, Default, Deserialize)]
struct StudentListQuery {
    year: Option<String>,
    shift: Option<String>,
}

impl StudentListQuery {
    fn into_filter(self) -> Result<StudentFilter, ServiceError> {
        let year = match self.year.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                ServiceError::Validation(format!("invalid year filter '{}'", raw))
            })?),
        };
        Ok(StudentFilter { year, shift: self.shift })
    }
}

pub fn router(service: Arc<AcademicService>) -> Router {
    Router::new()
        .route("/students", post(create_student).get(list_students))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route(
            "/students/{student_id}/subjects/{subject_id}",
            post(add_subject).delete(remove_subject),
        )
        .with_state(service)
}

// ---------------------------------------------------------------------------
// POST /students
// ---------------------------------------------------------------------------

async fn create_student(
    State(svc): State<AppState>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ServiceError> {
    let subject_ids: Vec<String> = req.subjects.into_iter().map(|s| s.id).collect();
    let student = svc.create_student(&req.name, req.current_year, &req.shift, &subject_ids)?;
    Ok((StatusCode::CREATED, Json(student)))
}

// ---------------------------------------------------------------------------
// GET /students
// ---------------------------------------------------------------------------

async fn list_students(
    State(svc): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Json<Vec<Student>>, ServiceError> {
    let filter = query.into_filter()?;
    Ok(Json(svc.list_students(&filter)?))
}

// ---------------------------------------------------------------------------
// GET /students/{id}
// ---------------------------------------------------------------------------

async fn get_student(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, ServiceError> {
    Ok(Json(svc.get_student(&id)?))
}

// ---------------------------------------------------------------------------
// PUT /students/{id}
// ---------------------------------------------------------------------------

async fn update_student(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, ServiceError> {
    let student = svc.update_student(&id, &req.name, req.current_year, &req.shift)?;
    Ok(Json(student))
}

// ---------------------------------------------------------------------------
// DELETE /students/{id}
// ---------------------------------------------------------------------------

async fn delete_student(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_student(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST/DELETE /students/{student_id}/subjects/{subject_id}
// ---------------------------------------------------------------------------

async fn add_subject(
    State(svc): State<AppState>,
    Path((student_id, subject_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.add_subject_to_student(&student_id, &subject_id)?;
    Ok(Json(serde_json::json!({
        "message": "subject added to student",
    })))
}

async fn remove_subject(
    State(svc): State<AppState>,
    Path((student_id, subject_id)): Path<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    svc.remove_subject_from_student(&student_id, &subject_id)?;
    Ok(StatusCode::NO_CONTENT)
}
