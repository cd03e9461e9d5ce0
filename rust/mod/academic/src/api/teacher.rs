use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use college_core::ServiceError;

use super::AppState;
use crate::model::Teacher;
use crate::service::AcademicService;
use crate::service::teacher::TeacherFilter;

#[derive(Debug, Deserialize)]
struct TeacherRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    department: String,
}

#[derive(Debug, Default, Deserialize)]
struct TeacherListQuery {
    name: Option<String>,
    department: Option<String>,
    email: Option<String>,
}

pub fn router(service: Arc<AcademicService>) -> Router {
    Router::new()
        .route("/teachers", post(create_teacher).get(list_teachers))
        .route(
            "/teachers/{id}",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
        .route(
            "/teachers/{teacher_id}/subjects/{subject_id}",
            post(add_subject).delete(remove_subject),
        )
        .with_state(service)
}

// ---------------------------------------------------------------------------
// POST /teachers
// ---------------------------------------------------------------------------

async fn create_teacher(
    State(svc): State<AppState>,
    Json(req): Json<TeacherRequest>,
) -> Result<(StatusCode, Json<Teacher>), ServiceError> {
    let teacher = svc.create_teacher(&req.name, &req.email, &req.department)?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

// ---------------------------------------------------------------------------
// GET /teachers
// ---------------------------------------------------------------------------

async fn list_teachers(
    State(svc): State<AppState>,
    Query(query): Query<TeacherListQuery>,
) -> Result<Json<Vec<Teacher>>, ServiceError> {
    let filter = TeacherFilter {
        name: query.name,
        department: query.department,
        email: query.email,
    };
    Ok(Json(svc.list_teachers(&filter)?))
}

// ---------------------------------------------------------------------------
// GET /teachers/{id}
// ---------------------------------------------------------------------------

async fn get_teacher(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Teacher>, ServiceError> {
    Ok(Json(svc.get_teacher(&id)?))
}

// ---------------------------------------------------------------------------
// PUT /teachers/{id}
// ---------------------------------------------------------------------------

async fn update_teacher(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TeacherRequest>,
) -> Result<Json<Teacher>, ServiceError> {
    let teacher = svc.update_teacher(&id, &req.name, &req.email, &req.department)?;
    Ok(Json(teacher))
}

// ---------------------------------------------------------------------------
// DELETE /teachers/{id}
// ---------------------------------------------------------------------------

async fn delete_teacher(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_teacher(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST/DELETE /teachers/{teacher_id}/subjects/{subject_id}
// ---------------------------------------------------------------------------

async fn add_subject(
    State(svc): State<AppState>,
    Path((teacher_id, subject_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.add_subject_to_teacher(&teacher_id, &subject_id)?;
    Ok(Json(serde_json::json!({
        "message": "subject added to teacher",
    })))
}

async fn remove_subject(
    State(svc): State<AppState>,
    Path((teacher_id, subject_id)): Path<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    svc.remove_subject_from_teacher(&teacher_id, &subject_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::testutil::{api, app};

    #[tokio::test]
    async fn create_assigns_registry_from_department() {
        let app = app();
        let (status, t) = api(
            &app,
            "POST",
            "/teachers",
            Some(json!({"name": "Ada", "email": "ada@college.edu", "department": "Mathematics"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(t["registry"], "MATH-0001");
        assert_eq!(t["subjects"], json!([]));

        let (status, err) = api(
            &app,
            "POST",
            "/teachers",
            Some(json!({"name": "Eve", "email": "ada@college.edu", "department": "Mathematics"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["code"], "ALREADY_EXISTS");

        let (status, err) = api(
            &app,
            "POST",
            "/teachers",
            Some(json!({"name": "Eve", "email": "eve@college.edu"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn update_filter_links_and_delete() {
        let app = app();
        api(
            &app,
            "POST",
            "/subjects",
            Some(json!({"id": "CALC", "name": "Calculus", "year": 1, "credits": 6})),
        )
        .await;
        let (_, t) = api(
            &app,
            "POST",
            "/teachers",
            Some(json!({"name": "Ada Lovelace", "email": "ada@college.edu", "department": "Mathematics"})),
        )
        .await;
        let id = t["id"].as_str().unwrap().to_string();

        let (status, u) = api(
            &app,
            "PUT",
            &format!("/teachers/{id}"),
            Some(json!({"name": "Ada Lovelace", "email": "ada@college.edu", "department": "Physics"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(u["registry"], "MATH-0001");

        let (_, found) = api(&app, "GET", "/teachers?department=PHYS", None).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        let (_, found) = api(&app, "GET", "/teachers?name=grace", None).await;
        assert_eq!(found, json!([]));

        let (status, _) = api(&app, "POST", &format!("/teachers/{id}/subjects/CALC"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, t) = api(&app, "GET", &format!("/teachers/{id}"), None).await;
        assert_eq!(t["subjects"][0]["name"], "Calculus");

        let (status, _) = api(&app, "DELETE", &format!("/teachers/{id}/subjects/CALC"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = api(&app, "DELETE", &format!("/teachers/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = api(&app, "DELETE", &format!("/teachers/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
