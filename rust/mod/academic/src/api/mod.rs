mod student;
mod subject;
mod teacher;

use std::sync::Arc;

use axum::Router;

use crate::service::AcademicService;

pub(crate) type AppState = Arc<AcademicService>;

/// Build the academic module router.
///
/// Routes:
/// - `POST   /subjects`, `GET /subjects`
/// - `GET    /subjects/{id}`, `PUT`, `DELETE`
/// - `POST   /students`, `GET /students?year=&shift=`
/// - `GET    /students/{id}`, `PUT`, `DELETE`
/// - `POST   /students/{student_id}/subjects/{subject_id}`, `DELETE`
/// - `POST   /teachers`, `GET /teachers?name=&department=&email=`
/// - `GET    /teachers/{id}`, `PUT`, `DELETE`
/// - `POST   /teachers/{teacher_id}/subjects/{subject_id}`, `DELETE`
pub fn router(service: Arc<AcademicService>) -> Router {
    Router::new()
        .merge(subject::router(Arc::clone(&service)))
        .merge(student::router(Arc::clone(&service)))
        .merge(teacher::router(service))
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::service::testutil::service;

    pub fn app() -> axum::Router {
        super::router(Arc::new(service()))
    }

    pub async fn api(
        router: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let body = match body {
            Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
            None => Body::empty(),
        };
        let req = builder.body(body).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::json!(null)
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null))
        };
        (status, json)
    }
}
