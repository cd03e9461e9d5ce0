pub mod api;
pub mod code;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use college_core::{Module, ServiceConfig, ServiceError};
use college_sql::SQLStore;

use service::AcademicService;

/// The academic records module: subjects, students and teachers, with
/// enrollment and registry codes issued by [`code::CodeAllocator`].
pub struct AcademicModule {
    service: Arc<AcademicService>,
}

impl AcademicModule {
    /// Create the module and initialise its schema.
    pub fn new(sql: Arc<dyn SQLStore>, config: &ServiceConfig) -> Result<Self, ServiceError> {
        let service = Arc::new(AcademicService::new(sql, config)?);
        Ok(Self { service })
    }

    pub fn service(&self) -> &Arc<AcademicService> {
        &self.service
    }
}

impl Module for AcademicModule {
    fn name(&self) -> &str {
        "academic"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
