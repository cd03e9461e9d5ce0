pub mod schema;
pub mod student;
pub mod subject;
pub mod teacher;

use std::collections::HashMap;
use std::sync::Arc;

use college_core::{ServiceConfig, ServiceError};
use college_sql::{Row, SQLError, SQLStore, Value};

use crate::code::CodeAllocator;
use crate::model::Subject;

/// Academic records service: subjects, students, teachers and the links
/// between them.
pub struct AcademicService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) codes: CodeAllocator,
}

impl AcademicService {
    pub fn new(sql: Arc<dyn SQLStore>, config: &ServiceConfig) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        let codes = CodeAllocator::new(Arc::clone(&sql), config.max_code_attempts);
        Ok(Self { sql, codes })
    }

    // ── Shared helpers ──

    /// True if a row with `id` exists in `table`.
    pub(crate) fn exists(&self, table: &str, id: &str) -> Result<bool, ServiceError> {
        let sql = format!("SELECT 1 AS hit FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(sql_err)?;
        Ok(!rows.is_empty())
    }

    /// Subjects linked to each of `owner_ids` through a join table, loaded
    /// in one query. Owners without links are absent from the map.
    pub(crate) fn linked_subjects(
        &self,
        join_table: &str,
        owner_col: &str,
        owner_ids: &[String],
    ) -> Result<HashMap<String, Vec<Subject>>, ServiceError> {
        let mut linked: HashMap<String, Vec<Subject>> = HashMap::new();
        if owner_ids.is_empty() {
            return Ok(linked);
        }

        let placeholders: Vec<String> = (1..=owner_ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT j.{owner} AS owner_id, s.id, s.name, s.year, s.credits FROM subjects s \
             JOIN {join} j ON s.id = j.subject_id \
             WHERE j.{owner} IN ({ids}) ORDER BY s.name, s.id",
            join = join_table,
            owner = owner_col,
            ids = placeholders.join(", "),
        );
        let params: Vec<Value> = owner_ids.iter().map(|id| Value::Text(id.clone())).collect();
        let rows = self.sql.query(&sql, &params).map_err(sql_err)?;
        for row in &rows {
            linked
                .entry(text_col(row, "owner_id")?)
                .or_default()
                .push(subject::row_to_subject(row)?);
        }
        Ok(linked)
    }
}

/// Map a store failure onto the service taxonomy.
pub(crate) fn sql_err(e: SQLError) -> ServiceError {
    match e {
        SQLError::UniqueViolation { target } => {
            ServiceError::Conflict(format!("duplicate value for {}", target))
        }
        other => ServiceError::Storage(other.to_string()),
    }
}

/// Trimmed `value`, or a validation error naming `field` if it is blank.
pub(crate) fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

pub(crate) fn text_col(row: &Row, name: &str) -> Result<String, ServiceError> {
    row.get_str(name)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Internal(format!("missing {} column", name)))
}

pub(crate) fn int_col(row: &Row, name: &str) -> Result<u32, ServiceError> {
    row.get_i64(name)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ServiceError::Internal(format!("missing or invalid {} column", name)))
}

#[cfg(test)]
pub(crate) mod testutil {
    use college_sql::SqliteStore;

    use super::*;

    pub fn service() -> AcademicService {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        AcademicService::new(sql, &ServiceConfig::default()).unwrap()
    }
}
