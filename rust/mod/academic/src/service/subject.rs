use college_core::{ServiceError, new_id};
use college_sql::{Row, SQLError, Value};
use tracing::info;

use crate::model::Subject;
use super::{AcademicService, int_col, required, sql_err, text_col};

pub(crate) fn row_to_subject(row: &Row) -> Result<Subject, ServiceError> {
    Ok(Subject {
        id: text_col(row, "id")?,
        name: text_col(row, "name")?,
        year: int_col(row, "year")?,
        credits: int_col(row, "credits")?,
    })
}

fn validate(name: &str, year: u32) -> Result<String, ServiceError> {
    let name = required("subject name", name)?;
    if year == 0 {
        return Err(ServiceError::Validation("subject year must be at least 1".into()));
    }
    Ok(name)
}

impl AcademicService {
    /// Create a subject. A blank `id` gets a generated one.
    pub fn create_subject(
        &self,
        id: Option<String>,
        name: &str,
        year: u32,
        credits: u32,
    ) -> Result<Subject, ServiceError> {
        let name = validate(name, year)?;
        let id = match id.as_deref().map(str::trim) {
            Some(given) if !given.is_empty() => given.to_string(),
            _ => new_id(),
        };

        self.sql
            .exec(
                "INSERT INTO subjects (id, name, year, credits) VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(id.clone()),
                    Value::Text(name.clone()),
                    Value::Integer(year as i64),
                    Value::Integer(credits as i64),
                ],
            )
            .map_err(|e| match e {
                SQLError::UniqueViolation { .. } => {
                    ServiceError::Conflict(format!("subject '{}' already exists", id))
                }
                other => sql_err(other),
            })?;

        info!(subject = %id, name = %name, "subject created");
        Ok(Subject { id, name, year, credits })
    }

    pub fn get_subject(&self, id: &str) -> Result<Subject, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT id, name, year, credits FROM subjects WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(sql_err)?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("subject '{}' not found", id)))?;
        row_to_subject(row)
    }

    pub fn list_subjects(&self) -> Result<Vec<Subject>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT id, name, year, credits FROM subjects ORDER BY year, name, id",
                &[],
            )
            .map_err(sql_err)?;
        rows.iter().map(row_to_subject).collect()
    }

    /// Replace a subject's name, year and credits.
    pub fn update_subject(
        &self,
        id: &str,
        name: &str,
        year: u32,
        credits: u32,
    ) -> Result<Subject, ServiceError> {
        let name = validate(name, year)?;
        let affected = self
            .sql
            .exec(
                "UPDATE subjects SET name = ?1, year = ?2, credits = ?3 WHERE id = ?4",
                &[
                    Value::Text(name.clone()),
                    Value::Integer(year as i64),
                    Value::Integer(credits as i64),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(sql_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("subject '{}' not found", id)));
        }
        Ok(Subject {
            id: id.to_string(),
            name,
            year,
            credits,
        })
    }

    /// Delete a subject; its student and teacher links go with it.
    pub fn delete_subject(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM subjects WHERE id = ?1", &[Value::Text(id.to_string())])
            .map_err(sql_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("subject '{}' not found", id)));
        }
        info!(subject = %id, "subject deleted");
        Ok(())
    }
}
