use college_core::{ServiceError, new_id};
use college_sql::{Row, Value};
use tracing::{info, warn};

use crate::model::{Shift, Student};
use super::{AcademicService, int_col, required, sql_err, text_col};

const SELECT_STUDENT: &str = "SELECT id, enrollment, name, current_year, shift FROM students";

/// Optional filters for listing students.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Match on `current_year`.
    pub year: Option<u32>,
    /// Match on shift; validated like a create payload.
    pub shift: Option<String>,
}

impl AcademicService {
    /// Build students from `rows`, fetching every row's subjects in one query.
    fn rows_to_students(&self, rows: &[Row]) -> Result<Vec<Student>, ServiceError> {
        let ids = rows
            .iter()
            .map(|r| text_col(r, "id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut linked = self.linked_subjects("student_subjects", "student_id", &ids)?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| -> Result<Student, ServiceError> {
                let shift = Shift::parse(&text_col(row, "shift")?)
                    .map_err(|e| ServiceError::Internal(format!("student {}: {}", id, e)))?;
                Ok(Student {
                    enrollment: text_col(row, "enrollment")?,
                    name: text_col(row, "name")?,
                    current_year: int_col(row, "current_year")?,
                    shift,
                    subjects: linked.remove(&id).unwrap_or_default(),
                    id,
                })
            })
            .collect()
    }

    /// Create a student and allocate their enrollment code.
    ///
    /// The shift is validated before the store is touched. A zero or
    /// missing `current_year` defaults to 1. Each entry of `subject_ids` is
    /// linked after the insert; a link that fails is logged and skipped.
    pub fn create_student(
        &self,
        name: &str,
        current_year: Option<u32>,
        shift: &str,
        subject_ids: &[String],
    ) -> Result<Student, ServiceError> {
        let shift = Shift::parse(shift)?;
        let name = required("student name", name)?;
        let current_year = current_year.filter(|y| *y > 0).unwrap_or(1);
        let id = new_id();

        let enrollment = self.codes.allocate_student_enrollment(shift, |enrollment| {
            self.sql.exec(
                "INSERT INTO students (id, enrollment, name, current_year, shift) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(id.clone()),
                    Value::Text(enrollment.to_string()),
                    Value::Text(name.clone()),
                    Value::Integer(current_year as i64),
                    Value::Text(shift.as_str().to_string()),
                ],
            )?;
            Ok(enrollment.to_string())
        })?;
        info!(student = %id, enrollment = %enrollment, "student created");

        for subject_id in subject_ids {
            if let Err(e) = self.add_subject_to_student(&id, subject_id) {
                warn!(student = %id, subject = %subject_id, error = %e, "could not link subject to new student");
            }
        }

        self.get_student(&id)
    }

    pub fn get_student(&self, id: &str) -> Result<Student, ServiceError> {
        let sql = format!("{} WHERE id = ?1", SELECT_STUDENT);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(sql_err)?;
        self.rows_to_students(&rows)?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("student '{}' not found", id)))
    }

    pub fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, ServiceError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        if let Some(year) = filter.year {
            params.push(Value::Integer(year as i64));
            where_clauses.push(format!("current_year = ?{}", params.len()));
        }
        if let Some(raw) = filter.shift.as_deref().filter(|s| !s.trim().is_empty()) {
            let shift = Shift::parse(raw)?;
            params.push(Value::Text(shift.as_str().to_string()));
            where_clauses.push(format!("shift = ?{}", params.len()));
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };
        let sql = format!("{}{} ORDER BY enrollment", SELECT_STUDENT, where_sql);

        let rows = self.sql.query(&sql, &params).map_err(sql_err)?;
        self.rows_to_students(&rows)
    }

    /// Replace a student's name, current year and shift.
    ///
    /// The enrollment code is never recomputed, even when the shift changes.
    pub fn update_student(
        &self,
        id: &str,
        name: &str,
        current_year: u32,
        shift: &str,
    ) -> Result<Student, ServiceError> {
        let name = required("student name", name)?;
        if current_year == 0 {
            return Err(ServiceError::Validation("current_year must be at least 1".into()));
        }
        let shift = Shift::parse(shift)?;

        let affected = self
            .sql
            .exec(
                "UPDATE students SET name = ?1, current_year = ?2, shift = ?3 WHERE id = ?4",
                &[
                    Value::Text(name),
                    Value::Integer(current_year as i64),
                    Value::Text(shift.as_str().to_string()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(sql_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("student '{}' not found", id)));
        }
        self.get_student(id)
    }

    pub fn delete_student(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM students WHERE id = ?1", &[Value::Text(id.to_string())])
            .map_err(sql_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("student '{}' not found", id)));
        }
        info!(student = %id, "student deleted");
        Ok(())
    }

    /// Link a subject to a student. Linking twice is a no-op.
    pub fn add_subject_to_student(&self, student_id: &str, subject_id: &str) -> Result<(), ServiceError> {
        self.require_student_and_subject(student_id, subject_id)?;
        self.sql
            .exec(
                "INSERT INTO student_subjects (student_id, subject_id) VALUES (?1, ?2) \
                 ON CONFLICT (student_id, subject_id) DO NOTHING",
                &[Value::Text(student_id.to_string()), Value::Text(subject_id.to_string())],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    pub fn remove_subject_from_student(&self, student_id: &str, subject_id: &str) -> Result<(), ServiceError> {
        self.require_student_and_subject(student_id, subject_id)?;
        let affected = self
            .sql
            .exec(
                "DELETE FROM student_subjects WHERE student_id = ?1 AND subject_id = ?2",
                &[Value::Text(student_id.to_string()), Value::Text(subject_id.to_string())],
            )
            .map_err(sql_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "subject '{}' is not linked to student '{}'",
                subject_id, student_id
            )));
        }
        Ok(())
    }

    fn require_student_and_subject(&self, student_id: &str, subject_id: &str) -> Result<(), ServiceError> {
        if !self.exists("students", student_id)? {
            return Err(ServiceError::NotFound(format!("student '{}' not found", student_id)));
        }
        if !self.exists("subjects", subject_id)? {
            return Err(ServiceError::NotFound(format!("subject '{}' not found", subject_id)));
        }
        Ok(())
    }
}
