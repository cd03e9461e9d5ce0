use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),

    /// A UNIQUE or PRIMARY KEY constraint rejected the statement.
    /// `target` names the offending column(s) as `table.column`.
    #[error("unique constraint failed: {target}")]
    UniqueViolation { target: String },
}

impl SQLError {
    /// True if this is a uniqueness violation on `table.column`.
    pub fn is_unique_violation_on(&self, table: &str, column: &str) -> bool {
        match self {
            SQLError::UniqueViolation { target } => {
                let wanted = format!("{}.{}", table, column);
                target.split(',').any(|t| t.trim() == wanted)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_matches_exact_column() {
        let err = SQLError::UniqueViolation {
            target: "students.enrollment".into(),
        };
        assert!(err.is_unique_violation_on("students", "enrollment"));
        assert!(!err.is_unique_violation_on("students", "id"));
        assert!(!err.is_unique_violation_on("teachers", "enrollment"));
    }

    #[test]
    fn violation_matches_compound_target() {
        let err = SQLError::UniqueViolation {
            target: "student_subjects.student_id, student_subjects.subject_id".into(),
        };
        assert!(err.is_unique_violation_on("student_subjects", "subject_id"));
    }

    #[test]
    fn other_errors_are_not_violations() {
        let err = SQLError::Execution("disk I/O error".into());
        assert!(!err.is_unique_violation_on("students", "enrollment"));
    }
}
