use college_core::{ServiceError, new_id};
use college_sql::{Row, Value};
use tracing::{info, warn};

use crate::model::Teacher;
use super::{AcademicService, required, sql_err, text_col};

const SELECT_TEACHER: &str = "SELECT id, registry, name, email, department FROM teachers";

/// Optional case-insensitive substring filters for listing teachers.
#[derive(Debug, Clone, Default)]
pub struct TeacherFilter {
    pub name: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
}

struct TeacherInput {
    name: String,
    email: String,
    department: String,
}

fn validate(name: &str, email: &str, department: &str) -> Result<TeacherInput, ServiceError> {
    let name = required("teacher name", name)?;
    let email = required("email", email)?;
    let department = required("department", department)?;
    if !email.contains('@') {
        return Err(ServiceError::Validation(format!("invalid email '{}'", email)));
    }
    Ok(TeacherInput { name, email, department })
}

impl AcademicService {
    /// Build teachers from `rows`, fetching every row's subjects in one query.
    fn rows_to_teachers(&self, rows: &[Row]) -> Result<Vec<Teacher>, ServiceError> {
        let ids = rows
            .iter()
            .map(|r| text_col(r, "id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut linked = self.linked_subjects("teacher_subjects", "teacher_id", &ids)?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| -> Result<Teacher, ServiceError> {
                Ok(Teacher {
                    registry: text_col(row, "registry")?,
                    name: text_col(row, "name")?,
                    email: text_col(row, "email")?,
                    department: text_col(row, "department")?,
                    subjects: linked.remove(&id).unwrap_or_default(),
                    id,
                })
            })
            .collect()
    }

    /// Create a teacher and allocate their registry code from the
    /// department prefix. A duplicate email is a conflict and is not retried.
    pub fn create_teacher(&self, name: &str, email: &str, department: &str) -> Result<Teacher, ServiceError> {
        let input = validate(name, email, department)?;
        let id = new_id();

        let registry = self.codes.allocate_teacher_registry(&input.department, |registry| {
            self.sql.exec(
                "INSERT INTO teachers (id, registry, name, email, department) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(id.clone()),
                    Value::Text(registry.to_string()),
                    Value::Text(input.name.clone()),
                    Value::Text(input.email.clone()),
                    Value::Text(input.department.clone()),
                ],
            )?;
            Ok(registry.to_string())
        })?;
        info!(teacher = %id, registry = %registry, "teacher created");

        self.get_teacher(&id)
    }

    pub fn get_teacher(&self, id: &str) -> Result<Teacher, ServiceError> {
        let sql = format!("{} WHERE id = ?1", SELECT_TEACHER);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(sql_err)?;
        self.rows_to_teachers(&rows)?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("teacher '{}' not found", id)))
    }

    pub fn list_teachers(&self, filter: &TeacherFilter) -> Result<Vec<Teacher>, ServiceError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        let filters = [
            ("name", &filter.name),
            ("department", &filter.department),
            ("email", &filter.email),
        ];
        for (col, value) in filters {
            let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            params.push(Value::Text(format!("%{}%", v)));
            where_clauses.push(format!("LOWER({}) LIKE LOWER(?{})", col, params.len()));
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };
        let sql = format!("{}{} ORDER BY registry", SELECT_TEACHER, where_sql);

        let rows = self.sql.query(&sql, &params).map_err(sql_err)?;
        self.rows_to_teachers(&rows)
    }

    /// Replace a teacher's name, email and department. The registry code
    /// keeps the prefix it was issued with.
    pub fn update_teacher(
        &self,
        id: &str,
        name: &str,
        email: &str,
        department: &str,
    ) -> Result<Teacher, ServiceError> {
        let input = validate(name, email, department)?;
        let affected = self
            .sql
            .exec(
                "UPDATE teachers SET name = ?1, email = ?2, department = ?3 WHERE id = ?4",
                &[
                    Value::Text(input.name),
                    Value::Text(input.email),
                    Value::Text(input.department),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(sql_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("teacher '{}' not found", id)));
        }
        self.get_teacher(id)
    }

    pub fn delete_teacher(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM teachers WHERE id = ?1", &[Value::Text(id.to_string())])
            .map_err(sql_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("teacher '{}' not found", id)));
        }
        info!(teacher = %id, "teacher deleted");
        Ok(())
    }

    /// Link a subject to a teacher. Linking twice is a no-op.
    pub fn add_subject_to_teacher(&self, teacher_id: &str, subject_id: &str) -> Result<(), ServiceError> {
        self.require_teacher_and_subject(teacher_id, subject_id)?;
        self.sql
            .exec(
                "INSERT INTO teacher_subjects (teacher_id, subject_id) VALUES (?1, ?2) \
                 ON CONFLICT (teacher_id, subject_id) DO NOTHING",
                &[Value::Text(teacher_id.to_string()), Value::Text(subject_id.to_string())],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    pub fn remove_subject_from_teacher(&self, teacher_id: &str, subject_id: &str) -> Result<(), ServiceError> {
        self.require_teacher_and_subject(teacher_id, subject_id)?;
        let affected = self
            .sql
            .exec(
                "DELETE FROM teacher_subjects WHERE teacher_id = ?1 AND subject_id = ?2",
                &[Value::Text(teacher_id.to_string()), Value::Text(subject_id.to_string())],
            )
            .map_err(sql_err)?;
        if affected == 0 {
            warn!(teacher = %teacher_id, subject = %subject_id, "no such teacher subject link");
            return Err(ServiceError::NotFound(format!(
                "subject '{}' is not linked to teacher '{}'",
                subject_id, teacher_id
            )));
        }
        Ok(())
    }

    fn require_teacher_and_subject(&self, teacher_id: &str, subject_id: &str) -> Result<(), ServiceError> {
        if !self.exists("teachers", teacher_id)? {
            return Err(ServiceError::NotFound(format!("teacher '{}' not found", teacher_id)));
        }
        if !self.exists("subjects", subject_id)? {
            return Err(ServiceError::NotFound(format!("subject '{}' not found", subject_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::service;
    use super::*;

    #[test]
    fn registry_codes_per_department_prefix() {
        let svc = service();
        let a = svc.create_teacher("Ada", "ada@college.edu", "Mathematics").unwrap();
        let b = svc.create_teacher("Bob", "bob@college.edu", "math").unwrap();
        let c = svc.create_teacher("Cy", "cy@college.edu", "Computer Science").unwrap();
        let d = svc.create_teacher("Di", "di@college.edu", "Computation").unwrap();

        assert_eq!(a.registry, "MATH-0001");
        assert_eq!(b.registry, "MATH-0002");
        assert_eq!(c.registry, "COMP-0001");
        // Departments sharing four letters share a partition.
        assert_eq!(d.registry, "COMP-0002");
    }

    #[test]
    fn short_department_does_not_collide_with_longer_prefix() {
        let svc = service();
        let ai = svc.create_teacher("Al", "al@college.edu", "AI").unwrap();
        let aix = svc.create_teacher("Ax", "ax@college.edu", "ai-x").unwrap();
        let ai2 = svc.create_teacher("Am", "am@college.edu", "ai").unwrap();
        assert_eq!(ai.registry, "AI-0001");
        assert_eq!(aix.registry, "AI-X-0001");
        assert_eq!(ai2.registry, "AI-0002");
    }

    #[test]
    fn required_fields_and_email_format() {
        let svc = service();
        for (name, email, dept) in [
            ("", "a@b.c", "Math"),
            ("Ada", "", "Math"),
            ("Ada", "a@b.c", "  "),
            ("Ada", "not-an-email", "Math"),
        ] {
            let err = svc.create_teacher(name, email, dept).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{name:?} {email:?} {dept:?}");
        }
        assert!(svc.list_teachers(&TeacherFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn duplicate_email_is_conflict_and_consumes_no_code() {
        let svc = service();
        svc.create_teacher("Ada", "ada@college.edu", "Math").unwrap();
        let err = svc.create_teacher("Ada 2", "ada@college.edu", "Math").unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let next = svc.create_teacher("Bob", "bob@college.edu", "Math").unwrap();
        assert_eq!(next.registry, "MATH-0002");
    }

    #[test]
    fn update_keeps_registry() {
        let svc = service();
        let t = svc.create_teacher("Ada", "ada@college.edu", "Mathematics").unwrap();
        let u = svc
            .update_teacher(&t.id, "Ada L.", "ada.l@college.edu", "Physics")
            .unwrap();
        assert_eq!(u.registry, "MATH-0001");
        assert_eq!(u.department, "Physics");
        assert_eq!(u.email, "ada.l@college.edu");

        assert!(matches!(
            svc.update_teacher("nope", "A", "a@b.c", "Math"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn update_to_taken_email_is_conflict() {
        let svc = service();
        svc.create_teacher("Ada", "ada@college.edu", "Math").unwrap();
        let bob = svc.create_teacher("Bob", "bob@college.edu", "Math").unwrap();
        let err = svc
            .update_teacher(&bob.id, "Bob", "ada@college.edu", "Math")
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn list_filters_are_case_insensitive_substrings() {
        let svc = service();
        svc.create_teacher("Ada Lovelace", "ada@college.edu", "Mathematics").unwrap();
        svc.create_teacher("Alan Turing", "alan@college.edu", "Computer Science").unwrap();
        svc.create_teacher("Grace Hopper", "grace@navy.mil", "Computer Science").unwrap();

        let by_name = svc
            .list_teachers(&TeacherFilter { name: Some("TURING".into()), ..Default::default() })
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Alan Turing");

        let by_dept = svc
            .list_teachers(&TeacherFilter { department: Some("computer".into()), ..Default::default() })
            .unwrap();
        assert_eq!(by_dept.len(), 2);

        let combined = svc
            .list_teachers(&TeacherFilter {
                department: Some("science".into()),
                email: Some("college.edu".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].registry, "COMP-0001");

        let blank = svc
            .list_teachers(&TeacherFilter { name: Some("  ".into()), ..Default::default() })
            .unwrap();
        assert_eq!(blank.len(), 3);
    }

    #[test]
    fn list_attaches_each_teachers_own_subjects() {
        let svc = service();
        svc.create_subject(Some("ALG".into()), "Algorithms", 2, 4).unwrap();
        svc.create_subject(Some("CALC".into()), "Calculus", 1, 6).unwrap();
        let ada = svc.create_teacher("Ada", "ada@college.edu", "Math").unwrap();
        let bob = svc.create_teacher("Bob", "bob@college.edu", "Math").unwrap();
        svc.create_teacher("Cy", "cy@college.edu", "Math").unwrap();
        svc.add_subject_to_teacher(&ada.id, "CALC").unwrap();
        svc.add_subject_to_teacher(&bob.id, "ALG").unwrap();
        svc.add_subject_to_teacher(&bob.id, "CALC").unwrap();

        let teachers = svc.list_teachers(&TeacherFilter::default()).unwrap();
        let ids: Vec<Vec<&str>> = teachers
            .iter()
            .map(|t| t.subjects.iter().map(|s| s.id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["CALC"], vec!["ALG", "CALC"], vec![]]);
    }

    #[test]
    fn subject_links_and_cascade_on_delete() {
        let svc = service();
        svc.create_subject(Some("ALG".into()), "Algorithms", 2, 4).unwrap();
        let t = svc.create_teacher("Ada", "ada@college.edu", "Math").unwrap();

        svc.add_subject_to_teacher(&t.id, "ALG").unwrap();
        svc.add_subject_to_teacher(&t.id, "ALG").unwrap();
        assert_eq!(svc.get_teacher(&t.id).unwrap().subjects.len(), 1);

        svc.remove_subject_from_teacher(&t.id, "ALG").unwrap();
        assert!(matches!(
            svc.remove_subject_from_teacher(&t.id, "ALG"),
            Err(ServiceError::NotFound(_))
        ));

        svc.add_subject_to_teacher(&t.id, "ALG").unwrap();
        svc.delete_teacher(&t.id).unwrap();
        assert!(matches!(svc.get_teacher(&t.id), Err(ServiceError::NotFound(_))));
        let links = svc
            .sql
            .query("SELECT COUNT(*) AS n FROM teacher_subjects", &[])
            .unwrap();
        assert_eq!(links[0].get_i64("n"), Some(0));
    }
}
