use college_core::ServiceError;
use college_sql::SQLStore;

/// SQL DDL statements to initialize the academic database schema.
///
/// Enrollment and registry codes carry UNIQUE constraints: they are what
/// the code allocator relies on to detect a lost race.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS subjects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        year INTEGER NOT NULL,
        credits INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS students (
        id TEXT PRIMARY KEY,
        enrollment TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        current_year INTEGER NOT NULL,
        shift TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS teachers (
        id TEXT PRIMARY KEY,
        registry TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        department TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS student_subjects (
        student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        subject_id TEXT NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
        PRIMARY KEY (student_id, subject_id)
    )",
    "CREATE TABLE IF NOT EXISTS teacher_subjects (
        teacher_id TEXT NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
        subject_id TEXT NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
        PRIMARY KEY (teacher_id, subject_id)
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_student_shift ON students(shift)",
    "CREATE INDEX IF NOT EXISTS idx_student_year ON students(current_year)",
    "CREATE INDEX IF NOT EXISTS idx_ss_subject ON student_subjects(subject_id)",
    "CREATE INDEX IF NOT EXISTS idx_ts_subject ON teacher_subjects(subject_id)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
