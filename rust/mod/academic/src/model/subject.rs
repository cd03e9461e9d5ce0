use serde::{Deserialize, Serialize};

/// A course offered by the college.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    /// Caller-chosen code (e.g. "BSI101") or a generated id.
    pub id: String,

    pub name: String,

    /// Curriculum year in which the subject is offered (1, 2, ...).
    pub year: u32,

    pub credits: u32,
}

/// Reference to an existing subject inside a create payload.
/// Only `id` is read; other subject fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectRef {
    pub id: String,
}
