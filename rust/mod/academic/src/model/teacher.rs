use serde::{Deserialize, Serialize};

use super::Subject;

/// A teacher and the subjects they teach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Teacher {
    pub id: String,

    /// Registry code, `<dept-prefix>-<seq4>` (e.g. `COMP-0001`).
    /// Assigned once at creation; not recomputed when the department changes.
    pub registry: String,

    pub name: String,

    pub email: String,

    pub department: String,

    #[serde(default)]
    pub subjects: Vec<Subject>,
}
