use serde::{Deserialize, Serialize};

use super::{Shift, Subject};

/// A student and the subjects they are enrolled in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: String,

    /// Enrollment code, `<year><shift><seq4>` (e.g. `2025M0001`).
    /// Assigned once at creation and never changed.
    pub enrollment: String,

    pub name: String,

    /// The student's current year in the programme.
    pub current_year: u32,

    pub shift: Shift,

    #[serde(default)]
    pub subjects: Vec<Subject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_wire_format() {
        let s = Student {
            id: "abc".into(),
            enrollment: "2025M0001".into(),
            name: "Ana".into(),
            current_year: 1,
            shift: Shift::Morning,
            subjects: vec![],
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["enrollment"], "2025M0001");
        assert_eq!(json["current_year"], 1);
        assert_eq!(json["shift"], "M");
        assert!(json["subjects"].as_array().unwrap().is_empty());
    }
}
