use college_core::ServiceError;

use crate::model::Shift;

/// Width of the zero-padded sequence field.
pub const SEQUENCE_WIDTH: usize = 4;

/// Largest sequence that fits the fixed-width field.
pub const MAX_SEQUENCE: u32 = 9999;

/// Maximum characters kept from a department name for its registry prefix.
const REGISTRY_PREFIX_LEN: usize = 4;

/// Which family of codes a partition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// Student enrollment: `<year><shift><seq4>`.
    Enrollment,
    /// Teacher registry: `<dept-prefix>-<seq4>`.
    Registry,
}

impl CodeKind {
    /// Table whose code column holds this family of codes.
    pub fn table(self) -> &'static str {
        match self {
            CodeKind::Enrollment => "students",
            CodeKind::Registry => "teachers",
        }
    }

    /// Column carrying the UNIQUE code.
    pub fn column(self) -> &'static str {
        match self {
            CodeKind::Enrollment => "enrollment",
            CodeKind::Registry => "registry",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            CodeKind::Enrollment => "",
            CodeKind::Registry => "-",
        }
    }
}

/// A set of codes sharing one prefix, inside which sequence numbers are
/// counted independently of every other partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    kind: CodeKind,
    key: String,
}

impl Partition {
    /// Student partition for an enrollment year and shift, e.g. `2025M`.
    pub fn enrollment(year: i32, shift: Shift) -> Self {
        Self {
            kind: CodeKind::Enrollment,
            key: format!("{:04}{}", year, shift),
        }
    }

    /// Teacher partition for a department, e.g. `COMP`.
    pub fn registry(department: &str) -> Result<Self, ServiceError> {
        let key = registry_prefix(department);
        if key.is_empty() {
            return Err(ServiceError::Validation(
                "department is required to derive a registry code".into(),
            ));
        }
        Ok(Self {
            kind: CodeKind::Registry,
            key,
        })
    }

    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    /// Partition key without the separator (`2025M`, `COMP`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Text every code in this partition starts with (`2025M`, `COMP-`).
    pub fn prefix(&self) -> String {
        format!("{}{}", self.key, self.kind.separator())
    }

    /// Character length shared by every well-formed code in this partition.
    pub fn code_len(&self) -> usize {
        self.prefix().chars().count() + SEQUENCE_WIDTH
    }

    /// Assemble a code from this partition and a sequence number.
    pub fn format(&self, sequence: u32) -> String {
        format!("{}{:0width$}", self.prefix(), sequence, width = SEQUENCE_WIDTH)
    }

    /// Numeric suffix of an issued code, or `None` if it is not a number.
    ///
    /// Enrollment codes carry the sequence in their last 4 characters;
    /// registry codes carry it after the last hyphen.
    pub fn sequence_of(&self, code: &str) -> Option<u32> {
        let suffix = match self.kind {
            CodeKind::Enrollment => {
                let start = code.char_indices().rev().nth(SEQUENCE_WIDTH - 1)?.0;
                &code[start..]
            }
            CodeKind::Registry => code.rsplit_once('-')?.1,
        };
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok()
    }
}

/// Registry prefix for a department: its name uppercased and cut to the
/// first 4 characters.
///
/// Distinct departments sharing those characters ("Computer Science",
/// "Computation") share one partition.
pub fn registry_prefix(department: &str) -> String {
    department
        .trim()
        .to_uppercase()
        .chars()
        .take(REGISTRY_PREFIX_LEN)
        .collect()
}
