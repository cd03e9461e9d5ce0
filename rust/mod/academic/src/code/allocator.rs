use std::sync::Arc;

use chrono::Datelike;
use college_core::ServiceError;
use college_sql::{SQLError, SQLStore, Value};
use tracing::{debug, warn};

use super::partition::{MAX_SEQUENCE, Partition, SEQUENCE_WIDTH};
use crate::model::Shift;
use crate::service::sql_err;

/// Calendar year used for new enrollment codes.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Issues sequential, human-readable codes per partition.
///
/// Every allocation re-reads the highest issued code of its partition; no
/// counter is cached in memory. Concurrent callers are serialized only by
/// the UNIQUE constraint on the code column: a caller that loses the race
/// looks up again and takes the next number, up to `max_attempts` rounds.
pub struct CodeAllocator {
    sql: Arc<dyn SQLStore>,
    max_attempts: u32,
}

impl CodeAllocator {
    pub fn new(sql: Arc<dyn SQLStore>, max_attempts: u32) -> Self {
        Self {
            sql,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Allocate an enrollment code in the current year's `shift` partition
    /// and persist it through `insert`.
    pub fn allocate_student_enrollment<T, F>(&self, shift: Shift, insert: F) -> Result<T, ServiceError>
    where
        F: FnMut(&str) -> Result<T, SQLError>,
    {
        self.allocate(&Partition::enrollment(current_year(), shift), insert)
    }

    /// Allocate a registry code in `department`'s partition and persist it
    /// through `insert`.
    pub fn allocate_teacher_registry<T, F>(&self, department: &str, insert: F) -> Result<T, ServiceError>
    where
        F: FnMut(&str) -> Result<T, SQLError>,
    {
        self.allocate(&Partition::registry(department)?, insert)
    }

    /// Highest code issued so far in `partition`, if any.
    ///
    /// Only codes of the partition's exact length are considered, so a
    /// longer prefix that happens to start with this one (`AI-X-0001` for
    /// `AI-`) is not mistaken for a member. Codes whose last four characters
    /// are not all digits are skipped too: `2025MABCD` sorts above every
    /// numeric code and would otherwise pin the partition at sequence 1.
    pub fn lookup_last_code(&self, partition: &Partition) -> Result<Option<String>, ServiceError> {
        let kind = partition.kind();
        let sql = format!(
            "SELECT {col} AS code FROM {table} \
             WHERE substr({col}, 1, length(?1)) = ?1 AND length({col}) = ?2 \
             AND substr({col}, -{width}) GLOB '{digits}' \
             ORDER BY {col} DESC LIMIT 1",
            col = kind.column(),
            table = kind.table(),
            width = SEQUENCE_WIDTH,
            digits = "[0-9]".repeat(SEQUENCE_WIDTH),
        );
        let rows = self
            .sql
            .query(
                &sql,
                &[
                    Value::Text(partition.prefix()),
                    Value::Integer(partition.code_len() as i64),
                ],
            )
            .map_err(|e| ServiceError::Storage(format!("code lookup failed: {}", e)))?;

        Ok(rows
            .first()
            .and_then(|r| r.get_str("code"))
            .map(str::to_string))
    }

    /// Sequence number following `last_code`.
    ///
    /// An unparseable suffix restarts the partition at 1 instead of failing;
    /// the UNIQUE constraint rejects any duplicate this produces.
    pub fn next_sequence(partition: &Partition, last_code: Option<&str>) -> u32 {
        let Some(last) = last_code else {
            return 1;
        };
        match partition.sequence_of(last) {
            Some(seq) => seq.saturating_add(1),
            None => {
                warn!(
                    partition = partition.key(),
                    last_code = last,
                    "malformed code suffix, restarting sequence at 1"
                );
                1
            }
        }
    }

    /// The code the next allocation in `partition` would try.
    pub fn next_code(&self, partition: &Partition) -> Result<String, ServiceError> {
        let last = self.lookup_last_code(partition)?;
        let seq = Self::next_sequence(partition, last.as_deref());
        if seq > MAX_SEQUENCE {
            return Err(ServiceError::ResourceExhausted(format!(
                "partition {} has no sequence numbers left (last issued {})",
                partition.key(),
                last.unwrap_or_default(),
            )));
        }
        Ok(partition.format(seq))
    }

    /// Allocate the next code in `partition` and hand it to `insert`.
    ///
    /// A UNIQUE violation on the partition's code column means another
    /// caller took the code first; the lookup is redone and the next
    /// number tried. Any other failure from `insert` is returned as is.
    pub fn allocate<T, F>(&self, partition: &Partition, mut insert: F) -> Result<T, ServiceError>
    where
        F: FnMut(&str) -> Result<T, SQLError>,
    {
        let kind = partition.kind();
        for attempt in 1..=self.max_attempts {
            let code = self.next_code(partition)?;
            match insert(&code) {
                Ok(created) => {
                    debug!(partition = partition.key(), code = %code, attempt, "code allocated");
                    return Ok(created);
                }
                Err(e) if e.is_unique_violation_on(kind.table(), kind.column()) => {
                    warn!(
                        partition = partition.key(),
                        code = %code,
                        attempt,
                        "code taken by a concurrent request, retrying"
                    );
                }
                Err(e) => return Err(sql_err(e)),
            }
        }
        Err(ServiceError::ResourceExhausted(format!(
            "could not allocate a code in partition {} after {} attempts",
            partition.key(),
            self.max_attempts,
        )))
    }
}
