//! Shift definitions: named time windows operators assign staff to.

use serde::{Deserialize, Serialize};

use super::time::{TimeOfDay, MINUTES_PER_DAY};
use crate::define_id_type;

define_id_type!(i64, ShiftId);

/// A named shift window with a display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: ShiftId,
    pub label: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub color: String,
}

/// Shift fields supplied by an operator, without an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDraft {
    pub label: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub color: String,
}

impl ShiftDefinition {
    /// A shift is overnight iff it starts later in the day than it ends.
    pub fn is_overnight(&self) -> bool {
        self.start_time > self.end_time
    }

    /// Length of the shift in minutes, counting across midnight.
    pub fn duration_minutes(&self) -> u16 {
        let start = self.start_time.minutes();
        let end = self.end_time.minutes();
        if self.is_overnight() {
            MINUTES_PER_DAY - start + end
        } else {
            end - start
        }
    }

    pub fn from_draft(id: ShiftId, draft: ShiftDraft) -> Self {
        Self {
            id,
            label: draft.label,
            start_time: draft.start_time,
            end_time: draft.end_time,
            color: draft.color,
        }
    }
}

impl ShiftDraft {
    /// Check the fields an operator can get wrong.
    ///
    /// Returns a human-readable message for the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.label.trim().is_empty() {
            return Err("Shift label must not be empty".to_string());
        }
        if self.start_time == self.end_time {
            return Err(format!(
                "Shift '{}' has an empty window ({} to {})",
                self.label, self.start_time, self.end_time
            ));
        }
        if !is_hex_color(&self.color) {
            return Err(format!(
                "Shift color '{}' is not a #RRGGBB hex value",
                self.color
            ));
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
