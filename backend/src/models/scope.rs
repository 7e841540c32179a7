//! Modification scope for edits and deletes of recurring assignments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::assignment::ScheduleAssignment;

/// How far an edit or delete reaches within a recurring series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifyScope {
    /// Only the identified row.
    #[default]
    Instance,
    /// The identified row and every later row of its series.
    Following,
    /// Every row of the series.
    All,
}

impl ModifyScope {
    /// Scope that actually applies to `target`. Rows outside a series can only
    /// be touched one at a time.
    pub fn effective_for(self, target: &ScheduleAssignment) -> ModifyScope {
        if target.recurring_group_id.is_some() {
            self
        } else {
            ModifyScope::Instance
        }
    }

    /// Whether `candidate` is affected when `target` is modified under this scope.
    ///
    /// The single source of truth for scope semantics; repositories filter
    /// rows with it (or an equivalent query).
    pub fn selects(self, target: &ScheduleAssignment, candidate: &ScheduleAssignment) -> bool {
        if candidate.id == target.id {
            return true;
        }
        let (Some(group), Some(other)) = (&target.recurring_group_id, &candidate.recurring_group_id)
        else {
            return false;
        };
        if group != other {
            return false;
        }
        match self {
            ModifyScope::Instance => false,
            ModifyScope::Following => candidate.date >= target.date,
            ModifyScope::All => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModifyScope::Instance => "instance",
            ModifyScope::Following => "following",
            ModifyScope::All => "all",
        }
    }
}

impl fmt::Display for ModifyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModifyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "instance" => Ok(Self::Instance),
            "following" => Ok(Self::Following),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown modify scope: {}", s)),
        }
    }
}
