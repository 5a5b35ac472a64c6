//! Upsert-only reconciliation of a desired shift list against stored windows.
//!
//! The planner is pure: the repository loads the stored windows, asks for a
//! [`ReconcilePlan`], and applies it inside one serialized transaction.
//!
//! Rules:
//! - Stored rows sharing a `code` are collapsed first, keeping the
//!   earliest-created row (lowest id on a tie).
//! - Each desired code maps to exactly one write: an update when the code is
//!   stored, a create otherwise.
//! - When the desired list repeats a code, the last entry's values win and
//!   the code keeps the position of its first appearance.
//! - Stored codes missing from the desired list are left alone.

use std::collections::HashMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::time_window::{serde_time_of_day, TimeWindow};
use crate::types::{DbId, Timestamp};

/// Maximum length of a shift code.
pub const MAX_CODE_LEN: usize = 32;

/// Maximum length of a shift display name.
pub const MAX_NAME_LEN: usize = 100;

/// One entry of the desired shift list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSpec {
    pub code: String,
    pub name: String,
    #[serde(with = "serde_time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_time_of_day")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ShiftSpec {
    /// Trim identifiers and check lengths and the time range.
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        self.code = self.code.trim().to_string();
        self.name = self.name.trim().to_string();

        if self.code.is_empty() {
            return Err(CoreError::Validation("Shift code must not be empty".into()));
        }
        if self.code.len() > MAX_CODE_LEN {
            return Err(CoreError::Validation(format!(
                "Shift code '{}' exceeds {MAX_CODE_LEN} characters",
                self.code
            )));
        }
        if self.name.is_empty() {
            return Err(CoreError::Validation(format!(
                "Shift '{}' must have a name",
                self.code
            )));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "Shift name for '{}' exceeds {MAX_NAME_LEN} characters",
                self.code
            )));
        }
        TimeWindow::new(self.start_time, self.end_time)?;
        Ok(self)
    }
}

fn default_true() -> bool {
    true
}

/// The identity of a stored window, as needed for planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredWindow {
    pub id: DbId,
    pub code: String,
    pub created_at: Timestamp,
}

/// Stored rows sharing one code: which row survives, which ones go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub code: String,
    pub keep: DbId,
    pub remove: Vec<DbId>,
}

/// A single write produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowOp {
    Update { id: DbId, spec: ShiftSpec },
    Create { spec: ShiftSpec },
}

impl WindowOp {
    pub fn spec(&self) -> &ShiftSpec {
        match self {
            WindowOp::Update { spec, .. } | WindowOp::Create { spec } => spec,
        }
    }
}

/// Everything a reconciliation run has to write, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub duplicates: Vec<DuplicateGroup>,
    pub ops: Vec<WindowOp>,
}

impl ReconcilePlan {
    /// Ids of every stored row the dedup step deletes.
    pub fn removed_ids(&self) -> Vec<DbId> {
        self.duplicates
            .iter()
            .flat_map(|g| g.remove.iter().copied())
            .collect()
    }

    pub fn creates(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, WindowOp::Create { .. }))
            .count()
    }

    pub fn updates(&self) -> usize {
        self.ops.len() - self.creates()
    }
}

/// Group stored rows by code and pick a survivor for every group of two or
/// more. Groups are returned in code order.
pub fn find_duplicates(stored: &[StoredWindow]) -> Vec<DuplicateGroup> {
    let mut by_code: HashMap<&str, Vec<&StoredWindow>> = HashMap::new();
    for window in stored {
        by_code.entry(window.code.as_str()).or_default().push(window);
    }

    let mut groups: Vec<DuplicateGroup> = by_code
        .into_iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(code, mut rows)| {
            rows.sort_by_key(|w| (w.created_at, w.id));
            DuplicateGroup {
                code: code.to_string(),
                keep: rows[0].id,
                remove: rows[1..].iter().map(|w| w.id).collect(),
            }
        })
        .collect();
    groups.sort_by(|a, b| a.code.cmp(&b.code));
    groups
}

/// Collapse repeated codes in the desired list: last values win, first
/// position is kept.
pub fn collapse_desired(desired: Vec<ShiftSpec>) -> Vec<ShiftSpec> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, ShiftSpec> = HashMap::new();
    for spec in desired {
        if !latest.contains_key(&spec.code) {
            order.push(spec.code.clone());
        }
        latest.insert(spec.code.clone(), spec);
    }
    order
        .into_iter()
        .filter_map(|code| latest.remove(&code))
        .collect()
}

/// Build the reconciliation plan. Desired specs must already be
/// [`ShiftSpec::normalized`].
pub fn plan(stored: &[StoredWindow], desired: Vec<ShiftSpec>) -> ReconcilePlan {
    let duplicates = find_duplicates(stored);

    // Survivors only: a removed duplicate must never be the update target.
    let removed: Vec<DbId> = duplicates.iter().flat_map(|g| g.remove.clone()).collect();
    let survivors: HashMap<&str, DbId> = stored
        .iter()
        .filter(|w| !removed.contains(&w.id))
        .map(|w| (w.code.as_str(), w.id))
        .collect();

    let ops = collapse_desired(desired)
        .into_iter()
        .map(|spec| match survivors.get(spec.code.as_str()) {
            Some(&id) => WindowOp::Update { id, spec },
            None => WindowOp::Create { spec },
        })
        .collect();

    ReconcilePlan { duplicates, ops }
}
