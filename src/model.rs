//! Data entities for one conversion run.
//!
//! Everything here is an immutable value: edits and candidates are built by
//! their readers and never mutated; lanes and clip instructions are derived
//! during assignment.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::error::{ConformError, ConformResult};

/// One normalized edit event: a source frame range placed at a record frame
/// range on one or more audio channels.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Edit {
    /// Stated source reference — a source filename or a tape name, whichever
    /// the edit list carries (a `SOURCE FILE` note wins over the reel field).
    pub source_identity: String,
    pub source_in: i64,
    pub source_out: i64,
    pub record_in: i64,
    pub record_out: i64,
    /// Output channels this edit targets. Non-empty.
    pub channels: BTreeSet<u32>,
    pub clip_name: Option<String>,
}

impl Edit {
    pub fn new(
        source_identity: impl Into<String>,
        source_in: i64,
        source_out: i64,
        record_in: i64,
        record_out: i64,
        channels: BTreeSet<u32>,
        clip_name: Option<String>,
    ) -> ConformResult<Self> {
        if source_out <= source_in {
            return Err(ConformError::validation(
                "edit source_out must be > source_in",
            ));
        }
        if record_out <= record_in {
            return Err(ConformError::validation(
                "edit record_out must be > record_in",
            ));
        }
        if channels.is_empty() {
            return Err(ConformError::validation("edit channel set must be non-empty"));
        }
        Ok(Self {
            source_identity: source_identity.into(),
            source_in,
            source_out,
            record_in,
            record_out,
            channels,
            clip_name,
        })
    }

    /// Placed length on the timeline, in frames.
    pub fn record_len(&self) -> i64 {
        self.record_out - self.record_in
    }
}

/// A physical source file considered as a possible origin for an edit.
///
/// Identity contract: equality, ordering, and hashing are defined on
/// `identity` alone. Two candidates with the same path are the same
/// candidate regardless of metadata contents.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SourceCandidate {
    /// Path or stable key for this file.
    pub identity: String,
    /// Covered time range in edit-rate frames, both ends inclusive.
    pub time_range: (i64, i64),
    /// First embedded track label, when the file carries one.
    pub recommended_lane_label: Option<String>,
    /// Strings that confirm this file against an edit's stated source:
    /// the file's basename and any embedded tape identity.
    pub correlation_keys: BTreeSet<String>,
}

impl SourceCandidate {
    pub fn basename(&self) -> &str {
        Path::new(&self.identity)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.identity)
    }
}

impl PartialEq for SourceCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for SourceCandidate {}

impl Hash for SourceCandidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl PartialOrd for SourceCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identity.cmp(&other.identity)
    }
}

/// A named output track for one channel/label combination.
///
/// Ordering compares the channel first, then the label, which matches the
/// lexicographic order of `slot_name()` values given the `A{channel}_{label}`
/// shape. The derived equality and hash follow the same two fields.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Lane {
    pub channel: u32,
    pub label: String,
}

impl Lane {
    pub fn new(channel: u32, label: impl Into<String>) -> Self {
        Self {
            channel,
            label: label.into(),
        }
    }

    pub fn slot_name(&self) -> String {
        format!("A{}_{}", self.channel, self.label)
    }

    /// Next lane in a collision chain.
    ///
    /// A trailing run of decimal digits is incremented in place (any prefix
    /// kept); otherwise `.1` is appended. Each step either grows the label or
    /// increments its numeric suffix, so repeated application never revisits
    /// a label.
    pub fn successor(&self) -> Lane {
        let digits = self
            .label
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .count();
        // ASCII digits are one byte each.
        let split = self.label.len() - digits;
        if digits > 0 {
            if let Ok(n) = self.label[split..].parse::<u64>() {
                return Lane::new(self.channel, format!("{}{}", &self.label[..split], n + 1));
            }
        }
        Lane::new(self.channel, format!("{}.1", self.label))
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A{}_{}", self.channel, self.label)
    }
}

/// One placement instruction: a matched source on a resolved lane.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClipInstruction {
    pub lane: Lane,
    pub source_identity: String,
    /// Start within the source file, in edit-rate frames.
    pub source_start: i64,
    pub length: i64,
    pub record_start: i64,
    /// Edit's clip name, falling back to the source basename.
    pub display_name: String,
}
