//! Lane assignment: giving every matched clip a track to live on.

use std::collections::BTreeSet;

use crate::model::{Edit, Lane, SourceCandidate};

/// How far the used-lane set reaches when resolving collisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionScope {
    /// The used set resets per edit. Within one edit every channel ×
    /// candidate combination fans out to a distinct lane, while equal trial
    /// labels from different edits resolve to the same lane, so sequential
    /// edits share tracks. This is the default.
    #[default]
    PerEdit,
    /// The used set lives for the whole run: every (edit, candidate,
    /// channel) triple anywhere in the list gets its own lane.
    Global,
}

/// Resolves lanes for one conversion run.
///
/// The used-lane set is owned here and threaded through every assignment,
/// so the collision scope is a property of the run, not of any global
/// state. Collisions are expected, not errors: the successor chain walks
/// until a free lane appears, and the chain is finite because each step
/// grows the label or bumps its numeric suffix against a finite used set.
#[derive(Debug, Default)]
pub struct LaneAssigner {
    scope: CollisionScope,
    used: BTreeSet<Lane>,
}

impl LaneAssigner {
    pub fn new(scope: CollisionScope) -> Self {
        Self {
            scope,
            used: BTreeSet::new(),
        }
    }

    /// Lanes handed out so far in the current scope.
    pub fn used_lanes(&self) -> &BTreeSet<Lane> {
        &self.used
    }

    /// Assign a lane to every (channel × matched candidate) combination of
    /// one edit. Channels iterate in ascending order and candidates in
    /// catalog order, so the outcome is deterministic for fixed inputs.
    pub fn assign<'a>(
        &mut self,
        edit: &Edit,
        matched: &[&'a SourceCandidate],
    ) -> Vec<(&'a SourceCandidate, Lane)> {
        if self.scope == CollisionScope::PerEdit {
            self.used.clear();
        }

        let mut assigned = Vec::with_capacity(edit.channels.len() * matched.len());
        for &channel in &edit.channels {
            for &candidate in matched {
                let label = candidate.recommended_lane_label.clone().unwrap_or_default();
                let mut lane = Lane::new(channel, label);
                while self.used.contains(&lane) {
                    lane = lane.successor();
                }
                self.used.insert(lane.clone());
                assigned.push((candidate, lane));
            }
        }
        assigned
    }
}
