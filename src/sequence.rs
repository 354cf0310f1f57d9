//! Ordering clips within their lanes and padding the gaps.

use std::collections::BTreeMap;

use tracing::warn;

use crate::model::{ClipInstruction, Lane};

/// One slot in a lane's output sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Placement {
    /// Silence keeping the following clip at its record offset.
    Filler { length: i64 },
    Clip(PlacedClip),
}

/// A clip fixed in its final position on a lane.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacedClip {
    pub source_identity: String,
    pub source_start: i64,
    pub length: i64,
    pub record_start: i64,
    pub display_name: String,
}

/// Per-lane ordered placements plus what the walk noticed along the way.
#[derive(Clone, Debug, Default)]
pub struct SequencedLanes {
    pub lanes: BTreeMap<Lane, Vec<Placement>>,
    /// Clips that began before the previous clip's end on the same lane.
    pub overlap_warnings: usize,
}

/// Group instructions by lane, order each lane by record time, and insert
/// filler for the gaps.
///
/// The per-lane sort is stable, so instructions with equal record starts
/// keep their encounter order. A clip that starts before the running cursor
/// (overlapping edits landing on one lane) is appended directly with no
/// filler — never a negative gap — and counted as a warning.
pub fn sequence(instructions: Vec<ClipInstruction>) -> SequencedLanes {
    let mut groups: BTreeMap<Lane, Vec<ClipInstruction>> = BTreeMap::new();
    for instruction in instructions {
        groups
            .entry(instruction.lane.clone())
            .or_default()
            .push(instruction);
    }

    let mut out = SequencedLanes::default();
    for (lane, mut group) in groups {
        group.sort_by_key(|c| c.record_start);

        let mut placements = Vec::with_capacity(group.len() * 2);
        let mut cursor: i64 = 0;
        for clip in group {
            if clip.record_start > cursor {
                placements.push(Placement::Filler {
                    length: clip.record_start - cursor,
                });
                cursor = clip.record_start;
            } else if clip.record_start < cursor {
                warn!(
                    lane = %lane,
                    record_start = clip.record_start,
                    lane_end = cursor,
                    clip = %clip.display_name,
                    "overlapping clips share a lane, appending without a gap"
                );
                out.overlap_warnings += 1;
            }
            cursor += clip.length;
            placements.push(Placement::Clip(PlacedClip {
                source_identity: clip.source_identity,
                source_start: clip.source_start,
                length: clip.length,
                record_start: clip.record_start,
                display_name: clip.display_name,
            }));
        }
        out.lanes.insert(lane, placements);
    }
    out
}
