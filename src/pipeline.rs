//! One conversion run: match, assign lanes, sequence.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::SourceCatalog;
use crate::error::{ConformError, ConformResult};
use crate::lanes::{CollisionScope, LaneAssigner};
use crate::matching;
use crate::model::{ClipInstruction, Edit};
use crate::sequence::{self, SequencedLanes};

#[derive(Clone, Copy, Debug, Default)]
pub struct ConformOpts {
    pub collision_scope: CollisionScope,
}

/// Everything a composition writer needs, plus the run's accounting.
#[derive(Clone, Debug)]
pub struct ConformOutput {
    pub sequenced: SequencedLanes,
    /// Unique source identities actually placed, in first-use order. The
    /// writer links each of these exactly once.
    pub sources: Vec<String>,
    pub summary: RunSummary,
}

/// What happened during a run, for the human reading the log. Partial
/// failure (edits nobody matched, files nobody used) must never be silent.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub edit_count: usize,
    pub matched_edit_count: usize,
    pub clip_count: usize,
    /// One descriptor per edit that no source satisfied.
    pub unmatched_edits: Vec<String>,
    /// Catalog entries never placed on any lane, in catalog order.
    pub unused_sources: Vec<String>,
    pub overlap_warnings: usize,
}

/// Run the matching and lane-assignment engine over fully loaded inputs.
///
/// Per-edit match failure is an expected outcome and lands in the summary;
/// the run only fails when the catalog is empty or when not a single edit
/// could be linked.
pub fn conform(
    edits: &[Edit],
    catalog: &SourceCatalog,
    opts: ConformOpts,
) -> ConformResult<ConformOutput> {
    if catalog.is_empty() {
        return Err(ConformError::NoUsableSources);
    }
    if edits.is_empty() {
        return Err(ConformError::NoLinkableEvents);
    }

    let mut assigner = LaneAssigner::new(opts.collision_scope);
    let mut instructions: Vec<ClipInstruction> = Vec::new();
    let mut sources: Vec<String> = Vec::new();
    let mut linked: BTreeSet<String> = BTreeSet::new();
    let mut summary = RunSummary {
        edit_count: edits.len(),
        ..RunSummary::default()
    };

    for edit in edits {
        let matched = matching::matches_for_edit(edit, catalog.candidates());
        if matched.is_empty() {
            summary.unmatched_edits.push(describe(edit));
            continue;
        }
        summary.matched_edit_count += 1;

        for (candidate, lane) in assigner.assign(edit, &matched) {
            if linked.insert(candidate.identity.clone()) {
                sources.push(candidate.identity.clone());
            }
            instructions.push(ClipInstruction {
                lane,
                source_identity: candidate.identity.clone(),
                source_start: edit.source_in - candidate.time_range.0,
                length: edit.record_len(),
                record_start: edit.record_in,
                display_name: edit
                    .clip_name
                    .clone()
                    .unwrap_or_else(|| candidate.basename().to_string()),
            });
        }
    }

    if summary.matched_edit_count == 0 {
        return Err(ConformError::NoLinkableEvents);
    }

    summary.clip_count = instructions.len();
    summary.unused_sources = catalog
        .candidates()
        .iter()
        .filter(|c| !linked.contains(&c.identity))
        .map(|c| c.identity.clone())
        .collect();

    let sequenced = sequence::sequence(instructions);
    summary.overlap_warnings = sequenced.overlap_warnings;
    debug!(
        edits = summary.edit_count,
        matched = summary.matched_edit_count,
        clips = summary.clip_count,
        lanes = sequenced.lanes.len(),
        "conform pass complete"
    );

    Ok(ConformOutput {
        sequenced,
        sources,
        summary,
    })
}

fn describe(edit: &Edit) -> String {
    format!(
        "{} (record {}..{})",
        edit.source_identity, edit.record_in, edit.record_out
    )
}
