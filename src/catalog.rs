//! Source catalog: every file offered to a run, probed exactly once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::FrameRate;
use crate::error::{ConformError, ConformResult};
use crate::model::SourceCandidate;
use crate::wav;

/// The pool of probed source files, in offer order.
#[derive(Clone, Debug)]
pub struct SourceCatalog {
    candidates: Vec<SourceCandidate>,
}

impl SourceCatalog {
    /// Probe `paths` and build the catalog.
    ///
    /// Each distinct path is read once; repeats are dropped. A file whose
    /// metadata cannot be read is skipped with a warning — it simply cannot
    /// be matched — unless that leaves the catalog empty, which is fatal.
    pub fn load(paths: &[PathBuf], rate: FrameRate) -> ConformResult<Self> {
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::new();

        for path in paths {
            let identity = path.to_string_lossy().into_owned();
            if !seen.insert(identity.clone()) {
                debug!(path = %identity, "duplicate source path, probing once");
                continue;
            }
            match probe(path, identity, rate) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable source");
                }
            }
        }

        if candidates.is_empty() {
            return Err(ConformError::NoUsableSources);
        }
        Ok(Self { candidates })
    }

    /// Build a catalog from pre-made candidates, preserving their order.
    pub fn from_candidates(candidates: Vec<SourceCandidate>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[SourceCandidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

fn probe(path: &Path, identity: String, rate: FrameRate) -> ConformResult<SourceCandidate> {
    let meta = wav::read_metadata(path)?;

    // Inclusive covered range in edit-rate frames: the first fully covered
    // frame instant rounds up, the last rounds down, keeping the containment
    // test exact in integers.
    let start = rate.samples_to_frames_ceil(meta.time_reference, meta.sample_rate);
    let end = rate.samples_to_frames_floor(meta.end_reference(), meta.sample_rate);

    let mut correlation_keys = BTreeSet::new();
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        correlation_keys.insert(name.to_string());
    }
    if let Some(tape) = &meta.tape {
        correlation_keys.insert(tape.clone());
    }

    Ok(SourceCandidate {
        identity,
        time_range: (start, end),
        recommended_lane_label: meta.recommended_lane_label().map(str::to_string),
        correlation_keys,
    })
}
