//! Edlconform reconciles an audio edit decision list against a pool of
//! broadcast-WAV source files and emits a lane-assigned composition.
//!
//! The flow is three pure stages over fully loaded inputs:
//!
//! - Match each [`Edit`] against the [`SourceCatalog`] (time-range
//!   containment first, then name/tape correlation)
//! - Assign every matched (channel × candidate) combination a [`Lane`]
//! - Sequence each lane by record time, padding gaps with filler
//!
//! [`pipeline::conform`] runs the three stages; [`compose`] serializes the
//! result for a container writer.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod compose;
pub mod core;
pub mod edl;
pub mod error;
pub mod lanes;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod sequence;
pub mod timecode;
pub mod wav;

pub use crate::catalog::SourceCatalog;
pub use crate::compose::{CompositionDoc, build_document, write_json};
pub use crate::core::{FrameRange, FrameRate};
pub use crate::edl::{EditList, parse_edit_list, read_edit_list};
pub use crate::error::{ConformError, ConformResult};
pub use crate::lanes::{CollisionScope, LaneAssigner};
pub use crate::matching::is_match;
pub use crate::model::{ClipInstruction, Edit, Lane, SourceCandidate};
pub use crate::pipeline::{ConformOpts, ConformOutput, RunSummary, conform};
pub use crate::sequence::{PlacedClip, Placement, SequencedLanes};
