//! Composition document handed to the container writer.
//!
//! The engine's job ends at placement instructions; this module gives them a
//! serialized shape. Tracks are named by lane slot and emitted in lane
//! order, each one an alternating filler/clip list; every used source is
//! linked exactly once and clips reference the link handle.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::core::FrameRate;
use crate::error::{ConformError, ConformResult};
use crate::pipeline::ConformOutput;
use crate::sequence::Placement;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CompositionDoc {
    pub name: String,
    pub edit_rate: u32,
    pub sources: Vec<LinkedSource>,
    pub tracks: Vec<TrackDoc>,
}

/// One linked source file and its handle within the document.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LinkedSource {
    pub id: String,
    pub path: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TrackDoc {
    pub name: String,
    pub items: Vec<TrackItem>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackItem {
    Filler {
        length: i64,
    },
    Clip {
        source: String,
        source_start: i64,
        length: i64,
        record_start: i64,
        name: String,
    },
}

pub fn build_document(name: &str, rate: FrameRate, output: &ConformOutput) -> CompositionDoc {
    let mut handles: BTreeMap<&str, String> = BTreeMap::new();
    let sources: Vec<LinkedSource> = output
        .sources
        .iter()
        .enumerate()
        .map(|(i, identity)| {
            let id = format!("s{i}");
            handles.insert(identity.as_str(), id.clone());
            LinkedSource {
                id,
                path: identity.clone(),
            }
        })
        .collect();

    let tracks = output
        .sequenced
        .lanes
        .iter()
        .map(|(lane, placements)| TrackDoc {
            name: lane.slot_name(),
            items: placements
                .iter()
                .map(|p| match p {
                    Placement::Filler { length } => TrackItem::Filler { length: *length },
                    Placement::Clip(c) => TrackItem::Clip {
                        source: handles
                            .get(c.source_identity.as_str())
                            .cloned()
                            .unwrap_or_default(),
                        source_start: c.source_start,
                        length: c.length,
                        record_start: c.record_start,
                        name: c.display_name.clone(),
                    },
                })
                .collect(),
        })
        .collect();

    CompositionDoc {
        name: name.to_string(),
        edit_rate: rate.0,
        sources,
        tracks,
    }
}

pub fn write_json(doc: &CompositionDoc, path: &Path) -> ConformResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), doc)
        .map_err(|e| ConformError::serde(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lane;
    use crate::pipeline::RunSummary;
    use crate::sequence::{PlacedClip, SequencedLanes};

    fn sample_output() -> ConformOutput {
        let mut sequenced = SequencedLanes::default();
        sequenced.lanes.insert(
            Lane::new(1, "1"),
            vec![
                Placement::Clip(PlacedClip {
                    source_identity: "/x/a.wav".to_string(),
                    source_start: 0,
                    length: 10,
                    record_start: 0,
                    display_name: "a".to_string(),
                }),
                Placement::Filler { length: 5 },
                Placement::Clip(PlacedClip {
                    source_identity: "/x/b.wav".to_string(),
                    source_start: 2,
                    length: 10,
                    record_start: 15,
                    display_name: "b".to_string(),
                }),
            ],
        );
        sequenced.lanes.insert(
            Lane::new(2, "1"),
            vec![Placement::Clip(PlacedClip {
                source_identity: "/x/a.wav".to_string(),
                source_start: 0,
                length: 10,
                record_start: 0,
                display_name: "a".to_string(),
            })],
        );
        ConformOutput {
            sequenced,
            sources: vec!["/x/a.wav".to_string(), "/x/b.wav".to_string()],
            summary: RunSummary::default(),
        }
    }

    #[test]
    fn tracks_are_named_and_ordered_by_lane() {
        let doc = build_document("ep101", FrameRate(24), &sample_output());
        let names: Vec<&str> = doc.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A1_1", "A2_1"]);
        assert_eq!(doc.name, "ep101");
        assert_eq!(doc.edit_rate, 24);
    }

    #[test]
    fn clips_reference_one_handle_per_source() {
        let doc = build_document("ep101", FrameRate(24), &sample_output());
        assert_eq!(doc.sources.len(), 2);
        assert_eq!(doc.sources[0].path, "/x/a.wav");

        let handle_of = |track: usize, item: usize| match &doc.tracks[track].items[item] {
            TrackItem::Clip { source, .. } => source.clone(),
            TrackItem::Filler { .. } => panic!("expected clip"),
        };
        // Same file on two tracks resolves to the same handle.
        assert_eq!(handle_of(0, 0), handle_of(1, 0));
        assert_ne!(handle_of(0, 0), handle_of(0, 2));
    }

    #[test]
    fn document_round_trips_through_json() {
        let doc = build_document("ep101", FrameRate(24), &sample_output());
        let json = serde_json::to_string(&doc).unwrap();
        let restored: CompositionDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.tracks.len(), 2);
        assert_eq!(restored.tracks[0].items.len(), 3);
        assert!(matches!(
            restored.tracks[0].items[1],
            TrackItem::Filler { length: 5 }
        ));
    }

    #[test]
    fn write_json_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let doc = build_document("ep101", FrameRate(24), &sample_output());
        write_json(&doc, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"A1_1\""));
    }
}
