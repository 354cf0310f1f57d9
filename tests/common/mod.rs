//! Fixture helpers shared by the integration tests.
//!
//! Fixtures are written byte-exactly: the metadata reader cares about chunk
//! layout (`fmt `, `bext`, `iXML`, `data`), so the builder assembles RIFF
//! chunks directly instead of going through an audio encoder.

use std::path::{Path, PathBuf};

pub const SAMPLE_RATE: u32 = 48_000;

/// Description of one broadcast-WAV fixture.
pub struct WavFixture<'a> {
    pub name: &'a str,
    pub channels: u16,
    /// First recorded sample's position on the recording timeline.
    pub time_reference: u64,
    /// Recorded length in sample frames.
    pub frame_count: u64,
    pub tape: Option<&'a str>,
    /// iXML track channel indexes, in order. Empty means no TRACK_LIST.
    pub track_labels: &'a [&'a str],
}

impl Default for WavFixture<'_> {
    fn default() -> Self {
        Self {
            name: "fixture.wav",
            channels: 1,
            time_reference: 0,
            frame_count: SAMPLE_RATE as u64,
            tape: None,
            track_labels: &[],
        }
    }
}

pub fn write_wav(dir: &Path, fixture: &WavFixture) -> PathBuf {
    let block_align = fixture.channels * 2; // 16-bit PCM

    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&fixture.channels.to_le_bytes());
    fmt.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    fmt.extend_from_slice(&(SAMPLE_RATE * u32::from(block_align)).to_le_bytes());
    fmt.extend_from_slice(&block_align.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());

    let mut bext = vec![0u8; 604];
    bext[338..346].copy_from_slice(&fixture.time_reference.to_le_bytes());

    let data = vec![0u8; (fixture.frame_count * u64::from(block_align)) as usize];

    let mut chunks: Vec<(&[u8; 4], Vec<u8>)> =
        vec![(b"fmt ", fmt), (b"bext", bext)];
    if let Some(ixml) = build_ixml(fixture) {
        chunks.push((b"iXML", ixml.into_bytes()));
    }
    chunks.push((b"data", data));

    let mut body = Vec::new();
    for (fourcc, chunk) in &chunks {
        body.extend_from_slice(*fourcc);
        body.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        body.extend_from_slice(chunk);
        if chunk.len() % 2 == 1 {
            body.push(0);
        }
    }

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(&body);

    let path = dir.join(fixture.name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn build_ixml(fixture: &WavFixture) -> Option<String> {
    if fixture.tape.is_none() && fixture.track_labels.is_empty() {
        return None;
    }

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<BWFXML>\n");
    xml.push_str("  <IXML_VERSION>1.5</IXML_VERSION>\n");
    if let Some(tape) = fixture.tape {
        xml.push_str(&format!("  <TAPE>{tape}</TAPE>\n"));
    }
    if !fixture.track_labels.is_empty() {
        xml.push_str("  <TRACK_LIST>\n");
        xml.push_str(&format!(
            "    <TRACK_COUNT>{}</TRACK_COUNT>\n",
            fixture.track_labels.len()
        ));
        for label in fixture.track_labels {
            xml.push_str(&format!(
                "    <TRACK><CHANNEL_INDEX>{label}</CHANNEL_INDEX></TRACK>\n"
            ));
        }
        xml.push_str("  </TRACK_LIST>\n");
    }
    xml.push_str("</BWFXML>\n");
    Some(xml)
}
