//! Broadcast-WAV metadata probing.
//!
//! One pass over the RIFF chunk list, collecting only what matching needs:
//! `fmt ` (sample rate, frame layout), `data` (recorded length), `bext`
//! (time reference, the file-relative sample offset of recorded audio) and
//! `iXML` (tape identity plus the ordered track list). Sample data itself is
//! never read. Missing chunks surface as zeroes/`None`s, not errors; a file
//! without `bext` simply starts at sample zero.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::warn;

use crate::error::{ConformError, ConformResult};

/// Offset of the 64-bit TimeReference field inside a `bext` chunk:
/// Description[256] + Originator[32] + OriginatorReference[32] +
/// OriginationDate[10] + OriginationTime[8].
const BEXT_TIME_REFERENCE_OFFSET: usize = 338;
const BEXT_MIN_SIZE: usize = BEXT_TIME_REFERENCE_OFFSET + 8;

#[derive(Clone, Debug, Default)]
pub struct WavMetadata {
    pub sample_rate: u32,
    pub channel_count: u16,
    /// Sample frames in the `data` chunk.
    pub frame_count: u64,
    /// First recorded sample's position on the original recording timeline.
    pub time_reference: u64,
    /// Embedded tape identity, when the file carries iXML.
    pub tape: Option<String>,
    /// Channel index of each iXML track, in document order.
    pub track_labels: Vec<String>,
}

impl WavMetadata {
    /// One past the last recorded sample, on the recording timeline.
    pub fn end_reference(&self) -> u64 {
        self.time_reference + self.frame_count
    }

    /// First track's channel index, the label a clip from this file should
    /// prefer for its lane.
    pub fn recommended_lane_label(&self) -> Option<&str> {
        self.track_labels.first().map(String::as_str)
    }
}

pub fn read_metadata(path: &Path) -> ConformResult<WavMetadata> {
    let file = File::open(path)?;
    let mut r = BufReader::new(file);

    let mut header = [0u8; 12];
    r.read_exact(&mut header)
        .map_err(|_| bad(path, "file too short for a RIFF header"))?;
    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Err(bad(path, "not a RIFF/WAVE file"));
    }

    let mut meta = WavMetadata::default();
    let mut block_align: u64 = 0;
    let mut data_bytes: Option<u64> = None;
    let mut saw_fmt = false;

    loop {
        let mut chunk_header = [0u8; 8];
        match r.read_exact(&mut chunk_header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let fourcc = [
            chunk_header[0],
            chunk_header[1],
            chunk_header[2],
            chunk_header[3],
        ];
        let size = u64::from(u32::from_le_bytes([
            chunk_header[4],
            chunk_header[5],
            chunk_header[6],
            chunk_header[7],
        ]));

        match &fourcc {
            b"fmt " => {
                if size < 16 {
                    return Err(bad(path, "fmt chunk too short"));
                }
                let mut fmt = [0u8; 16];
                r.read_exact(&mut fmt)?;
                meta.channel_count = u16::from_le_bytes([fmt[2], fmt[3]]);
                meta.sample_rate = u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]);
                block_align = u64::from(u16::from_le_bytes([fmt[12], fmt[13]]));
                skip(&mut r, size - 16)?;
                saw_fmt = true;
            }
            b"data" => {
                data_bytes = Some(size);
                skip(&mut r, size)?;
            }
            b"bext" => {
                if (size as usize) < BEXT_MIN_SIZE {
                    warn!(path = %path.display(), "bext chunk too short, ignoring");
                    skip(&mut r, size)?;
                } else {
                    let mut bext = vec![0u8; BEXT_MIN_SIZE];
                    r.read_exact(&mut bext)?;
                    let mut tr = [0u8; 8];
                    tr.copy_from_slice(
                        &bext[BEXT_TIME_REFERENCE_OFFSET..BEXT_TIME_REFERENCE_OFFSET + 8],
                    );
                    meta.time_reference = u64::from_le_bytes(tr);
                    skip(&mut r, size - BEXT_MIN_SIZE as u64)?;
                }
            }
            b"iXML" => {
                let mut buf = vec![0u8; size as usize];
                r.read_exact(&mut buf)?;
                let xml = String::from_utf8_lossy(&buf);
                match parse_ixml(&xml) {
                    Ok((tape, labels)) => {
                        meta.tape = tape;
                        meta.track_labels = labels;
                    }
                    Err(e) => {
                        // Treat a garbled iXML chunk as absent metadata; the
                        // file can still correlate by basename.
                        warn!(path = %path.display(), error = %e, "ignoring unreadable iXML");
                    }
                }
            }
            _ => skip(&mut r, size)?,
        }

        // RIFF chunks are padded to even sizes.
        if size % 2 == 1 {
            skip(&mut r, 1)?;
        }
    }

    if !saw_fmt {
        return Err(bad(path, "missing fmt chunk"));
    }
    let data_bytes = data_bytes.ok_or_else(|| bad(path, "missing data chunk"))?;
    if meta.sample_rate == 0 || block_align == 0 {
        return Err(bad(path, "fmt chunk has a zero sample rate or block align"));
    }
    meta.frame_count = data_bytes / block_align;

    Ok(meta)
}

fn parse_ixml(xml: &str) -> Result<(Option<String>, Vec<String>), roxmltree::Error> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();

    let tape = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "TAPE")
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut labels = Vec::new();
    if let Some(track_list) = root
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "TRACK_LIST")
    {
        for track in track_list
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "TRACK")
        {
            if let Some(index) = track
                .children()
                .find(|n| n.is_element() && n.tag_name().name() == "CHANNEL_INDEX")
                .and_then(|n| n.text())
            {
                let index = index.trim();
                if !index.is_empty() {
                    labels.push(index.to_string());
                }
            }
        }
    }

    Ok((tape, labels))
}

fn skip<R: Seek>(r: &mut R, bytes: u64) -> std::io::Result<()> {
    if bytes > 0 {
        r.seek(SeekFrom::Current(bytes as i64))?;
    }
    Ok(())
}

fn bad(path: &Path, msg: &str) -> ConformError {
    ConformError::metadata(format!("{}: {msg}", path.display()))
}
