//! CMX3600-style edit list reader.
//!
//! Only the surface this tool needs: the title line, standard event lines,
//! `AUD` channel-extension lines, and the `FROM CLIP NAME` / `SOURCE FILE`
//! note comments that attach to the preceding event. Events are normalized
//! to [`Edit`] values at a single integer frame rate; video-only events,
//! black/filler reels, and zero-length events are dropped during
//! normalization (they have no audio to conform).

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::core::FrameRate;
use crate::error::{ConformError, ConformResult};
use crate::model::Edit;
use crate::timecode::parse_timecode;

/// A parsed edit list: its stated title and the normalized audio edits, in
/// list order.
#[derive(Clone, Debug, Default)]
pub struct EditList {
    pub title: Option<String>,
    pub edits: Vec<Edit>,
}

pub fn read_edit_list(path: &Path, rate: FrameRate) -> ConformResult<EditList> {
    let text = fs::read_to_string(path)?;
    parse_edit_list(&text, rate)
}

pub fn parse_edit_list(text: &str, rate: FrameRate) -> ConformResult<EditList> {
    let mut list = EditList::default();
    let mut pending: Option<PendingEvent> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let fail = |msg: String| ConformError::edl_parse(format!("line {}: {msg}", lineno + 1));

        if let Some(rest) = line.strip_prefix("TITLE:") {
            let title = rest.trim();
            if !title.is_empty() {
                list.title = Some(title.to_string());
            }
        } else if line.starts_with("FCM:") || line.starts_with("M2") {
            // Frame-count mode and motion-memory lines carry nothing we place.
        } else if let Some(note) = line.strip_prefix('*') {
            apply_note(note.trim(), &mut pending);
        } else if line.starts_with("AUD") {
            let ev = pending
                .as_mut()
                .ok_or_else(|| fail("AUD line without a preceding event".to_string()))?;
            for field in line[3..].split_whitespace() {
                let ch: u32 = field
                    .parse()
                    .map_err(|_| fail(format!("bad AUD channel '{field}'")))?;
                ev.channels.insert(ch);
            }
        } else if line.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            flush(&mut pending, &mut list)?;
            pending = Some(parse_event_line(line, rate).map_err(|e| match e {
                ConformError::EdlParse(msg) => fail(msg),
                other => other,
            })?);
        } else {
            // Unknown directive lines are tolerated, the format grows warts.
            warn!(line = lineno + 1, "ignoring unrecognized edit list line");
        }
    }

    flush(&mut pending, &mut list)?;
    Ok(list)
}

/// An event line plus whatever notes follow it, before normalization.
#[derive(Clone, Debug)]
struct PendingEvent {
    reel: String,
    channels: BTreeSet<u32>,
    source_in: i64,
    source_out: i64,
    record_in: i64,
    record_out: i64,
    clip_name: Option<String>,
    source_file: Option<String>,
}

fn apply_note(note: &str, pending: &mut Option<PendingEvent>) {
    let Some(ev) = pending.as_mut() else {
        return;
    };
    let upper = note.to_ascii_uppercase();
    if let Some(rest) = upper.strip_prefix("FROM CLIP NAME:") {
        let value = note[note.len() - rest.len()..].trim();
        if !value.is_empty() {
            ev.clip_name = Some(value.to_string());
        }
    } else if let Some(rest) = upper.strip_prefix("SOURCE FILE:") {
        let value = note[note.len() - rest.len()..].trim();
        if !value.is_empty() {
            ev.source_file = Some(value.to_string());
        }
    }
}

fn parse_event_line(line: &str, rate: FrameRate) -> ConformResult<PendingEvent> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    // Event number, reel, channels, transition, then four timecodes; dissolve
    // and wipe events carry extra operands between those groups.
    if fields.len() < 8 {
        return Err(ConformError::edl_parse("event line has too few fields"));
    }

    let reel = fields[1].to_string();
    let channels = parse_channels(fields[2])?;

    let tc = &fields[fields.len() - 4..];
    Ok(PendingEvent {
        reel,
        channels,
        source_in: parse_timecode(tc[0], rate)?,
        source_out: parse_timecode(tc[1], rate)?,
        record_in: parse_timecode(tc[2], rate)?,
        record_out: parse_timecode(tc[3], rate)?,
        clip_name: None,
        source_file: None,
    })
}

/// Decode a channel designator into the audio channels it targets.
///
/// Video-only designators produce an empty set. `AA` means both A1 and A2,
/// `B` is video plus A1, and slash-joined forms combine.
fn parse_channels(designator: &str) -> ConformResult<BTreeSet<u32>> {
    let mut channels = BTreeSet::new();
    for token in designator.split('/') {
        match token {
            "V" | "NONE" | "" => {}
            "A" => {
                channels.insert(1);
            }
            "AA" => {
                channels.insert(1);
                channels.insert(2);
            }
            "B" => {
                channels.insert(1);
            }
            _ => {
                let digits = token
                    .strip_prefix('A')
                    .filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()));
                match digits.and_then(|d| d.parse::<u32>().ok()) {
                    Some(ch) => {
                        channels.insert(ch);
                    }
                    None => {
                        return Err(ConformError::edl_parse(format!(
                            "unknown channel designator '{designator}'"
                        )));
                    }
                }
            }
        }
    }
    Ok(channels)
}

fn flush(pending: &mut Option<PendingEvent>, list: &mut EditList) -> ConformResult<()> {
    let Some(ev) = pending.take() else {
        return Ok(());
    };

    if ev.channels.is_empty() {
        return Ok(());
    }
    if ev.reel == "BL" {
        // Black/filler reel, nothing to link.
        return Ok(());
    }
    if ev.source_out <= ev.source_in || ev.record_out <= ev.record_in {
        warn!(reel = %ev.reel, "skipping zero-length edit");
        return Ok(());
    }

    let identity = ev.source_file.unwrap_or_else(|| ev.reel.clone());
    let edit = Edit::new(
        identity,
        ev.source_in,
        ev.source_out,
        ev.record_in,
        ev.record_out,
        ev.channels,
        ev.clip_name,
    )?;
    list.edits.push(edit);
    Ok(())
}
