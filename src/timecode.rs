//! SMPTE timecode strings at an integer frame rate.
//!
//! Edit lists carry `HH:MM:SS:FF` values; the last separator may be `;` or
//! `.` in lists exported from drop-frame projects. Those are accepted and
//! counted as non-drop, which is consistent with the integer-rate surface of
//! this tool.

use crate::core::FrameRate;
use crate::error::{ConformError, ConformResult};

/// Parse a timecode string into an absolute frame count.
pub fn parse_timecode(s: &str, rate: FrameRate) -> ConformResult<i64> {
    let fields: Vec<&str> = s.split([':', ';', '.']).collect();
    if fields.len() != 4 {
        return Err(ConformError::edl_parse(format!(
            "timecode '{s}' must have four fields"
        )));
    }

    let field = |i: usize, name: &str| -> ConformResult<i64> {
        fields[i]
            .parse::<i64>()
            .map_err(|_| ConformError::edl_parse(format!("timecode '{s}' has a bad {name} field")))
    };

    let hh = field(0, "hours")?;
    let mm = field(1, "minutes")?;
    let ss = field(2, "seconds")?;
    let ff = field(3, "frames")?;

    if !(0..60).contains(&mm) || !(0..60).contains(&ss) {
        return Err(ConformError::edl_parse(format!(
            "timecode '{s}' is out of range"
        )));
    }
    if hh < 0 || ff < 0 || ff >= i64::from(rate.0) {
        return Err(ConformError::edl_parse(format!(
            "timecode '{s}' is out of range at {} fps",
            rate.0
        )));
    }

    Ok(((hh * 60 + mm) * 60 + ss) * i64::from(rate.0) + ff)
}

/// Format an absolute frame count as `HH:MM:SS:FF`.
pub fn format_timecode(frames: i64, rate: FrameRate) -> String {
    let fps = i64::from(rate.0);
    let ff = frames.rem_euclid(fps);
    let total_secs = frames.div_euclid(fps);
    let ss = total_secs % 60;
    let mm = (total_secs / 60) % 60;
    let hh = total_secs / 3600;
    format!("{hh:02}:{mm:02}:{ss:02}:{ff:02}")
}
