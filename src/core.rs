use crate::error::{ConformError, ConformResult};

/// Integer edit rate, frames per second. Edit lists state a single rate and
/// every frame quantity in a run is expressed against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameRate(pub u32);

impl FrameRate {
    pub fn new(fps: u32) -> ConformResult<Self> {
        if fps == 0 {
            return Err(ConformError::validation("frame rate must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Project a sample count at `sample_rate` onto this rate, rounding up.
    ///
    /// Used for the start of a source range: a file covers an edit frame
    /// only if the frame instant is at or after the file's first sample, so
    /// the first fully covered frame is the ceiling.
    pub fn samples_to_frames_ceil(self, samples: u64, sample_rate: u32) -> i64 {
        let num = u128::from(samples) * u128::from(self.0);
        let den = u128::from(sample_rate);
        num.div_ceil(den) as i64
    }

    /// Project a sample count at `sample_rate` onto this rate, rounding down.
    ///
    /// Used for the end of a source range: the last covered frame instant is
    /// the floor of the file's final sample position.
    pub fn samples_to_frames_floor(self, samples: u64, sample_rate: u32) -> i64 {
        let num = u128::from(samples) * u128::from(self.0);
        let den = u128::from(sample_rate);
        (num / den) as i64
    }
}

/// Half-open range of record-time frames, `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    pub fn new(start: i64, end: i64) -> ConformResult<Self> {
        if start > end {
            return Err(ConformError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, f: i64) -> bool {
        self.start <= f && f < self.end
    }
}
