// clipdeck-core/src/timeline/types.rs
//
// Entities owned by the timeline: tracks, the clips placed on them, and the
// patch structs used to edit both.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::MediaId;

/// A placed span on a track.
///
/// `media_file_id` is a non-owning reference into the media catalog and may
/// dangle once the file is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    /// Seconds, never negative.
    pub start_time: f64,
    /// Seconds, always positive.
    pub duration: f64,
    pub name: String,
    pub media_file_id: Option<MediaId>,
    pub thumbnail_path: Option<PathBuf>,
    pub resolution: Option<String>,
    pub codec: Option<String>,
}

impl Clip {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether `time` falls within the clip, both ends included.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time()
    }
}

/// A lane of clips. Clip order is insertion order, not playback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub clips: Vec<Clip>,
    pub muted: bool,
    pub locked: bool,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            clips: Vec::new(),
            muted: false,
            locked: false,
        }
    }

    /// End of the most recently inserted clip, or 0 for an empty track.
    pub fn tail_end(&self) -> f64 {
        self.clips.last().map_or(0.0, Clip::end_time)
    }

    /// Latest end time of any clip on the track.
    pub fn end_time(&self) -> f64 {
        self.clips.iter().map(Clip::end_time).fold(0.0, f64::max)
    }
}

/// Input to `TimelineModel::add_clip`.
///
/// A missing id is generated; a missing or non-positive duration falls back
/// to the default clip length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClip {
    pub id: Option<String>,
    pub start_time: f64,
    pub duration: Option<f64>,
    pub name: String,
    pub media_file_id: Option<MediaId>,
    pub thumbnail_path: Option<PathBuf>,
    pub resolution: Option<String>,
    pub codec: Option<String>,
}

impl NewClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn media_file_id(mut self, id: impl Into<MediaId>) -> Self {
        self.media_file_id = Some(id.into());
        self
    }
}

/// Partial update for a clip; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipPatch {
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub name: Option<String>,
}

/// Partial update for a track; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackPatch {
    pub name: Option<String>,
    pub muted: Option<bool>,
    pub locked: Option<bool>,
}
