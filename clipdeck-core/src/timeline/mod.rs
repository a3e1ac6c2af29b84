// ============================================================================
// clipdeck-core/src/timeline/mod.rs
// ============================================================================
//
// TIMELINE MODEL: Tracks, clips, selection, playback and zoom
//
// The model exclusively owns its tracks and clips. Clips refer to media files
// by id only, so every lookup through `media_file_id` may come back empty.
// `total_duration` is the furthest clip end across all tracks and is
// recomputed after every clip mutation.
//
// Overlapping clips on one track are allowed; no operation rejects or
// resolves overlap.

mod types;

use log::debug;
use serde::Serialize;

pub use types::{Clip, ClipPatch, NewClip, Track, TrackPatch};

use crate::catalog::{MediaCatalog, MediaFile};
use crate::error::{CoreError, CoreResult};
use crate::utils::generate_id;

/// Length given to clips whose duration is unknown or invalid.
pub const DEFAULT_CLIP_DURATION: f64 = 5.0;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Factor applied by `zoom_in` / `zoom_out`.
pub const ZOOM_STEP: f64 = 1.5;

pub const MIN_PLAYBACK_RATE: f64 = 0.1;
pub const MAX_PLAYBACK_RATE: f64 = 4.0;

/// Horizontal scale at zoom 1.0.
pub const PIXELS_PER_SECOND: f64 = 100.0;
pub const MIN_TIMELINE_WIDTH: f64 = 2000.0;
/// Duration assumed when sizing an empty timeline.
pub const EMPTY_TIMELINE_SECONDS: f64 = 60.0;
pub const DEFAULT_GRID_SIZE: f64 = 1.0;

/// Edit state of the timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineModel {
    tracks: Vec<Track>,
    active_track_id: String,
    selected_clip_ids: Vec<String>,
    selected_track_id: Option<String>,
    total_duration: f64,
    current_time: f64,
    is_playing: bool,
    playback_rate: f64,
    zoom_level: f64,
    snap_enabled: bool,
    grid_size: f64,
}

impl Default for TimelineModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineModel {
    /// Two empty video tracks, the first one active.
    pub fn new() -> Self {
        Self {
            tracks: vec![
                Track::new("track1", "Video Track 1"),
                Track::new("track2", "Video Track 2"),
            ],
            active_track_id: "track1".to_string(),
            selected_clip_ids: Vec::new(),
            selected_track_id: None,
            total_duration: 0.0,
            current_time: 0.0,
            is_playing: false,
            playback_rate: 1.0,
            zoom_level: 1.0,
            snap_enabled: true,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }

    // ---- Accessors ----

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn active_track_id(&self) -> &str {
        &self.active_track_id
    }

    /// Furthest clip end across all tracks, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn selected_clip_ids(&self) -> &[String] {
        &self.selected_clip_ids
    }

    pub fn selected_track_id(&self) -> Option<&str> {
        self.selected_track_id.as_deref()
    }

    // ---- Tracks ----

    /// Appends an empty track and returns its id. Without a name it is
    /// called "Video Track N".
    pub fn add_track(&mut self, name: Option<&str>) -> String {
        let id = generate_id("track");
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Video Track {}", self.tracks.len() + 1));
        self.tracks.push(Track::new(id.clone(), name));
        id
    }

    /// Removes a track with all its clips. The last remaining track cannot be
    /// removed. If the active track goes, the first track becomes active.
    pub fn remove_track(&mut self, track_id: &str) -> bool {
        if self.tracks.len() <= 1 {
            debug!("Refusing to remove the last track");
            return false;
        }
        let Some(index) = self.tracks.iter().position(|t| t.id == track_id) else {
            return false;
        };

        let removed = self.tracks.remove(index);
        self.selected_clip_ids
            .retain(|id| !removed.clips.iter().any(|c| &c.id == id));
        if self.selected_track_id.as_deref() == Some(track_id) {
            self.selected_track_id = None;
        }
        if self.active_track_id == track_id {
            self.active_track_id = self.tracks[0].id.clone();
        }
        self.recompute_duration();
        true
    }

    pub fn update_track(&mut self, track_id: &str, patch: TrackPatch) -> bool {
        let Some(track) = self.track_mut(track_id) else {
            return false;
        };
        if let Some(name) = patch.name {
            track.name = name;
        }
        if let Some(muted) = patch.muted {
            track.muted = muted;
        }
        if let Some(locked) = patch.locked {
            track.locked = locked;
        }
        true
    }

    pub fn set_active_track(&mut self, track_id: &str) -> bool {
        if self.track(track_id).is_none() {
            return false;
        }
        self.active_track_id = track_id.to_string();
        true
    }

    // ---- Clips ----

    /// Appends a clip to a track.
    pub fn add_clip(&mut self, track_id: &str, new_clip: NewClip) -> CoreResult<Clip> {
        let track = self
            .track_mut(track_id)
            .ok_or_else(|| CoreError::TrackNotFound(track_id.to_string()))?;

        let clip = Clip {
            id: new_clip.id.unwrap_or_else(|| generate_id("clip")),
            start_time: sanitize_start(new_clip.start_time),
            duration: sanitize_duration(new_clip.duration),
            name: new_clip.name,
            media_file_id: new_clip.media_file_id,
            thumbnail_path: new_clip.thumbnail_path,
            resolution: new_clip.resolution,
            codec: new_clip.codec,
        };
        track.clips.push(clip.clone());
        self.recompute_duration();

        debug!(
            "Added clip {} to {} at {}s for {}s",
            clip.id, track_id, clip.start_time, clip.duration
        );
        Ok(clip)
    }

    /// Places a media file directly after the last clip on the track.
    pub fn add_media_file_as_clip(&mut self, media: &MediaFile, track_id: &str) -> CoreResult<Clip> {
        let start_time = self
            .track(track_id)
            .ok_or_else(|| CoreError::TrackNotFound(track_id.to_string()))?
            .tail_end();

        self.add_clip(
            track_id,
            NewClip {
                id: None,
                start_time,
                duration: media.duration,
                name: media.name.clone(),
                media_file_id: Some(media.id.clone()),
                thumbnail_path: media.thumbnail_path.clone(),
                resolution: media.resolution.clone(),
                codec: media.codec.clone(),
            },
        )
    }

    /// Moves a clip to `new_track_id` at `new_start_time`, appending it to
    /// that track. Returns `false` if the clip or the track is unknown.
    pub fn move_clip(&mut self, clip_id: &str, new_track_id: &str, new_start_time: f64) -> bool {
        if self.track(new_track_id).is_none() {
            return false;
        }
        let Some(mut clip) = self.detach_clip(clip_id) else {
            return false;
        };

        clip.start_time = sanitize_start(new_start_time);
        if let Some(track) = self.track_mut(new_track_id) {
            track.clips.push(clip);
        }
        self.recompute_duration();
        true
    }

    /// Removes the first clip with `clip_id`. Returns `false` if none exists.
    pub fn remove_clip(&mut self, clip_id: &str) -> bool {
        if self.detach_clip(clip_id).is_none() {
            return false;
        }
        self.selected_clip_ids.retain(|id| id != clip_id);
        self.recompute_duration();
        true
    }

    /// Applies `patch` to a clip.
    ///
    /// A negative or non-finite start, or a duration that is not a positive
    /// finite number, rejects the whole patch and leaves the clip unchanged.
    pub fn update_clip(&mut self, clip_id: &str, patch: ClipPatch) -> CoreResult<()> {
        if let Some(start_time) = patch.start_time {
            if !(start_time.is_finite() && start_time >= 0.0) {
                return Err(CoreError::InvalidClipTiming(format!(
                    "start time must be a non-negative number, got {start_time}"
                )));
            }
        }
        if let Some(duration) = patch.duration {
            if !(duration.is_finite() && duration > 0.0) {
                return Err(CoreError::InvalidClipTiming(format!(
                    "duration must be positive, got {duration}"
                )));
            }
        }

        let clip = self
            .tracks
            .iter_mut()
            .flat_map(|t| t.clips.iter_mut())
            .find(|c| c.id == clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;

        if let Some(start_time) = patch.start_time {
            clip.start_time = start_time;
        }
        if let Some(duration) = patch.duration {
            clip.duration = duration;
        }
        if let Some(name) = patch.name {
            clip.name = name;
        }
        self.recompute_duration();
        Ok(())
    }

    /// Looks up a clip and the id of the track holding it.
    pub fn clip(&self, clip_id: &str) -> Option<(&Clip, &str)> {
        self.tracks.iter().find_map(|track| {
            track
                .clips
                .iter()
                .find(|c| c.id == clip_id)
                .map(|c| (c, track.id.as_str()))
        })
    }

    /// Clips covering `time` on any track, paired with their track id.
    pub fn clips_at_time(&self, time: f64) -> Vec<(&Clip, &str)> {
        self.tracks
            .iter()
            .flat_map(|track| {
                track
                    .clips
                    .iter()
                    .filter(move |c| c.contains(time))
                    .map(move |c| (c, track.id.as_str()))
            })
            .collect()
    }

    pub fn has_clips(&self) -> bool {
        self.tracks.iter().any(|t| !t.clips.is_empty())
    }

    /// Empties every track and resets selection and the playhead.
    pub fn clear_all(&mut self) {
        for track in &mut self.tracks {
            track.clips.clear();
        }
        self.selected_clip_ids.clear();
        self.current_time = 0.0;
        self.is_playing = false;
        self.recompute_duration();
    }

    /// Rebuilds all clips from `files`, alternating between the first two
    /// tracks by index. Missing lanes are created first.
    pub fn sync_with_media_files(&mut self, files: &[MediaFile]) {
        for track in &mut self.tracks {
            track.clips.clear();
        }
        self.selected_clip_ids.clear();
        while self.tracks.len() < 2 {
            self.add_track(None);
        }

        let lanes = [self.tracks[0].id.clone(), self.tracks[1].id.clone()];
        for (index, file) in files.iter().enumerate() {
            let lane = &lanes[index % 2];
            if let Err(e) = self.add_media_file_as_clip(file, lane) {
                debug!("Skipping {} during sync: {}", file.id, e);
            }
        }
        self.recompute_duration();
    }

    /// Clips of one track sorted by start time.
    pub fn playback_order(&self, track_id: &str) -> Vec<&Clip> {
        let mut clips: Vec<&Clip> = self
            .track(track_id)
            .map(|t| t.clips.iter().collect())
            .unwrap_or_default();
        clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        clips
    }

    /// Follows a clip's media reference. A dangling or absent reference
    /// yields `None`.
    pub fn resolve_media<'a>(clip: &Clip, catalog: &'a MediaCatalog) -> Option<&'a MediaFile> {
        clip.media_file_id.as_deref().and_then(|id| catalog.get(id))
    }

    // ---- Playback ----

    pub fn set_current_time(&mut self, time: f64) {
        self.current_time = if time.is_finite() { time.max(0.0) } else { 0.0 };
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Pauses and rewinds to the start.
    pub fn stop(&mut self) {
        self.is_playing = false;
        self.current_time = 0.0;
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if rate.is_finite() {
            self.playback_rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        }
    }

    // ---- Zoom ----

    pub fn set_zoom_level(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom_level = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom_level(self.zoom_level * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom_level(self.zoom_level / ZOOM_STEP);
    }

    /// Resets the zoom to 1.0.
    pub fn zoom_to_fit(&mut self) {
        self.zoom_level = 1.0;
    }

    /// Picks the zoom that fits the whole timeline into `viewport_width`
    /// pixels. An empty timeline resets to 1.0.
    pub fn fit_to_viewport(&mut self, viewport_width: f64) {
        if self.total_duration > 0.0 && viewport_width > 0.0 {
            self.set_zoom_level(viewport_width / (self.total_duration * PIXELS_PER_SECOND));
        } else {
            self.zoom_level = 1.0;
        }
    }

    /// Rendered width in pixels, never below `MIN_TIMELINE_WIDTH`.
    pub fn timeline_width(&self) -> f64 {
        let seconds = if self.total_duration > 0.0 {
            self.total_duration
        } else {
            EMPTY_TIMELINE_SECONDS
        };
        (seconds * PIXELS_PER_SECOND * self.zoom_level).max(MIN_TIMELINE_WIDTH)
    }

    // ---- Grid ----

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    /// Rounds `time` to the nearest grid line when snapping is on.
    pub fn snap_to_grid(&self, time: f64) -> f64 {
        if self.snap_enabled && self.grid_size > 0.0 {
            (time / self.grid_size).round() * self.grid_size
        } else {
            time
        }
    }

    // ---- Selection ----

    /// Single select replaces the selection; multi select toggles `clip_id`.
    pub fn select_clip(&mut self, clip_id: &str, multi: bool) {
        if multi {
            if let Some(pos) = self.selected_clip_ids.iter().position(|id| id == clip_id) {
                self.selected_clip_ids.remove(pos);
            } else {
                self.selected_clip_ids.push(clip_id.to_string());
            }
        } else {
            self.selected_clip_ids = vec![clip_id.to_string()];
        }
    }

    /// Selects a track, dropping any clip selection.
    pub fn select_track(&mut self, track_id: &str) {
        self.selected_track_id = Some(track_id.to_string());
        self.selected_clip_ids.clear();
    }

    pub fn clear_selection(&mut self) {
        self.selected_clip_ids.clear();
        self.selected_track_id = None;
    }

    // ---- Internals ----

    fn track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    fn detach_clip(&mut self, clip_id: &str) -> Option<Clip> {
        self.tracks.iter_mut().find_map(|track| {
            let index = track.clips.iter().position(|c| c.id == clip_id)?;
            Some(track.clips.remove(index))
        })
    }

    fn recompute_duration(&mut self) {
        self.total_duration = self.tracks.iter().map(Track::end_time).fold(0.0, f64::max);
    }
}

fn sanitize_duration(duration: Option<f64>) -> f64 {
    duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(DEFAULT_CLIP_DURATION)
}

fn sanitize_start(start_time: f64) -> f64 {
    if start_time.is_finite() {
        start_time.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::Path;

    fn media(id: &str, duration: Option<f64>) -> MediaFile {
        let mut file = MediaFile::new(id, Path::new(&format!("/videos/{id}.mp4")), 100, Utc::now());
        file.duration = duration;
        file
    }

    #[test]
    fn test_new_timeline() {
        let timeline = TimelineModel::new();
        let names: Vec<&str> = timeline.tracks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Video Track 1", "Video Track 2"]);
        assert_eq!(timeline.active_track_id(), "track1");
        assert_eq!(timeline.total_duration(), 0.0);
        assert!(!timeline.has_clips());
    }

    #[test]
    fn test_add_clip_defaults() {
        let mut timeline = TimelineModel::new();
        let clip = timeline.add_clip("track1", NewClip::new("intro")).unwrap();
        assert!(clip.id.starts_with("clip_"));
        assert_eq!(clip.duration, DEFAULT_CLIP_DURATION);
        assert_eq!(timeline.total_duration(), 5.0);

        let clip = timeline
            .add_clip("track2", NewClip::new("bad").start_time(-3.0).duration(f64::NAN))
            .unwrap();
        assert_eq!(clip.start_time, 0.0);
        assert_eq!(clip.duration, DEFAULT_CLIP_DURATION);

        let clip = timeline
            .add_clip("track2", NewClip::new("zero").id("mine").duration(0.0))
            .unwrap();
        assert_eq!(clip.id, "mine");
        assert_eq!(clip.duration, DEFAULT_CLIP_DURATION);

        assert!(matches!(
            timeline.add_clip("nope", NewClip::new("x")),
            Err(CoreError::TrackNotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_media_clips_are_contiguous() {
        let mut timeline = TimelineModel::new();
        let first = timeline
            .add_media_file_as_clip(&media("a", Some(7.25)), "track1")
            .unwrap();
        let second = timeline
            .add_media_file_as_clip(&media("b", None), "track1")
            .unwrap();

        assert_eq!(first.start_time, 0.0);
        assert_eq!(second.start_time, first.start_time + first.duration);
        assert_eq!(second.duration, DEFAULT_CLIP_DURATION);
        assert_eq!(second.media_file_id.as_deref(), Some("b"));
        assert_eq!(timeline.total_duration(), 12.25);

        // The same media placed twice gets distinct clip ids.
        let again = timeline
            .add_media_file_as_clip(&media("a", Some(1.0)), "track1")
            .unwrap();
        assert_ne!(again.id, first.id);
    }

    #[test]
    fn test_move_clip_shrinks_total_duration() {
        let mut timeline = TimelineModel::new();
        timeline
            .add_clip("track1", NewClip::new("short").id("s").duration(4.0))
            .unwrap();
        timeline
            .add_clip("track1", NewClip::new("long").id("l").start_time(20.0).duration(10.0))
            .unwrap();
        assert_eq!(timeline.total_duration(), 30.0);

        assert!(timeline.move_clip("l", "track2", 1.0));
        assert_eq!(timeline.total_duration(), 11.0);
        let (clip, track) = timeline.clip("l").unwrap();
        assert_eq!(track, "track2");
        assert_eq!(clip.start_time, 1.0);

        assert!(!timeline.move_clip("l", "missing", 0.0));
        assert!(!timeline.move_clip("missing", "track1", 0.0));
        assert_eq!(timeline.clip("l").unwrap().1, "track2");
    }

    #[test]
    fn test_remove_and_update_clip() {
        let mut timeline = TimelineModel::new();
        timeline.add_clip("track1", NewClip::new("a").id("a")).unwrap();
        timeline
            .add_clip("track2", NewClip::new("b").id("b").start_time(2.0))
            .unwrap();
        timeline.select_clip("b", false);

        timeline
            .update_clip(
                "a",
                ClipPatch {
                    duration: Some(12.0),
                    name: Some("renamed".into()),
                    ..ClipPatch::default()
                },
            )
            .unwrap();
        assert_eq!(timeline.total_duration(), 12.0);
        assert_eq!(timeline.clip("a").unwrap().0.name, "renamed");

        assert!(timeline.remove_clip("a"));
        assert!(!timeline.remove_clip("a"));
        assert_eq!(timeline.total_duration(), 7.0);

        assert!(timeline.remove_clip("b"));
        assert!(timeline.selected_clip_ids().is_empty());
        assert_eq!(timeline.total_duration(), 0.0);
        assert!(matches!(
            timeline.update_clip("b", ClipPatch::default()),
            Err(CoreError::ClipNotFound(id)) if id == "b"
        ));
    }

    #[test]
    fn test_sync_round_robin() {
        let mut timeline = TimelineModel::new();
        timeline.add_clip("track2", NewClip::new("stale")).unwrap();

        timeline.sync_with_media_files(&[media("a", Some(2.0)), media("b", Some(3.0)), media("c", Some(4.0))]);

        let lane = |i: usize| {
            timeline.tracks()[i]
                .clips
                .iter()
                .map(|c| c.media_file_id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(lane(0), vec![Some("a".to_string()), Some("c".to_string())]);
        assert_eq!(lane(1), vec![Some("b".to_string())]);
        assert_eq!(timeline.tracks()[0].clips[1].start_time, 2.0);
        assert_eq!(timeline.total_duration(), 6.0);
    }

    #[test]
    fn test_clips_at_time_is_inclusive() {
        let mut timeline = TimelineModel::new();
        timeline
            .add_clip("track1", NewClip::new("a").id("a").duration(5.0))
            .unwrap();
        timeline
            .add_clip("track2", NewClip::new("b").id("b").start_time(5.0))
            .unwrap();

        let ids = |t: f64| -> Vec<String> {
            timeline
                .clips_at_time(t)
                .into_iter()
                .map(|(c, _)| c.id.clone())
                .collect()
        };
        assert_eq!(ids(0.0), vec!["a"]);
        assert_eq!(ids(5.0), vec!["a", "b"]);
        assert_eq!(ids(10.0), vec!["b"]);
        assert!(ids(10.5).is_empty());
    }

    #[test]
    fn test_playback_order_follows_start_time() {
        let mut timeline = TimelineModel::new();
        timeline
            .add_clip("track1", NewClip::new("late").id("late").start_time(9.0))
            .unwrap();
        timeline
            .add_clip("track1", NewClip::new("early").id("early").start_time(1.0))
            .unwrap();
        let order: Vec<&str> = timeline
            .playback_order("track1")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(order, vec!["early", "late"]);
        assert!(timeline.playback_order("nope").is_empty());
    }

    #[test]
    fn test_tracks() {
        let mut timeline = TimelineModel::new();
        let id = timeline.add_track(None);
        assert_eq!(timeline.track(&id).unwrap().name, "Video Track 3");

        assert!(timeline.set_active_track(&id));
        assert!(!timeline.set_active_track("nope"));
        assert!(timeline.update_track(
            &id,
            TrackPatch {
                muted: Some(true),
                locked: Some(true),
                ..TrackPatch::default()
            }
        ));
        let track = timeline.track(&id).unwrap();
        assert!(track.muted && track.locked);

        timeline.add_clip(&id, NewClip::new("x").duration(50.0)).unwrap();
        assert!(timeline.remove_track(&id));
        assert_eq!(timeline.active_track_id(), "track1");
        assert_eq!(timeline.total_duration(), 0.0);

        assert!(timeline.remove_track("track2"));
        assert!(!timeline.remove_track("track1"));
        assert_eq!(timeline.tracks().len(), 1);
    }

    #[test]
    fn test_playback_and_zoom_clamps() {
        let mut timeline = TimelineModel::new();
        timeline.set_current_time(-4.0);
        assert_eq!(timeline.current_time(), 0.0);
        timeline.set_current_time(3.5);
        timeline.play();
        assert!(timeline.is_playing());
        timeline.stop();
        assert!(!timeline.is_playing());
        assert_eq!(timeline.current_time(), 0.0);

        timeline.set_playback_rate(10.0);
        assert_eq!(timeline.playback_rate(), MAX_PLAYBACK_RATE);
        timeline.set_playback_rate(0.0);
        assert_eq!(timeline.playback_rate(), MIN_PLAYBACK_RATE);

        timeline.zoom_in();
        assert!((timeline.zoom_level() - 1.5).abs() < 1e-9);
        timeline.zoom_out();
        timeline.zoom_out();
        assert!((timeline.zoom_level() - 1.0 / 1.5).abs() < 1e-9);
        for _ in 0..20 {
            timeline.zoom_in();
        }
        assert_eq!(timeline.zoom_level(), MAX_ZOOM);
        timeline.set_zoom_level(0.0);
        assert_eq!(timeline.zoom_level(), MIN_ZOOM);
    }

    #[test]
    fn test_timeline_width_and_fit() {
        let mut timeline = TimelineModel::new();
        assert_eq!(timeline.timeline_width(), 6000.0);
        timeline.set_zoom_level(0.1);
        assert_eq!(timeline.timeline_width(), MIN_TIMELINE_WIDTH);

        timeline.add_clip("track1", NewClip::new("a").duration(100.0)).unwrap();
        timeline.fit_to_viewport(5000.0);
        assert!((timeline.zoom_level() - 0.5).abs() < 1e-9);
        assert_eq!(timeline.timeline_width(), 5000.0);

        timeline.zoom_to_fit();
        assert_eq!(timeline.zoom_level(), 1.0);

        timeline.set_zoom_level(3.0);
        timeline.clear_all();
        timeline.fit_to_viewport(5000.0);
        assert_eq!(timeline.zoom_level(), 1.0);
    }

    #[test]
    fn test_snap_to_grid() {
        let mut timeline = TimelineModel::new();
        assert_eq!(timeline.snap_to_grid(2.4), 2.0);
        assert_eq!(timeline.snap_to_grid(2.6), 3.0);
        timeline.set_snap_to_grid(false);
        assert_eq!(timeline.snap_to_grid(2.4), 2.4);
    }

    #[test]
    fn test_selection() {
        let mut timeline = TimelineModel::new();
        timeline.select_clip("a", false);
        timeline.select_clip("b", false);
        assert_eq!(timeline.selected_clip_ids(), ["b"]);

        timeline.select_clip("c", true);
        assert_eq!(timeline.selected_clip_ids(), ["b", "c"]);
        timeline.select_clip("b", true);
        assert_eq!(timeline.selected_clip_ids(), ["c"]);

        timeline.select_track("track2");
        assert_eq!(timeline.selected_track_id(), Some("track2"));
        assert!(timeline.selected_clip_ids().is_empty());

        timeline.clear_selection();
        assert!(timeline.selected_track_id().is_none());
    }

    #[test]
    fn test_resolve_media_handles_dangling_reference() {
        let mut catalog = MediaCatalog::new();
        catalog.insert(media("a", Some(1.0)));
        let mut timeline = TimelineModel::new();
        let clip = timeline.add_media_file_as_clip(&media("a", Some(1.0)), "track1").unwrap();

        assert_eq!(TimelineModel::resolve_media(&clip, &catalog).map(|m| m.id.as_str()), Some("a"));
        catalog.remove("a");
        assert!(TimelineModel::resolve_media(&clip, &catalog).is_none());

        let plain = timeline.add_clip("track1", NewClip::new("title")).unwrap();
        assert!(TimelineModel::resolve_media(&plain, &catalog).is_none());
    }
}
