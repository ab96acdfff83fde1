//! The host object-model seam.
//!
//! The bridge never touches the creative application's object graph
//! directly: every command body calls through [`HostModel`], implemented by
//! the embedding host process. The contract the bridge relies on:
//!
//! - read methods are safe to call concurrently from any thread,
//! - mutating methods are only ever called from the privileged thread (the
//!   scheduler enforces this; implementations may assume it),
//! - every method is synchronous and returns within microseconds.
//!
//! Results are JSON values because the wire protocol forwards them
//! verbatim; their shapes are owned by the host, not redesigned here.

use serde_json::Value;
use thiserror::Error;

/// Failure reported by a host operation (bad index, missing resource,
/// invalid parameter combination). The message travels to the client
/// unchanged.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct HostError(String);

impl HostError {
    /// Wrap a failure message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self { Self(message.into()) }
}

impl From<String> for HostError {
    fn from(message: String) -> Self { Self(message) }
}

impl From<&str> for HostError {
    fn from(message: &str) -> Self { Self(message.to_owned()) }
}

/// Outcome of a host operation.
pub type HostResult = Result<Value, HostError>;

/// Interface to the live application's object graph.
///
/// One method per table entry (the `jump_by_beats` alias shares
/// [`jump_by`](Self::jump_by)). Grouped to mirror the command table:
/// session, tracks, clips, transport, devices, browser, application.
#[allow(missing_docs)]
pub trait HostModel: Send + Sync {
    // Session and scenes.
    fn session_info(&self) -> HostResult;
    fn list_scenes(&self) -> HostResult;
    fn fire_scene(&self, scene_index: usize) -> HostResult;
    fn create_scene(&self, scene_index: i64) -> HostResult;
    fn rename_scene(&self, scene_index: usize, name: &str) -> HostResult;
    fn list_return_tracks(&self) -> HostResult;

    // Tracks.
    fn track_info(&self, track_index: usize) -> HostResult;
    fn create_midi_track(&self, index: i64) -> HostResult;
    fn create_audio_track(&self, index: i64) -> HostResult;
    fn set_track_name(&self, track_index: usize, name: &str) -> HostResult;
    fn set_send_level(&self, track_index: usize, send_index: usize, level: f64) -> HostResult;
    fn clear_arrangement(&self, track_indices: Option<&[usize]>) -> HostResult;
    #[allow(clippy::too_many_arguments)]
    fn duplicate_track_clip_to_arrangement(
        &self,
        track_index: usize,
        clip_index: usize,
        start_beats: f64,
        length_beats: f64,
        looped: Option<bool>,
    ) -> HostResult;

    // Clips.
    fn clip_info(&self, track_index: usize, clip_index: usize) -> HostResult;
    fn create_clip(&self, track_index: usize, clip_index: usize, length: f64) -> HostResult;
    fn add_notes_to_clip(
        &self,
        track_index: usize,
        clip_index: usize,
        notes: &[Value],
    ) -> HostResult;
    fn set_clip_name(&self, track_index: usize, clip_index: usize, name: &str) -> HostResult;
    fn fire_clip(&self, track_index: usize, clip_index: usize) -> HostResult;
    fn stop_clip(&self, track_index: usize, clip_index: usize) -> HostResult;
    #[allow(clippy::too_many_arguments)]
    fn write_automation(
        &self,
        track_index: usize,
        clip_index: usize,
        device_index: usize,
        points: &[Value],
        parameter_index: Option<usize>,
        parameter_name: Option<&str>,
    ) -> HostResult;

    // Transport and arrangement.
    fn set_tempo(&self, tempo: f64) -> HostResult;
    fn set_signature_numerator(&self, numerator: u32) -> HostResult;
    fn set_signature_denominator(&self, denominator: u32) -> HostResult;
    fn start_playback(&self) -> HostResult;
    fn stop_playback(&self) -> HostResult;
    fn continue_playing(&self) -> HostResult;
    fn play_selection(&self) -> HostResult;
    fn jump_by(&self, beats: f64) -> HostResult;
    fn set_song_position(&self, time: f64) -> HostResult;
    fn current_song_time_beats(&self) -> HostResult;
    fn set_current_song_time_beats(&self, beats: f64) -> HostResult;
    fn set_record_mode(&self, on: bool) -> HostResult;
    fn set_back_to_arranger(&self, on: bool) -> HostResult;
    fn set_start_time(&self, beats: f64) -> HostResult;
    fn set_metronome(&self, on: bool) -> HostResult;
    fn set_clip_trigger_quantization(&self, quant: u32) -> HostResult;
    fn set_loop(&self, on: bool) -> HostResult;
    fn set_loop_region(&self, start: f64, length: f64) -> HostResult;
    fn list_locators(&self) -> HostResult;
    fn create_locator(&self, time: f64) -> HostResult;
    fn rename_cue_point(&self, cue_index: usize, name: &str) -> HostResult;
    fn jump_to_next_cue(&self) -> HostResult;
    fn jump_to_prev_cue(&self) -> HostResult;
    fn jump_to_cue(&self, index: usize) -> HostResult;
    fn toggle_cue_at_current(&self) -> HostResult;
    fn re_enable_automation(&self) -> HostResult;
    fn set_arrangement_overdub(&self, on: bool) -> HostResult;
    fn set_session_automation_record(&self, on: bool) -> HostResult;
    fn trigger_session_record(&self, record_length: Option<f64>) -> HostResult;
    fn stop_all_clips(&self, quantized: u32) -> HostResult;

    // Devices.
    fn device_details(&self, track_index: usize, device_index: usize) -> HostResult;
    fn find_device_by_name(&self, track_index: usize, device_name: &str) -> HostResult;
    fn device_parameters(&self, track_index: usize, device_index: usize) -> HostResult;
    fn set_device_parameter(
        &self,
        track_index: usize,
        device_index: usize,
        value: f64,
        parameter_index: Option<usize>,
        parameter_name: Option<&str>,
    ) -> HostResult;
    fn delete_device(&self, track_index: usize, device_index: usize) -> HostResult;

    // Browser.
    fn browser_item(&self, uri: Option<&str>, path: Option<&str>) -> HostResult;
    fn browser_categories(&self, category_type: &str) -> HostResult;
    fn browser_items(&self, path: &str, item_type: &str) -> HostResult;
    fn browser_tree(&self, category_type: &str, max_depth: u32) -> HostResult;
    fn browser_items_at_path(&self, path: &str) -> HostResult;
    fn load_browser_item(&self, track_index: usize, item_uri: &str) -> HostResult;

    // Application and its view.
    fn application_info(&self) -> HostResult;
    fn application_view_state(&self) -> HostResult;
    fn application_process_usage(&self) -> HostResult;
    fn application_version(&self) -> HostResult;
    fn application_document(&self) -> HostResult;
    fn list_control_surfaces(&self) -> HostResult;
    fn press_current_dialog_button(&self, index: usize) -> HostResult;
    fn show_message(&self, message: &str) -> HostResult;
    fn available_main_views(&self) -> HostResult;
    fn focus_view(&self, view_name: &str) -> HostResult;
    fn hide_view(&self, view_name: &str) -> HostResult;
    fn is_view_visible(&self, view_name: &str) -> HostResult;
    fn show_view(&self, view_name: &str) -> HostResult;
    fn toggle_browse(&self) -> HostResult;
    fn scroll_view(&self, direction: i64, view_name: &str, modifier_pressed: bool) -> HostResult;
    fn zoom_view(&self, direction: i64, view_name: &str, modifier_pressed: bool) -> HostResult;
}
