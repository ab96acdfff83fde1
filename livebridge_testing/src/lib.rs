//! Test doubles and harnesses for exercising the bridge end to end.
//!
//! [`FakeHost`] is a fully scripted stand-in for the live application: it
//! keeps a small amount of real state (tempo, signature, track names, the
//! transport position) so read commands return believable data, records
//! every call with the thread it arrived on, and can be told to fail any
//! method on demand. [`TestServer`] binds an ephemeral port and runs a real
//! server over it.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    thread::{self, ThreadId},
    time::Duration,
};

use livebridge::{
    BridgeClient, BridgeServer, ClientConfig, CommandRouter, CommandScheduler, HostError,
    HostModel, HostResult, ServerConfig, UiThreadScheduler, WorkQueue,
};
use serde_json::{Value, json};
use tokio::sync::oneshot;

/// One observed host-method call.
#[derive(Clone, Debug)]
pub struct CallRecord {
    /// Host method name.
    pub method: String,
    /// Thread the call arrived on.
    pub thread: ThreadId,
}

#[derive(Debug)]
struct FakeState {
    tempo: f64,
    signature_numerator: u32,
    signature_denominator: u32,
    track_names: Vec<String>,
    scene_count: usize,
    playing: bool,
    song_time_beats: f64,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            signature_numerator: 4,
            signature_denominator: 4,
            track_names: vec!["1-Audio".into(), "2-MIDI".into()],
            scene_count: 8,
            playing: false,
            song_time_beats: 0.0,
        }
    }
}

/// Scripted in-memory host.
#[derive(Debug, Default)]
pub struct FakeHost {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<CallRecord>>,
    failures: Mutex<HashMap<String, String>>,
}

impl FakeHost {
    /// A fresh host with two tracks, eight scenes and a 120 bpm session.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Make `method` fail with `message` on every subsequent call.
    pub fn fail_with(&self, method: &str, message: &str) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(method.to_owned(), message.to_owned());
    }

    /// Every call observed so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Threads that invoked `method`, in arrival order.
    #[must_use]
    pub fn threads_of(&self, method: &str) -> Vec<ThreadId> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .map(|call| call.thread)
            .collect()
    }

    /// The current tempo, for asserting mutations landed.
    #[must_use]
    pub fn tempo(&self) -> f64 { self.state.lock().expect("state lock").tempo }

    /// Name of the track at `index`, if it exists.
    #[must_use]
    pub fn track_name(&self, index: usize) -> Option<String> {
        self.state
            .lock()
            .expect("state lock")
            .track_names
            .get(index)
            .cloned()
    }

    fn record(&self, method: &str) -> Result<(), HostError> {
        self.calls.lock().expect("calls lock").push(CallRecord {
            method: method.to_owned(),
            thread: thread::current().id(),
        });
        if let Some(message) = self.failures.lock().expect("failures lock").get(method) {
            return Err(HostError::new(message.clone()));
        }
        Ok(())
    }
}

/// Implement a block of host methods that record the call and return `{}`.
macro_rules! recorded_noop {
    ($($name:ident ( $($arg:ident : $ty:ty),* $(,)? );)*) => {
        $(
            fn $name(&self, $($arg: $ty),*) -> HostResult {
                $(let _ = $arg;)*
                self.record(stringify!($name))?;
                Ok(json!({}))
            }
        )*
    };
}

impl HostModel for FakeHost {
    fn session_info(&self) -> HostResult {
        self.record("session_info")?;
        let state = self.state.lock().expect("state lock");
        Ok(json!({
            "tempo": state.tempo,
            "signature_numerator": state.signature_numerator,
            "signature_denominator": state.signature_denominator,
            "track_count": state.track_names.len(),
            "scene_count": state.scene_count,
            "is_playing": state.playing,
        }))
    }

    fn track_info(&self, track_index: usize) -> HostResult {
        self.record("track_info")?;
        let state = self.state.lock().expect("state lock");
        let name = state
            .track_names
            .get(track_index)
            .ok_or_else(|| HostError::new(format!("Track index out of range: {track_index}")))?;
        Ok(json!({
            "index": track_index,
            "name": name,
            "is_foldable": false,
            "clip_slots": [],
        }))
    }

    fn set_track_name(&self, track_index: usize, name: &str) -> HostResult {
        self.record("set_track_name")?;
        let mut state = self.state.lock().expect("state lock");
        let slot = state
            .track_names
            .get_mut(track_index)
            .ok_or_else(|| HostError::new(format!("Track index out of range: {track_index}")))?;
        *slot = name.to_owned();
        Ok(json!({ "name": name }))
    }

    fn set_tempo(&self, tempo: f64) -> HostResult {
        self.record("set_tempo")?;
        self.state.lock().expect("state lock").tempo = tempo;
        Ok(json!({ "tempo": tempo }))
    }

    fn start_playback(&self) -> HostResult {
        self.record("start_playback")?;
        self.state.lock().expect("state lock").playing = true;
        Ok(json!({ "playing": true }))
    }

    fn stop_playback(&self) -> HostResult {
        self.record("stop_playback")?;
        self.state.lock().expect("state lock").playing = false;
        Ok(json!({ "playing": false }))
    }

    fn current_song_time_beats(&self) -> HostResult {
        self.record("current_song_time_beats")?;
        let state = self.state.lock().expect("state lock");
        Ok(json!({ "beats": state.song_time_beats }))
    }

    fn set_current_song_time_beats(&self, beats: f64) -> HostResult {
        self.record("set_current_song_time_beats")?;
        self.state.lock().expect("state lock").song_time_beats = beats;
        Ok(json!({ "beats": beats }))
    }

    fn jump_by(&self, beats: f64) -> HostResult {
        self.record("jump_by")?;
        let mut state = self.state.lock().expect("state lock");
        state.song_time_beats += beats;
        Ok(json!({ "beats": state.song_time_beats }))
    }

    recorded_noop! {
        list_scenes();
        fire_scene(scene_index: usize);
        create_scene(scene_index: i64);
        rename_scene(scene_index: usize, name: &str);
        list_return_tracks();
        create_midi_track(index: i64);
        create_audio_track(index: i64);
        set_send_level(track_index: usize, send_index: usize, level: f64);
        clear_arrangement(track_indices: Option<&[usize]>);
        duplicate_track_clip_to_arrangement(
            track_index: usize,
            clip_index: usize,
            start_beats: f64,
            length_beats: f64,
            looped: Option<bool>,
        );
        clip_info(track_index: usize, clip_index: usize);
        create_clip(track_index: usize, clip_index: usize, length: f64);
        add_notes_to_clip(track_index: usize, clip_index: usize, notes: &[Value]);
        set_clip_name(track_index: usize, clip_index: usize, name: &str);
        fire_clip(track_index: usize, clip_index: usize);
        stop_clip(track_index: usize, clip_index: usize);
        write_automation(
            track_index: usize,
            clip_index: usize,
            device_index: usize,
            points: &[Value],
            parameter_index: Option<usize>,
            parameter_name: Option<&str>,
        );
        set_signature_numerator(numerator: u32);
        set_signature_denominator(denominator: u32);
        continue_playing();
        play_selection();
        set_song_position(time: f64);
        set_record_mode(on: bool);
        set_back_to_arranger(on: bool);
        set_start_time(beats: f64);
        set_metronome(on: bool);
        set_clip_trigger_quantization(quant: u32);
        set_loop(on: bool);
        set_loop_region(start: f64, length: f64);
        list_locators();
        create_locator(time: f64);
        rename_cue_point(cue_index: usize, name: &str);
        jump_to_next_cue();
        jump_to_prev_cue();
        jump_to_cue(index: usize);
        toggle_cue_at_current();
        re_enable_automation();
        set_arrangement_overdub(on: bool);
        set_session_automation_record(on: bool);
        trigger_session_record(record_length: Option<f64>);
        stop_all_clips(quantized: u32);
        device_details(track_index: usize, device_index: usize);
        find_device_by_name(track_index: usize, device_name: &str);
        device_parameters(track_index: usize, device_index: usize);
        set_device_parameter(
            track_index: usize,
            device_index: usize,
            value: f64,
            parameter_index: Option<usize>,
            parameter_name: Option<&str>,
        );
        delete_device(track_index: usize, device_index: usize);
        browser_item(uri: Option<&str>, path: Option<&str>);
        browser_categories(category_type: &str);
        browser_items(path: &str, item_type: &str);
        browser_tree(category_type: &str, max_depth: u32);
        browser_items_at_path(path: &str);
        load_browser_item(track_index: usize, item_uri: &str);
        application_info();
        application_view_state();
        application_process_usage();
        application_version();
        application_document();
        list_control_surfaces();
        press_current_dialog_button(index: usize);
        show_message(message: &str);
        available_main_views();
        focus_view(view_name: &str);
        hide_view(view_name: &str);
        is_view_visible(view_name: &str);
        show_view(view_name: &str);
        toggle_browse();
        scroll_view(direction: i64, view_name: &str, modifier_pressed: bool);
        zoom_view(direction: i64, view_name: &str, modifier_pressed: bool);
    }
}

/// A real server on an ephemeral loopback port.
pub struct TestServer {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Bind port 0 and start serving with the given host and scheduler.
    ///
    /// # Panics
    /// Panics when the ephemeral bind fails.
    pub async fn start(host: Arc<dyn HostModel>, scheduler: Arc<dyn CommandScheduler>) -> Self {
        let config = ServerConfig::for_addr(loopback_any_port());
        let router = CommandRouter::new(host, scheduler);
        let server = BridgeServer::bind(config, router).await.expect("bind test server");
        let addr = server.local_addr();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(server.run_with_shutdown(async move {
            let _ = stop_rx.await;
        }));
        Self {
            addr,
            stop: Some(stop_tx),
            task,
        }
    }

    /// Address the server bound.
    #[must_use]
    pub fn addr(&self) -> SocketAddr { self.addr }

    /// A client pointed at this server with fast test-friendly timings.
    #[must_use]
    pub fn client(&self) -> BridgeClient {
        let mut config = ClientConfig::for_addr(self.addr);
        config.settle_delay = Duration::from_millis(1);
        config.connect_retry_delay = Duration::from_millis(50);
        BridgeClient::new(config)
    }

    /// Shut the server down and wait for it to drain.
    ///
    /// # Panics
    /// Panics when the server task itself panicked.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.await.expect("server task");
    }
}

/// Start a dedicated privileged thread driving `queue`-style work.
///
/// Returns the scheduler plus the thread handle; drop every scheduler clone
/// before joining the thread.
#[must_use]
pub fn spawn_ui_thread(ceiling: Duration) -> (Arc<UiThreadScheduler>, thread::JoinHandle<()>) {
    let (scheduler, queue) = UiThreadScheduler::new(ceiling);
    let handle = thread::spawn(move || queue.run());
    (Arc::new(scheduler), handle)
}

/// A scheduler whose queue is never driven, for timeout scenarios. Keep the
/// returned [`WorkQueue`] alive or submissions fail instead of timing out.
#[must_use]
pub fn stalled_scheduler(ceiling: Duration) -> (Arc<UiThreadScheduler>, WorkQueue) {
    let (scheduler, queue) = UiThreadScheduler::new(ceiling);
    (Arc::new(scheduler), queue)
}

fn loopback_any_port() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

/// Install a subscriber printing captured logs for failing tests. Safe to
/// call from every test; only the first call wins.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}
