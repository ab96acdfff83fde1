//! Transport, tempo, cue-point, and arrangement commands.

use super::{CommandSpec, Registry};

pub(super) fn register(table: &mut Registry) {
    table.insert(
        "get_current_song_time_beats",
        CommandSpec::direct(|host, _| Ok(host.current_song_time_beats()?)),
    );
    table.insert(
        "list_locators",
        CommandSpec::direct(|host, _| Ok(host.list_locators()?)),
    );
    table.insert(
        "set_tempo",
        CommandSpec::marshalled(|host, params| {
            let tempo = params.f64_or("tempo", 120.0)?;
            Ok(host.set_tempo(tempo)?)
        }),
    );
    table.insert(
        "set_signature_numerator",
        CommandSpec::marshalled(|host, params| {
            let numerator = params.u32_or("signature_numerator", 4)?;
            Ok(host.set_signature_numerator(numerator)?)
        }),
    );
    table.insert(
        "set_signature_denominator",
        CommandSpec::marshalled(|host, params| {
            let denominator = params.u32_or("signature_denominator", 4)?;
            Ok(host.set_signature_denominator(denominator)?)
        }),
    );
    table.insert(
        "start_playback",
        CommandSpec::marshalled(|host, _| Ok(host.start_playback()?)),
    );
    table.insert(
        "stop_playback",
        CommandSpec::marshalled(|host, _| Ok(host.stop_playback()?)),
    );
    table.insert(
        "continue_playing",
        CommandSpec::marshalled(|host, _| Ok(host.continue_playing()?)),
    );
    table.insert(
        "play_selection",
        CommandSpec::marshalled(|host, _| Ok(host.play_selection()?)),
    );
    table.insert(
        "jump_by",
        CommandSpec::marshalled(|host, params| {
            let beats = params.f64_or("beats", 0.0)?;
            Ok(host.jump_by(beats)?)
        }),
    );
    // Alias kept for older clients; same host operation.
    table.insert(
        "jump_by_beats",
        CommandSpec::marshalled(|host, params| {
            let beats = params.f64_or("beats", 0.0)?;
            Ok(host.jump_by(beats)?)
        }),
    );
    table.insert(
        "set_song_position",
        CommandSpec::marshalled(|host, params| {
            let time = params.f64_or("time", 0.0)?;
            Ok(host.set_song_position(time)?)
        }),
    );
    table.insert(
        "set_current_song_time_beats",
        CommandSpec::marshalled(|host, params| {
            let beats = params.f64_or("beats", 0.0)?;
            Ok(host.set_current_song_time_beats(beats)?)
        }),
    );
    table.insert(
        "set_record_mode",
        CommandSpec::marshalled(|host, params| {
            let on = params.bool_or("on", false)?;
            Ok(host.set_record_mode(on)?)
        }),
    );
    table.insert(
        "set_back_to_arranger",
        CommandSpec::marshalled(|host, params| {
            let on = params.bool_or("on", false)?;
            Ok(host.set_back_to_arranger(on)?)
        }),
    );
    table.insert(
        "set_start_time",
        CommandSpec::marshalled(|host, params| {
            let beats = params.f64_or("beats", 0.0)?;
            Ok(host.set_start_time(beats)?)
        }),
    );
    table.insert(
        "set_metronome",
        CommandSpec::marshalled(|host, params| {
            let on = params.bool_or("on", false)?;
            Ok(host.set_metronome(on)?)
        }),
    );
    table.insert(
        "set_clip_trigger_quantization",
        CommandSpec::marshalled(|host, params| {
            let quant = params.u32_or("quant", 4)?;
            Ok(host.set_clip_trigger_quantization(quant)?)
        }),
    );
    table.insert(
        "set_loop",
        CommandSpec::marshalled(|host, params| {
            let on = params.bool_or("on", false)?;
            Ok(host.set_loop(on)?)
        }),
    );
    table.insert(
        "set_loop_region",
        CommandSpec::marshalled(|host, params| {
            let start = params.f64_or("start", 0.0)?;
            let length = params.f64_or("length", 0.0)?;
            Ok(host.set_loop_region(start, length)?)
        }),
    );
    table.insert(
        "create_locator",
        CommandSpec::marshalled(|host, params| {
            let time = params.f64_or("time", 0.0)?;
            Ok(host.create_locator(time)?)
        }),
    );
    table.insert(
        "rename_cue_point",
        CommandSpec::marshalled(|host, params| {
            let cue_index = params.index_or("cue_index", 0)?;
            let name = params.str_or("name", "")?;
            Ok(host.rename_cue_point(cue_index, &name)?)
        }),
    );
    table.insert(
        "jump_to_next_cue",
        CommandSpec::marshalled(|host, _| Ok(host.jump_to_next_cue()?)),
    );
    table.insert(
        "jump_to_prev_cue",
        CommandSpec::marshalled(|host, _| Ok(host.jump_to_prev_cue()?)),
    );
    table.insert(
        "jump_to_cue",
        CommandSpec::marshalled(|host, params| {
            let index = params.index_or("index", 0)?;
            Ok(host.jump_to_cue(index)?)
        }),
    );
    table.insert(
        "toggle_cue_at_current",
        CommandSpec::marshalled(|host, _| Ok(host.toggle_cue_at_current()?)),
    );
    table.insert(
        "re_enable_automation",
        CommandSpec::marshalled(|host, _| Ok(host.re_enable_automation()?)),
    );
    table.insert(
        "set_arrangement_overdub",
        CommandSpec::marshalled(|host, params| {
            let on = params.bool_or("on", false)?;
            Ok(host.set_arrangement_overdub(on)?)
        }),
    );
    table.insert(
        "set_session_automation_record",
        CommandSpec::marshalled(|host, params| {
            let on = params.bool_or("on", false)?;
            Ok(host.set_session_automation_record(on)?)
        }),
    );
    table.insert(
        "trigger_session_record",
        CommandSpec::marshalled(|host, params| {
            let record_length = params.opt_f64("record_length")?;
            Ok(host.trigger_session_record(record_length)?)
        }),
    );
    table.insert(
        "stop_all_clips",
        CommandSpec::marshalled(|host, params| {
            let quantized = params.u32_or("quantized", 1)?;
            Ok(host.stop_all_clips(quantized)?)
        }),
    );
}
