//! Track-level commands.

use super::{CommandSpec, Registry};

pub(super) fn register(table: &mut Registry) {
    table.insert(
        "get_track_info",
        CommandSpec::direct(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            Ok(host.track_info(track_index)?)
        }),
    );
    table.insert(
        "create_midi_track",
        CommandSpec::marshalled(|host, params| {
            // -1 appends after the last track.
            let index = params.i64_or("index", -1)?;
            Ok(host.create_midi_track(index)?)
        }),
    );
    table.insert(
        "create_audio_track",
        CommandSpec::marshalled(|host, params| {
            let index = params.i64_or("index", -1)?;
            Ok(host.create_audio_track(index)?)
        }),
    );
    table.insert(
        "set_track_name",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let name = params.str_or("name", "")?;
            Ok(host.set_track_name(track_index, &name)?)
        }),
    );
    table.insert(
        "set_send_level",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let send_index = params.index_or("send_index", 0)?;
            let level = params.f64_or("level", 0.0)?;
            Ok(host.set_send_level(track_index, send_index, level)?)
        }),
    );
    table.insert(
        "clear_arrangement",
        CommandSpec::marshalled(|host, params| {
            let track_indices = params.opt_index_list("track_indices")?;
            Ok(host.clear_arrangement(track_indices.as_deref())?)
        }),
    );
    table.insert(
        "duplicate_track_clip_to_arrangement",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let clip_index = params.index_or("clip_index", 0)?;
            let start_beats = params.f64_or("start_beats", 0.0)?;
            let length_beats = params.f64_or("length_beats", 0.0)?;
            let looped = params.opt_bool("loop")?;
            Ok(host.duplicate_track_clip_to_arrangement(
                track_index,
                clip_index,
                start_beats,
                length_beats,
                looped,
            )?)
        }),
    );
}
