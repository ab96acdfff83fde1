//! Clip commands: introspection, creation, editing, launch.

use super::{CommandSpec, Registry};

pub(super) fn register(table: &mut Registry) {
    table.insert(
        "get_clip_info",
        CommandSpec::direct(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let clip_index = params.index_or("clip_index", 0)?;
            Ok(host.clip_info(track_index, clip_index)?)
        }),
    );
    table.insert(
        "create_clip",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let clip_index = params.index_or("clip_index", 0)?;
            let length = params.f64_or("length", 4.0)?;
            Ok(host.create_clip(track_index, clip_index, length)?)
        }),
    );
    table.insert(
        "add_notes_to_clip",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let clip_index = params.index_or("clip_index", 0)?;
            let notes = params.list_or_empty("notes")?;
            Ok(host.add_notes_to_clip(track_index, clip_index, &notes)?)
        }),
    );
    table.insert(
        "set_clip_name",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let clip_index = params.index_or("clip_index", 0)?;
            let name = params.str_or("name", "")?;
            Ok(host.set_clip_name(track_index, clip_index, &name)?)
        }),
    );
    table.insert(
        "fire_clip",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let clip_index = params.index_or("clip_index", 0)?;
            Ok(host.fire_clip(track_index, clip_index)?)
        }),
    );
    table.insert(
        "stop_clip",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let clip_index = params.index_or("clip_index", 0)?;
            Ok(host.stop_clip(track_index, clip_index)?)
        }),
    );
    // Unlike its neighbours, write_automation declares its coordinates
    // required rather than defaulted.
    table.insert(
        "write_automation",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.require_index("track_index")?;
            let clip_index = params.require_index("clip_index")?;
            let device_index = params.require_index("device_index")?;
            let points = params.require_list("points")?;
            let parameter_index = params.opt_index("parameter_index")?;
            let parameter_name = params.opt_str("parameter_name")?;
            Ok(host.write_automation(
                track_index,
                clip_index,
                device_index,
                &points,
                parameter_index,
                parameter_name.as_deref(),
            )?)
        }),
    );
}
