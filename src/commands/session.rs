//! Session overview and scene commands.

use super::{CommandSpec, Registry};

pub(super) fn register(table: &mut Registry) {
    table.insert(
        "get_session_info",
        CommandSpec::direct(|host, _| Ok(host.session_info()?)),
    );
    table.insert(
        "list_scenes",
        CommandSpec::direct(|host, _| Ok(host.list_scenes()?)),
    );
    table.insert(
        "list_return_tracks",
        CommandSpec::direct(|host, _| Ok(host.list_return_tracks()?)),
    );
    table.insert(
        "fire_scene",
        CommandSpec::marshalled(|host, params| {
            let scene_index = params.index_or("scene_index", 0)?;
            Ok(host.fire_scene(scene_index)?)
        }),
    );
    table.insert(
        "create_scene",
        CommandSpec::marshalled(|host, params| {
            // -1 appends after the last scene.
            let scene_index = params.i64_or("scene_index", -1)?;
            Ok(host.create_scene(scene_index)?)
        }),
    );
    table.insert(
        "rename_scene",
        CommandSpec::marshalled(|host, params| {
            let scene_index = params.index_or("scene_index", 0)?;
            let name = params.str_or("name", "")?;
            Ok(host.rename_scene(scene_index, &name)?)
        }),
    );
}
