//! Application-level introspection and view control.

use super::{CommandSpec, Registry};

pub(super) fn register(table: &mut Registry) {
    table.insert(
        "get_application_info",
        CommandSpec::direct(|host, _| Ok(host.application_info()?)),
    );
    table.insert(
        "get_application_view_state",
        CommandSpec::direct(|host, _| Ok(host.application_view_state()?)),
    );
    table.insert(
        "get_application_process_usage",
        CommandSpec::direct(|host, _| Ok(host.application_process_usage()?)),
    );
    table.insert(
        "get_application_version",
        CommandSpec::direct(|host, _| Ok(host.application_version()?)),
    );
    table.insert(
        "get_application_document",
        CommandSpec::direct(|host, _| Ok(host.application_document()?)),
    );
    table.insert(
        "list_control_surfaces",
        CommandSpec::direct(|host, _| Ok(host.list_control_surfaces()?)),
    );
    table.insert(
        "press_current_dialog_button",
        CommandSpec::marshalled(|host, params| {
            let index = params.index_or("index", 0)?;
            Ok(host.press_current_dialog_button(index)?)
        }),
    );
    table.insert(
        "show_message",
        CommandSpec::marshalled(|host, params| {
            let message = params.str_or("message", "")?;
            Ok(host.show_message(&message)?)
        }),
    );
    table.insert(
        "application_view_available_main_views",
        CommandSpec::marshalled(|host, _| Ok(host.available_main_views()?)),
    );
    table.insert(
        "application_view_focus_view",
        CommandSpec::marshalled(|host, params| {
            // The empty string names the main window view.
            let view_name = params.str_or("view_name", "")?;
            Ok(host.focus_view(&view_name)?)
        }),
    );
    table.insert(
        "application_view_hide_view",
        CommandSpec::marshalled(|host, params| {
            let view_name = params.str_or("view_name", "")?;
            Ok(host.hide_view(&view_name)?)
        }),
    );
    table.insert(
        "application_view_is_view_visible",
        CommandSpec::marshalled(|host, params| {
            let view_name = params.str_or("view_name", "")?;
            Ok(host.is_view_visible(&view_name)?)
        }),
    );
    table.insert(
        "application_view_show_view",
        CommandSpec::marshalled(|host, params| {
            let view_name = params.str_or("view_name", "")?;
            Ok(host.show_view(&view_name)?)
        }),
    );
    table.insert(
        "application_view_toggle_browse",
        CommandSpec::marshalled(|host, _| Ok(host.toggle_browse()?)),
    );
    table.insert(
        "application_view_scroll_view",
        CommandSpec::marshalled(|host, params| {
            let direction = params.i64_or("direction", 0)?;
            let view_name = params.str_or("view_name", "")?;
            let modifier_pressed = params.bool_or("modifier_pressed", false)?;
            Ok(host.scroll_view(direction, &view_name, modifier_pressed)?)
        }),
    );
    table.insert(
        "application_view_zoom_view",
        CommandSpec::marshalled(|host, params| {
            let direction = params.i64_or("direction", 0)?;
            let view_name = params.str_or("view_name", "")?;
            let modifier_pressed = params.bool_or("modifier_pressed", false)?;
            Ok(host.zoom_view(direction, &view_name, modifier_pressed)?)
        }),
    );
}
