//! Device commands.
//!
//! `get_device_parameters` is read-shaped but classed marshalled: the table
//! is external contract and the class is preserved as published.

use super::{CommandSpec, Registry};

pub(super) fn register(table: &mut Registry) {
    table.insert(
        "get_device_details",
        CommandSpec::direct(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let device_index = params.index_or("device_index", 0)?;
            Ok(host.device_details(track_index, device_index)?)
        }),
    );
    table.insert(
        "find_device_by_name",
        CommandSpec::direct(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let device_name = params.str_or("device_name", "")?;
            Ok(host.find_device_by_name(track_index, &device_name)?)
        }),
    );
    table.insert(
        "get_device_parameters",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let device_index = params.index_or("device_index", 0)?;
            Ok(host.device_parameters(track_index, device_index)?)
        }),
    );
    table.insert(
        "set_device_parameter",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let device_index = params.index_or("device_index", 0)?;
            let value = params.f64_or("value", 0.0)?;
            let parameter_index = params.opt_index("parameter_index")?;
            let parameter_name = params.opt_str("parameter_name")?;
            Ok(host.set_device_parameter(
                track_index,
                device_index,
                value,
                parameter_index,
                parameter_name.as_deref(),
            )?)
        }),
    );
    table.insert(
        "delete_device",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let device_index = params.index_or("device_index", 0)?;
            Ok(host.delete_device(track_index, device_index)?)
        }),
    );
}
