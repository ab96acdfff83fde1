//! Browser-tree traversal and item loading.

use super::{CommandSpec, Registry};

pub(super) fn register(table: &mut Registry) {
    table.insert(
        "get_browser_item",
        CommandSpec::direct(|host, params| {
            let uri = params.opt_str("uri")?;
            let path = params.opt_str("path")?;
            Ok(host.browser_item(uri.as_deref(), path.as_deref())?)
        }),
    );
    table.insert(
        "get_browser_categories",
        CommandSpec::direct(|host, params| {
            let category_type = params.str_or("category_type", "all")?;
            Ok(host.browser_categories(&category_type)?)
        }),
    );
    table.insert(
        "get_browser_items",
        CommandSpec::direct(|host, params| {
            let path = params.str_or("path", "")?;
            let item_type = params.str_or("item_type", "all")?;
            Ok(host.browser_items(&path, &item_type)?)
        }),
    );
    table.insert(
        "get_browser_tree",
        CommandSpec::direct(|host, params| {
            let category_type = params.str_or("category_type", "all")?;
            let max_depth = params.u32_or("max_depth", 2)?;
            Ok(host.browser_tree(&category_type, max_depth)?)
        }),
    );
    table.insert(
        "get_browser_items_at_path",
        CommandSpec::direct(|host, params| {
            let path = params.str_or("path", "")?;
            Ok(host.browser_items_at_path(&path)?)
        }),
    );
    table.insert(
        "load_browser_item",
        CommandSpec::marshalled(|host, params| {
            let track_index = params.index_or("track_index", 0)?;
            let item_uri = params.str_or("item_uri", "")?;
            Ok(host.load_browser_item(track_index, &item_uri)?)
        }),
    );
}
