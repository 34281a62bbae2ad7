pub mod app;
pub mod assembly;
pub mod component;
pub mod config;
pub mod languagepack;
pub mod pipeline;
pub mod plan;

use crate::output::{print_dict, print_json};
use solum_core::resource::{Hydrate, Lazy, Resource};

/// Print one resource as a property table, or as JSON.
pub fn show_resource<R: Resource>(resource: &R, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(resource)
    } else {
        print_dict(&resource.to_raw());
        Ok(())
    }
}

/// Listed entries are printed from what the list call returned; nothing is
/// fetched per row.
pub fn listed<R: Resource>(entries: Vec<Lazy<'_, R>>) -> Vec<R> {
    entries.into_iter().map(Lazy::into_inner).collect()
}
