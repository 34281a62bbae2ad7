use crate::cmd::{listed, show_resource};
use crate::output::{opt, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use solum_core::client::HttpClient;
use solum_core::component::Component;
use solum_core::manager::Manager;

#[derive(Subcommand)]
pub enum ComponentSubcommand {
    /// List all components
    List,
    /// Show a component by name or uuid
    Show { name_or_id: String },
}

pub fn run(http: &dyn HttpClient, subcmd: ComponentSubcommand, json: bool) -> anyhow::Result<()> {
    let components: Manager<Component> = Manager::new(http);
    match subcmd {
        ComponentSubcommand::List => {
            let items = listed(components.list(&[]).context("failed to list components")?);
            if json {
                return print_json(&items);
            }
            let rows = items
                .iter()
                .map(|c| {
                    vec![
                        opt(c.uuid.as_deref()),
                        opt(c.name.as_deref()),
                        opt(c.description.as_deref()),
                        opt(c.assembly_uuid.as_deref()),
                    ]
                })
                .collect();
            print_table(&["UUID", "NAME", "DESCRIPTION", "ASSEMBLY"], rows);
            Ok(())
        }
        ComponentSubcommand::Show { name_or_id } => {
            let component = components
                .find(&name_or_id)
                .with_context(|| format!("could not resolve component '{name_or_id}'"))?;
            show_resource(&component, json)
        }
    }
}
