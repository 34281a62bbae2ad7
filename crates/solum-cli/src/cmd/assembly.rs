use crate::cmd::plan::resolve_plan_uri;
use crate::cmd::{listed, show_resource};
use crate::output::{opt, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use solum_core::assembly::{Assembly, AssemblyCreate};
use solum_core::client::HttpClient;
use solum_core::manager::Manager;

#[derive(Subcommand)]
pub enum AssemblySubcommand {
    /// List all assemblies
    List,
    /// Deploy a plan as a new assembly
    Create {
        name: String,
        /// Plan URI, or the name or uuid of a registered plan
        plan: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show an assembly by name or uuid
    Show { name_or_id: String },
    /// Delete an assembly by name or uuid
    Delete { name_or_id: String },
}

pub fn run(http: &dyn HttpClient, subcmd: AssemblySubcommand, json: bool) -> anyhow::Result<()> {
    let assemblies: Manager<Assembly> = Manager::new(http);
    match subcmd {
        AssemblySubcommand::List => list(assemblies, json),
        AssemblySubcommand::Create {
            name,
            plan,
            description,
        } => {
            let plan_uri = resolve_plan_uri(http, &plan)?;
            create(assemblies, name, plan_uri, description, json)
        }
        AssemblySubcommand::Show { name_or_id } => {
            let assembly = assemblies
                .find(&name_or_id)
                .with_context(|| format!("could not resolve assembly '{name_or_id}'"))?;
            show_resource(&assembly, json)
        }
        AssemblySubcommand::Delete { name_or_id } => delete(assemblies, &name_or_id, json),
    }
}

fn list(assemblies: Manager<Assembly>, json: bool) -> anyhow::Result<()> {
    let items = listed(assemblies.list(&[]).context("failed to list assemblies")?);

    if json {
        return print_json(&items);
    }
    let rows = items
        .iter()
        .map(|a| {
            vec![
                opt(a.uuid.as_deref()),
                opt(a.name.as_deref()),
                opt(a.description.as_deref()),
                opt(a.status.as_deref()),
            ]
        })
        .collect();
    print_table(&["UUID", "NAME", "DESCRIPTION", "STATUS"], rows);
    Ok(())
}

fn create(
    assemblies: Manager<Assembly>,
    name: String,
    plan_uri: String,
    description: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let payload = AssemblyCreate {
        name,
        description,
        plan_uri,
    };
    let assembly = assemblies
        .create(&payload)
        .with_context(|| format!("failed to create assembly '{}'", payload.name))?;
    show_resource(&assembly, json)
}

fn delete(assemblies: Manager<Assembly>, name_or_id: &str, json: bool) -> anyhow::Result<()> {
    let assembly = assemblies
        .find(name_or_id)
        .with_context(|| format!("could not resolve assembly '{name_or_id}'"))?;
    let uuid = assembly
        .uuid
        .as_deref()
        .with_context(|| format!("assembly '{name_or_id}' has no uuid"))?;
    assemblies
        .delete(uuid)
        .with_context(|| format!("failed to delete assembly '{name_or_id}'"))?;

    if json {
        print_json(&serde_json::json!({ "deleted": uuid }))?;
    } else {
        println!("Deleted assembly: {uuid}");
    }
    Ok(())
}
