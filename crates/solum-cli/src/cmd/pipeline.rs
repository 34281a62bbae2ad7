use crate::cmd::plan::resolve_plan_uri;
use crate::cmd::{listed, show_resource};
use crate::output::{opt, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use solum_core::client::HttpClient;
use solum_core::manager::Manager;
use solum_core::pipeline::{Pipeline, PipelineCreate};

#[derive(Subcommand)]
pub enum PipelineSubcommand {
    /// List all pipelines
    List,
    /// Create a pipeline running a workbook against a plan
    Create {
        /// Plan URI, or the name or uuid of a registered plan
        plan: String,
        workbook_name: String,
        name: String,
    },
    /// Show a pipeline by name or uuid
    Show { name_or_id: String },
    /// Delete a pipeline by name or uuid
    Delete { name_or_id: String },
}

pub fn run(http: &dyn HttpClient, subcmd: PipelineSubcommand, json: bool) -> anyhow::Result<()> {
    let pipelines: Manager<Pipeline> = Manager::new(http);
    match subcmd {
        PipelineSubcommand::List => list(pipelines, json),
        PipelineSubcommand::Create {
            plan,
            workbook_name,
            name,
        } => {
            let payload = PipelineCreate {
                name,
                workbook_name,
                plan_uri: resolve_plan_uri(http, &plan)?,
            };
            let pipeline = pipelines
                .create(&payload)
                .with_context(|| format!("failed to create pipeline '{}'", payload.name))?;
            show_resource(&pipeline, json)
        }
        PipelineSubcommand::Show { name_or_id } => {
            let pipeline = pipelines
                .find(&name_or_id)
                .with_context(|| format!("could not resolve pipeline '{name_or_id}'"))?;
            show_resource(&pipeline, json)
        }
        PipelineSubcommand::Delete { name_or_id } => delete(pipelines, &name_or_id, json),
    }
}

fn list(pipelines: Manager<Pipeline>, json: bool) -> anyhow::Result<()> {
    let items = listed(pipelines.list(&[]).context("failed to list pipelines")?);

    if json {
        return print_json(&items);
    }
    let rows = items
        .iter()
        .map(|p| {
            vec![
                opt(p.uuid.as_deref()),
                opt(p.name.as_deref()),
                opt(p.description.as_deref()),
                opt(p.workbook_name.as_deref()),
            ]
        })
        .collect();
    print_table(&["UUID", "NAME", "DESCRIPTION", "WORKBOOK"], rows);
    Ok(())
}

fn delete(pipelines: Manager<Pipeline>, name_or_id: &str, json: bool) -> anyhow::Result<()> {
    let pipeline = pipelines
        .find(name_or_id)
        .with_context(|| format!("could not resolve pipeline '{name_or_id}'"))?;
    let uuid = pipeline
        .uuid
        .as_deref()
        .with_context(|| format!("pipeline '{name_or_id}' has no uuid"))?;
    pipelines
        .delete(uuid)
        .with_context(|| format!("failed to delete pipeline '{name_or_id}'"))?;

    if json {
        print_json(&serde_json::json!({ "deleted": uuid }))?;
    } else {
        println!("Deleted pipeline: {uuid}");
    }
    Ok(())
}
