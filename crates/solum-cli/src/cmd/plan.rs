use crate::cmd::{listed, show_resource};
use crate::output::{opt, print_dict, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use solum_core::client::HttpClient;
use solum_core::manager::Manager;
use solum_core::plan::Plan;
use solum_core::resource::Hydrate;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// List all plans
    List,
    /// Register a plan from a YAML or JSON plan file
    Create { plan_file: PathBuf },
    /// Show a plan by name or uuid
    Show { name_or_id: String },
    /// Delete a plan by name or uuid
    Delete { name_or_id: String },
}

pub fn run(http: &dyn HttpClient, subcmd: PlanSubcommand, json: bool) -> anyhow::Result<()> {
    let plans: Manager<Plan> = Manager::new(http);
    match subcmd {
        PlanSubcommand::List => list(plans, json),
        PlanSubcommand::Create { plan_file } => create(plans, &plan_file, json),
        PlanSubcommand::Show { name_or_id } => show(plans, &name_or_id, json),
        PlanSubcommand::Delete { name_or_id } => delete(plans, &name_or_id, json),
    }
}

fn list(plans: Manager<Plan>, json: bool) -> anyhow::Result<()> {
    let items = listed(plans.list(&[]).context("failed to list plans")?);

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
            ]
        })
        .collect();
    print_table(&["UUID", "NAME", "DESCRIPTION"], rows);
    Ok(())
}

fn create(plans: Manager<Plan>, path: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("could not open plan file {}", path.display()))?;
    let definition: serde_yaml::Value = serde_yaml::from_str(&data)
        .with_context(|| format!("plan file {} was not YAML", path.display()))?;

    let plan = plans
        .create(&definition)
        .with_context(|| format!("failed to create plan from {}", path.display()))?;
    print_plan(&plan, json)
}

fn show(plans: Manager<Plan>, name_or_id: &str, json: bool) -> anyhow::Result<()> {
    let plan = plans
        .find(name_or_id)
        .with_context(|| format!("could not resolve plan '{name_or_id}'"))?;
    print_plan(&plan, json)
}

fn delete(plans: Manager<Plan>, name_or_id: &str, json: bool) -> anyhow::Result<()> {
    let plan = plans
        .find(name_or_id)
        .with_context(|| format!("could not resolve plan '{name_or_id}'"))?;
    let uuid = plan
        .uuid
        .as_deref()
        .with_context(|| format!("plan '{name_or_id}' has no uuid"))?;
    plans
        .delete(uuid)
        .with_context(|| format!("failed to delete plan '{name_or_id}'"))?;

    if json {
        print_json(&serde_json::json!({ "deleted": uuid }))?;
    } else {
        println!("Deleted plan: {uuid}");
    }
    Ok(())
}

/// Plans with private-repository artifacts are printed without the
/// artifact list, followed by the deploy keys the service generated.
pub fn print_plan(plan: &Plan, json: bool) -> anyhow::Result<()> {
    let keys = plan.public_keys();
    if json || keys.is_empty() {
        return show_resource(plan, json);
    }
    let mut fields = plan.to_raw();
    fields.remove("artifacts");
    print_dict(&fields);
    print_public_keys(&keys);
    Ok(())
}

fn print_public_keys(keys: &[(String, String)]) {
    println!();
    println!("Important:");
    println!("  Solum has generated an SSH public key for each private repository.");
    println!("  Add it as a deploy key to the repository so Solum can clone it.");
    for (artifact, key) in keys {
        println!();
        println!("  Artifact: {artifact}");
        println!("  {key}");
    }
}

/// A plan argument that is not already an http(s) URI names a plan; its
/// `uri` is looked up.
pub fn resolve_plan_uri(http: &dyn HttpClient, plan: &str) -> anyhow::Result<String> {
    if plan.starts_with("http://") || plan.starts_with("https://") {
        return Ok(plan.to_string());
    }
    let plans: Manager<Plan> = Manager::new(http);
    let found = plans
        .find(plan)
        .with_context(|| format!("could not resolve plan '{plan}'"))?;
    found
        .uri
        .with_context(|| format!("plan '{plan}' has no uri"))
}
