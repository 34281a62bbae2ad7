use crate::cmd::{listed, show_resource};
use crate::output::{opt, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use solum_core::client::HttpClient;
use solum_core::languagepack::LanguagePack;
use solum_core::manager::Manager;
use solum_core::planfile::lpname_is_valid;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum LanguagePackSubcommand {
    /// List all language packs
    List,
    /// Register a language pack from a JSON definition file
    Create { lp_file: PathBuf },
    /// Show a language pack by uuid
    Show { lp_id: String },
    /// Delete a language pack by uuid
    Delete { lp_id: String },
}

pub fn run(
    http: &dyn HttpClient,
    subcmd: LanguagePackSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let languagepacks: Manager<LanguagePack> = Manager::new(http);
    match subcmd {
        LanguagePackSubcommand::List => list(languagepacks, json),
        LanguagePackSubcommand::Create { lp_file } => create(languagepacks, &lp_file, json),
        LanguagePackSubcommand::Show { lp_id } => {
            let lp = languagepacks
                .get(&lp_id)
                .with_context(|| format!("could not resolve languagepack '{lp_id}'"))?;
            show_resource(&lp, json)
        }
        LanguagePackSubcommand::Delete { lp_id } => {
            languagepacks
                .delete(&lp_id)
                .with_context(|| format!("failed to delete languagepack '{lp_id}'"))?;
            if json {
                print_json(&serde_json::json!({ "deleted": lp_id }))?;
            } else {
                println!("Deleted languagepack: {lp_id}");
            }
            Ok(())
        }
    }
}

fn list(languagepacks: Manager<LanguagePack>, json: bool) -> anyhow::Result<()> {
    let items = listed(
        languagepacks
            .list(&[])
            .context("failed to list languagepacks")?,
    );

    if json {
        return print_json(&items);
    }
    let rows = items
        .iter()
        .map(|lp| {
            vec![
                opt(lp.uuid.as_deref()),
                opt(lp.name.as_deref()),
                opt(lp.description.as_deref()),
                opt(lp.status.as_deref()),
                opt(lp.source_uri.as_deref()),
            ]
        })
        .collect();
    print_table(&["UUID", "NAME", "DESCRIPTION", "STATUS", "SOURCE"], rows);
    Ok(())
}

fn create(languagepacks: Manager<LanguagePack>, path: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("could not open languagepack file {}", path.display()))?;
    let definition: serde_json::Value = serde_json::from_str(&data)
        .with_context(|| format!("languagepack file {} was not JSON", path.display()))?;
    if !definition.is_object() {
        anyhow::bail!(
            "languagepack file {} must contain a JSON object",
            path.display()
        );
    }
    if let Some(name) = definition.get("name").and_then(|n| n.as_str()) {
        if !lpname_is_valid(name) {
            anyhow::bail!(
                "languagepack name '{name}' must be 1-100 characters of a-z, 0-9, - and _"
            );
        }
    }

    let lp = languagepacks
        .create(&definition)
        .with_context(|| format!("failed to create languagepack from {}", path.display()))?;
    show_resource(&lp, json)
}
