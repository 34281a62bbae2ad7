use crate::output::{print_dict, print_json};
use clap::Subcommand;
use solum_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective settings (file, environment and flags combined)
    Show,

    /// Validate the settings for common mistakes
    Validate,
}

pub fn run(config: &Config, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(config, json),
        ConfigSubcommand::Validate => validate(config, json),
    }
}

fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    for secret in [&mut shown.auth.password, &mut shown.auth.token] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    shown
}

fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    let shown = redacted(config);
    if json {
        return print_json(&shown);
    }
    let mut fields = serde_json::Map::new();
    fields.insert("solum_url".into(), serde_json::json!(shown.solum_url));
    if let serde_json::Value::Object(auth) = serde_json::to_value(&shown.auth)? {
        for (key, value) in auth {
            fields.insert(format!("auth.{key}"), value);
        }
    }
    print_dict(&fields);
    Ok(())
}

fn validate(config: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
