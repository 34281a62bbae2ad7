mod cmd;
mod output;
mod prompt;
mod session;

use clap::{Parser, Subcommand};
use cmd::{
    app::AppSubcommand, assembly::AssemblySubcommand, component::ComponentSubcommand,
    config::ConfigSubcommand, languagepack::LanguagePackSubcommand, pipeline::PipelineSubcommand,
    plan::PlanSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "solum",
    about = "Command-line client for the Solum application deployment service",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log requests and responses
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.config/solum/config.yaml)
    #[arg(long, global = true, env = "SOLUM_CONFIG")]
    config: Option<PathBuf>,

    /// Solum API endpoint
    #[arg(long, global = true, env = "SOLUM_URL")]
    solum_url: Option<String>,

    /// Keystone identity endpoint
    #[arg(long, global = true, env = "OS_AUTH_URL")]
    os_auth_url: Option<String>,

    #[arg(long, global = true, env = "OS_USERNAME")]
    os_username: Option<String>,

    #[arg(long, global = true, env = "OS_PASSWORD", hide_env_values = true)]
    os_password: Option<String>,

    #[arg(long, global = true, env = "OS_TENANT_NAME")]
    os_tenant_name: Option<String>,

    /// Pre-issued auth token; used together with --solum-url
    #[arg(long, global = true, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    os_auth_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage plans
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },

    /// Build a plan for an application from flags, a plan file and prompts
    App {
        #[command(subcommand)]
        subcommand: AppSubcommand,
    },

    /// Manage assemblies
    Assembly {
        #[command(subcommand)]
        subcommand: AssemblySubcommand,
    },

    /// Manage pipelines
    Pipeline {
        #[command(subcommand)]
        subcommand: PipelineSubcommand,
    },

    /// Manage language packs
    Languagepack {
        #[command(subcommand)]
        subcommand: LanguagePackSubcommand,
    },

    /// Inspect components
    Component {
        #[command(subcommand)]
        subcommand: ComponentSubcommand,
    },

    /// Inspect the client configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let overrides = solum_core::config::Overrides {
        solum_url: cli.solum_url,
        auth_url: cli.os_auth_url,
        username: cli.os_username,
        password: cli.os_password,
        tenant_name: cli.os_tenant_name,
        token: cli.os_auth_token,
    };
    let result = session::load_config(cli.config.as_deref(), overrides).and_then(|config| {
        let json = cli.json;
        match cli.command {
            Commands::Config { subcommand } => cmd::config::run(&config, subcommand, json),
            Commands::Plan { subcommand } => {
                cmd::plan::run(&session::connect(&config)?, subcommand, json)
            }
            Commands::App { subcommand } => {
                cmd::app::run(&session::connect(&config)?, subcommand, json)
            }
            Commands::Assembly { subcommand } => {
                cmd::assembly::run(&session::connect(&config)?, subcommand, json)
            }
            Commands::Pipeline { subcommand } => {
                cmd::pipeline::run(&session::connect(&config)?, subcommand, json)
            }
            Commands::Languagepack { subcommand } => {
                cmd::languagepack::run(&session::connect(&config)?, subcommand, json)
            }
            Commands::Component { subcommand } => {
                cmd::component::run(&session::connect(&config)?, subcommand, json)
            }
        }
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
