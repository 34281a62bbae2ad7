use crate::cmd::plan::print_plan;
use crate::prompt;
use anyhow::Context;
use clap::Subcommand;
use solum_core::client::HttpClient;
use solum_core::languagepack::LanguagePack;
use solum_core::manager::Manager;
use solum_core::plan::Plan;
use solum_core::planfile::{load_plan_file, PlanArgs, PlanDefinition};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum AppSubcommand {
    /// Register a plan for an application, asking for anything not given
    Create {
        /// Existing plan file to start from
        #[arg(long)]
        plan_file: Option<PathBuf>,
        /// Git repository URL of the application
        #[arg(long)]
        git_url: Option<String>,
        /// Language pack name or uuid ("auto" to let the service detect it)
        #[arg(long = "lp", alias = "languagepack")]
        lp: Option<String>,
        /// YAML file of deployment parameters
        #[arg(long)]
        param_file: Option<PathBuf>,
        /// Port the application listens on
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Command that starts the application
        #[arg(long)]
        run_cmd: Option<String>,
        /// The repository needs a deploy key
        #[arg(long)]
        private_repo: bool,
        /// Token for the repository host (e.g. a GitHub access token)
        #[arg(long)]
        access_token: Option<String>,
    },
}

pub fn run(http: &dyn HttpClient, subcmd: AppSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AppSubcommand::Create {
            plan_file,
            git_url,
            lp,
            param_file,
            port,
            name,
            desc,
            run_cmd,
            private_repo,
            access_token,
        } => {
            let args = PlanArgs {
                name,
                desc,
                git_url,
                private: private_repo,
                lp,
                param_file,
                port,
                run_cmd,
                access_token,
            };
            create(http, plan_file, args, json)
        }
    }
}

fn create(
    http: &dyn HttpClient,
    plan_file: Option<PathBuf>,
    args: PlanArgs,
    json: bool,
) -> anyhow::Result<()> {
    let plan = match plan_file {
        Some(ref path) => load_plan_file(path)?,
        None => Plan::default(),
    };

    let languagepacks: Manager<LanguagePack> = Manager::new(http);
    let mut definition = PlanDefinition::new(&languagepacks, plan, args);
    for notice in definition.notices() {
        eprintln!("{notice}");
    }
    prompt::fill_missing(&mut definition)?;
    let document = definition.dump()?;

    let plans: Manager<Plan> = Manager::new(http);
    let created = plans
        .create(&document)
        .with_context(|| format!("failed to register plan '{}'", document.name))?;
    print_plan(&created, json)
}
