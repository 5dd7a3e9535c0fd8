//! crewdeploy CLI: validate, export and deploy crew configurations.
//!
//! All domain logic lives in crewdeploy-core; this binary only parses
//! arguments, loads configuration and prints results.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use crewdeploy_core::Target;

/// crewdeploy: deploy agent crews and workflow graphs
#[derive(Parser)]
#[command(name = "crewdeploy", version, about = "crewdeploy: deploy agent crews and workflow graphs")]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, env = "CREWDEPLOY_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a .env file with credentials (defaults to ./.env if present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override the output directory for records, pending payloads and exports
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is reachable with the configured credentials
    Check,

    /// Validate the crew and workflow without sending anything
    Validate {
        /// Crew definition (JSON or YAML); defaults to the built-in crew
        #[arg(long)]
        crew_file: Option<PathBuf>,
        /// Workflow graph (JSON or YAML); defaults to the built-in workflow
        #[arg(long)]
        workflow_file: Option<PathBuf>,
    },

    /// Write configuration files and a manual deployment guide
    Export {
        #[arg(long)]
        crew_file: Option<PathBuf>,
        #[arg(long)]
        workflow_file: Option<PathBuf>,
    },

    /// Deploy to the remote service (primary endpoint, then fallback)
    Deploy {
        /// What to deploy
        #[arg(long, value_enum, default_value_t = TargetArg::Crew)]
        target: TargetArg,
        /// Skip the pre-flight status check
        #[arg(long)]
        skip_check: bool,
        #[arg(long)]
        crew_file: Option<PathBuf>,
        #[arg(long)]
        workflow_file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TargetArg {
    Crew,
    Workflow,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Crew => Target::Crew,
            TargetArg::Workflow => Target::Workflow,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewdeploy_core=info,crewdeploy=info".into()),
        )
        .init();

    let result = match cli.command {
        Some(command) => run(command, cli.config, cli.env_file, cli.output_dir).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: Option<PathBuf>,
    env_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<(), String> {
    let ctx = commands::Context::load(config.as_deref(), env_file.as_deref(), output_dir)?;

    match command {
        Commands::Check => commands::check::run(&ctx).await,
        Commands::Validate {
            crew_file,
            workflow_file,
        } => commands::validate::run(crew_file.as_deref(), workflow_file.as_deref()),
        Commands::Export {
            crew_file,
            workflow_file,
        } => commands::export::run(&ctx, crew_file.as_deref(), workflow_file.as_deref()).await,
        Commands::Deploy {
            target,
            skip_check,
            crew_file,
            workflow_file,
        } => {
            commands::deploy::run(
                &ctx,
                target.into(),
                skip_check,
                crew_file.as_deref(),
                workflow_file.as_deref(),
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deploy_flags() {
        let cli = Cli::try_parse_from([
            "crewdeploy",
            "--output-dir",
            "out",
            "deploy",
            "--target",
            "workflow",
            "--skip-check",
            "--workflow-file",
            "wf.yaml",
        ])
        .unwrap();

        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        match cli.command {
            Some(Commands::Deploy {
                target,
                skip_check,
                crew_file,
                workflow_file,
            }) => {
                assert_eq!(target, TargetArg::Workflow);
                assert!(skip_check);
                assert!(crew_file.is_none());
                assert_eq!(workflow_file, Some(PathBuf::from("wf.yaml")));
            }
            _ => panic!("expected deploy command"),
        }
    }

    #[test]
    fn test_deploy_defaults_to_crew() {
        let cli = Cli::try_parse_from(["crewdeploy", "deploy"]).unwrap();
        match cli.command {
            Some(Commands::Deploy { target, skip_check, .. }) => {
                assert_eq!(Target::from(target), Target::Crew);
                assert!(!skip_check);
            }
            _ => panic!("expected deploy command"),
        }
    }

    #[test]
    fn test_rejects_unknown_target() {
        assert!(Cli::try_parse_from(["crewdeploy", "deploy", "--target", "agents"]).is_err());
    }
}
