use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use ethdeploy_tools::{logging, Config, ExportFormat, Task};

#[derive(Parser)]
#[command(name = "ethdeploy")]
#[command(about = "Inspect, validate and export the contract toolchain configuration")]
struct Cli {
    /// Env file to load instead of the default .env lookup
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Log level; overrides RUST_LOG (default: warn)
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration with secrets redacted
    Show,
    /// Validate the configuration
    Check {
        /// Task to validate for
        #[arg(short, long, value_enum, default_value = "all")]
        task: TaskArg,
    },
    /// Write the host-tool record, secrets included
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the registered host-tool plugins
    Plugins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TaskArg {
    Compile,
    Deploy,
    Verify,
    All,
}

impl TaskArg {
    fn tasks(self) -> &'static [Task] {
        match self {
            TaskArg::Compile => &[Task::Compile],
            TaskArg::Deploy => &[Task::Deploy],
            TaskArg::Verify => &[Task::Verify],
            TaskArg::All => &Task::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Toml,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => ExportFormat::Json,
            Format::Toml => ExportFormat::Toml,
        }
    }
}

fn parse_log_level(s: &str) -> Result<String, String> {
    logging::parse_level(s)
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

fn load_config(env_file: Option<&PathBuf>) -> Result<Config> {
    match env_file {
        Some(path) => Config::load_with_env_file(path)
            .with_context(|| format!("failed to load env file {}", path.display())),
        None => Ok(Config::load()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref())?;

    let config = load_config(cli.env_file.as_ref())?;

    match cli.command {
        Commands::Show => {
            config.print_summary();
            Ok(())
        }
        Commands::Check { task } => {
            for task in task.tasks() {
                config
                    .validate_for(*task)
                    .with_context(|| format!("configuration is not usable for {}", task))?;
                info!(%task, "configuration valid");
                println!("{}: ok", task);
            }
            Ok(())
        }
        Commands::Export { format, output } => {
            let format = ExportFormat::from(format);
            match output {
                Some(path) => {
                    config
                        .export_to(&path, format)
                        .with_context(|| format!("failed to export to {}", path.display()))?;
                    info!(path = %path.display(), "configuration exported");
                }
                None => println!("{}", config.render(format)?),
            }
            Ok(())
        }
        Commands::Plugins => {
            for plugin in config.plugins() {
                println!("{}", plugin);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_check_with_task() {
        let cli = Cli::try_parse_from(["ethdeploy", "check", "--task", "deploy"]).unwrap();
        match cli.command {
            Commands::Check { task } => assert_eq!(task.tasks(), &[Task::Deploy]),
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_check_defaults_to_all_tasks() {
        let cli = Cli::try_parse_from(["ethdeploy", "check"]).unwrap();
        match cli.command {
            Commands::Check { task } => assert_eq!(task.tasks(), &Task::ALL),
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_parses_export_options() {
        let cli = Cli::try_parse_from([
            "ethdeploy",
            "--env-file",
            "deploy.env",
            "export",
            "--format",
            "toml",
            "-o",
            "out.toml",
        ])
        .unwrap();

        assert_eq!(cli.env_file, Some(PathBuf::from("deploy.env")));
        assert_eq!(cli.log_level, None);
        match cli.command {
            Commands::Export { format, output } => {
                assert_eq!(format, Format::Toml);
                assert_eq!(output, Some(PathBuf::from("out.toml")));
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_explicit_log_level_is_kept() {
        let cli = Cli::try_parse_from(["ethdeploy", "--log-level", "debug", "show"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_bad_log_level() {
        assert!(Cli::try_parse_from(["ethdeploy", "--log-level", "loud", "show"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_task() {
        assert!(Cli::try_parse_from(["ethdeploy", "check", "--task", "mint"]).is_err());
    }
}
