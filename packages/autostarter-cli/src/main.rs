//! Autostarter CLI - register scripts to run at login
//!
//! This binary can:
//! - Add a startup entry for a script (per-user or system-wide)
//! - Remove a startup entry by identifier
//! - Show whether an entry is registered
//! - Show configuration paths and settings

use anyhow::{Context, Result};
use autostarter_core::config::{self, AutostartConfig};
use autostarter_core::{AddOptions, Autostarter, RemoveOptions};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "autostarter")]
#[command(version)]
#[command(about = "Add and remove scripts that run at login")]
#[command(long_about = "
Autostarter registers scripts to run automatically when you log in, on
Windows (Startup folder), macOS (LaunchAgents) and Linux (XDG autostart).

Quick start:
  1. Register a script:  autostarter add ~/bin/sync.sh --id sync
  2. Check it:           autostarter status sync
  3. Unregister it:      autostarter remove sync
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Which startup entry to act on. Without either flag the config default applies.
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct ScopeArgs {
    /// Use the all-users entry (requires root/administrator)
    #[arg(short, long, conflicts_with = "per_user")]
    pub system_wide: bool,

    /// Use the current user's entry, even if the config defaults to system-wide
    #[arg(short = 'u', long)]
    pub per_user: bool,
}

impl ScopeArgs {
    pub fn resolve(self, default_system_wide: bool) -> bool {
        if self.per_user {
            false
        } else {
            self.system_wide || default_system_wide
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a script to run at login
    Add {
        /// Path of the script to run
        script: String,

        /// Identifier for the entry (a random UUID when omitted)
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Arguments passed to the script
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        args: String,

        /// Program that runs the script (default: "cmd" on Windows, "sh" elsewhere)
        #[arg(short, long)]
        interpreter: Option<String>,
    },

    /// Unregister a startup entry
    #[command(alias = "rm")]
    Remove {
        /// Identifier of the entry
        id: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Show whether a startup entry is registered
    Status {
        /// Identifier of the entry
        id: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Show configuration paths and settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("autostarter={},autostarter_core={}", log_level, log_level).into()
            }),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config();

    match &cli.command {
        Commands::Add {
            script,
            id,
            scope,
            args,
            interpreter,
        } => {
            let mut options = AddOptions::default()
                .system_wide(scope.resolve(config.defaults.system_wide))
                .arguments(args.clone());
            if let Some(id) = id {
                options = options.identifier(id.clone());
            }
            if let Some(interpreter) = interpreter {
                options = options.interpreter(interpreter.clone());
            }
            cmd_add(&cli, &config, script, &options)
        }
        Commands::Remove { id, scope } => {
            let options = RemoveOptions::system_wide(scope.resolve(config.defaults.system_wide));
            cmd_remove(&cli, &config, id, &options)
        }
        Commands::Status { id, scope } => {
            let options = RemoveOptions::system_wide(scope.resolve(config.defaults.system_wide));
            cmd_status(&cli, &config, id, &options)
        }
        Commands::Config => cmd_config(&cli, &config),
    }
}

fn autostarter(config: &AutostartConfig) -> Result<Autostarter> {
    Autostarter::from_config(config).context("Failed to set up startup entries for this system")
}

fn cmd_add(cli: &Cli, config: &AutostartConfig, script: &str, options: &AddOptions) -> Result<()> {
    let autostarter = autostarter(config)?;
    let identifier = autostarter
        .add(script, options)
        .with_context(|| format!("Failed to add startup entry for {}", script))?;

    let status = autostarter.status(
        &identifier,
        &RemoveOptions::system_wide(options.system_wide),
    )?;

    match cli.format {
        OutputFormat::Text => {
            println!("Added startup entry '{}'", identifier);
            for path in &status.present {
                println!("  {}", path.display());
            }
            println!();
            println!(
                "Remove it with: autostarter remove {}{}",
                identifier,
                if options.system_wide {
                    " --system-wide"
                } else {
                    " --per-user"
                }
            );
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "status": "added",
                    "identifier": identifier,
                    "scope": status.scope,
                    "files": status.present,
                })
            );
        }
    }

    Ok(())
}

fn cmd_remove(cli: &Cli, config: &AutostartConfig, id: &str, options: &RemoveOptions) -> Result<()> {
    let removed = autostarter(config)?
        .remove(id, options)
        .with_context(|| format!("Failed to remove startup entry '{}'", id))?;

    match cli.format {
        OutputFormat::Text => {
            if removed {
                println!("Removed startup entry '{}'", id);
            } else {
                eprintln!("Could not remove startup entry '{}' (see log for details)", id);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "status": if removed { "removed" } else { "failed" },
                    "identifier": id,
                })
            );
        }
    }

    if !removed {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_status(cli: &Cli, config: &AutostartConfig, id: &str, options: &RemoveOptions) -> Result<()> {
    let status = autostarter(config)?
        .status(id, options)
        .with_context(|| format!("Failed to query startup entry '{}'", id))?;

    match cli.format {
        OutputFormat::Text => {
            println!("Entry:     {}", status.identifier);
            println!("Scope:     {}", status.scope);
            println!("Directory: {}", status.directory.display());
            if status.registered {
                println!("Status:    Registered");
            } else if status.present.is_empty() {
                println!("Status:    Not registered");
            } else {
                println!("Status:    Incomplete");
                for path in &status.missing {
                    println!("  missing: {}", path.display());
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&status)?);
        }
    }

    Ok(())
}

fn cmd_config(cli: &Cli, config: &AutostartConfig) -> Result<()> {
    let config_path = config::config_file_path_string();
    let autostarter = autostarter(config)?;
    let dirs = autostarter.dirs();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration");
            println!("=============");
            println!();
            println!("Config file:        {} (from {})", config_path, config.source);
            println!("Platform:           {}", autostarter.platform());
            println!("Interpreter:        {}", autostarter.default_interpreter());
            println!("Per-user directory: {}", dirs.per_user.display());
            println!("System directory:   {}", dirs.system_wide.display());
            println!(
                "Default scope:      {}",
                if config.defaults.system_wide {
                    "system-wide"
                } else {
                    "per-user"
                }
            );
            println!();
            println!("Example config.toml:");
            println!();
            println!("{}", config::generate_example_config());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": config_path,
                    "config_source": config.source.to_string(),
                    "platform": autostarter.platform(),
                    "interpreter": autostarter.default_interpreter(),
                    "directories": dirs,
                    "system_wide_default": config.defaults.system_wide,
                })
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "autostarter",
            "add",
            "/usr/bin/foo.sh",
            "--id",
            "test1",
            "--args",
            "--flag",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                script,
                id,
                scope,
                args,
                interpreter,
            } => {
                assert_eq!(script, "/usr/bin/foo.sh");
                assert_eq!(id.as_deref(), Some("test1"));
                assert!(!scope.system_wide);
                assert!(!scope.per_user);
                assert_eq!(args, "--flag");
                assert_eq!(interpreter, None);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_remove_alias_with_global_flags() {
        let cli = Cli::try_parse_from(["autostarter", "rm", "test1", "--system-wide", "-f", "json"])
            .unwrap();

        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Commands::Remove { id, scope } => {
                assert_eq!(id, "test1");
                assert!(scope.system_wide);
            }
            _ => panic!("expected remove"),
        }
    }

    #[test]
    fn test_per_user_overrides_system_wide_default() {
        let cli = Cli::try_parse_from(["autostarter", "status", "job", "--per-user"]).unwrap();
        let Commands::Status { scope, .. } = cli.command else {
            panic!("expected status");
        };
        assert!(!scope.resolve(true));
        assert!(!scope.resolve(false));

        let cli = Cli::try_parse_from(["autostarter", "remove", "job"]).unwrap();
        let Commands::Remove { scope, .. } = cli.command else {
            panic!("expected remove");
        };
        assert!(scope.resolve(true));
        assert!(!scope.resolve(false));
    }

    #[test]
    fn test_scope_flags_conflict() {
        assert!(Cli::try_parse_from(["autostarter", "remove", "job", "-s", "-u"]).is_err());
    }
}
