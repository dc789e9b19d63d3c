use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::{config::ConfigLoadOption, routing::model::Pool};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, disable_help_subcommand = true)]
pub struct Command {
    /// Namespace of the routing resource (overrides config)
    #[arg(short, long, display_order = 1000)]
    pub namespace: Option<String>,

    /// Name of the routing resource (overrides config)
    #[arg(short, long, display_order = 1000)]
    pub route: Option<String>,

    /// Logging
    #[arg(short = 'l', long, display_order = 1000)]
    pub logging: bool,

    /// Config file path
    #[arg(long, display_order = 1000)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: SubCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// Show the current default pool and routing rules
    Get {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        output: OutputFormat,
    },

    /// Add a header-match rule
    Add {
        /// Logical or wire header name to match on
        header: String,

        /// Exact header value to match
        value: String,

        /// Pool receiving the matched traffic
        #[arg(short, long, default_value = "green")]
        target: Pool,
    },

    /// Edit fields of an existing rule
    Update {
        /// Rule id as shown by `get`
        id: u64,

        #[arg(long)]
        header: Option<String>,

        #[arg(long)]
        value: Option<String>,

        #[arg(long)]
        target: Option<Pool>,
    },

    /// Delete a rule
    Remove {
        /// Rule id as shown by `get`
        id: u64,
    },

    /// Change the default pool, keeping the rules
    SetDefault { pool: Pool },

    /// Send 100% of traffic to one pool, dropping every rule
    SwitchAll {
        pool: Pool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

impl Command {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn config_load_option(&self) -> Result<ConfigLoadOption> {
        let option = if let Some(path) = &self.config_file {
            match path.try_exists() {
                Ok(true) => ConfigLoadOption::Path(path.clone()),
                Ok(false) => {
                    eprintln!("Config file not found: {:?}", path);

                    ConfigLoadOption::Default
                }
                Err(err) => {
                    eprintln!("Failed to check config file exists: {}", err);

                    ConfigLoadOption::Default
                }
            }
        } else {
            let path = xdg_config_home().join("config.yaml");

            match path.try_exists() {
                Ok(true) => ConfigLoadOption::Path(path),
                Ok(false) => ConfigLoadOption::Default,
                Err(err) => {
                    eprintln!("Failed to check config file exists: {}", err);

                    ConfigLoadOption::Default
                }
            }
        };

        Ok(option)
    }
}

fn xdg_config_home() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("routeshift")
}
