//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ConnectionConfig;
use crate::database::register_drivers;
use crate::error::{Error, Result};
use serde_json::json;
use std::time::Duration;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check(),
            Commands::Descriptor { show_password } => self.descriptor(*show_password),
            Commands::Engines => self.engines(),
        }
    }

    /// Resolve the connection config from `--config` or `--url`
    fn load_config(&self) -> Result<ConnectionConfig> {
        if let Some(path) = &self.cli.config {
            return ConnectionConfig::load(path);
        }
        if let Some(url) = &self.cli.url {
            return ConnectionConfig::from_url(url);
        }
        Err(Error::config(
            "No connection configured (use --config FILE or --url URL)",
        ))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.cli.timeout)
    }

    fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let registry = register_drivers();

        let handle = match registry.connect(&config, self.timeout()) {
            Ok(handle) => handle,
            Err(e) => {
                Self::output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "engine": config.engine(),
                        "message": e.to_string()
                    }
                }));
                return Err(e);
            }
        };

        Self::output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": "SUCCEEDED",
                "engine": handle.engine(),
                "target": handle.target()
            }
        }));

        handle.close()
    }

    fn descriptor(&self, show_password: bool) -> Result<()> {
        let config = self.load_config()?;
        let connector = register_drivers().get(config.engine())?;

        let descriptor = if show_password {
            connector.descriptor(&config)?
        } else {
            connector.masked_descriptor(&config)?
        };
        println!("{descriptor}");
        Ok(())
    }

    fn engines(&self) -> Result<()> {
        let engines = register_drivers().engines();
        Self::output_message(&json!({
            "type": "ENGINES",
            "engines": engines
        }));
        Ok(())
    }

    /// Print one JSON message per line
    fn output_message(message: &serde_json::Value) {
        println!("{message}");
    }
}
