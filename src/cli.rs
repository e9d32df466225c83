use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "modelmart")]
#[command(version, about = "modelmart - AI model marketplace registry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and local.toml (defaults to ./config)
    #[arg(long, global = true, env = "MODELMART_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the server and an interactive browser session (default)
    Run,

    /// Start only the HTTP server
    Serve,

    /// Browse a registry served by another process
    Browse {
        /// Server base URL (defaults to the configured host and port)
        #[arg(long)]
        url: Option<String>,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_run() {
        let cli = Cli::try_parse_from(["modelmart"]).unwrap();
        assert_eq!(cli.command(), Commands::Run);
    }

    #[test]
    fn test_browse_with_url() {
        let cli = Cli::try_parse_from(["modelmart", "browse", "--url", "http://10.0.0.2:8080"]).unwrap();
        assert_eq!(
            cli.command(),
            Commands::Browse { url: Some("http://10.0.0.2:8080".to_string()) }
        );
    }

    #[test]
    fn test_global_config_dir() {
        let cli = Cli::try_parse_from(["modelmart", "serve", "--config-dir", "/etc/modelmart"]).unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("/etc/modelmart")));
        assert_eq!(cli.command(), Commands::Serve);
    }
}
