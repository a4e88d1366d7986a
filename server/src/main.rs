mod config;
mod http;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::EmployeeStore;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "employee-api", version, about = "In-memory employee records over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "EMPLOYEE_API_HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "EMPLOYEE_API_PORT", default_value_t = 4000)]
    port: u16,
    #[arg(long, env = "EMPLOYEE_API_LOG_FILE", value_name = "FILE", default_value = "server.log")]
    log_file: PathBuf,
    #[arg(long, help = "Log to the console only")]
    no_log_file: bool,
}

impl ServeCommand {
    fn obs_config(&self) -> ObsConfig {
        ObsConfig {
            log_file: (!self.no_log_file).then(|| self.log_file.clone()),
            ..ObsConfig::default()
        }
    }
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => {
            init_tracing(cmd.obs_config())?;
            run_server(cmd).await
        }
    }
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let state = AppState {
        store: Arc::new(EmployeeStore::new()),
        config,
    };
    http::serve(cmd.into(), state).await
}
