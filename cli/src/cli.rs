//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Bring up a single-node OpenShift cluster
#[derive(Parser)]
#[command(
    name = "crcup",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Show retry attempts and every command run
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file [default: ~/.crcup/config.yaml]
    #[arg(long, global = true, env = "CRCUP_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full bring-up sequence
    Start,

    /// Wait until the node accepts SSH
    WaitSsh(commands::wait_ssh::WaitSshArgs),

    /// Check kubelet certificate expiry
    Certs,

    /// Show root partition usage on the node
    Disk,

    /// Check whether the operator deployment carries the proxy settings
    ProxyCheck,

    /// Print the proxy drop-in and cluster patch without applying them
    RenderProxy,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            config,
            command,
        } = self;

        if matches!(command, Command::Version) {
            return Ok(commands::version::run(json));
        }

        let flags = AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
        };
        let app = AppContext::new(&flags)?;

        match command {
            Command::Start => commands::start::run(&app).await,
            Command::WaitSsh(args) => commands::wait_ssh::run(&app, &args).await,
            Command::Certs => commands::certs::run(&app).await,
            Command::Disk => commands::disk::run(&app).await,
            Command::ProxyCheck => commands::proxy_check::run(&app).await,
            Command::RenderProxy => commands::render_proxy::run(&app),
            Command::Version => Ok(commands::version::run(json)),
        }
    }
}
