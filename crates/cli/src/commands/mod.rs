//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Each command parses its arguments, opens a drive session through the
//! shared [`Context`] and runs against any `DriveStore`, which keeps the
//! command logic testable without a network.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gdc_core::{Config, ConfigManager, Error, Navigation, Session, StateManager};
use gdc_drive::DriveClient;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cd;
mod completions;
mod cp;
mod download;
mod is_dir;
mod is_exist;
mod ls;
mod mkdir;
mod mv;
mod pwd;
mod rm;
mod search;
mod stat;
mod upload;

/// gdc - path-based cloud drive client
///
/// Navigate, create, move, copy, search, upload and download drive items
/// using UNIX-style paths. The working directory set by `cd` is remembered
/// between invocations.
#[derive(Parser, Debug)]
#[command(name = "gdc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinners
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the working directory
    Pwd(pwd::PwdArgs),

    /// List the children of a folder
    Ls(ls::LsArgs),

    /// Change the working directory
    Cd(cd::CdArgs),

    /// Create a folder and any missing parents
    Mkdir(mkdir::MkdirArgs),

    /// Upload a local file
    Upload(upload::UploadArgs),

    /// Download a remote file
    Download(download::DownloadArgs),

    /// Remove a file or folder
    Rm(rm::RmArgs),

    /// Move or rename a file or folder
    Mv(mv::MvArgs),

    /// Copy a file
    Cp(cp::CpArgs),

    /// Print whether a path exists
    IsExist(is_exist::IsExistArgs),

    /// Print whether a path is a folder
    IsDir(is_dir::IsDirArgs),

    /// Search by name in a folder, or across the drive
    Search(search::SearchArgs),

    /// Show metadata for a path
    Stat(stat::StatArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Everything a command needs besides its own arguments
pub struct Context {
    pub formatter: Formatter,
    pub config: Config,
    pub config_dir: PathBuf,
    pub state_path: PathBuf,
}

impl Context {
    /// Load the configuration and merge it with the command-line flags
    pub fn load(flags: OutputConfig) -> Result<Self, (Formatter, Error)> {
        let loaded = ConfigManager::new().and_then(|manager| {
            let config = manager.load()?;
            Ok((manager, config))
        });
        match loaded {
            Ok((manager, config)) => Ok(Self {
                formatter: Formatter::new(flags.with_defaults(&config.defaults)),
                config_dir: manager.config_dir(),
                state_path: manager.state_path(),
                config,
            }),
            Err(e) => Err((Formatter::new(flags), e)),
        }
    }

    /// Persisted working directory
    pub fn navigation(&self) -> Navigation {
        Navigation::load(StateManager::with_path(self.state_path.clone()))
    }

    /// Authenticate against the drive and restore the working directory
    pub async fn session(&self) -> Result<Session<DriveClient>, Error> {
        let client = DriveClient::connect(&self.config.drive, &self.config_dir).await?;
        Ok(Session::new(client, self.navigation()))
    }

    /// Open a session or report why it failed
    pub async fn open(&self) -> Result<Session<DriveClient>, ExitCode> {
        self.session()
            .await
            .map_err(|e| fail(&self.formatter, "Failed to connect to drive", &e))
    }
}

/// Print `context: error` and pick the matching exit code
pub(crate) fn fail(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {error}"));
    ExitCode::from(error)
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let flags = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    // Completions need neither configuration nor a drive
    let command = match cli.command {
        Commands::Completions(args) => return completions::execute(args),
        command => command,
    };

    let ctx = match Context::load(flags) {
        Ok(ctx) => ctx,
        Err((formatter, e)) => return fail(&formatter, "Failed to load configuration", &e),
    };

    match command {
        Commands::Pwd(args) => pwd::execute(args, &ctx).await,
        Commands::Ls(args) => ls::execute(args, &ctx).await,
        Commands::Cd(args) => cd::execute(args, &ctx).await,
        Commands::Mkdir(args) => mkdir::execute(args, &ctx).await,
        Commands::Upload(args) => upload::execute(args, &ctx).await,
        Commands::Download(args) => download::execute(args, &ctx).await,
        Commands::Rm(args) => rm::execute(args, &ctx).await,
        Commands::Mv(args) => mv::execute(args, &ctx).await,
        Commands::Cp(args) => cp::execute(args, &ctx).await,
        Commands::IsExist(args) => is_exist::execute(args, &ctx).await,
        Commands::IsDir(args) => is_dir::execute(args, &ctx).await,
        Commands::Search(args) => search::execute(args, &ctx).await,
        Commands::Stat(args) => stat::execute(args, &ctx).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use gdc_core::{MemoryStore, Navigation, Session};

    use crate::output::{Formatter, OutputConfig};

    /// Formatter that prints nothing but errors
    pub fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            no_color: true,
            no_progress: true,
            ..Default::default()
        })
    }

    /// Plain human formatter for rendering checks
    pub fn plain() -> Formatter {
        Formatter::new(OutputConfig {
            no_color: true,
            no_progress: true,
            ..Default::default()
        })
    }

    pub fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new(), Navigation::default())
    }
}
