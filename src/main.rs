use std::path::PathBuf;

use clap::{
    ArgAction, Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use monthlist::{Res, cli, config, config::RunSettings, error, logging};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[clap(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth(AuthOptions),

    /// Keep monthly playlists in sync, reconciling every run interval
    Run(RunOptions),

    /// Reconcile monthly playlists once
    Once(RunOptions),

    /// Show what a reconciliation would change without touching anything
    Plan(RunOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Print the refresh token as {"RefreshToken": ...}
    #[clap(long)]
    pub print: bool,

    /// Write the refresh token document to this file
    #[clap(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunOptions {
    /// Months of liked history to mirror, 0 for all [env: SEARCH_PERIOD]
    #[clap(long, value_name = "MONTHS")]
    pub search_period: Option<u32>,

    /// Remove tracks that are no longer liked [env: REMOVE_UNLIKED_SONGS]
    #[clap(long, conflicts_with = "keep_unliked")]
    pub remove_unliked_songs: bool,

    /// Keep tracks that are no longer liked
    #[clap(long)]
    pub keep_unliked: bool,

    /// Minutes between two runs [env: RUN_INTERVAL]
    #[clap(long, value_name = "MINUTES")]
    pub run_interval: Option<u64>,
}

impl RunOptions {
    /// Flags win over the environment, the environment over defaults.
    fn settings(&self) -> RunSettings {
        let mut settings = RunSettings::from_env();
        if let Some(search_period) = self.search_period {
            settings.search_period = search_period;
        }
        if self.remove_unliked_songs {
            settings.remove_unliked_songs = true;
        }
        if self.keep_unliked {
            settings.remove_unliked_songs = false;
        }
        if let Some(run_interval) = self.run_interval {
            settings.run_interval = run_interval;
        }
        settings
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet) {
        eprintln!("Cannot initialize logging. Err: {e}");
    }

    let result: Res<()> = match cli.command {
        Command::Auth(opt) => cli::auth(opt.print, opt.file).await,
        Command::Run(opt) => cli::run(opt.settings()).await,
        Command::Once(opt) => cli::once(opt.settings()).await,
        Command::Plan(opt) => cli::plan(opt.settings()).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
