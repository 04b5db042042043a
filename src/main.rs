use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pixiv_dl::{
    Config, EffectExecutor, Error, FinishReason, HttpFetcher, PixivCatalog, Result, Session,
    Theme,
};

/// Environment variable holding the log filter, e.g. `PIXIV_DL_LOG=pixiv_dl=debug`
const LOG_ENV_VAR: &str = "PIXIV_DL_LOG";

#[derive(Parser, Debug)]
#[command(name = "pixiv-dl", version, about = "Download pixiv illustrations by search query")]
struct CliArgs {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory under which one folder per query is created.
    #[arg(short, long)]
    pub download_dir: Option<PathBuf>,

    /// Per-illustration timeout in seconds. 0 disables the timeout.
    #[arg(long)]
    pub item_timeout: Option<u64>,

    /// Quit as soon as the batch ends instead of waiting for another query.
    #[arg(long)]
    pub exit_when_finished: bool,

    /// Query submitted on start. An empty string asks for the top illustrations.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Print one line per illustration instead of the interactive view.
    #[arg(long)]
    pub plain: bool,

    /// Append logs to this file. Without it the interactive view logs nothing.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>, headless: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let initialized = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| Error::Config {
                    message: format!("cannot open log file {}: {}", path.display(), e),
                    key: None,
                })?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .with(filter)
                .try_init()
        }
        None if headless => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
        // The interactive view owns the terminal
        None => return Ok(()),
    };

    initialized.map_err(|e| Error::Other(format!("failed to initialize logging: {}", e)))
}

fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(dir) = &args.download_dir {
        config.download.download_dir = dir.clone();
    }
    if let Some(secs) = args.item_timeout {
        config.download.item_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if args.exit_when_finished {
        config.ui.exit_when_finished = true;
    }

    config.validate()?;
    Ok(config)
}

async fn run(args: CliArgs, config: Config, headless: bool) -> Result<ExitCode> {
    let catalog = Arc::new(PixivCatalog::new(&config.catalog)?);
    let fetcher = Arc::new(HttpFetcher::new(&config.download)?);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let executor = EffectExecutor::new(catalog, fetcher, tx, config.download.item_timeout);

    if headless {
        let mut session = Session::new(&config, Theme::plain());
        let query = args.query.unwrap_or_default();
        let mut stdout = std::io::stdout();
        pixiv_dl::run_headless(&mut session, &executor, &mut rx, &query, &mut stdout).await?;

        return Ok(match session.orchestrator().finish_reason() {
            Some(FinishReason::Completed | FinishReason::NoResults) => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        });
    }

    let mut session = Session::new(&config, Theme::colored());
    if let Some(query) = &args.query {
        session.set_query(query);
    }
    pixiv_dl::run_terminal(
        &mut session,
        &executor,
        &mut rx,
        config.ui.tick_interval(),
        args.query.is_some(),
    )
    .await?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    let headless = args.plain || !std::io::stdout().is_terminal();

    if let Err(e) = init_logging(args.log_file.as_deref(), headless) {
        eprintln!("pixiv-dl: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "Invalid configuration");
            eprintln!("pixiv-dl: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args, config, headless).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "Session failed");
            eprintln!("pixiv-dl: {}", e);
            ExitCode::FAILURE
        }
    }
}
