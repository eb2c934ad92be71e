use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{Clear, ClearType, EnterAlternateScreen, enable_raw_mode},
};
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sparkmon::api::SparkApiClient;
use sparkmon::app::{App, restore_terminal};

#[derive(Parser)]
#[command(name = "sparkmon", version, about = "Real-time terminal dashboard for Spark cluster triage")]
struct Cli {
    /// Base URL of the Spark monitor proxy API.
    #[arg(
        long,
        env = "SPARKMON_BASE_URL",
        default_value = "http://127.0.0.1:8888/berdl/api/spark-monitor"
    )]
    base_url: String,

    /// Session token forwarded to the proxy as an auth cookie.
    #[arg(long, env = "SPARKMON_TOKEN")]
    token: Option<String>,

    /// Append structured logs to this file (stdout belongs to the dashboard).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let path = log_file?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path.file_name()?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_deref());
    info!(base_url = %cli.base_url, "starting sparkmon");

    let rt = Arc::new(tokio::runtime::Runtime::new()?);
    let api = SparkApiClient::new(&cli.base_url, cli.token.as_deref()).map_err(io::Error::other)?;

    // SIGTERM/SIGINT break the event loop so the terminal is restored even
    // when the process is killed from outside.
    let exit_flag = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&exit_flag))?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Clear(ClearType::All))?;

    let mut app = App::new(Arc::clone(&rt), Arc::new(api));
    let result = app.run(&exit_flag);

    restore_terminal();
    info!("sparkmon stopped");
    result
}
