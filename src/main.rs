use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tokio::signal;

use menu_seeder::cli::commands::{
    handle_catalog, handle_config, handle_seed, handle_serve, handle_status,
};
use menu_seeder::cli::{Cli, Commands};
use menu_seeder::models::OutputFormat;
use menu_seeder::services::ORT_DYLIB_ENV;
use menu_seeder::utils::init_tracing;

/// Detect ONNX Runtime library path and set ORT_DYLIB_PATH if not already set.
/// Must be called before any ort code runs.
fn detect_and_set_ort_path() {
    if std::env::var(ORT_DYLIB_ENV)
        .map(|p| Path::new(&p).exists())
        .unwrap_or(false)
    {
        return;
    }

    let home = std::env::var("HOME").unwrap_or_default();

    let found = if cfg!(target_os = "macos") {
        [
            format!("{home}/.local/lib/menu-seeder/libonnxruntime.dylib"),
            "/opt/homebrew/opt/onnxruntime/lib/libonnxruntime.dylib".into(),
            "/usr/local/opt/onnxruntime/lib/libonnxruntime.dylib".into(),
        ]
        .into_iter()
        .find(|p| Path::new(p).exists())
    } else if cfg!(target_os = "linux") {
        [
            format!("{home}/.local/lib/menu-seeder/libonnxruntime.so"),
            "/usr/local/lib/libonnxruntime.so".into(),
            "/usr/lib/libonnxruntime.so".into(),
            "/usr/lib/x86_64-linux-gnu/libonnxruntime.so".into(),
            "/usr/lib/aarch64-linux-gnu/libonnxruntime.so".into(),
        ]
        .into_iter()
        .find(|p| Path::new(p).exists())
    } else {
        None
    };

    if let Some(path) = found {
        // SAFETY: Called at program start before any threads are spawned.
        unsafe {
            std::env::set_var(ORT_DYLIB_ENV, path);
        }
    }
}

fn main() -> Result<()> {
    detect_and_set_ort_path();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format.unwrap_or_default();
    let verbose = cli.verbose;

    tokio::select! {
        result = run_command(cli.command, format, verbose) => {
            if let Err(ref e) = result {
                let formatter = menu_seeder::cli::output::get_formatter(format);
                eprint!("{}", formatter.format_error(&format!("{:#}", e)));
                std::process::exit(1);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("received shutdown signal");
        }
    }

    Ok(())
}

async fn run_command(command: Option<Commands>, format: OutputFormat, verbose: bool) -> Result<()> {
    match command.unwrap_or(Commands::Seed) {
        Commands::Seed => handle_seed(format, verbose).await?,
        Commands::Serve(args) => handle_serve(args).await?,
        Commands::Catalog(args) => handle_catalog(args, format, verbose).await?,
        Commands::Status => handle_status(format, verbose).await?,
        Commands::Config(cmd) => handle_config(cmd, format, verbose).await?,
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
