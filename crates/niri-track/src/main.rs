use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;
use tracing::debug;

use niri_track::commands::Cli;
use niri_track::commands::Commands;
use niri_track::error::AppError;
use niri_track::handlers;
use niri_track::telemetry;
use niri_track_store::TrackerConfig;

fn main() {
    if let Err(e) = run() {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            if app_error.is_not_running() {
                debug!(error = %app_error, "niri is not running, nothing to do");
                return;
            }
            eprintln!("Error: {}", app_error);
            if let Some(suggestion) = app_error.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            std::process::exit(app_error.exit_code());
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "niri-track", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = TrackerConfig::from_env();
    if let Some(dir) = cli.state_dir {
        config = config.with_state_dir(dir);
    }

    // stdout carries native messaging frames, so the host logs to a file.
    let _guard = match &cli.command {
        Commands::BrowserHost { .. } => telemetry::init_file_tracing(
            telemetry::default_level(),
            &config.state_dir.join(handlers::BROWSER_HOST_LOG),
        ),
        _ => telemetry::init_tracing(telemetry::default_level()),
    };

    let mut stdout = std::io::stdout();
    match cli.command {
        Commands::Completions { .. } => unreachable!(),
        Commands::Track => handlers::handle_track(config)?,
        Commands::Restore { target } => handlers::handle_restore(config, target)?,
        Commands::BrowserHost { browser_args } => {
            debug!(?browser_args, "started by browser");
            handlers::handle_browser_host(config)?
        }
        Commands::Prune => handlers::handle_prune(&config, &mut stdout)?,
        Commands::Show => handlers::handle_show(&config, &mut stdout)?,
    }
    Ok(())
}
