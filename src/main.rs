use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use padcore::config::InputConfig;
use padcore::device::GilrsBackend;
use padcore::hid::{PadUpdate, WatchHidConsumer};
use padcore::{InputCore, SettingsPortal, TokioTickScheduler};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "padcore", version, about = "Emulated console input core")]
struct Cli {
    /// Input config file, defaults to the user's config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the input core and log pad changes until Ctrl-C
    Run,
    /// Wait for one newly pressed input and print its mapping
    Detect {
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
    },
    /// List the input devices currently available
    List,
    /// Write the default bindings to the config file
    WriteDefaultConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => InputConfig::default_path()?,
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::WriteDefaultConfig => {
            InputConfig::default_bindings().save(&config_path)?;
            println!("{}", config_path.display());
        }
        Command::List => {
            let (core, _) = build_core(InputConfig::load_or_default(&config_path))?;
            for device in core.all_devices() {
                println!("{}", device.identity());
            }
        }
        Command::Detect { timeout_ms } => {
            let (core, _) = build_core(InputConfig::load_or_default(&config_path))?;
            let timeout = Duration::from_millis(timeout_ms);
            info!("Press any button within {:?}", timeout);

            let detected = tokio::task::spawn_blocking(move || core.detect_input(timeout, || {}))
                .await
                .map_err(|e| eyre!("Detection task failed: {}", e))?;
            match detected {
                Some(mapping) => println!("{}", mapping),
                None => warn!("No input detected"),
            }
        }
        Command::Run => {
            let (core, updates) = build_core(InputConfig::load_or_default(&config_path))?;
            run(core, updates).await;
        }
    }

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| Level::from_str(&level).ok())
        .unwrap_or(Level::INFO);

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

fn build_core(config: InputConfig) -> Result<(Arc<InputCore>, watch::Receiver<PadUpdate>)> {
    let scheduler =
        TokioTickScheduler::current().map_err(|e| eyre!("Failed to create scheduler: {}", e))?;
    let (hid, updates) = WatchHidConsumer::new();

    let core = InputCore::new(
        Arc::new(SettingsPortal::new(config)),
        Arc::new(GilrsBackend::new()),
        Arc::new(scheduler),
        Arc::new(hid),
    );
    Ok((Arc::new(core), updates))
}

async fn run(core: Arc<InputCore>, mut updates: watch::Receiver<PadUpdate>) {
    core.init();
    info!("Input core started, press Ctrl-C to stop");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Pad update channel closed");
                    break;
                }
                let update = *updates.borrow_and_update();
                info!(
                    "Pad {:#010x}, circle pad ({}, {})",
                    update.buttons.bits(),
                    update.circle_pad.x,
                    update.circle_pad.y
                );
            }
            _ = &mut shutdown => {
                info!("Ctrl-C received");
                break;
            }
        }
    }

    core.shutdown();
}
