mod command;
mod core;

use anyhow::Context;
use radio_core::platform::Dirs;
use radio_core::{Config, PlaylistResolver, StationCollection, StationPaths};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Echoes WARN and ERROR events to stderr so they show up next to the
/// command output; everything else only goes to the log file.
struct StderrLayer;

impl<S> tracing_subscriber::Layer<S> for StderrLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let level = event.metadata().level();
        if !matches!(*level, tracing::Level::WARN | tracing::Level::ERROR) {
            return;
        }

        let mut message = String::new();
        let now = chrono::Local::now();
        message.push_str(&format!("{} ", now.format("%H:%M:%S")));
        message.push_str(&format!("[{}] ", level));

        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        eprintln!("{message}");
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl<'a> tracing::field::Visit for MessageVisitor<'a> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        } else {
            self.0.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

fn init_logging(dirs: &Dirs) -> anyhow::Result<std::path::PathBuf> {
    std::fs::create_dir_all(&dirs.user_data)
        .with_context(|| format!("creating {}", dirs.user_data.display()))?;
    let log_path = dirs.user_data.join("daemon.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(StderrLayer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,radio_daemon=debug,radio_core=debug")
            }),
        )
        .init();

    Ok(log_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dirs = Dirs::detect();
    let log_path = init_logging(&dirs)?;
    info!("Log file: {:?}", log_path);

    let config_path = Config::config_path(&dirs);
    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!("Config loaded from: {:?}", config_path);

    let paths = StationPaths::new(&config.stations, &dirs);
    info!("Station list will be saved to {:?}", paths.save_path);

    let mut collection = StationCollection::with_fs(paths, config.stations.save_delay());
    tokio::spawn(core::log_collection_events(collection.subscribe()));
    collection.load()?;

    let resolver = PlaylistResolver::new(config.resolver.clone());

    // Resolve completions funnel back into DaemonCore
    let (event_tx, event_rx) = tokio::sync::mpsc::channel::<core::DaemonEvent>(32);
    let daemon_core = core::DaemonCore::new(collection, resolver, event_tx);

    let lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", command::HELP);
    daemon_core.run(lines, event_rx).await?;

    info!("Daemon stopped");
    Ok(())
}
