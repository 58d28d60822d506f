//! ScootDash terminal dashboard
//!
//! Polls the scooter's display module, prints a text dashboard on every
//! cycle and reads operator commands from stdin in between.

mod settings;
mod terminal;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scootdash_core::dashboard::Dashboard;
use scootdash_core::demo::DemoDevice;
use scootdash_core::device::{Device, HttpDevice};
use scootdash_core::diagnostics::RecordingSink;
use scootdash_core::view::MemoryView;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use settings::Settings;
use terminal::{parse_command, render_frame, summary_line, Command, HELP};

type Session<D> = Dashboard<D, MemoryView, RecordingSink>;

/// Terminal dashboard for scooters running the custom display firmware
#[derive(Parser, Debug)]
#[command(name = "scootdash", author, version, about, long_about = None)]
struct Args {
    /// Settings file (default: <config dir>/scootdash/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Base URL of the display module
    #[arg(long)]
    device_url: Option<String>,

    /// Telemetry poll period in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Use the simulated scooter
    #[arg(long)]
    demo: bool,

    /// Log filter, e.g. "debug" or "scootdash_core=trace"
    #[arg(long)]
    log_level: Option<String>,

    /// Poll once, print the dashboard and exit
    #[arg(long)]
    once: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    write_settings: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.device_url {
            settings.device_url = url.clone();
        }
        if let Some(ms) = self.interval_ms {
            settings.poll_interval_ms = ms;
        }
        if let Some(ms) = self.timeout_ms {
            settings.request_timeout_ms = Some(ms);
        }
        if self.demo {
            settings.demo = true;
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let mut settings = settings::load(args.settings.as_deref())?;
    args.apply(&mut settings);

    if args.write_settings {
        let path = args
            .settings
            .clone()
            .or_else(settings::default_path)
            .context("No config directory on this system; pass --settings")?;
        settings.save(&path)?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    info!("ScootDash {}", scootdash_core::VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(async {
        if settings.demo {
            info!("Using the simulated scooter");
            run(DemoDevice::new(), &settings, args.once).await
        } else {
            info!("Connecting to {}", settings.device_url);
            run(HttpDevice::new(&settings.device_url), &settings, args.once).await
        }
    })
}

fn print_frame<D: Device>(dashboard: &Session<D>) {
    let frame = render_frame(dashboard.view(), dashboard.sink().last());
    if std::io::stdout().is_terminal() {
        // clear screen, cursor home
        print!("\x1b[2J\x1b[H");
    }
    println!("{}", frame);
}

async fn run<D: Device>(device: D, settings: &Settings, once: bool) -> Result<()> {
    let view = MemoryView::new(settings.layout.clone());
    let mut dashboard = Dashboard::with_sink(device, view, RecordingSink::default())
        .with_poll_interval(settings.poll_interval())
        .with_request_timeout(settings.request_timeout());

    dashboard.start().await;

    if once {
        dashboard.poll_once().await;
        print_frame(&dashboard);
        println!("{}", summary_line(dashboard.view()));
        return Ok(());
    }

    let interval = settings.poll_interval();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let next_poll = tokio::time::sleep(std::time::Duration::ZERO);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(next_poll, shutdown);

    loop {
        tokio::select! {
            () = &mut next_poll => {
                dashboard.poll_once().await;
                print_frame(&dashboard);
                // fixed delay after the cycle settled
                next_poll.as_mut().reset(Instant::now() + interval);
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        if !handle_line(&mut dashboard, &line).await {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = &mut shutdown => break,
        }
    }

    info!("Stopped after {} poll cycles", dashboard.poller().cycles());
    Ok(())
}

/// Run one operator command; `false` means quit
async fn handle_line<D: Device>(dashboard: &mut Session<D>, line: &str) -> bool {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(err) => {
            println!("{:#}", err);
            return true;
        }
    };

    match command {
        Command::Toggle(feature) => {
            dashboard.toggle(feature).await;
        }
        Command::MaxSpeed(kmh) => {
            dashboard.set_max_speed(kmh).await;
        }
        Command::Set { key, value } => {
            if !dashboard.view_mut().edit_control(&key, &value) {
                println!("No config control named '{}'", key);
                return true;
            }
        }
        Command::Save => {
            dashboard.save_config().await;
        }
        Command::Reload => {
            dashboard.load_config().await;
        }
        Command::Help => {
            println!("{}", HELP);
            return true;
        }
        Command::Quit => return false,
    }

    print_frame(dashboard);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scootdash_core::render::ControlValue;
    use scootdash_core::state::Feature;

    fn session() -> Session<DemoDevice> {
        let view = MemoryView::new(Default::default());
        Dashboard::with_sink(DemoDevice::with_seed(7), view, RecordingSink::default())
    }

    #[test]
    fn test_flags_override_file() {
        let args = Args::parse_from([
            "scootdash",
            "--device-url",
            "http://10.0.0.9",
            "--timeout-ms",
            "800",
            "--demo",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.device_url, "http://10.0.0.9");
        assert_eq!(settings.request_timeout_ms, Some(800));
        assert_eq!(settings.poll_interval_ms, 500);
        assert!(settings.demo);
    }

    #[tokio::test]
    async fn test_commands_drive_the_session() {
        let mut dashboard = session();
        dashboard.start().await;

        assert!(handle_line(&mut dashboard, "light").await);
        assert!(dashboard.features().light);
        assert!(dashboard.device().lights());

        assert!(handle_line(&mut dashboard, "speed 30").await);
        assert_eq!(dashboard.device().max_speed_kmh(), 30);

        assert!(handle_line(&mut dashboard, "set show-intro yes").await);
        assert_eq!(
            dashboard.view().control("show-intro"),
            Some(&ControlValue::Checked(true))
        );

        assert!(handle_line(&mut dashboard, "bogus").await);
        assert!(handle_line(&mut dashboard, "").await);
        assert!(!handle_line(&mut dashboard, "quit").await);
        assert!(dashboard.sink().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_speed_is_reported() {
        let mut dashboard = session();
        let before = dashboard.device().max_speed_kmh();

        assert!(handle_line(&mut dashboard, "speed 50").await);
        assert_eq!(dashboard.device().max_speed_kmh(), before);
        assert_eq!(dashboard.sink().last().unwrap().0, "action");
        assert!(!dashboard.features().get(Feature::Lock));
    }
}
