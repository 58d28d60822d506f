//! Terminal front end: frame rendering and operator commands

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use scootdash_core::format::format_number;
use scootdash_core::layout::GaugeKind;
use scootdash_core::render::ControlValue;
use scootdash_core::state::Feature;
use scootdash_core::view::MemoryView;

const BAR_WIDTH: usize = 24;

pub const HELP: &str = "\
commands:
  light | eco | lock      toggle a feature
  speed <kmh>             set the speed limit (5-35)
  set <key> <value>       edit a config control
  save                    write the config form to the scooter
  reload                  reload the config form from the scooter
  help                    show this text
  quit                    exit";

/// A parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle(Feature),
    MaxSpeed(u32),
    Set { key: String, value: String },
    Save,
    Reload,
    Help,
    Quit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "light" => Command::Toggle(Feature::Light),
        "eco" => Command::Toggle(Feature::EcoMode),
        "lock" => Command::Toggle(Feature::Lock),
        "speed" => {
            let kmh = rest
                .parse()
                .with_context(|| format!("speed needs a whole number of km/h, got '{}'", rest))?;
            Command::MaxSpeed(kmh)
        }
        "set" => {
            let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if key.is_empty() {
                bail!("usage: set <key> <value>");
            }
            Command::Set {
                key: key.to_string(),
                value: value.trim().to_string(),
            }
        }
        "save" => Command::Save,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{}' (try 'help')", other),
    };
    Ok(Some(command))
}

fn gauge_line(out: &mut String, view: &MemoryView, kind: GaugeKind) {
    let gauge = view.gauge(kind);
    let filled = (gauge.needle_fraction() * BAR_WIDTH as f64).round() as usize;
    let value = gauge
        .drawn_value()
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "--".to_string());

    let _ = writeln!(
        out,
        "{:<14}[{}{}] {:>6} {}",
        gauge.config.label,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        value,
        gauge.config.units
    );
}

/// Render the whole dashboard as text
pub fn render_frame(view: &MemoryView, last_error: Option<&(String, String)>) -> String {
    let mut out = String::new();

    for kind in GaugeKind::ALL {
        gauge_line(&mut out, view, kind);
    }
    out.push('\n');

    let statuses: Vec<String> = Feature::ALL
        .iter()
        .map(|f| format!("{}: {}", f.label(), view.status(*f).unwrap_or("--")))
        .collect();
    let _ = writeln!(out, "{}", statuses.join("   "));
    out.push('\n');

    for field in &view.layout().stats {
        let Some(text) = view.stat(&field.key) else {
            continue;
        };
        let units = if field.units.is_empty() {
            String::new()
        } else {
            format!(" {}", field.units)
        };
        let _ = writeln!(out, "  {:<16}{}{}", field.label, text, units);
    }

    let _ = writeln!(out, "\nconfig:");
    for field in &view.layout().config_fields {
        let shown = match view.control(&field.key) {
            Some(ControlValue::Checked(true)) => "[x]".to_string(),
            Some(ControlValue::Checked(false)) => "[ ]".to_string(),
            Some(ControlValue::Text(text)) => text.clone(),
            None => continue,
        };
        let _ = writeln!(out, "  {:<30}{:<10}({})", field.label, shown, field.key);
    }
    if let Some(pin) = view.readable_pin() {
        let _ = writeln!(out, "  PIN buttons: {}", pin);
    }

    if let Some((context, message)) = last_error {
        let _ = writeln!(out, "\nlast error ({}): {}", context, message);
    }
    out
}

/// Short one-line status for `--once` style output
pub fn summary_line(view: &MemoryView) -> String {
    let value = |kind| {
        view.gauge(kind)
            .drawn_value()
            .map(format_number)
            .unwrap_or_else(|| "--".to_string())
    };
    format!(
        "speed {} km/h, battery {} %, acceleration {}",
        value(GaugeKind::Speed),
        value(GaugeKind::Battery),
        value(GaugeKind::Acceleration)
    )
}
