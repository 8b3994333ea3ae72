//! Command handlers

use anyhow::{Context, Result};
use padkeys::{list_gamepads, EvdevGamepad, LogSink, VirtualKeyboard};
use padkeys_engine::label::SPECIAL_KEYS;
use padkeys_engine::{AxisMapping, Engine, Inspector, KeySink, Profile, ProfileBook, TickDriver};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve the book path and load it
pub fn load_book(path: Option<&Path>) -> Result<(PathBuf, ProfileBook)> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(ProfileBook::default_path);
    info!("Loading profiles from {}", path.display());
    let book = ProfileBook::load(&path)?;
    Ok((path, book))
}

/// Run a profile until Ctrl+C / SIGTERM
pub async fn run(
    book: &ProfileBook,
    name: &str,
    joystick_id: Option<usize>,
    rate: u32,
    dry_run: bool,
) -> Result<()> {
    let profile = book.profile(name)?;
    let id = joystick_id.unwrap_or(profile.joystick_id);
    let source = EvdevGamepad::open(id).with_context(|| format!("Failed to open gamepad {id}"))?;

    let sink: Box<dyn KeySink> = if dry_run {
        info!("Dry run: key presses are logged, not injected");
        Box::new(LogSink::new())
    } else {
        Box::new(VirtualKeyboard::new().context("Is /dev/uinput writable by this user?")?)
    };

    info!(
        "Profile \"{}\": {} button(s), {} axis mapping(s)",
        profile.name,
        profile.buttons.len(),
        profile.axes.len()
    );
    let mut engine = Engine::new(profile, sink);
    let mut driver = TickDriver::new(source, rate);
    info!("Running at {rate} Hz. Press Ctrl+C to exit.");

    let stats = driver.run(&mut engine, shutdown_signal()).await;
    info!(
        "Stopped after {} ticks ({} failed polls)",
        stats.ticks, stats.failed_polls
    );
    Ok(())
}

/// Print raw controller activity
pub async fn inspect(
    book: Option<&ProfileBook>,
    profile: Option<&str>,
    joystick_id: Option<usize>,
    rate: u32,
) -> Result<()> {
    let profile_id = match (book, profile) {
        (Some(book), Some(name)) => Some(book.profile(name)?.joystick_id),
        _ => None,
    };
    let id = joystick_id.or(profile_id).unwrap_or(0);
    let source = EvdevGamepad::open(id).with_context(|| format!("Failed to open gamepad {id}"))?;
    println!(
        "Inspecting {} ({}). Press Ctrl+C to exit.",
        source.name().unwrap_or("Unknown"),
        source.path().display()
    );

    let mut inspector = Inspector::new(std::io::stdout());
    let mut driver = TickDriver::new(source, rate);
    driver.run(&mut inspector, shutdown_signal()).await;
    Ok(())
}

pub fn profiles(path: &Path, book: &ProfileBook) {
    println!("Profiles in {}:", path.display());
    if book.profiles.is_empty() {
        println!("  (none)");
        return;
    }
    for (name, record) in &book.profiles {
        println!(
            "  {name:<20} joystick {}  {} button(s)  {} axis mapping(s)",
            record.joystick_id,
            record.buttons.len(),
            record.axes.len()
        );
    }
}

pub fn check(book: &ProfileBook, name: &str) -> Result<()> {
    let profile = book.profile(name)?;
    print!("{}", describe(&profile));
    Ok(())
}

/// Human-readable summary of a validated profile
pub fn describe(profile: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Profile \"{}\" is valid", profile.name);
    let _ = writeln!(out, "  joystick id:   {}", profile.joystick_id);
    let _ = writeln!(out, "  press hold:    {:?}", profile.press_hold);
    let _ = writeln!(
        out,
        "  hold repeat:   {:?} hold, {:?} delay, {:?} interval",
        profile.repeat_hold, profile.repeat.delay, profile.repeat.interval
    );

    let _ = writeln!(out, "Buttons:");
    if profile.buttons.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (index, mapping) in &profile.buttons {
        let hold = match mapping.press_override {
            Some(hold) if mapping.mode.uses_press_override() => format!(" ({hold:?})"),
            _ => String::new(),
        };
        let target = match mapping.axis {
            Some(axis) => format!("axis {axis} sections"),
            None => mapping.key.to_string(),
        };
        let _ = writeln!(
            out,
            "  {index:>3}  {:<8} {target}{hold}",
            mapping.mode.as_str()
        );
    }

    let _ = writeln!(out, "Axes:");
    if profile.axes.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (index, mapping) in &profile.axes {
        let invert = |on: bool| if on { ", inverted" } else { "" };
        let line = match mapping {
            AxisMapping::StepsToButtons {
                steps,
                invert: inv,
                key_positive,
                key_negative,
                tap_hold,
                tap_interval,
            } => format!(
                "{steps} steps, + {key_positive} / - {key_negative}, tap {tap_hold:?} every {tap_interval:?}{}",
                invert(*inv)
            ),
            AxisMapping::SectionsToKeys {
                buckets,
                keys,
                invert: inv,
                repeat,
                repeat_interval,
            } => {
                let keys: Vec<_> = keys
                    .iter()
                    .map(|k| if k.is_noop() { "-".to_string() } else { k.to_string() })
                    .collect();
                let repeat = if *repeat {
                    format!(", repeat every {repeat_interval:?}")
                } else {
                    String::new()
                };
                format!("{buckets} sections [{}]{repeat}{}", keys.join(" "), invert(*inv))
            }
        };
        let _ = writeln!(out, "  {index:>3}  {:<17} {line}", mapping.kind());
    }
    out
}

pub fn devices() {
    let pads = list_gamepads();
    if pads.is_empty() {
        println!("No gamepads found (check permissions on /dev/input/event*)");
        return;
    }
    for pad in pads {
        println!(
            "  [{}] {}  {}  {} button(s), {} axis/axes",
            pad.id,
            pad.name,
            pad.path.display(),
            pad.buttons,
            pad.axes
        );
    }
}

pub fn keys() {
    println!("Single characters (a, Z, 7, /, ...) map to themselves.");
    println!("Named keys:");
    for (name, description) in SPECIAL_KEYS {
        println!("  {name:<14} {description}");
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!("Ctrl+C handler failed: {e}");
            }
        }
        _ = terminate => {}
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_mappings() {
        let book = ProfileBook::from_json(
            r#"{ "menu": {
                "joystick_id": 1,
                "buttons": {
                    "0": { "key": "enter" },
                    "4": { "key": "a", "mode": "hold", "press_seconds": 0.5 },
                    "5": { "key": "b", "press_seconds": 0.25 },
                    "6": { "mode": "next", "axis": 3 }
                },
                "axes": {
                    "1": { "type": "steps_to_buttons", "steps": 8 },
                    "3": { "type": "sections_to_keys", "buckets": 3, "keys": ["z", "x"], "repeat": true }
                }
            } }"#,
        )
        .unwrap();
        let text = describe(&book.profile("menu").unwrap());

        assert!(text.starts_with("Profile \"menu\" is valid\n"));
        assert!(text.contains("joystick id:   1"));
        assert!(text.contains("  0  single   enter"));
        assert!(text.contains("  4  hold     a\n"));
        assert!(text.contains("  5  single   b (250ms)"));
        assert!(text.contains("  6  next     axis 3 sections"));
        assert!(text.contains("steps_to_buttons  8 steps, + down / - up"));
        assert!(text.contains("3 sections [z x -], repeat every 500ms"));
    }

    #[test]
    fn test_describe_empty_profile() {
        let book = ProfileBook::from_json(r#"{ "empty": {} }"#).unwrap();
        let text = describe(&book.profile("empty").unwrap());
        assert_eq!(text.matches("(none)").count(), 2);
    }
}
