// CLI definitions using clap

use clap::{Parser, Subcommand};
use padkeys_engine::{DEFAULT_RATE_HZ, INSPECT_RATE_HZ};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "padkeys")]
#[command(author, version, about = "Map gamepad buttons and sticks to keystrokes")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Profile book (default: ./profiles.json, then ~/.config/padkeys/profiles.json)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub profiles: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a profile: read the gamepad and inject keystrokes
    #[command(visible_alias = "r")]
    Run {
        /// Profile name
        profile: String,
        /// Gamepad to read (overrides the profile's joystick_id)
        #[arg(short, long)]
        joystick_id: Option<usize>,
        /// Tick rate in Hz
        #[arg(long, default_value_t = DEFAULT_RATE_HZ)]
        rate: u32,
        /// Log key presses instead of injecting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print raw button transitions and axis values
    #[command(visible_alias = "i")]
    Inspect {
        /// Take the gamepad id from this profile
        profile: Option<String>,
        /// Gamepad to read
        #[arg(short, long)]
        joystick_id: Option<usize>,
        /// Tick rate in Hz
        #[arg(long, default_value_t = INSPECT_RATE_HZ)]
        rate: u32,
    },

    /// List profiles in the profile book
    #[command(visible_alias = "ls")]
    Profiles,

    /// Validate one profile and print its mappings
    Check {
        /// Profile name
        profile: String,
    },

    /// List detected gamepads
    #[command(visible_alias = "dev")]
    Devices,

    /// List named keys usable in profiles
    Keys,
}
