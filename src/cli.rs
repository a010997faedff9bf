use crate::types::{Coordinates, WorkoutKind};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pinlog",
    version,
    about = "Log running and cycling workouts as pins on a map"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,

    /// SQLite file holding the stored workouts.
    ///
    /// Default: <data dir>/pinlog/pinlog.sqlite3
    #[arg(long, env = "PINLOG_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Current position as LAT,LON. Without it the map cannot be shown.
    #[arg(
        long,
        env = "PINLOG_POSITION",
        value_name = "LAT,LON",
        value_parser = parse_coordinates,
        allow_hyphen_values = true,
        global = true
    )]
    pub here: Option<Coordinates>,

    /// Map zoom level.
    #[arg(long, default_value_t = 13, global = true)]
    pub zoom: u8,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// List stored workouts, newest first
    List,

    /// Drop a pin and log a workout there
    Add {
        #[arg(value_enum)]
        kind: WorkoutKind,

        /// Distance in km
        #[arg(long, allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes
        #[arg(long, allow_hyphen_values = true)]
        duration: String,

        /// Steps per minute (running)
        #[arg(long, allow_hyphen_values = true)]
        cadence: Option<String>,

        /// Elevation gain in meters (cycling)
        #[arg(long, allow_hyphen_values = true)]
        elevation: Option<String>,

        /// Where to drop the pin. Defaults to the current position.
        #[arg(long, value_name = "LAT,LON", value_parser = parse_coordinates, allow_hyphen_values = true)]
        at: Option<Coordinates>,
    },

    /// Move the map to a logged workout
    Show {
        /// Workout id as shown by `list`
        id: String,
    },

    /// Forget every stored workout
    Reset,
}

pub fn parse_coordinates(s: &str) -> Result<Coordinates, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("bad longitude {lng:?}: {e}"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinates out of range: {lat},{lng}"));
    }
    Ok(Coordinates::new(lat, lng))
}
