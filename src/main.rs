#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use pinlog::app::{App, AppConfig};
use pinlog::database::SqliteStore;
use pinlog::surfaces::{FormValues, Surfaces};
use pinlog::terminal::{FixedPosition, PresetForm, StderrNotifier, TerminalList, TerminalMap};
use pinlog::types::WorkoutKind;
use pinlog::{cli, utils};
use std::io;
use std::path::PathBuf;

#[macro_use]
extern crate pinlog;

type CliApp = App<TerminalMap, PresetForm, TerminalList, StderrNotifier, SqliteStore>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let db_path = cli.db.clone().unwrap_or_else(default_db_path);
    dlog!("db={} here={:?} zoom={}", db_path.display(), cli.here, cli.zoom);

    let config = AppConfig {
        zoom: cli.zoom,
        ..AppConfig::default()
    };
    let mut geo = FixedPosition(cli.here);

    match cli.cmd.unwrap_or(cli::Cmd::List) {
        cli::Cmd::List => {
            let mut app = session(&db_path, config, FormValues::empty(WorkoutKind::Running))?;
            app.locate(&mut geo);
            print_list(&app)
        }
        cli::Cmd::Add {
            kind,
            distance,
            duration,
            cadence,
            elevation,
            at,
        } => {
            let values = FormValues {
                kind,
                distance,
                duration,
                cadence: cadence.unwrap_or_default(),
                elevation: elevation.unwrap_or_default(),
            };
            let mut app = session(&db_path, config, values)?;
            app.locate(&mut geo);

            if !app.state().map_ready() {
                bail!("No map without a position. Pass --here LAT,LON or set PINLOG_POSITION.");
            }
            let Some(pin) = at.or(cli.here) else {
                bail!("No position to drop the pin at.");
            };

            app.on_kind_change(kind);
            app.on_map_click(pin);
            let workout = app.on_submit().context("Workout not added")?;

            println!("added {} ({})", workout.description(), workout.id());
            print_list(&app)
        }
        cli::Cmd::Show { id } => {
            let mut app = session(&db_path, config, FormValues::empty(WorkoutKind::Running))?;
            app.locate(&mut geo);

            let Some(workout) = app.workouts().find(&id) else {
                bail!("No workout with id {id}");
            };
            let target = workout.coords();

            if !app.on_list_click(Some(&id)) {
                bail!("No map without a position. Pass --here LAT,LON or set PINLOG_POSITION.");
            }
            println!("map centered on {target} (zoom {})", config.zoom);
            Ok(())
        }
        cli::Cmd::Reset => {
            let mut app = session(&db_path, config, FormValues::empty(WorkoutKind::Running))?;
            app.reset().context("Could not remove stored workouts")?;
            println!("all workouts removed");
            Ok(())
        }
    }
}

fn session(db_path: &std::path::Path, config: AppConfig, values: FormValues) -> Result<CliApp> {
    let storage = SqliteStore::open(db_path)?;
    let surfaces = Surfaces {
        map: TerminalMap::default(),
        form: PresetForm::new(values),
        list: TerminalList::default(),
        notifier: StderrNotifier::default(),
    };

    let mut app = App::new(surfaces, storage, config);
    app.boot();
    Ok(app)
}

fn print_list(app: &CliApp) -> Result<()> {
    let list = &app.surfaces().list;
    if list.entries.is_empty() {
        println!("no workouts yet");
        return Ok(());
    }
    list.print(&mut io::stdout().lock()).context("Writing workout list")
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pinlog")
        .join("pinlog.sqlite3")
}
