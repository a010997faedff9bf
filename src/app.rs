use crate::dlog;
use crate::render::{list_entry, marker_popup};
use crate::storage::KeyValueStore;
use crate::store::{self, DuplicateId, WorkoutStore};
use crate::surfaces::{
    EntryForm, FormValues, GeoError, Geolocation, MapWidget, Notifier, PanOptions, Surfaces,
    WorkoutList,
};
use crate::types::{Coordinates, Workout, WorkoutKind};
use crate::utils::coerce_number;
use crate::workout::{ValidationError, WorkoutInput};
use chrono::{DateTime, Local};
use std::time::Duration;
use thiserror::Error;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

pub const INVALID_INPUT_ALERT: &str = "Input has to be positive numbers";
pub const NO_POSITION_ALERT: &str = "Could not get the position";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppConfig {
    pub zoom: u8,
    pub pan_duration: Duration,
    pub form_restore_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zoom: 13,
            pan_duration: Duration::from_secs(1),
            form_restore_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    /// Waiting for the first position fix; no map yet.
    AwaitingLocation,
    /// The position could not be obtained. No map for the rest of the session.
    Unavailable,
    /// Map shown, form hidden.
    Idle,
    /// Map clicked at `click`, form shown.
    FormOpen { click: Coordinates },
}

impl State {
    pub const fn map_ready(&self) -> bool {
        matches!(self, Self::Idle | Self::FormOpen { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("no map click is pending")]
    FormClosed,
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Duplicate(#[from] DuplicateId),
}

type Clock = Box<dyn Fn() -> DateTime<Local>>;

/// Coordinates the map, the entry form, the workout list and storage.
///
/// Every `on_*` method handles one discrete event and runs to completion.
pub struct App<M, F, L, N, S> {
    surfaces: Surfaces<M, F, L, N>,
    storage: S,
    config: AppConfig,
    store: WorkoutStore,
    state: State,
    clock: Clock,
}

impl<M, F, L, N, S> App<M, F, L, N, S>
where
    M: MapWidget,
    F: EntryForm,
    L: WorkoutList,
    N: Notifier,
    S: KeyValueStore,
{
    pub fn new(surfaces: Surfaces<M, F, L, N>, storage: S, config: AppConfig) -> Self {
        Self {
            surfaces,
            storage,
            config,
            store: WorkoutStore::new(),
            state: State::AwaitingLocation,
            clock: Box::new(Local::now),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Local> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Loads stored workouts and lists them. Markers wait for the map.
    pub fn boot(&mut self) {
        self.store = store::load(&self.storage);
        for w in &self.store {
            self.surfaces.list.prepend(&list_entry(w));
        }
        tracing::info!(workouts = self.store.len(), "session started");
    }

    /// Asks `geo` for a position once and handles the answer.
    pub fn locate(&mut self, geo: &mut impl Geolocation) {
        let fix = geo.current_position();
        self.on_position(fix);
    }

    pub fn on_position(&mut self, fix: Result<Coordinates, GeoError>) {
        if self.state != State::AwaitingLocation {
            dlog!("ignoring position update in state {:?}", self.state);
            return;
        }

        match fix {
            Ok(center) => {
                let map = &mut self.surfaces.map;
                map.create_map(center, self.config.zoom);
                map.add_tile_layer(TILE_URL, TILE_ATTRIBUTION);
                self.state = State::Idle;
                tracing::info!(%center, zoom = self.config.zoom, "map ready");

                for w in &self.store {
                    place_marker(&mut self.surfaces.map, w);
                }
            }
            Err(e) => {
                tracing::warn!(err = %e, "no position, map stays unavailable");
                self.state = State::Unavailable;
                self.surfaces.notifier.alert(NO_POSITION_ALERT);
            }
        }
    }

    /// Remembers where the map was clicked and opens the form.
    pub fn on_map_click(&mut self, at: Coordinates) -> bool {
        if !self.state.map_ready() {
            dlog!("map click without a map: {at}");
            return false;
        }

        self.state = State::FormOpen { click: at };
        self.surfaces.form.show();
        self.surfaces.form.focus_distance();
        dlog!("form open at {at}");
        true
    }

    pub fn on_kind_change(&mut self, kind: WorkoutKind) {
        self.surfaces.form.show_rows_for(kind);
    }

    /// Validates the form and, on success, records and renders a new workout.
    ///
    /// A rejected submission leaves the form open with its values untouched.
    pub fn on_submit(&mut self) -> Result<Workout, SubmitError> {
        let State::FormOpen { click } = self.state else {
            return Err(SubmitError::FormClosed);
        };

        let input = read_input(&self.surfaces.form.values());
        let created_at = (self.clock)();
        let id = self.store.next_id(created_at);

        let workout = match Workout::new(id, created_at, click, input) {
            Ok(w) => w,
            Err(e) => {
                tracing::info!(err = %e, "rejected workout input");
                self.surfaces.notifier.alert(INVALID_INPUT_ALERT);
                return Err(e.into());
            }
        };

        let workout = self.store.push(workout)?.clone();

        self.surfaces.form.clear();
        self.surfaces.form.hide(self.config.form_restore_delay);
        self.state = State::Idle;

        place_marker(&mut self.surfaces.map, &workout);
        self.surfaces.list.prepend(&list_entry(&workout));
        self.persist();

        tracing::info!(id = %workout.id(), kind = %workout.kind(), "workout added");
        Ok(workout)
    }

    /// Pans to the workout behind a list click. Clicks that hit no entry,
    /// or an id that is not stored, do nothing.
    pub fn on_list_click(&mut self, id: Option<&str>) -> bool {
        let Some(id) = id else {
            return false;
        };
        let Some(workout) = self.store.find(id) else {
            dlog!("list click on unknown id {id}");
            return false;
        };
        if !self.state.map_ready() {
            dlog!("list click before the map is ready");
            return false;
        }

        let pan = PanOptions {
            animate: true,
            duration: self.config.pan_duration,
        };
        self.surfaces
            .map
            .set_view(workout.coords(), self.config.zoom, Some(pan));
        true
    }

    /// Drops every stored workout and restarts the session from empty.
    ///
    /// The session is restarted even when storage could not be cleared;
    /// that failure is returned so the caller can report it.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        let cleared = store::clear(&mut self.storage);
        if let Err(e) = &cleared {
            tracing::error!(err = %e, "could not clear stored workouts");
        }

        self.surfaces.list.clear();
        self.surfaces.form.clear();
        self.surfaces.form.hide(Duration::ZERO);
        self.surfaces.map.destroy();
        self.state = State::AwaitingLocation;
        tracing::info!("session reset");

        self.boot();
        cleared
    }

    fn persist(&mut self) {
        if let Err(e) = store::save(&mut self.storage, &self.store) {
            tracing::error!(err = %format!("{e:#}"), "could not store workouts");
        }
    }

    pub const fn state(&self) -> State {
        self.state
    }

    pub const fn workouts(&self) -> &WorkoutStore {
        &self.store
    }

    pub const fn surfaces(&self) -> &Surfaces<M, F, L, N> {
        &self.surfaces
    }

    pub const fn surfaces_mut(&mut self) -> &mut Surfaces<M, F, L, N> {
        &mut self.surfaces
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

fn place_marker(map: &mut impl MapWidget, workout: &Workout) {
    let popup = marker_popup(workout);
    let marker = map.add_marker(workout.coords());
    map.bind_popup(marker, &popup.content, &popup.options);
}

fn read_input(values: &FormValues) -> WorkoutInput {
    let distance_km = coerce_number(&values.distance);
    let duration_min = coerce_number(&values.duration);
    match values.kind {
        WorkoutKind::Running => WorkoutInput::Running {
            distance_km,
            duration_min,
            cadence_spm: coerce_number(&values.cadence),
        },
        WorkoutKind::Cycling => WorkoutInput::Cycling {
            distance_km,
            duration_min,
            elevation_gain_m: coerce_number(&values.elevation),
        },
    }
}
