//! Seams between the controller and the things it drives: the map, the
//! location source, the entry form, the workout list and user alerts.

use crate::render::{ListEntry, PopupOptions};
use crate::types::{Coordinates, WorkoutKind};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration: Duration,
}

pub trait MapWidget {
    fn create_map(&mut self, center: Coordinates, zoom: u8);
    fn add_tile_layer(&mut self, url_template: &str, attribution: &str);
    fn add_marker(&mut self, at: Coordinates) -> MarkerId;
    /// Attaches a popup to `marker` and opens it.
    fn bind_popup(&mut self, marker: MarkerId, content: &str, options: &PopupOptions);
    fn set_view(&mut self, center: Coordinates, zoom: u8, pan: Option<PanOptions>);
    /// Tears the map down; the next `create_map` starts from nothing.
    fn destroy(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("geolocation is not available")]
    Unsupported,
}

/// One-shot position lookup.
pub trait Geolocation {
    fn current_position(&mut self) -> Result<Coordinates, GeoError>;
}

/// Raw field contents of the entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl FormValues {
    pub const fn empty(kind: WorkoutKind) -> Self {
        Self {
            kind,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
        }
    }
}

pub trait EntryForm {
    fn values(&self) -> FormValues;
    fn show(&mut self);
    fn focus_distance(&mut self);
    /// Empties all numeric inputs.
    fn clear(&mut self);
    /// Hides the form; the form restores its layout after `restore_after`
    /// but stays logically hidden until shown again.
    fn hide(&mut self, restore_after: Duration);
    /// Shows the cadence row for running, the elevation row for cycling.
    fn show_rows_for(&mut self, kind: WorkoutKind);
}

pub trait WorkoutList {
    /// Inserts an entry above all existing ones.
    fn prepend(&mut self, entry: &ListEntry);
    fn clear(&mut self);
}

pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// Everything the controller renders into.
#[derive(Debug, Default)]
pub struct Surfaces<M, F, L, N> {
    pub map: M,
    pub form: F,
    pub list: L,
    pub notifier: N,
}
