//! Terminal stand-ins for the map, form, list and alerts used by the CLI.

use crate::dlog;
use crate::render::{ListEntry, PopupOptions};
use crate::surfaces::{
    EntryForm, FormValues, GeoError, Geolocation, MapWidget, MarkerId, Notifier, PanOptions,
    WorkoutList,
};
use crate::types::{Coordinates, WorkoutKind};
use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub at: Coordinates,
    pub popup: Option<String>,
}

/// Keeps the map's view and markers so they can be reported.
#[derive(Debug, Default)]
pub struct TerminalMap {
    pub view: Option<(Coordinates, u8)>,
    pub markers: Vec<Marker>,
    pub tiles: Option<String>,
}

impl MapWidget for TerminalMap {
    fn create_map(&mut self, center: Coordinates, zoom: u8) {
        self.view = Some((center, zoom));
        self.markers.clear();
    }

    fn add_tile_layer(&mut self, url_template: &str, _attribution: &str) {
        self.tiles = Some(url_template.to_string());
    }

    fn add_marker(&mut self, at: Coordinates) -> MarkerId {
        self.markers.push(Marker { at, popup: None });
        MarkerId(self.markers.len() - 1)
    }

    fn bind_popup(&mut self, marker: MarkerId, content: &str, options: &PopupOptions) {
        if let Some(m) = self.markers.get_mut(marker.0) {
            dlog!("popup {} on {}: {content}", options.class_name, m.at);
            m.popup = Some(content.to_string());
        }
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8, pan: Option<PanOptions>) {
        if let Some(pan) = pan {
            dlog!("panning to {center} over {:?}", pan.duration);
        }
        self.view = Some((center, zoom));
    }

    fn destroy(&mut self) {
        *self = Self::default();
    }
}

/// Position given up front (flag or environment). `None` means no geolocation.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Option<Coordinates>);

impl Geolocation for FixedPosition {
    fn current_position(&mut self) -> Result<Coordinates, GeoError> {
        self.0.ok_or(GeoError::Unsupported)
    }
}

/// Form whose fields were filled from the command line.
#[derive(Debug)]
pub struct PresetForm {
    values: FormValues,
}

impl PresetForm {
    pub const fn new(values: FormValues) -> Self {
        Self { values }
    }
}

impl Default for PresetForm {
    fn default() -> Self {
        Self::new(FormValues::empty(WorkoutKind::Running))
    }
}

impl EntryForm for PresetForm {
    fn values(&self) -> FormValues {
        self.values.clone()
    }

    fn show(&mut self) {}

    fn focus_distance(&mut self) {}

    fn clear(&mut self) {
        self.values = FormValues::empty(self.values.kind);
    }

    fn hide(&mut self, _restore_after: Duration) {}

    fn show_rows_for(&mut self, kind: WorkoutKind) {
        self.values.kind = kind;
    }
}

/// Entries in display order, newest on top.
#[derive(Debug, Default)]
pub struct TerminalList {
    pub entries: Vec<ListEntry>,
}

impl TerminalList {
    pub fn print(&self, out: &mut impl Write) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{entry}")?;
        }
        Ok(())
    }
}

impl WorkoutList for TerminalList {
    fn prepend(&mut self, entry: &ListEntry) {
        self.entries.insert(0, entry.clone());
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Writes alerts to stderr and keeps them.
#[derive(Debug, Default)]
pub struct StderrNotifier {
    pub alerts: Vec<String>,
}

impl Notifier for StderrNotifier {
    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
        self.alerts.push(message.to_string());
    }
}
