use crate::types::{Metrics, Workout, WorkoutKind};
use crate::utils::format_number;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    pub min_width: u16,
    pub max_width: u16,
    pub auto_close: bool,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub content: String,
    pub options: PopupOptions,
}

pub fn marker_popup(workout: &Workout) -> Popup {
    let kind = workout.kind();
    Popup {
        content: format!("{} {}", kind.icon(), workout.description()),
        options: PopupOptions {
            min_width: 100,
            max_width: 250,
            auto_close: false,
            class_name: format!("{kind}-popup"),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl DetailRow {
    const fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

/// One entry of the workout list, keyed by workout id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub kind: WorkoutKind,
    pub title: String,
    pub rows: Vec<DetailRow>,
}

pub fn list_entry(workout: &Workout) -> ListEntry {
    let kind = workout.kind();
    let mut rows = vec![
        DetailRow::new(kind.icon(), format_number(workout.distance_km()), "km"),
        DetailRow::new("⏱", format_number(workout.duration_min()), "min"),
    ];

    match *workout.metrics() {
        Metrics::Running {
            cadence_spm,
            pace_min_per_km,
        } => {
            rows.push(DetailRow::new("⚡️", format!("{pace_min_per_km:.1}"), "min/km"));
            rows.push(DetailRow::new("🦶🏼", format_number(cadence_spm), "spm"));
        }
        Metrics::Cycling {
            elevation_gain_m,
            speed_km_per_h,
        } => {
            rows.push(DetailRow::new("⚡️", format!("{speed_km_per_h:.1}"), "km/h"));
            rows.push(DetailRow::new("⛰", format_number(elevation_gain_m), "m"));
        }
    }

    ListEntry {
        id: workout.id().to_string(),
        kind,
        title: workout.description().to_string(),
        rows,
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)?;
        for row in &self.rows {
            write!(f, "  {} {} {}", row.icon, row.value, row.unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;
    use chrono::{Local, TimeZone};

    fn jan5() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap()
    }

    #[test]
    fn popup_carries_icon_and_variant_class() {
        let w = Workout::running("1".into(), jan5(), Coordinates::new(0.0, 0.0), 5.0, 30.0, 160.0)
            .unwrap();
        let popup = marker_popup(&w);
        assert_eq!(popup.content, "🏃‍♂️ Running on January 5");
        assert_eq!(popup.options.class_name, "running-popup");
        assert!(!popup.options.auto_close);
    }

    #[test]
    fn running_entry_rows() {
        let w = Workout::running("1".into(), jan5(), Coordinates::new(0.0, 0.0), 5.0, 32.0, 160.0)
            .unwrap();
        let entry = list_entry(&w);
        let values: Vec<_> = entry.rows.iter().map(|r| (r.value.as_str(), r.unit)).collect();
        assert_eq!(
            values,
            [("5", "km"), ("32", "min"), ("6.4", "min/km"), ("160", "spm")]
        );
    }

    #[test]
    fn cycling_entry_shows_speed_and_elevation() {
        let w = Workout::cycling("2".into(), jan5(), Coordinates::new(0.0, 0.0), 27.5, 11.0, 0.0)
            .unwrap();
        let entry = list_entry(&w);
        assert_eq!(entry.kind, WorkoutKind::Cycling);
        assert_eq!(entry.rows.len(), 4);
        assert_eq!(entry.rows[2].value, "2.5");
        assert_eq!(entry.rows[2].unit, "km/h");
        assert_eq!(entry.rows[3].value, "0");
        assert_eq!(entry.rows[3].unit, "m");
        assert!(entry.to_string().starts_with("[2] Cycling on January 5"));
    }
}
