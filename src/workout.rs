use crate::types::{Coordinates, Metrics, Workout, WorkoutKind, WorkoutRecord};
use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("unknown workout type {0:?}")]
    UnknownKind(String),
    #[error("{kind} record is missing {field}")]
    MissingField {
        kind: WorkoutKind,
        field: &'static str,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Numbers entered for a new workout, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutInput {
    Running {
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    },
    Cycling {
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    },
}

impl WorkoutInput {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    const fn base(&self) -> (f64, f64) {
        match *self {
            Self::Running {
                distance_km,
                duration_min,
                ..
            }
            | Self::Cycling {
                distance_km,
                duration_min,
                ..
            } => (distance_km, duration_min),
        }
    }

    /// Every field must be finite; distance and duration strictly positive.
    /// Cadence must be positive, elevation gain may be zero but not negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (distance_km, duration_min) = self.base();
        finite("distance", distance_km)?;
        finite("duration", duration_min)?;
        match *self {
            Self::Running { cadence_spm, .. } => finite("cadence", cadence_spm)?,
            Self::Cycling {
                elevation_gain_m, ..
            } => finite("elevation gain", elevation_gain_m)?,
        }

        positive("distance", distance_km)?;
        positive("duration", duration_min)?;
        match *self {
            Self::Running { cadence_spm, .. } => positive("cadence", cadence_spm),
            Self::Cycling {
                elevation_gain_m, ..
            } => {
                if elevation_gain_m < 0.0 {
                    return Err(ValidationError::Negative {
                        field: "elevation gain",
                        value: elevation_gain_m,
                    });
                }
                Ok(())
            }
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

/// Minutes per kilometer.
pub fn pace(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

/// `distance / duration`, shown as km/h.
pub fn speed(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / duration_min
}

/// "Running on January 5"
pub fn describe(kind: WorkoutKind, created_at: DateTime<Local>) -> String {
    format!("{} on {}", kind.label(), created_at.format("%B %-d"))
}

/// Last ten digits of the epoch-millisecond timestamp.
pub fn id_from_time(created_at: DateTime<Local>) -> String {
    let millis = created_at.timestamp_millis().unsigned_abs().to_string();
    let start = millis.len().saturating_sub(10);
    millis[start..].to_string()
}

impl Workout {
    /// Validates the input, then derives the metric and description exactly once.
    pub fn new(
        id: String,
        created_at: DateTime<Local>,
        coords: Coordinates,
        input: WorkoutInput,
    ) -> Result<Self, ValidationError> {
        finite("latitude", coords.lat)?;
        finite("longitude", coords.lng)?;
        input.validate()?;

        let (distance_km, duration_min) = input.base();
        let metrics = match input {
            WorkoutInput::Running { cadence_spm, .. } => Metrics::Running {
                cadence_spm,
                pace_min_per_km: pace(distance_km, duration_min),
            },
            WorkoutInput::Cycling {
                elevation_gain_m, ..
            } => Metrics::Cycling {
                elevation_gain_m,
                speed_km_per_h: speed(distance_km, duration_min),
            },
        };

        Ok(Self {
            id,
            description: describe(input.kind(), created_at),
            created_at,
            coords,
            distance_km,
            duration_min,
            metrics,
        })
    }

    pub fn running(
        id: String,
        created_at: DateTime<Local>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(
            id,
            created_at,
            coords,
            WorkoutInput::Running {
                distance_km,
                duration_min,
                cadence_spm,
            },
        )
    }

    pub fn cycling(
        id: String,
        created_at: DateTime<Local>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(
            id,
            created_at,
            coords,
            WorkoutInput::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m,
            },
        )
    }

    /// Rebuilds a workout from stored fields, re-running construction.
    /// Stored derived values are ignored.
    pub fn from_record(record: WorkoutRecord) -> Result<Self, RecordError> {
        let kind = WorkoutKind::parse(&record.kind)
            .ok_or_else(|| RecordError::UnknownKind(record.kind.clone()))?;

        let input = match kind {
            WorkoutKind::Running => WorkoutInput::Running {
                distance_km: record.distance,
                duration_min: record.duration,
                cadence_spm: record.cadence.ok_or(RecordError::MissingField {
                    kind,
                    field: "cadence",
                })?,
            },
            WorkoutKind::Cycling => WorkoutInput::Cycling {
                distance_km: record.distance,
                duration_min: record.duration,
                elevation_gain_m: record.elevation_gain.ok_or(RecordError::MissingField {
                    kind,
                    field: "elevationGain",
                })?,
            },
        };

        Ok(Self::new(record.id, record.date, record.coords, input)?)
    }

    pub fn to_record(&self) -> WorkoutRecord {
        let (cadence, elevation_gain, pace, speed) = match self.metrics {
            Metrics::Running {
                cadence_spm,
                pace_min_per_km,
            } => (Some(cadence_spm), None, Some(pace_min_per_km), None),
            Metrics::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => (None, Some(elevation_gain_m), None, Some(speed_km_per_h)),
        };

        WorkoutRecord {
            id: self.id.clone(),
            date: self.created_at,
            coords: self.coords,
            distance: self.distance_km,
            duration: self.duration_min,
            kind: self.kind().as_str().to_string(),
            cadence,
            elevation_gain,
            pace,
            speed,
            description: Some(self.description.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jan5() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap()
    }

    fn here() -> Coordinates {
        Coordinates::new(50.45, 30.52)
    }

    #[test]
    fn running_derives_pace() {
        let w = Workout::running("1".into(), jan5(), here(), 5.0, 30.0, 160.0).unwrap();
        let Metrics::Running {
            pace_min_per_km, ..
        } = *w.metrics()
        else {
            panic!("expected running metrics");
        };
        assert!((pace_min_per_km - 6.0).abs() < 1e-12);
        assert_eq!(w.description(), "Running on January 5");
    }

    #[test]
    fn cycling_derives_speed() {
        let w = Workout::cycling("2".into(), jan5(), here(), 27.0, 95.0, 523.0).unwrap();
        let Metrics::Cycling { speed_km_per_h, .. } = *w.metrics() else {
            panic!("expected cycling metrics");
        };
        assert!((speed_km_per_h - 27.0 / 95.0).abs() < 1e-12);
        assert_eq!(w.description(), "Cycling on January 5");
    }

    #[test]
    fn description_has_no_leading_zero_and_full_month() {
        let at = Local.with_ymd_and_hms(2023, 11, 21, 18, 0, 0).unwrap();
        assert_eq!(describe(WorkoutKind::Cycling, at), "Cycling on November 21");
        let at = Local.with_ymd_and_hms(2023, 9, 3, 7, 0, 0).unwrap();
        assert_eq!(describe(WorkoutKind::Running, at), "Running on September 3");
    }

    #[test]
    fn rejects_zero_distance_and_nan_duration() {
        let err = Workout::running("1".into(), jan5(), here(), 0.0, 30.0, 160.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotPositive {
                field: "distance",
                value: 0.0
            }
        );

        let err = Workout::cycling("1".into(), jan5(), here(), 5.0, f64::NAN, 0.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotFinite {
                field: "duration",
                ..
            }
        ));
    }

    #[test]
    fn cadence_must_be_positive_but_elevation_may_be_zero() {
        assert!(Workout::running("1".into(), jan5(), here(), 5.0, 30.0, 0.0).is_err());
        assert!(Workout::cycling("1".into(), jan5(), here(), 5.0, 30.0, 0.0).is_ok());
        assert!(matches!(
            Workout::cycling("1".into(), jan5(), here(), 5.0, 30.0, -4.0),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn rehydration_recomputes_derived_fields() {
        let w = Workout::running("77".into(), jan5(), here(), 10.0, 50.0, 170.0).unwrap();
        let mut record = w.to_record();
        record.pace = Some(999.0);
        record.description = Some("stale".into());

        let back = Workout::from_record(record).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn rehydration_rejects_unknown_kind_and_missing_fields() {
        let w = Workout::cycling("5".into(), jan5(), here(), 10.0, 20.0, 100.0).unwrap();

        let mut record = w.to_record();
        record.kind = "swimming".into();
        assert_eq!(
            Workout::from_record(record),
            Err(RecordError::UnknownKind("swimming".into()))
        );

        let mut record = w.to_record();
        record.elevation_gain = None;
        assert!(matches!(
            Workout::from_record(record),
            Err(RecordError::MissingField {
                field: "elevationGain",
                ..
            })
        ));
    }

    #[test]
    fn id_keeps_last_ten_digits() {
        let at = Local.timestamp_millis_opt(1_704_447_000_123).unwrap();
        assert_eq!(id_from_time(at), "4447000123");
    }
}
