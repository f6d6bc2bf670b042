//! Birth input validation and the geocoding/timezone collaborator.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Utc};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ephemeris::types::GeoLocation;
use crate::error::{KundliError, Result};

pub const MIN_BIRTH_YEAR: i32 = 1800;
pub const MAX_NAME_LEN: usize = 200;
pub const FALLBACK_TIMEZONE: &str = "UTC";

const SUSPICIOUS_PLACE: &str = r"https?://|<|>|\n|\r";

lazy_static::lazy_static! {
    static ref PLACE_FILTER: Option<Regex> = Regex::new(SUSPICIOUS_PLACE).ok();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceQuery {
    Text(String),
    Coordinates { lat: f64, lon: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub lat: f64,
    pub lon: f64,
    /// IANA name; `None` when the resolver could not tell.
    pub timezone: Option<String>,
}

/// Place-name and timezone resolution. Implementations typically call out to
/// a network service and should map timeouts to `UpstreamUnavailable`.
pub trait Geocoder {
    fn resolve(&self, query: &PlaceQuery) -> Result<ResolvedPlace>;

    /// Offset of `timezone` from UTC at the given local wall-clock time.
    fn utc_offset(&self, timezone: &str, local: NaiveDateTime) -> Result<FixedOffset>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthInput {
    pub name: String,
    pub local_datetime: NaiveDateTime,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub unknown_time: bool,
}

impl BirthInput {
    /// Reject malformed or out-of-range birth data.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(KundliError::input(format!(
                "Name must be between 1 and {} characters",
                MAX_NAME_LEN
            )));
        }
        // a naive birth time is compared as if it were UTC
        if Utc.from_utc_datetime(&self.local_datetime) > now {
            return Err(KundliError::input("Birth date cannot be in the future"));
        }
        if self.local_datetime.year() < MIN_BIRTH_YEAR {
            return Err(KundliError::input(format!(
                "Birth year must be after {}",
                MIN_BIRTH_YEAR
            )));
        }
        let suspicious = PLACE_FILTER
            .as_ref()
            .ok_or_else(|| KundliError::Configuration("place filter pattern rejected".into()))?;
        if suspicious.is_match(&self.place) {
            return Err(KundliError::input("Invalid place format"));
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(KundliError::input(format!("Latitude out of range: {}", lat)));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(KundliError::input(format!("Longitude out of range: {}", lon)));
                }
            }
            (None, None) => {
                if self.place.trim().is_empty() {
                    return Err(KundliError::input("Either a place or coordinates are required"));
                }
            }
            _ => return Err(KundliError::input("Latitude and longitude must be given together")),
        }
        Ok(())
    }

    /// Local wall-clock time, with an unknown birth time moved to noon.
    pub fn normalized_local(&self) -> NaiveDateTime {
        if self.unknown_time {
            self.local_datetime
                .date()
                .and_hms_opt(12, 0, 0)
                .unwrap_or(self.local_datetime)
        } else {
            self.local_datetime
        }
    }

    fn query(&self) -> PlaceQuery {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => PlaceQuery::Coordinates { lat, lon },
            _ => PlaceQuery::Text(self.place.trim().to_string()),
        }
    }
}

/// A birth moment pinned to UTC and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBirth {
    pub instant: DateTime<Utc>,
    pub location: GeoLocation,
    pub timezone: String,
}

/// Validate, normalize and resolve a birth input to a UTC instant and location.
pub fn resolve_birth(
    input: &BirthInput,
    geocoder: &dyn Geocoder,
    now: DateTime<Utc>,
) -> Result<ResolvedBirth> {
    input.validate(now)?;
    let local = input.normalized_local();

    let (location, timezone) = match (input.lat, input.lon, &input.timezone) {
        // nothing left to look up
        (Some(lat), Some(lon), Some(tz)) => (GeoLocation { lat, lon }, tz.clone()),
        _ => {
            let resolved = geocoder.resolve(&input.query())?;
            let location = match (input.lat, input.lon) {
                (Some(lat), Some(lon)) => GeoLocation { lat, lon },
                _ => GeoLocation { lat: resolved.lat, lon: resolved.lon },
            };
            let timezone = input
                .timezone
                .clone()
                .or(resolved.timezone)
                .unwrap_or_else(|| FALLBACK_TIMEZONE.to_string());
            (location, timezone)
        }
    };

    let offset = geocoder.utc_offset(&timezone, local)?;
    let instant = offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| KundliError::input(format!("Ambiguous local time {} in {}", local, timezone)))?;

    debug!(
        "Resolved birth {} ({}) -> {} at ({:.4}, {:.4})",
        local, timezone, instant, location.lat, location.lon
    );
    Ok(ResolvedBirth { instant, location, timezone })
}

/// In-memory resolver with fixed places and fixed (non-DST) offsets.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: BTreeMap<String, ResolvedPlace>,
    offsets: BTreeMap<String, i32>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, lat: f64, lon: f64, timezone: &str) -> Self {
        self.places.insert(
            name.to_lowercase(),
            ResolvedPlace { lat, lon, timezone: Some(timezone.to_string()) },
        );
        self
    }

    pub fn with_offset(mut self, timezone: &str, offset_seconds: i32) -> Self {
        self.offsets.insert(timezone.to_string(), offset_seconds);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn resolve(&self, query: &PlaceQuery) -> Result<ResolvedPlace> {
        match query {
            PlaceQuery::Text(place) => self
                .places
                .get(&place.to_lowercase())
                .cloned()
                .ok_or_else(|| KundliError::input(format!("Could not find location: {}", place))),
            PlaceQuery::Coordinates { lat, lon } => {
                // nearest known place supplies the timezone
                let timezone = self
                    .places
                    .values()
                    .min_by(|a, b| {
                        let da = (a.lat - lat).powi(2) + (a.lon - lon).powi(2);
                        let db = (b.lat - lat).powi(2) + (b.lon - lon).powi(2);
                        da.total_cmp(&db)
                    })
                    .and_then(|place| place.timezone.clone());
                Ok(ResolvedPlace { lat: *lat, lon: *lon, timezone })
            }
        }
    }

    fn utc_offset(&self, timezone: &str, _local: NaiveDateTime) -> Result<FixedOffset> {
        if timezone == FALLBACK_TIMEZONE {
            return FixedOffset::east_opt(0)
                .ok_or_else(|| KundliError::input("invalid UTC offset"));
        }
        let seconds = self
            .offsets
            .get(timezone)
            .ok_or_else(|| KundliError::input(format!("Invalid timezone: {}", timezone)))?;
        FixedOffset::east_opt(*seconds)
            .ok_or_else(|| KundliError::input(format!("Offset out of range for {}", timezone)))
    }
}
