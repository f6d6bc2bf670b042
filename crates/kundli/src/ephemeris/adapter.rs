use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ephemeris::types::{
    BodyPosition, CelestialSnapshot, GeoLocation, HouseAngles, HouseSystem, SnapshotBody,
};
use crate::error::{KundliError, Result};
use crate::vedic::zodiac::{normalize_degrees, Body};

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// The raw ephemeris. Implementations wrap whatever computes tropical positions
/// (a native library, a remote service, recorded frames).
pub trait EphemerisAdapter {
    /// Tropical positions for at least Sun..Saturn and the mean node (as `Body::Rahu`).
    fn positions(&self, julian_day: f64) -> Result<BTreeMap<Body, BodyPosition>>;

    /// Tropical ascendant, midheaven and cusps for a location.
    fn ascendant_mc(
        &self,
        julian_day: f64,
        lat: f64,
        lon: f64,
        house_system: HouseSystem,
    ) -> Result<HouseAngles>;

    /// Lahiri ayanamsa in degrees for the given Julian Day.
    fn ayanamsa(&self, julian_day: f64) -> Result<f64>;
}

/// Convert UTC datetime to Julian Day
pub fn julian_day(dt: DateTime<Utc>) -> f64 {
    let seconds = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9;
    UNIX_EPOCH_JD + seconds / SECONDS_PER_DAY
}

/// Convert Julian Day to UTC datetime, to millisecond precision
pub fn julian_day_to_datetime(jd: f64) -> Option<DateTime<Utc>> {
    let millis = ((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(millis).single()
}

/// Query the adapter and assemble an immutable snapshot. Ketu is derived here.
pub fn capture_snapshot(
    adapter: &dyn EphemerisAdapter,
    instant: DateTime<Utc>,
    location: GeoLocation,
    house_system: HouseSystem,
) -> Result<CelestialSnapshot> {
    let jd = julian_day(instant);
    let bodies = resolve_bodies(&adapter.positions(jd)?, jd)?;

    let angles = adapter.ascendant_mc(jd, location.lat, location.lon, house_system)?;
    debug!(
        "Captured snapshot at JD {:.5} (asc {:.3}, mc {:.3})",
        jd, angles.ascendant, angles.midheaven
    );

    Ok(CelestialSnapshot {
        instant,
        julian_day: jd,
        location,
        house_system,
        bodies,
        ascendant: normalize_degrees(angles.ascendant),
        midheaven: normalize_degrees(angles.midheaven),
        cusps: angles.cusps.map(normalize_degrees),
    })
}

/// Check the adapter answer for the required bodies and derive Ketu from Rahu.
pub fn resolve_bodies(
    raw: &BTreeMap<Body, BodyPosition>,
    julian_day: f64,
) -> Result<BTreeMap<Body, SnapshotBody>> {
    let mut bodies = BTreeMap::new();
    for body in Body::EPHEMERIS {
        let pos = raw.get(&body).ok_or_else(|| {
            KundliError::upstream(
                "ephemeris",
                format!("no position for {} at JD {:.5}", body, julian_day),
            )
        })?;
        bodies.insert(body, snapshot_body(pos));
    }
    if let Some(rahu) = bodies.get(&Body::Rahu).copied() {
        bodies.insert(
            Body::Ketu,
            SnapshotBody {
                lon: normalize_degrees(rahu.lon + 180.0),
                lat: -rahu.lat,
                speed_lon: rahu.speed_lon,
                retrograde: rahu.retrograde,
            },
        );
    }
    Ok(bodies)
}

fn snapshot_body(pos: &BodyPosition) -> SnapshotBody {
    SnapshotBody {
        lon: normalize_degrees(pos.lon),
        lat: pos.lat,
        speed_lon: pos.speed_lon,
        retrograde: pos.is_retrograde(),
    }
}

/// One recorded ephemeris answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemerisFrame {
    #[serde(rename = "julianDay")]
    pub julian_day: f64,
    pub ayanamsa: f64,
    pub bodies: BTreeMap<Body, BodyPosition>,
    pub angles: HouseAngles,
}

/// Replays recorded frames. A query resolves to the frame nearest in time,
/// which keeps tests and offline runs deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameEphemeris {
    pub frames: Vec<EphemerisFrame>,
}

impl FrameEphemeris {
    pub fn new(frames: Vec<EphemerisFrame>) -> Self {
        Self { frames }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| KundliError::upstream("ephemeris", format!("Invalid frame file: {}", e)))
    }

    fn nearest(&self, julian_day: f64) -> Result<&EphemerisFrame> {
        self.frames
            .iter()
            .min_by(|a, b| {
                let da = (a.julian_day - julian_day).abs();
                let db = (b.julian_day - julian_day).abs();
                da.total_cmp(&db)
            })
            .ok_or_else(|| KundliError::upstream("ephemeris", "no recorded frames"))
    }
}

impl EphemerisAdapter for FrameEphemeris {
    fn positions(&self, julian_day: f64) -> Result<BTreeMap<Body, BodyPosition>> {
        Ok(self.nearest(julian_day)?.bodies.clone())
    }

    fn ascendant_mc(
        &self,
        julian_day: f64,
        _lat: f64,
        _lon: f64,
        _house_system: HouseSystem,
    ) -> Result<HouseAngles> {
        Ok(self.nearest(julian_day)?.angles)
    }

    fn ayanamsa(&self, julian_day: f64) -> Result<f64> {
        Ok(self.nearest(julian_day)?.ayanamsa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(jd: f64, sun: f64) -> EphemerisFrame {
        let mut bodies = BTreeMap::new();
        for (i, body) in Body::EPHEMERIS.iter().enumerate() {
            bodies.insert(
                *body,
                BodyPosition { lon: sun + i as f64 * 20.0, lat: 0.5, speed_lon: 1.0 },
            );
        }
        bodies.insert(Body::Rahu, BodyPosition { lon: 350.0, lat: 0.0, speed_lon: -0.05 });
        EphemerisFrame {
            julian_day: jd,
            ayanamsa: 24.0,
            bodies,
            angles: HouseAngles { ascendant: 100.0, midheaven: 10.0, cusps: [0.0; 12] },
        }
    }

    #[test]
    fn test_julian_day_epochs() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((julian_day(j2000) - 2_451_545.0).abs() < 1e-9);
        let back = julian_day_to_datetime(2_451_545.0).unwrap();
        assert_eq!(back, j2000);
    }

    #[test]
    fn test_capture_snapshot_derives_ketu() {
        let eph = FrameEphemeris::new(vec![frame(2_451_545.0, 10.0)]);
        let instant = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let snap = capture_snapshot(
            &eph,
            instant,
            GeoLocation { lat: 19.0, lon: 72.8 },
            HouseSystem::Placidus,
        )
        .unwrap();
        assert_eq!(snap.bodies.len(), 9);
        let ketu = snap.body(Body::Ketu).unwrap();
        assert!((ketu.lon - 170.0).abs() < 1e-9);
        assert!(ketu.retrograde);
        assert!(!snap.body(Body::Sun).unwrap().retrograde);
    }

    #[test]
    fn test_missing_body_is_upstream_failure() {
        let mut f = frame(2_451_545.0, 10.0);
        f.bodies.remove(&Body::Mars);
        let eph = FrameEphemeris::new(vec![f]);
        let instant = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let err = capture_snapshot(&eph, instant, GeoLocation { lat: 0.0, lon: 0.0 }, HouseSystem::Equal)
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_nearest_frame_is_selected() {
        let eph = FrameEphemeris::new(vec![frame(10.0, 0.0), frame(20.0, 100.0)]);
        let positions = eph.positions(18.0).unwrap();
        assert!((positions[&Body::Sun].lon - 100.0).abs() < 1e-9);
        assert!(FrameEphemeris::default().ayanamsa(1.0).is_err());
    }
}
