//! End-to-end orchestration: birth input to natal chart to horoscope report.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::cache::{chart_key, ChartCache};
use crate::ephemeris::adapter::{capture_snapshot, julian_day, EphemerisAdapter};
use crate::ephemeris::types::{GeoLocation, HouseSystem};
use crate::error::{KundliError, Result};
use crate::geo::{resolve_birth, BirthInput, Geocoder};
use crate::insights::{dasha_insights, DashaInsights};
use crate::predictions::{PredictionEngine, PredictionReport};
use crate::signals::{build_signals, SignalSet};
use crate::transit::{SadeSati, TransitEngine, TransitRecord};
use crate::vedic::chart::{build_natal_chart, NatalChart};
use crate::vedic::dashas::{compute_vimshottari, VimshottariDasha};
use crate::western::{build_western_chart, WesternChart};

pub struct ChartPipeline<'a> {
    adapter: &'a dyn EphemerisAdapter,
    geocoder: &'a dyn Geocoder,
    house_system: HouseSystem,
}

impl<'a> ChartPipeline<'a> {
    pub fn new(adapter: &'a dyn EphemerisAdapter, geocoder: &'a dyn Geocoder) -> Self {
        Self {
            adapter,
            geocoder,
            house_system: HouseSystem::default(),
        }
    }

    pub fn with_house_system(mut self, house_system: HouseSystem) -> Self {
        self.house_system = house_system;
        self
    }

    pub fn house_system(&self) -> HouseSystem {
        self.house_system
    }

    /// Natal chart for an instant and place that are already known.
    pub fn chart_at(&self, instant: DateTime<Utc>, location: GeoLocation) -> Result<NatalChart> {
        let snapshot = capture_snapshot(self.adapter, instant, location, self.house_system)?;
        let ayanamsa = self.adapter.ayanamsa(snapshot.julian_day)?;
        build_natal_chart(&snapshot, ayanamsa)
    }

    /// Validate, resolve place and timezone, convert to UTC and build the chart.
    pub fn calculate(&self, input: &BirthInput, now: DateTime<Utc>) -> Result<NatalChart> {
        let birth = resolve_birth(input, self.geocoder, now)?;
        info!(
            "Calculating chart for {} at {} ({})",
            input.name, birth.instant, birth.timezone
        );
        self.chart_at(birth.instant, birth.location)
    }

    /// Like [`calculate`](Self::calculate), consulting `cache` first. Cache
    /// failures never fail the calculation.
    pub fn calculate_cached(
        &self,
        input: &BirthInput,
        now: DateTime<Utc>,
        cache: &dyn ChartCache,
    ) -> Result<NatalChart> {
        let birth = resolve_birth(input, self.geocoder, now)?;
        let key = chart_key(birth.instant, birth.location, self.house_system);

        if let Some(value) = cache.get(&key) {
            match serde_json::from_value::<NatalChart>(value) {
                Ok(chart) => {
                    debug!("Chart cache hit for {}", key);
                    return Ok(chart);
                }
                Err(e) => warn!("Discarding unreadable cache entry {}: {}", key, e),
            }
        }

        let chart = self.chart_at(birth.instant, birth.location)?;
        match serde_json::to_value(&chart) {
            Ok(value) => cache.put(&key, value),
            Err(e) => warn!("Chart for {} not cached: {}", key, e),
        }
        Ok(chart)
    }
}

/// Everything derived from a natal chart at a given "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoroscopeReport {
    pub generated_at: DateTime<Utc>,
    pub dasha: VimshottariDasha,
    pub transits: Vec<TransitRecord>,
    pub sade_sati: SadeSati,
    pub signals: SignalSet,
    pub predictions: PredictionReport,
    pub insights: DashaInsights,
    /// Tropical view of the natal chart.
    pub western: WesternChart,
}

impl HoroscopeReport {
    pub fn compose(
        chart: &NatalChart,
        adapter: &dyn EphemerisAdapter,
        engine: &PredictionEngine,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let moon = chart.moon_longitude().ok_or_else(|| {
            KundliError::ComputationInconsistency("natal chart has no Moon".into())
        })?;
        let dasha = compute_vimshottari(moon, chart.birth, now)?;

        let transits = TransitEngine::new(adapter).transits(chart, now)?;
        let sade_sati = SadeSati::from_transits(chart, &transits)?;

        let signals = build_signals(chart, &dasha.periods, &transits, Some(&sade_sati));
        let predictions = engine.generate(&signals);
        let insights = dasha_insights(chart, &dasha);
        let western = build_western_chart(chart);

        info!(
            "Horoscope at JD {:.3}: {} predictions, sade sati {}",
            julian_day(now),
            predictions.total(),
            sade_sati.phase.name()
        );
        Ok(Self {
            generated_at: now,
            dasha,
            transits,
            sade_sati,
            signals,
            predictions,
            insights,
            western,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::ephemeris::adapter::{EphemerisFrame, FrameEphemeris};
    use crate::ephemeris::types::{BodyPosition, HouseAngles};
    use crate::geo::StaticGeocoder;
    use crate::predictions::{RuleSet, Timeframe};
    use crate::vedic::zodiac::Body;
    use chrono::{NaiveDate, TimeZone};
    use std::cell::Cell;
    use std::collections::BTreeMap;

    /// Counts position queries made through it.
    struct CountingEphemeris {
        inner: FrameEphemeris,
        position_queries: Cell<usize>,
    }

    impl EphemerisAdapter for CountingEphemeris {
        fn positions(&self, julian_day: f64) -> Result<BTreeMap<Body, BodyPosition>> {
            self.position_queries.set(self.position_queries.get() + 1);
            self.inner.positions(julian_day)
        }

        fn ascendant_mc(
            &self,
            julian_day: f64,
            lat: f64,
            lon: f64,
            house_system: HouseSystem,
        ) -> Result<HouseAngles> {
            self.inner.ascendant_mc(julian_day, lat, lon, house_system)
        }

        fn ayanamsa(&self, julian_day: f64) -> Result<f64> {
            self.inner.ayanamsa(julian_day)
        }
    }

    fn frame(instant: DateTime<Utc>, saturn: f64) -> EphemerisFrame {
        let longitudes = [
            (Body::Sun, 280.0),
            (Body::Moon, 5.0),
            (Body::Mercury, 265.0),
            (Body::Venus, 300.0),
            (Body::Mars, 230.0),
            (Body::Jupiter, 95.0),
            (Body::Saturn, saturn),
            (Body::Rahu, 310.0),
        ];
        let bodies: BTreeMap<Body, BodyPosition> = longitudes
            .iter()
            .map(|(b, lon)| (*b, BodyPosition { lon: *lon, lat: 0.0, speed_lon: 1.0 }))
            .collect();
        EphemerisFrame {
            julian_day: julian_day(instant),
            ayanamsa: 0.0,
            bodies,
            angles: HouseAngles {
                ascendant: 0.0,
                midheaven: 270.0,
                cusps: std::array::from_fn(|i| 30.0 * i as f64),
            },
        }
    }

    fn ephemeris() -> FrameEphemeris {
        FrameEphemeris::new(vec![
            frame(Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(), 290.0),
            frame(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(), 10.0),
        ])
    }

    fn input() -> BirthInput {
        BirthInput {
            name: "Asha".into(),
            local_datetime: NaiveDate::from_ymd_opt(1990, 1, 1)
                .and_then(|d| d.and_hms_opt(5, 30, 0))
                .unwrap(),
            place: "Delhi".into(),
            lat: None,
            lon: None,
            timezone: None,
            unknown_time: false,
        }
    }

    fn geocoder() -> StaticGeocoder {
        StaticGeocoder::new()
            .with_place("Delhi", 28.61, 77.21, "Asia/Kolkata")
            .with_offset("Asia/Kolkata", 19_800)
    }

    #[test]
    fn test_calculate_resolves_place_and_zone() {
        let eph = ephemeris();
        let geo = geocoder();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let chart = ChartPipeline::new(&eph, &geo).calculate(&input(), now).unwrap();
        assert_eq!(chart.birth, Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap());
        assert!((chart.location.lat - 28.61).abs() < 1e-9);
        assert_eq!(chart.house_system, HouseSystem::Placidus);
    }

    #[test]
    fn test_calculate_cached_hits_second_time() {
        let eph = ephemeris();
        let geo = geocoder();
        let cache = MemoryCache::new();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let pipeline = ChartPipeline::new(&eph, &geo);

        let first = pipeline.calculate_cached(&input(), now, &cache).unwrap();
        assert_eq!(cache.len(), 1);
        let second = pipeline.calculate_cached(&input(), now, &cache).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_input_is_rejected_before_lookup() {
        let eph = ephemeris();
        let geo = StaticGeocoder::new();
        let mut bad = input();
        bad.name.clear();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let err = ChartPipeline::new(&eph, &geo).calculate(&bad, now).unwrap_err();
        assert!(matches!(err, KundliError::Input(_)));
    }

    #[test]
    fn test_compose_report() {
        let eph = ephemeris();
        let location = GeoLocation { lat: 28.6, lon: 77.2 };
        let birth = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let chart = ChartPipeline::new(&eph, &StaticGeocoder::new())
            .chart_at(birth, location)
            .unwrap();
        let engine = PredictionEngine::new(RuleSet::builtin());

        let report = HoroscopeReport::compose(&chart, &eph, &engine, now).unwrap();
        assert_eq!(report.transits.len(), 9);
        assert_eq!(report.dasha.current_maha().map(|p| p.maha_lord), Some(Body::Moon));
        // Saturn at 10 deg sits on the natal Moon sign
        assert_eq!(report.sade_sati.phase.name(), "peak");
        assert_eq!(report.predictions.predictions.len(), 3);
        assert!(report
            .predictions
            .bucket(Timeframe::Now)
            .iter()
            .any(|p| p.id == "pred_sade_sati_peak_now"));
        assert!(report.insights.mahadasha.is_some());
        // Ayanamsa 0 in these frames, so tropical equals sidereal
        assert_eq!(report.western.planets.len(), 8);
        assert_eq!(report.western.planets[&Body::Moon].sign, chart.moon_sign().unwrap());
    }

    #[test]
    fn test_compose_queries_transit_positions_once() {
        let eph = CountingEphemeris {
            inner: ephemeris(),
            position_queries: Cell::new(0),
        };
        let birth = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let chart = ChartPipeline::new(&eph, &StaticGeocoder::new())
            .chart_at(birth, GeoLocation { lat: 28.6, lon: 77.2 })
            .unwrap();
        eph.position_queries.set(0);

        let engine = PredictionEngine::new(RuleSet::empty());
        let report = HoroscopeReport::compose(&chart, &eph, &engine, now).unwrap();
        assert_eq!(eph.position_queries.get(), 1);

        let saturn = report.transits.iter().find(|t| t.body == Body::Saturn).unwrap();
        assert_eq!(report.sade_sati.saturn_sign, saturn.current_sign);
        assert_eq!(report.sade_sati.house_from_moon, saturn.house_from_moon);
    }
}
