//! Derives the deterministic feature map consumed by the rule engine.

use log::debug;

use crate::signals::value::{SignalSet, SignalValue};
use crate::transit::{SadeSati, TransitRecord};
use crate::vedic::chart::NatalChart;
use crate::vedic::dashas::DashaPeriod;
use crate::vedic::dignities::{dignity, is_combust, strength_score};
use crate::vedic::drishti::aspected_houses;
use crate::vedic::vargas::HouseChart;
use crate::vedic::yogas::identify_yogas;
use crate::vedic::zodiac::{house_from, Body};

/// House of each body from Lagna and from the natal Moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HouseOverlay {
    pub from_lagna: u8,
    pub from_moon: u8,
}

pub fn house_overlay(natal: &NatalChart, body: Body) -> Option<HouseOverlay> {
    let planet = natal.planet(body)?;
    let moon_sign = natal.moon_sign()?;
    Some(HouseOverlay {
        from_lagna: house_from(natal.lagna_sign(), planet.sign),
        from_moon: house_from(moon_sign, planet.sign),
    })
}

fn combust(natal: &NatalChart, body: Body) -> Option<bool> {
    let sun = natal.planet(Body::Sun)?;
    let planet = natal.planet(body)?;
    is_combust(body, planet.longitude, sun.longitude)
}

fn houses_signal(natal: &NatalChart) -> SignalValue {
    let mut out = SignalValue::map();
    for body in Body::ALL {
        if let Some(overlay) = house_overlay(natal, body) {
            out.insert(
                body.name(),
                SignalValue::map()
                    .with("from_lagna", overlay.from_lagna)
                    .with("from_moon", overlay.from_moon),
            );
        }
    }
    out
}

fn dignity_signal(natal: &NatalChart) -> SignalValue {
    let mut out = SignalValue::map();
    for (body, planet) in &natal.planets {
        if let Some(d) = dignity(*body, planet.sign) {
            out.insert(body.name(), d.name());
        }
    }
    out
}

fn combust_signal(natal: &NatalChart) -> SignalValue {
    let mut out = SignalValue::map();
    for body in Body::ALL {
        if let Some(flag) = combust(natal, body) {
            out.insert(body.name(), flag);
        }
    }
    out
}

fn drishti_signal(natal: &NatalChart) -> SignalValue {
    let mut out = SignalValue::map();
    for body in Body::ALL {
        if let Some(overlay) = house_overlay(natal, body) {
            out.insert(body.name(), aspected_houses(body, overlay.from_lagna));
        }
    }
    out
}

fn yogas_signal(natal: &NatalChart) -> SignalValue {
    let mut out = SignalValue::map();
    for yoga in identify_yogas(natal) {
        out.insert(yoga.kind.name(), yoga.present);
    }
    out
}

fn strength_signal(natal: &NatalChart) -> SignalValue {
    let mut out = SignalValue::map();
    for (body, planet) in &natal.planets {
        let Some(overlay) = house_overlay(natal, *body) else {
            continue;
        };
        let score = strength_score(
            dignity(*body, planet.sign),
            overlay.from_lagna,
            planet.retrograde,
            combust(natal, *body).unwrap_or(false),
        );
        out.insert(body.name(), score);
    }
    out
}

fn nakshatra_signal(natal: &NatalChart) -> SignalValue {
    let mut out = SignalValue::map();
    for (body, planet) in &natal.planets {
        out.insert(
            body.name(),
            SignalValue::map()
                .with("name", planet.nakshatra.name())
                .with("lord", planet.nakshatra_lord.name())
                .with("pada", planet.pada),
        );
    }
    out
}

fn lagna_signal(natal: &NatalChart) -> SignalValue {
    let asc = &natal.ascendant;
    SignalValue::map()
        .with("sign", asc.sign.name())
        .with("lord", natal.lagna_lord().name())
        .with("degree", asc.degree)
        .with("nakshatra", asc.nakshatra.name())
        .with("pada", asc.pada)
}

fn varga_signal(chart: &HouseChart) -> SignalValue {
    let mut out = SignalValue::map();
    for (house, bodies) in &chart.houses {
        let names: Vec<&str> = bodies.iter().map(|b| b.name()).collect();
        out.insert(house.to_string(), names);
    }
    out
}

/// Placement and dignity of a dasha lord.
fn dasha_lord_signal(natal: &NatalChart, period: &DashaPeriod) -> Option<SignalValue> {
    let lord = period.lord();
    let planet = natal.planet(lord)?;
    let overlay = house_overlay(natal, lord)?;
    let placement = SignalValue::map()
        .with("sign", planet.sign.name())
        .with("degree", planet.degree)
        .with("nakshatra", planet.nakshatra.name())
        .with("pada", planet.pada)
        .with("house_from_lagna", overlay.from_lagna)
        .with("house_from_moon", overlay.from_moon);
    Some(
        SignalValue::map()
            .with("lord", lord.name())
            .with("placement", placement)
            .with("dignity", dignity(lord, planet.sign).map(|d| d.name()))
            .with("start", period.start.to_rfc3339())
            .with("end", period.end.to_rfc3339()),
    )
}

fn dasha_signal(natal: &NatalChart, periods: &[DashaPeriod]) -> SignalValue {
    let mut out = SignalValue::map();
    let Some(maha) = periods.iter().find(|p| p.is_current) else {
        return out;
    };
    if let Some(ctx) = dasha_lord_signal(natal, maha) {
        out.insert("maha", ctx);
    }
    if let Some(antar) = maha.children.iter().find(|p| p.is_current) {
        if let Some(ctx) = dasha_lord_signal(natal, antar) {
            out.insert("antar", ctx);
        }
    }
    out
}

fn transit_signal(transits: &[TransitRecord], sade_sati: Option<&SadeSati>) -> SignalValue {
    let mut out = SignalValue::map();
    if transits.is_empty() && sade_sati.is_none() {
        return out;
    }
    let mut houses = SignalValue::map();
    let mut by_planet = SignalValue::map();
    for record in transits {
        houses.insert(
            record.body.name(),
            SignalValue::map()
                .with("from_moon", record.house_from_moon)
                .with("from_lagna", record.house_from_lagna)
                .with("sign", record.current_sign.name()),
        );
        let aspects: Vec<&str> = record.aspects_natal.iter().map(|b| b.name()).collect();
        by_planet.insert(
            record.body.name(),
            SignalValue::map()
                .with("aspects_natal", aspects)
                .with("retrograde", record.retrograde),
        );
    }
    out.insert("houses", houses);
    out.insert("by_planet", by_planet);
    if let Some(sati) = sade_sati {
        out.insert(
            "sade_sati",
            SignalValue::map()
                .with("phase", sati.phase.name())
                .with("active", sati.is_active())
                .with("house_from_moon", sati.house_from_moon)
                .with("saturn_sign", sati.saturn_sign.name()),
        );
    }
    out
}

/// Assemble the full signal tree. `periods` are the Mahadashas (with their children).
pub fn build_signals(
    natal: &NatalChart,
    periods: &[DashaPeriod],
    transits: &[TransitRecord],
    sade_sati: Option<&SadeSati>,
) -> SignalSet {
    let natal_signals = SignalValue::map()
        .with("houses", houses_signal(natal))
        .with("dignity", dignity_signal(natal))
        .with("combust", combust_signal(natal))
        .with("graha_drishti", drishti_signal(natal))
        .with("yogas", yogas_signal(natal))
        .with("strength", strength_signal(natal))
        .with("nakshatra", nakshatra_signal(natal))
        .with("lagna", lagna_signal(natal))
        .with("d9", varga_signal(&natal.d9))
        .with("d10", varga_signal(&natal.d10));

    let dasha = dasha_signal(natal, periods);
    if dasha.is_empty_map() {
        debug!("No current dasha; dasha signals left empty");
    }

    SignalSet::new(
        SignalValue::map()
            .with("natal", natal_signals)
            .with("dasha", dasha)
            .with("transit", transit_signal(transits, sade_sati)),
    )
}
