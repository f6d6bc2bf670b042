//! Graha drishti: the full (special) aspects each body casts, counted in houses.
//!
//! Aspect offsets are added straight onto the body's house number, so a 7th
//! aspect from house 1 lands on house 8. Rule weights depend on this arithmetic.

use crate::vedic::zodiac::{advance_house, Body};

/// Every body casts this one.
pub const UNIVERSAL_ASPECT: u8 = 7;

/// Offsets aspected in addition to the 7th.
fn special_offsets(body: Body) -> &'static [u8] {
    match body {
        Body::Mars => &[4, 8],
        Body::Jupiter => &[5, 9],
        Body::Saturn => &[3, 10],
        _ => &[],
    }
}

/// Houses aspected by `body` sitting in `own_house`, 7th first.
pub fn aspected_houses(body: Body, own_house: u8) -> Vec<u8> {
    std::iter::once(UNIVERSAL_ASPECT)
        .chain(special_offsets(body).iter().copied())
        .map(|offset| advance_house(own_house, offset))
        .collect()
}
