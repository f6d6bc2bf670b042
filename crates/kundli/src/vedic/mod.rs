pub mod zodiac;
pub mod nakshatra;
pub mod chart;
pub mod vargas;
pub mod dashas;
pub mod dignities;
pub mod drishti;
pub mod yogas;

pub use zodiac::{Body, Modality, Nakshatra, Sign};
pub use nakshatra::{NakshatraPlacement, nakshatra_for_longitude};
pub use chart::{NatalChart, SiderealBody, build_natal_chart, AYANAMSA_NAME};
pub use vargas::{HouseChart, Varga, build_varga_chart, dashamsa_sign, navamsa_sign};
pub use dashas::{DashaLevel, DashaPeriod, VimshottariDasha, compute_vimshottari, sequence_from};
pub use dignities::{Dignity, dignity, is_combust, strength_score};
pub use drishti::aspected_houses;
pub use yogas::{Yoga, YogaKind, identify_yogas};
