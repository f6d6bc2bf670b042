pub mod builder;
pub mod value;

pub use builder::{build_signals, house_overlay, HouseOverlay};
pub use value::{SignalSet, SignalValue};
