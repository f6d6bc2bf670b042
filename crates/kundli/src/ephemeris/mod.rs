pub mod adapter;
pub mod types;

pub use adapter::{
    capture_snapshot, julian_day, julian_day_to_datetime, resolve_bodies, EphemerisAdapter,
    EphemerisFrame, FrameEphemeris,
};
pub use types::{BodyPosition, CelestialSnapshot, GeoLocation, HouseAngles, HouseSystem, SnapshotBody};
