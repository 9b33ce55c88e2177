//! # LayerWatch Communication
//!
//! Live print height from the printer. The monitor only needs the current
//! toolhead Z, read through the [`HeightSource`] trait; [`MoonrakerClient`]
//! implements it against a Moonraker object query.

pub mod status;

pub use status::{
    moonraker::{parse_toolhead_z, MoonrakerClient, MoonrakerConfig, TOOLHEAD_QUERY_PATH},
    FixedHeight, HeightSource,
};
