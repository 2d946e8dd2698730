//! Antimeridian (±180° longitude) handling for journey polylines.
//!
//! [`Splitter`] breaks a path into segments that each stay on one side of the
//! date line, so renderers never draw a spurious world-wrapping stroke. The
//! geodesic work is delegated to a [`GeometryEngine`]; [`SphericalEngine`] is
//! the built-in one.

pub mod crossing;
pub mod engine;
pub mod spherical;
pub mod splitter;

pub use crossing::*;
pub use engine::*;
pub use spherical::*;
pub use splitter::*;

use foundation::math::LonLat;

/// Ordered coordinates describing one unbroken line.
pub type Path = Vec<LonLat>;
