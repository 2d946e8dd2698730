//! Journey datasets: split every line feature at the antimeridian and rewrap
//! the segments as GeoJSON ready for rendering.

pub mod config;
pub mod error;
pub mod processor;
pub mod report;

pub use config::*;
pub use error::*;
pub use processor::*;
pub use report::*;
