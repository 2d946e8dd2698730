pub mod collection;
pub mod geojson;

pub use collection::*;
pub use geojson::*;
