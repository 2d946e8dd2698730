use std::future::Future;

use foundation::math::LonLat;

use crate::Path;

/// Geodesic operations the splitter relies on.
///
/// Densification is synchronous; normalization may suspend (a remote geometry
/// service, a worker, ...). Implementations must not retain state between
/// calls that would couple independent paths.
pub trait GeometryEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert points along the geodesic between consecutive vertices so no two
    /// adjacent points are further apart than `max_segment_length_m`. Engines
    /// may sample finer than requested.
    fn geodesic_densify(
        &self,
        path: &[LonLat],
        max_segment_length_m: f64,
    ) -> Result<Path, Self::Error>;

    /// Represent `path` continuously around the central meridian. Returns one
    /// path if nothing wraps, several if the line crosses ±180°.
    fn normalize_central_meridian(
        &self,
        path: &[LonLat],
    ) -> impl Future<Output = Result<Vec<Path>, Self::Error>>;
}

impl<E: GeometryEngine> GeometryEngine for &E {
    type Error = E::Error;

    fn geodesic_densify(
        &self,
        path: &[LonLat],
        max_segment_length_m: f64,
    ) -> Result<Path, Self::Error> {
        (**self).geodesic_densify(path, max_segment_length_m)
    }

    fn normalize_central_meridian(
        &self,
        path: &[LonLat],
    ) -> impl Future<Output = Result<Vec<Path>, Self::Error>> {
        (**self).normalize_central_meridian(path)
    }
}
