use foundation::math::LonLat;

use crate::Path;

/// Tolerance for treating a normalized longitude as sitting on ±180.
pub const BOUNDARY_EPSILON: f64 = 1e-6;

/// Longitude of the synthetic point closing a segment on the eastern side.
pub const EAST_BOUNDARY_LON: f64 = 180.000001;

/// Longitude of the synthetic point opening a segment on the western side.
pub const WEST_BOUNDARY_LON: f64 = -179.99999;

/// Coarse test: the step between two longitudes is longer than half the globe.
///
/// This can fire without a real crossing (the refined check in
/// [`find_crossing`] then rejects it) and misses paths that wrap with a
/// smaller longitude delta.
pub fn is_crossing(lon1: f64, lon2: f64) -> bool {
    (lon1 - lon2).abs() > 180.0
}

/// Indices `i` such that the pair `(i - 1, i)` passes the coarse test.
pub fn coarse_crossings(path: &[LonLat]) -> Vec<usize> {
    path.windows(2)
        .enumerate()
        .filter(|(_, w)| is_crossing(w[0].lon_deg, w[1].lon_deg))
        .map(|(i, _)| i + 1)
        .collect()
}

/// The two ends of one crossing event, at the same latitude.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CrossingPair {
    pub east: LonLat,
    pub west: LonLat,
}

impl CrossingPair {
    pub fn at_latitude(lat_deg: f64) -> Self {
        Self {
            east: LonLat::new(EAST_BOUNDARY_LON, lat_deg),
            west: LonLat::new(WEST_BOUNDARY_LON, lat_deg),
        }
    }

    /// `(closing, opening)` for a segment whose last vertex sits at
    /// `prev_lon_deg`: positive longitudes close on the east end.
    pub fn oriented_from(self, prev_lon_deg: f64) -> (LonLat, LonLat) {
        if prev_lon_deg > 0.0 {
            (self.east, self.west)
        } else {
            (self.west, self.east)
        }
    }
}

fn on_boundary(lon_deg: f64) -> bool {
    (lon_deg - 180.0).abs() < BOUNDARY_EPSILON || (lon_deg + 180.0).abs() < BOUNDARY_EPSILON
}

/// Locate the crossing in a normalized result.
///
/// A single path means normalization found nothing to wrap. Otherwise the
/// first vertex (in path order, then vertex order) within
/// [`BOUNDARY_EPSILON`] of ±180 supplies the crossing latitude.
pub fn find_crossing(paths: &[Path]) -> Option<CrossingPair> {
    if paths.len() <= 1 {
        return None;
    }
    paths
        .iter()
        .flatten()
        .find(|p| on_boundary(p.lon_deg))
        .map(|p| CrossingPair::at_latitude(p.lat_deg))
}
