use foundation::math::{LonLat, great_circle_distance_m, interpolate_great_circle, wrap_longitude};

use crate::Path;
use crate::engine::GeometryEngine;

/// Default spacing between densified vertices (meters).
pub const DEFAULT_DENSIFY_STEP_M: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    InvalidSegmentLength(f64),
    NonFiniteCoordinate { index: usize },
    /// Consecutive vertices are antipodal; the geodesic between them is not unique.
    AntipodalSegment { index: usize },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidSegmentLength(len) => {
                write!(f, "max segment length must be positive and finite, got {len}")
            }
            EngineError::NonFiniteCoordinate { index } => {
                write!(f, "non-finite coordinate at vertex {index}")
            }
            EngineError::AntipodalSegment { index } => {
                write!(f, "vertices {} and {index} are antipodal", index - 1)
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Great-circle geometry on a spherical Earth.
///
/// Densification samples at most every `step_m` regardless of the requested
/// max segment length, so an "unbounded" request still yields a usable curve.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphericalEngine {
    step_m: f64,
}

impl Default for SphericalEngine {
    fn default() -> Self {
        Self {
            step_m: DEFAULT_DENSIFY_STEP_M,
        }
    }
}

impl SphericalEngine {
    pub fn new(step_m: f64) -> Result<Self, EngineError> {
        if !(step_m.is_finite() && step_m > 0.0) {
            return Err(EngineError::InvalidSegmentLength(step_m));
        }
        Ok(Self { step_m })
    }

    pub fn step_m(&self) -> f64 {
        self.step_m
    }

    pub fn densify(&self, path: &[LonLat], max_segment_length_m: f64) -> Result<Path, EngineError> {
        if !(max_segment_length_m.is_finite() && max_segment_length_m > 0.0) {
            return Err(EngineError::InvalidSegmentLength(max_segment_length_m));
        }
        if let Some(index) = path.iter().position(|p| !p.is_finite()) {
            return Err(EngineError::NonFiniteCoordinate { index });
        }
        let Some(first) = path.first() else {
            return Ok(Vec::new());
        };

        let step = max_segment_length_m.min(self.step_m);
        let mut out = vec![*first];
        for (i, w) in path.windows(2).enumerate() {
            let (a, b) = (w[0], w[1]);
            let n = (great_circle_distance_m(a, b) / step).ceil().max(1.0) as usize;
            for k in 1..n {
                let t = k as f64 / n as f64;
                let p = interpolate_great_circle(a, b, t)
                    .ok_or(EngineError::AntipodalSegment { index: i + 1 })?;
                out.push(p);
            }
            out.push(b);
        }
        Ok(out)
    }

    /// Unwrap longitudes so consecutive vertices never jump by more than
    /// 180°, then cut wherever the unwrapped line passes an odd multiple of
    /// 180°. Each cut closes one part on ±180 and opens the next on ∓180.
    pub fn normalize(&self, path: &[LonLat]) -> Vec<Path> {
        let Some(first) = path.first() else {
            return Vec::new();
        };

        let unwrapped = unwrap_longitudes(path);
        let mut parts: Vec<Path> = Vec::new();
        let mut current: Path = vec![LonLat::new(wrap_longitude(first.lon_deg), first.lat_deg)];

        for w in unwrapped.windows(2) {
            let (a, b) = (w[0], w[1]);
            let (wa, wb) = (world_of(a.lon_deg), world_of(b.lon_deg));
            if wa != wb {
                let boundary = if wb > wa {
                    180.0 + 360.0 * wa as f64
                } else {
                    -180.0 + 360.0 * wa as f64
                };
                let t = (boundary - a.lon_deg) / (b.lon_deg - a.lon_deg);
                let lat = a.lat_deg + t * (b.lat_deg - a.lat_deg);

                push_distinct(&mut current, LonLat::new(boundary - 360.0 * wa as f64, lat));
                let closed = std::mem::replace(
                    &mut current,
                    vec![LonLat::new(boundary - 360.0 * wb as f64, lat)],
                );
                // A part that is only the boundary vertex carries no line.
                if closed.len() >= 2 {
                    parts.push(closed);
                }
            }
            push_distinct(&mut current, LonLat::new(b.lon_deg - 360.0 * wb as f64, b.lat_deg));
        }

        parts.push(current);
        parts
    }
}

impl GeometryEngine for SphericalEngine {
    type Error = EngineError;

    fn geodesic_densify(&self, path: &[LonLat], max_segment_length_m: f64) -> Result<Path, EngineError> {
        self.densify(path, max_segment_length_m)
    }

    async fn normalize_central_meridian(&self, path: &[LonLat]) -> Result<Vec<Path>, EngineError> {
        if let Some(index) = path.iter().position(|p| !p.is_finite()) {
            return Err(EngineError::NonFiniteCoordinate { index });
        }
        Ok(self.normalize(path))
    }
}

/// Index of the 360° "world copy" holding `lon`; world 0 is [-180, 180).
fn world_of(lon_deg: f64) -> i64 {
    ((lon_deg + 180.0) / 360.0).floor() as i64
}

fn unwrap_longitudes(path: &[LonLat]) -> Path {
    let mut out: Path = Vec::with_capacity(path.len());
    let Some(first) = path.first() else {
        return out;
    };
    let mut prev_lon = first.lon_deg;
    out.push(*first);

    for p in &path[1..] {
        let mut lon = p.lon_deg;
        let delta = lon - prev_lon;
        if delta > 180.0 {
            lon -= 360.0 * ((delta + 180.0) / 360.0).floor();
        } else if delta < -180.0 {
            lon += 360.0 * ((-delta + 180.0) / 360.0).floor();
        }
        prev_lon = lon;
        out.push(LonLat::new(lon, p.lat_deg));
    }
    out
}

fn push_distinct(path: &mut Path, p: LonLat) {
    if path.last() != Some(&p) {
        path.push(p);
    }
}
