use super::Vec3;

/// Mean Earth radius (IUGG, meters). Used for spherical distances.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Geographic position in degrees, GeoJSON axis order (lon, lat).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn is_finite(self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(p: LonLat) -> Self {
        [p.lon_deg, p.lat_deg]
    }
}

/// Point on the unit sphere (x through lon 0, z through the north pole).
pub fn lon_lat_to_unit(p: LonLat) -> Vec3 {
    let lat = p.lat_deg.to_radians();
    let lon = p.lon_deg.to_radians();
    let cos_lat = lat.cos();
    Vec3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
}

/// Inverse of [`lon_lat_to_unit`]. Longitude lands in [-180, 180].
pub fn unit_to_lon_lat(v: Vec3) -> LonLat {
    let lon = v.y.atan2(v.x);
    let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
    LonLat::new(lon.to_degrees(), lat.to_degrees())
}

/// Angle subtended at the sphere's center, in radians.
pub fn central_angle(a: LonLat, b: LonLat) -> f64 {
    let ua = lon_lat_to_unit(a);
    let ub = lon_lat_to_unit(b);
    ua.cross(ub).length().atan2(ua.dot(ub))
}

pub fn great_circle_distance_m(a: LonLat, b: LonLat) -> f64 {
    central_angle(a, b) * MEAN_EARTH_RADIUS_M
}

/// Point at fraction `t` along the minor great-circle arc from `a` to `b`.
///
/// Returns `None` for (near-)antipodal endpoints, where the arc is undefined.
pub fn interpolate_great_circle(a: LonLat, b: LonLat, t: f64) -> Option<LonLat> {
    let ua = lon_lat_to_unit(a);
    let ub = lon_lat_to_unit(b);
    let sin_omega = ua.cross(ub).length();
    let omega = sin_omega.atan2(ua.dot(ub));

    if sin_omega < 1e-12 {
        if omega < std::f64::consts::FRAC_PI_2 {
            // Coincident endpoints.
            return Some(a);
        }
        return None;
    }

    let wa = ((1.0 - t) * omega).sin() / sin_omega;
    let wb = (t * omega).sin() / sin_omega;
    Some(unit_to_lon_lat(ua * wa + ub * wb))
}

/// Wrap a longitude into [-180, 180]. Values already in range are untouched,
/// so both +180 and -180 survive.
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon_deg) {
        return lon_deg;
    }
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}
