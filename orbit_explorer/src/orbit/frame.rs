//! Coordinate frames: inertial (TEME) → Earth-fixed → geodetic → scene.
//!
//! The scene is a uniformly scaled, Earth-centred, Y-up frame. The planet is
//! drawn with radius `R`; altitudes are scaled by the same factor and added
//! to `R`, so a sample sits at `R + altitude * scale` from the origin.

use bevy::math::{DVec3, Vec3};
use bevy::prelude::Resource;
use chrono::{DateTime, Utc};

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const SECONDS_PER_DAY: f64 = 86400.0;

const WGS84_A_KM: f64 = 6378.137;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
const GMST_BASE_DEG: f64 = 280.460_618_37;
const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
const GMST_CORRECTION: f64 = 0.000_387_933;

/// Geodetic coordinates in degrees and kilometres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Maps geodetic coordinates into scene units.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SceneFrame {
    /// Rendered radius of the planet, in scene units.
    pub radius: f32,
}

impl Default for SceneFrame {
    fn default() -> Self {
        Self { radius: 10.0 }
    }
}

impl SceneFrame {
    /// Scene units per kilometre.
    pub fn scale(&self) -> f64 {
        self.radius as f64 / EARTH_RADIUS_KM
    }

    pub fn km_to_scene(&self, km: f64) -> f32 {
        (km * self.scale()) as f32
    }

    pub fn scene_to_km(&self, distance: f32) -> f64 {
        distance as f64 / self.scale()
    }

    /// Fixed spherical-to-Cartesian transform.
    pub fn to_scene(&self, geo: &Geodetic) -> Vec3 {
        let lat = geo.latitude_deg.to_radians();
        let lon = geo.longitude_deg.to_radians();
        let r = self.radius as f64 + geo.altitude_km * self.scale();
        DVec3::new(
            r * lat.cos() * lon.cos(),
            r * lat.sin(),
            -r * lat.cos() * lon.sin(),
        )
        .as_vec3()
    }

    /// Inverse of [`SceneFrame::to_scene`], spherical (no ellipsoid).
    pub fn to_geodetic(&self, scene: Vec3) -> Geodetic {
        let p = scene.as_dvec3();
        let r = p.length();
        if r < f64::EPSILON {
            return Geodetic {
                latitude_deg: 0.0,
                longitude_deg: 0.0,
                altitude_km: -EARTH_RADIUS_KM,
            };
        }
        Geodetic {
            latitude_deg: (p.y / r).asin().to_degrees(),
            longitude_deg: (-p.z).atan2(p.x).to_degrees(),
            altitude_km: (r - self.radius as f64) / self.scale(),
        }
    }
}

/// Greenwich mean sidereal time in radians.
pub fn greenwich_mean_sidereal_time(at: DateTime<Utc>) -> f64 {
    // J2000.0 = 2000-01-01T12:00:00Z = 946728000 unix seconds.
    let unix_ms = at.timestamp_millis() as f64;
    let days_since_j2000 = (unix_ms / 1000.0 - 946_728_000.0) / SECONDS_PER_DAY;
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    gmst_degrees.rem_euclid(360.0).to_radians()
}

/// Rotate an inertial vector into the Earth-fixed frame.
pub fn inertial_to_ecef(position_km: DVec3, gmst: f64) -> DVec3 {
    let (s, c) = gmst.sin_cos();
    DVec3::new(
        c * position_km.x + s * position_km.y,
        -s * position_km.x + c * position_km.y,
        position_km.z,
    )
}

/// WGS-84 geodetic coordinates of an Earth-fixed vector.
pub fn ecef_to_geodetic(p: DVec3) -> Geodetic {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let lon = p.y.atan2(p.x);
    let rho = (p.x * p.x + p.y * p.y).sqrt();

    let mut lat = p.z.atan2(rho * (1.0 - e2));
    let mut n = WGS84_A_KM;
    for _ in 0..5 {
        let sin_lat = lat.sin();
        n = WGS84_A_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        lat = (p.z + e2 * n * sin_lat).atan2(rho);
    }

    let altitude_km = if lat.cos().abs() > 1e-9 {
        rho / lat.cos() - n
    } else {
        p.z.abs() - n * (1.0 - e2)
    };

    Geodetic {
        latitude_deg: lat.to_degrees(),
        longitude_deg: normalize_longitude(lon.to_degrees()),
        altitude_km,
    }
}

pub fn geodetic_to_ecef(geo: &Geodetic) -> DVec3 {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let lat = geo.latitude_deg.to_radians();
    let lon = geo.longitude_deg.to_radians();
    let n = WGS84_A_KM / (1.0 - e2 * lat.sin() * lat.sin()).sqrt();
    DVec3::new(
        (n + geo.altitude_km) * lat.cos() * lon.cos(),
        (n + geo.altitude_km) * lat.cos() * lon.sin(),
        (n * (1.0 - e2) + geo.altitude_km) * lat.sin(),
    )
}

/// East/north/up components of an Earth-fixed offset seen from `observer`.
pub fn ecef_to_enu(delta: DVec3, observer: &Geodetic) -> DVec3 {
    let lat = observer.latitude_deg.to_radians();
    let lon = observer.longitude_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    DVec3::new(
        -sin_lon * delta.x + cos_lon * delta.y,
        -sin_lat * cos_lon * delta.x - sin_lat * sin_lon * delta.y + cos_lat * delta.z,
        cos_lat * cos_lon * delta.x + cos_lat * sin_lon * delta.y + sin_lat * delta.z,
    )
}

fn normalize_longitude(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}
