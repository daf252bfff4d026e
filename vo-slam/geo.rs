use vo_core::{PositionFix, TrajectoryPoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude
pub const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Places a trajectory on the globe, treating motion units as meters.
///
/// The trajectory origin sits on the anchor; +y points north and +x east.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoAnchor {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoAnchor {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn from_fix(fix: &PositionFix) -> Self {
        Self::new(fix.latitude, fix.longitude)
    }

    pub fn project_point(&self, point: &TrajectoryPoint) -> GeoPoint {
        let meters_per_lon = METERS_PER_DEGREE * self.latitude.to_radians().cos();
        let longitude = if meters_per_lon.abs() > 1e-9 {
            self.longitude + point.x / meters_per_lon
        } else {
            self.longitude
        };
        GeoPoint {
            latitude: self.latitude + point.y / METERS_PER_DEGREE,
            longitude,
        }
    }

    /// Geographic path of a trajectory; empty below two points
    pub fn project<'a, I>(&self, trajectory: I) -> Vec<GeoPoint>
    where
        I: IntoIterator<Item = &'a TrajectoryPoint>,
    {
        let points: Vec<GeoPoint> = trajectory.into_iter().map(|p| self.project_point(p)).collect();
        if points.len() < 2 {
            return Vec::new();
        }
        points
    }
}
