//! Respawn point validation
//!
//! A grounded position only becomes the respawn target when the ground is
//! wide enough (left, right and center probes all hit) and flat enough (the
//! center normal is within the slope limit).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Category, Geometry, RayHit};
use crate::angle_from_up_degrees;
use crate::tuning::SafeGroundTuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub left: Option<RayHit>,
    pub right: Option<RayHit>,
    pub center: Option<RayHit>,
}

impl ProbeReport {
    pub fn is_safe(&self, max_slope_degrees: f32) -> bool {
        match (self.left, self.right, self.center) {
            (Some(_), Some(_), Some(center)) => {
                angle_from_up_degrees(center.normal) <= max_slope_degrees
            }
            _ => false,
        }
    }
}

/// Cast the three downward probes from `check_y`, spread around `position.x`
pub fn probe<G: Geometry>(
    geometry: &G,
    position: Vec2,
    check_y: f32,
    tuning: &SafeGroundTuning,
) -> ProbeReport {
    let cast = |x: f32| {
        geometry.raycast(
            Vec2::new(x, check_y),
            Vec2::NEG_Y,
            tuning.probe_distance,
            Category::Ground,
        )
    };

    ProbeReport {
        left: cast(position.x - tuning.probe_half_width),
        right: cast(position.x + tuning.probe_half_width),
        center: cast(position.x),
    }
}

/// Returns `position` if it qualifies as a respawn point
pub fn validate<G: Geometry>(
    geometry: &G,
    position: Vec2,
    check_y: f32,
    tuning: &SafeGroundTuning,
) -> Option<Vec2> {
    probe(geometry, position, check_y, tuning)
        .is_safe(tuning.max_slope_degrees)
        .then_some(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{Solid, StaticWorld};

    fn normal_at(degrees: f32) -> Vec2 {
        Vec2::new(degrees.to_radians().sin(), degrees.to_radians().cos())
    }

    #[test]
    fn test_flat_wide_ground_is_safe() {
        let world = StaticWorld::new().with(Solid::platform(0.0, 0.0, 10.0, 1.0));
        let spot = Vec2::new(1.0, 0.5);
        assert_eq!(
            validate(&world, spot, 0.0, &SafeGroundTuning::default()),
            Some(spot)
        );
    }

    #[test]
    fn test_steep_center_is_rejected() {
        let world = StaticWorld::new()
            .with(Solid::platform(0.0, 0.0, 10.0, 1.0).with_surface_normal(normal_at(60.0)));
        let report = probe(&world, Vec2::new(0.0, 0.5), 0.0, &SafeGroundTuning::default());
        assert!(report.left.is_some() && report.right.is_some() && report.center.is_some());
        assert!(!report.is_safe(45.0));
    }

    #[test]
    fn test_slope_at_limit_is_accepted() {
        let world = StaticWorld::new()
            .with(Solid::platform(0.0, 0.0, 10.0, 1.0).with_surface_normal(normal_at(44.0)));
        assert!(validate(&world, Vec2::new(0.0, 0.5), 0.0, &SafeGroundTuning::default()).is_some());
    }

    #[test]
    fn test_narrow_ledge_is_rejected() {
        // Platform narrower than the probe spread
        let world = StaticWorld::new().with(Solid::platform(0.0, 0.0, 3.0, 1.0));
        let report = probe(&world, Vec2::new(0.0, 0.5), 0.0, &SafeGroundTuning::default());
        assert!(report.center.is_some());
        assert!(report.left.is_none() && report.right.is_none());
        assert!(!report.is_safe(45.0));
    }

    #[test]
    fn test_ground_out_of_reach_is_rejected() {
        let world = StaticWorld::new().with(Solid::platform(0.0, -2.0, 10.0, 1.0));
        assert!(validate(&world, Vec2::new(0.0, 0.5), 0.0, &SafeGroundTuning::default()).is_none());
    }
}
