//! Rising hazard
//!
//! The hazard surface climbs at `base_speed × multiplier`. The multiplier
//! target grows with elapsed time and with how far the player has climbed,
//! whichever is stronger; the live multiplier chases that target at a bounded
//! rate so difficulty never spikes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Category, Geometry, RayHit, Solid};
use crate::tuning::HazardTuning;
use crate::{clamp01, lerp, move_towards};

/// Horizontal half-extent of the hazard and fade band
const HAZARD_HALF_WIDTH: f32 = 1.0e4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardState {
    /// Scaled seconds since level start
    pub elapsed: f32,
    pub start_height: f32,
    /// Smoothed speed multiplier
    pub multiplier: f32,
    /// Current surface height
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct Hazard {
    tuning: HazardTuning,
    state: HazardState,
}

impl Hazard {
    pub fn new(tuning: &HazardTuning) -> Self {
        Self {
            tuning: *tuning,
            state: HazardState {
                elapsed: 0.0,
                start_height: tuning.start_height,
                multiplier: tuning.min_multiplier,
                height: tuning.start_height,
            },
        }
    }

    pub fn state(&self) -> &HazardState {
        &self.state
    }

    pub fn height(&self) -> f32 {
        self.state.height
    }

    /// Current rise speed (units/s)
    pub fn speed(&self) -> f32 {
        self.tuning.base_speed * self.state.multiplier
    }

    pub fn has_fade_sensor(&self) -> bool {
        self.tuning.fade_sensor.is_some()
    }

    /// Multiplier the hazard is heading toward for the given player height
    pub fn target_multiplier(&self, player_y: f32) -> f32 {
        let t = &self.tuning;
        let time_t = clamp01(self.state.elapsed / t.time_ramp);
        let height_t = clamp01((player_y - self.state.start_height) / t.height_ramp);

        let combined = time_t.max(height_t);
        let compressed = 1.0 - (-combined * t.compression).exp();
        let curved = clamp01(t.curve.evaluate(compressed));

        lerp(t.min_multiplier, t.max_multiplier, curved)
    }

    /// Advance by `dt` scaled seconds
    pub fn advance(&mut self, dt: f32, player_y: f32) {
        self.state.elapsed += dt;

        let target = self.target_multiplier(player_y);
        self.state.multiplier = move_towards(
            self.state.multiplier,
            target,
            self.tuning.max_multiplier_delta_per_second * dt,
        );

        self.state.height += self.speed() * dt;
    }

    /// The hazard body: a slab `thickness` deep under the surface
    pub fn as_solid(&self) -> Solid {
        let h = self.state.height;
        Solid::new(
            Vec2::new(-HAZARD_HALF_WIDTH, h - self.tuning.thickness),
            Vec2::new(HAZARD_HALF_WIDTH, h),
            Category::Hazard,
        )
    }

    /// The soft-death band riding with the surface, if configured
    pub fn fade_sensor_solid(&self) -> Option<Solid> {
        self.tuning.fade_sensor.map(|shape| {
            let h = self.state.height;
            Solid::new(
                Vec2::new(-HAZARD_HALF_WIDTH, h + shape.bottom_offset),
                Vec2::new(HAZARD_HALF_WIDTH, h + shape.top_offset),
                Category::FadeSensor,
            )
        })
    }

    /// Level geometry with this hazard layered over it
    pub fn view<'a, G: Geometry>(&self, world: &'a G) -> PursuitView<'a, G> {
        PursuitView {
            world,
            hazard: self.as_solid(),
            fade_sensor: self.fade_sensor_solid(),
        }
    }
}

/// Geometry that answers hazard and fade-sensor queries from the moving
/// hazard as well as from the level itself
#[derive(Debug, Clone, Copy)]
pub struct PursuitView<'a, G> {
    world: &'a G,
    hazard: Solid,
    fade_sensor: Option<Solid>,
}

impl<G: Geometry> PursuitView<'_, G> {
    fn layer(&self, category: Category) -> Option<Solid> {
        match category {
            Category::Ground => None,
            Category::Hazard => Some(self.hazard),
            Category::FadeSensor => self.fade_sensor,
        }
    }
}

impl<G: Geometry> Geometry for PursuitView<'_, G> {
    fn overlap_circle(&self, center: Vec2, radius: f32, category: Category) -> bool {
        self.layer(category)
            .is_some_and(|solid| solid.overlaps_circle(center, radius))
            || self.world.overlap_circle(center, radius, category)
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        category: Category,
    ) -> Option<RayHit> {
        let layered = self.layer(category).and_then(|solid| {
            solid.raycast(origin, direction.normalize_or_zero(), max_distance)
        });
        let world = self.world.raycast(origin, direction, max_distance, category);

        match (layered, world) {
            (Some(a), Some(b)) => Some(if a.distance <= b.distance { a } else { b }),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::StaticWorld;
    use crate::tuning::FadeSensorShape;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn test_starts_at_min_multiplier() {
        let hazard = Hazard::new(&HazardTuning::default());
        assert_eq!(hazard.height(), -10.0);
        assert!((hazard.speed() - 2.0 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_target_saturates_on_height_or_time() {
        let tuning = HazardTuning::default();
        let mut hazard = Hazard::new(&tuning);

        // No pressure yet: min multiplier
        assert!((hazard.target_multiplier(tuning.start_height) - 0.8).abs() < 1e-6);

        // Full height pressure: compressed value 1 - e^-1.6
        let expected = lerp(0.8, 3.0, 1.0 - (-1.6f32).exp());
        let full_height = tuning.start_height + tuning.height_ramp;
        assert!((hazard.target_multiplier(full_height) - expected).abs() < 1e-5);

        // Time pressure alone reaches the same value
        hazard.state.elapsed = tuning.time_ramp * 2.0;
        assert!((hazard.target_multiplier(tuning.start_height) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_surface_rises_over_time() {
        let mut hazard = Hazard::new(&HazardTuning::default());
        let start = hazard.height();
        for _ in 0..120 {
            hazard.advance(DT, 0.0);
        }
        assert!(hazard.height() > start + 1.5);
        assert!(hazard.state().multiplier > 0.8);
    }

    #[test]
    fn test_view_layers_hazard_and_fade_band() {
        let tuning = HazardTuning {
            start_height: 0.0,
            fade_sensor: Some(FadeSensorShape {
                bottom_offset: 1.0,
                top_offset: 3.0,
            }),
            ..Default::default()
        };
        let hazard = Hazard::new(&tuning);
        let world = StaticWorld::new();
        let view = hazard.view(&world);

        assert!(view.overlap_circle(Vec2::new(0.0, -0.5), 0.1, Category::Hazard));
        assert!(!view.overlap_circle(Vec2::new(0.0, 2.0), 0.1, Category::Hazard));
        // Under the slab
        assert!(!view.overlap_circle(Vec2::new(0.0, -6.0), 0.1, Category::Hazard));
        assert!(view.overlap_circle(Vec2::new(5.0, 2.0), 0.1, Category::FadeSensor));
        assert!(!view.overlap_circle(Vec2::new(5.0, 5.0), 0.1, Category::FadeSensor));
        assert!(!view.overlap_circle(Vec2::new(0.0, -0.5), 0.1, Category::Ground));

        let hit = view
            .raycast(Vec2::new(0.0, 4.0), Vec2::NEG_Y, 10.0, Category::Hazard)
            .unwrap();
        assert!((hit.point.y).abs() < 1e-4);
    }

    #[test]
    fn test_no_fade_band_without_shape() {
        let hazard = Hazard::new(&HazardTuning::default());
        assert!(!hazard.has_fade_sensor());
        assert!(hazard.fade_sensor_solid().is_none());
    }

    proptest! {
        #[test]
        fn multiplier_change_is_rate_limited(
            player_heights in prop::collection::vec(-50.0f32..500.0, 1..200),
            dt in 0.001f32..0.1,
        ) {
            let tuning = HazardTuning::default();
            let mut hazard = Hazard::new(&tuning);
            for y in player_heights {
                let before = hazard.state().multiplier;
                hazard.advance(dt, y);
                let after = hazard.state().multiplier;
                prop_assert!((after - before).abs() <= tuning.max_multiplier_delta_per_second * dt + 1e-5);
                prop_assert!(after >= tuning.min_multiplier - 1e-5);
                prop_assert!(after <= tuning.max_multiplier + 1e-5);
            }
        }
    }
}
