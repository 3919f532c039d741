//! Geometry queries
//!
//! The simulation never touches colliders directly. Everything it knows about
//! the level comes from two questions: "does this circle overlap anything in
//! category X?" and "what does this ray hit first in category X?".

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision category (layer) a solid belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Ground,
    Hazard,
    FadeSensor,
}

/// Result of a ray query that hit something
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub point: Vec2,
    /// Surface normal at the hit point
    pub normal: Vec2,
    /// Distance along the ray
    pub distance: f32,
}

/// Geometry collaborator
pub trait Geometry {
    fn overlap_circle(&self, center: Vec2, radius: f32, category: Category) -> bool;

    /// First hit along `direction` (normalized) within `max_distance`
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        category: Category,
    ) -> Option<RayHit>;
}

impl<G: Geometry + ?Sized> Geometry for &G {
    fn overlap_circle(&self, center: Vec2, radius: f32, category: Category) -> bool {
        (**self).overlap_circle(center, radius, category)
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        category: Category,
    ) -> Option<RayHit> {
        (**self).raycast(origin, direction, max_distance, category)
    }
}

/// Rays starting up to this far inside a face still report that face
const SURFACE_SKIN: f32 = 1e-3;

/// An axis-aligned solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub min: Vec2,
    pub max: Vec2,
    pub category: Category,
    /// Normal reported for hits on the top face (lets flat boxes stand in for slopes)
    pub surface_normal: Vec2,
}

impl Solid {
    pub fn new(min: Vec2, max: Vec2, category: Category) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            category,
            surface_normal: Vec2::Y,
        }
    }

    /// Ground platform described by its top surface
    pub fn platform(center_x: f32, top: f32, width: f32, thickness: f32) -> Self {
        Self::new(
            Vec2::new(center_x - width / 2.0, top - thickness),
            Vec2::new(center_x + width / 2.0, top),
            Category::Ground,
        )
    }

    pub fn with_surface_normal(mut self, normal: Vec2) -> Self {
        self.surface_normal = normal.normalize_or_zero();
        self
    }

    pub fn top(&self) -> f32 {
        self.max.y
    }

    /// Circle overlap via closest point on the box
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        center.distance_squared(closest) <= radius * radius
    }

    /// Slab test; a ray that starts inside the solid does not hit it
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_normal = Vec2::ZERO;

        for axis in 0..2 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
            // Ray enters through the face it is travelling toward
            let mut normal = Vec2::ZERO;
            normal[axis] = -d.signum();
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                enter_normal = normal;
            }
            t_exit = t_exit.min(t1);
        }

        if t_exit < 0.0 || t_enter > t_exit || t_enter > max_distance {
            return None;
        }

        // Rays starting inside a solid pass through it (one-way platforms)
        if t_enter < -SURFACE_SKIN {
            return None;
        }

        let distance = t_enter.max(0.0);
        let normal = if enter_normal == Vec2::Y {
            self.surface_normal
        } else {
            enter_normal
        };

        Some(RayHit {
            point: origin + direction * distance,
            normal,
            distance,
        })
    }
}

/// A fixed set of solids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticWorld {
    pub solids: Vec<Solid>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, solid: Solid) -> Self {
        self.solids.push(solid);
        self
    }

    pub fn push(&mut self, solid: Solid) {
        self.solids.push(solid);
    }
}

impl Geometry for StaticWorld {
    fn overlap_circle(&self, center: Vec2, radius: f32, category: Category) -> bool {
        self.solids
            .iter()
            .filter(|s| s.category == category)
            .any(|s| s.overlaps_circle(center, radius))
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        category: Category,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        self.solids
            .iter()
            .filter(|s| s.category == category)
            .filter_map(|s| s.raycast(origin, direction, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
