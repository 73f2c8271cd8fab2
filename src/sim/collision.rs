//! Narrow-phase tests for axis-aligned boxes
//!
//! Everything in the arena is a box. Contacts are separated along one axis:
//! the axis on which the two boxes were still apart before this step, or the
//! axis of least penetration when that is ambiguous.

use glam::Vec2;

use super::entity::Body;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit axis pointing from the other box toward the tested one
    pub normal: Vec2,
    /// Overlap depth along `normal`
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Strict box overlap; touching edges do not count
pub fn aabb_overlap(a: &Body, b: &Body) -> bool {
    let d = (a.pos - b.pos).abs();
    let extent = a.half_size + b.half_size;
    d.x < extent.x && d.y < extent.y
}

/// Contact between `a` (which was at `a_prev` before this step) and `b`
pub fn aabb_contact(a: &Body, a_prev: Vec2, b: &Body) -> CollisionResult {
    let extent = a.half_size + b.half_size;
    let d = a.pos - b.pos;
    let overlap = extent - d.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return CollisionResult::miss();
    }

    let prev_d = a_prev - b.pos;
    let apart_x = prev_d.x.abs() >= extent.x;
    let apart_y = prev_d.y.abs() >= extent.y;
    let along_y = match (apart_x, apart_y) {
        (false, true) => true,
        (true, false) => false,
        _ => overlap.y <= overlap.x,
    };

    // Side the box came from; fall back to the current offset if it started inside
    let side = |prev: f32, now: f32| {
        let s = if prev != 0.0 { prev } else { now };
        if s < 0.0 { -1.0 } else { 1.0 }
    };

    if along_y {
        CollisionResult {
            hit: true,
            normal: Vec2::new(0.0, side(prev_d.y, d.y)),
            penetration: overlap.y,
        }
    } else {
        CollisionResult {
            hit: true,
            normal: Vec2::new(side(prev_d.x, d.x), 0.0),
            penetration: overlap.x,
        }
    }
}

/// Reflect the component of `vel` moving into the surface, scaled per axis by `bounce`
#[inline]
pub fn bounce_off(vel: Vec2, normal: Vec2, bounce: Vec2) -> Vec2 {
    let mut out = vel;
    if normal.x != 0.0 && vel.x * normal.x < 0.0 {
        out.x = -vel.x * bounce.x;
    }
    if normal.y != 0.0 && vel.y * normal.y < 0.0 {
        out.y = -vel.y * bounce.y;
    }
    out
}

/// Which world edges a body was pushed back from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundsHit {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

/// Clamp a body into `[0, size]` and bounce it off the edges it crossed
pub fn clamp_to_world(body: &mut Body, size: Vec2) -> BoundsHit {
    let mut hit = BoundsHit::default();
    let hs = body.half_size;

    if body.pos.x - hs.x < 0.0 {
        body.pos.x = hs.x;
        body.vel = bounce_off(body.vel, Vec2::X, body.bounce);
        hit.left = true;
    } else if body.pos.x + hs.x > size.x {
        body.pos.x = size.x - hs.x;
        body.vel = bounce_off(body.vel, Vec2::NEG_X, body.bounce);
        hit.right = true;
    }

    if body.pos.y - hs.y < 0.0 {
        body.pos.y = hs.y;
        body.vel = bounce_off(body.vel, Vec2::Y, body.bounce);
        hit.top = true;
    } else if body.pos.y + hs.y > size.y {
        body.pos.y = size.y - hs.y;
        body.vel = bounce_off(body.vel, Vec2::NEG_Y, body.bounce);
        hit.bottom = true;
    }

    hit
}
