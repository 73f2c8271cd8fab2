//! Demo player
//!
//! Picks an input frame from the current arena so headless runs exercise the
//! whole round: chase the nearest star, hop toward higher ones, and back off
//! from bombs that get close.

use glam::Vec2;

use crate::sim::{EntityKind, EntityRegistry, InputFrame, Physics};
use crate::tuning::Tuning;

/// Horizontal distance inside which a hazard is worth running from
const DANGER_RADIUS_X: f32 = 120.0;
/// Vertical band around the player a hazard must be in to count
const DANGER_RADIUS_Y: f32 = 90.0;
/// Close enough horizontally to stop steering
const ARRIVE_X: f32 = 6.0;
/// Targets this far above the player's centre call for a jump
const JUMP_RISE: f32 = 40.0;

pub fn drive(registry: &EntityRegistry, physics: &impl Physics, tuning: &Tuning) -> InputFrame {
    let Some(handle) = registry.player() else {
        return InputFrame::default();
    };
    let Some(player) = registry.get(handle) else {
        return InputFrame::default();
    };
    let pos = player.body.pos;
    let grounded = physics.is_touching_down(handle);

    // Bombs first
    let threat = registry
        .iter_active(EntityKind::Hazard)
        .map(|(_, e)| e.body.pos)
        .filter(|h| (h.x - pos.x).abs() < DANGER_RADIUS_X && (h.y - pos.y).abs() < DANGER_RADIUS_Y)
        .min_by(|a, b| {
            a.distance_squared(pos)
                .partial_cmp(&b.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(hazard) = threat {
        let mut input = away_from(hazard.x, pos.x, tuning.arena.width);
        // Hop over a bomb that is already low and close
        input.up = grounded && hazard.y > pos.y - player.body.half_size.y;
        return input;
    }

    let target = registry
        .iter_active(EntityKind::Collectible)
        .map(|(_, e)| e.body.pos)
        .min_by(|a, b| {
            a.distance_squared(pos)
                .partial_cmp(&b.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    let Some(target) = target else {
        return InputFrame::default();
    };

    let mut input = toward(target, pos);
    input.up = grounded && target.y < pos.y - JUMP_RISE;
    input
}

fn toward(target: Vec2, pos: Vec2) -> InputFrame {
    let dx = target.x - pos.x;
    if dx < -ARRIVE_X {
        InputFrame::left()
    } else if dx > ARRIVE_X {
        InputFrame::right()
    } else {
        InputFrame::default()
    }
}

/// Run from `hazard_x`, turning around when pinned against a wall
fn away_from(hazard_x: f32, x: f32, width: f32) -> InputFrame {
    let flee_right = hazard_x <= x;
    if flee_right && x > width - DANGER_RADIUS_X / 2.0 {
        InputFrame::left()
    } else if !flee_right && x < DANGER_RADIUS_X / 2.0 {
        InputFrame::right()
    } else if flee_right {
        InputFrame::right()
    } else {
        InputFrame::left()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::round::tests::new_round;
    use crate::sim::{ArcadePhysics, spawn_hazard};

    fn physics(tuning: &Tuning) -> ArcadePhysics {
        ArcadePhysics::new(&tuning.arena)
    }

    #[test]
    fn test_chases_nearest_star() {
        let (mut registry, round) = new_round(1);
        let tuning = round.tuning().clone();
        // Only a star far to the right is left
        let stars = registry.handles(EntityKind::Collectible);
        for &s in &stars[..11] {
            registry.set_active(s, false);
        }
        registry.get_mut(stars[11]).unwrap().body.pos = Vec2::new(700.0, 450.0);

        let input = drive(&registry, &physics(&tuning), &tuning);
        assert!(input.right && !input.left);
        assert!(!input.up);
    }

    #[test]
    fn test_stops_under_target() {
        let (mut registry, round) = new_round(1);
        let tuning = round.tuning().clone();
        let stars = registry.handles(EntityKind::Collectible);
        for &s in &stars[1..] {
            registry.set_active(s, false);
        }
        registry.get_mut(stars[0]).unwrap().body.pos = Vec2::new(102.0, 455.0);

        assert_eq!(
            drive(&registry, &physics(&tuning), &tuning),
            InputFrame::default()
        );
    }

    #[test]
    fn test_backs_off_from_close_hazard() {
        let (mut registry, round) = new_round(1);
        let tuning = round.tuning().clone();
        let hazard = spawn_hazard(&mut registry, &tuning, 160.0, 0.0).unwrap();
        registry.get_mut(hazard).unwrap().body.pos.y = 440.0;

        let input = drive(&registry, &physics(&tuning), &tuning);
        assert!(input.left);
    }

    #[test]
    fn test_far_hazard_is_ignored() {
        let (mut registry, round) = new_round(1);
        let tuning = round.tuning().clone();
        spawn_hazard(&mut registry, &tuning, 700.0, 0.0).unwrap();

        let input = drive(&registry, &physics(&tuning), &tuning);
        // Nearest star is at x = 82, left of the spawn point
        assert!(input.left);
    }

    #[test]
    fn test_pinned_against_wall_turns_around() {
        assert!(away_from(700.0, 780.0, 800.0).left);
        assert!(away_from(100.0, 20.0, 800.0).right);
        assert!(away_from(300.0, 400.0, 800.0).right);
    }
}
