//! Drift-Free Rotation State
//!
//! A body's rotation is stored as a baked base orientation plus a constant
//! axis velocity and the total angle accumulated around that axis since the
//! axis was last set. The current orientation is *derived* on demand, so a
//! body spinning at constant speed never integrates quaternion error: one
//! multiply against the base orientation reproduces it exactly, step after
//! step.
//!
//! Changing the axis first bakes the derived orientation into the base, then
//! resets the accumulated angle, so orientation is continuous across axis
//! changes.

use crate::math::{Unit, Vec4};

/// Base orientation + axis velocity + accumulated angle.
///
/// `axis_velocity` stores a unit-length rotation axis in xyz and the angular
/// speed (angle units per time unit, never negative) in `w`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationState {
    /// Orientation the body had when the axis was last set.
    pub original_orientation: Vec4,
    /// Unit rotation axis (xyz) and non-negative angular speed (w).
    pub axis_velocity: Vec4,
    /// Angle accumulated around the axis since the axis was last set.
    pub current_angle: Unit,
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationState {
    /// Identity orientation, +X axis, zero speed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            original_orientation: Vec4::IDENTITY,
            axis_velocity: Vec4::UNIT_X,
            current_angle: 0,
        }
    }

    /// Current orientation, derived from the base orientation and the angle
    /// accumulated around the current axis. Renormalized so repeated queries
    /// stay on the unit sphere.
    #[must_use]
    pub fn orientation(&self) -> Vec4 {
        let around_axis = Vec4::from_axis_angle(self.axis_velocity, self.current_angle);

        self.original_orientation.q_mul(around_axis).normalized4()
    }

    /// Overwrite the orientation directly, discarding the accumulated angle.
    /// The axis velocity is kept.
    pub fn set_orientation(&mut self, orientation: Vec4) {
        self.original_orientation = orientation;
        self.current_angle = 0;
    }

    /// Advance the accumulated angle by one time unit of spinning.
    #[inline]
    pub fn advance(&mut self) {
        self.current_angle += self.axis_velocity.w;
    }

    /// Replace the rotation axis and speed. The current derived orientation
    /// is baked into the base first, so the visible orientation does not
    /// jump. A negative `velocity` flips the axis instead.
    ///
    /// Returns `true` when the new axis points against the previous one
    /// (their dot product is not positive), which callers use to arm
    /// anti-vibration damping.
    pub fn set_axis_velocity(&mut self, axis: Vec4, velocity: Unit) -> bool {
        if self.current_angle != 0 {
            self.original_orientation = self.orientation();
        }

        let (axis, velocity) = if velocity < 0 {
            (axis.times_plain(-1), -velocity)
        } else {
            (axis, velocity)
        };

        let axis = axis.normalized();
        let reversed = axis.dot_plain(self.axis_velocity) <= 0;

        self.axis_velocity = Vec4::new(axis.x, axis.y, axis.z, velocity);
        self.current_angle = 0;

        reversed
    }

    /// Combine the current rotation with an additional one: both are taken
    /// as axis-scaled vectors (direction = axis, magnitude = speed), summed,
    /// and converted back to a unit axis plus speed.
    ///
    /// Returns the reversal signal of the underlying axis replacement, or
    /// `false` when `velocity` is zero and nothing changes.
    pub fn add_axis_velocity(&mut self, axis: Vec4, velocity: Unit) -> bool {
        if velocity == 0 {
            return false;
        }

        let current = self.axis_velocity.times(self.axis_velocity.w);
        let added = axis.normalized().times(velocity);

        let combined = current.plus(added);
        let speed = combined.len();

        self.set_axis_velocity(combined, speed)
    }

    /// Stop spinning without touching the orientation.
    pub fn stop(&mut self) {
        if self.current_angle != 0 {
            self.original_orientation = self.orientation();
            self.current_angle = 0;
        }

        self.axis_velocity.w = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::UNITS;

    #[test]
    fn test_default_is_identity() {
        let r = RotationState::new();
        assert_eq!(r.orientation(), Vec4::IDENTITY);
    }

    #[test]
    fn test_constant_spin_does_not_drift() {
        // Deriving after N steps must equal deriving once with angle N * w
        let mut stepped = RotationState::new();
        stepped.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), 3);

        for _ in 0..100 {
            stepped.advance();
        }

        let mut direct = RotationState::new();
        direct.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), 3);
        direct.current_angle = 300;

        assert_eq!(stepped.orientation(), direct.orientation());
    }

    #[test]
    fn test_full_turn_returns_home() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, 0, UNITS, 0), 0);
        r.current_angle = UNITS;

        let q = r.orientation();
        let p = Vec4::new(300, -100, 50, 0);
        let rotated = p.rotated_by(q);

        assert!((rotated.x - p.x).abs() <= 8, "x drifted: {:?}", rotated);
        assert!((rotated.y - p.y).abs() <= 8);
        assert!((rotated.z - p.z).abs() <= 8);
    }

    #[test]
    fn test_axis_change_preserves_orientation() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), 5);
        r.current_angle = 60;

        let before = r.orientation();
        r.set_axis_velocity(Vec4::new(UNITS, 0, 0, 0), 2);
        let after = r.orientation();

        assert_eq!(r.current_angle, 0, "angle resets on axis change");
        assert!(
            (before.x - after.x).abs() <= 4
                && (before.y - after.y).abs() <= 4
                && (before.z - after.z).abs() <= 4
                && (before.w - after.w).abs() <= 4,
            "orientation jumped: {:?} vs {:?}",
            before,
            after
        );
    }

    #[test]
    fn test_negative_velocity_flips_axis() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), -7);

        assert_eq!(r.axis_velocity.w, 7);
        assert!(r.axis_velocity.y < 0, "axis should flip: {:?}", r.axis_velocity);
    }

    #[test]
    fn test_reversal_signal() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), 4);

        assert!(
            r.set_axis_velocity(Vec4::new(0, -UNITS, 0, 0), 4),
            "opposite axis must signal a reversal"
        );
        assert!(
            !r.set_axis_velocity(Vec4::new(0, -UNITS, 0, 0), 4),
            "same axis again is not a reversal"
        );
    }

    #[test]
    fn test_add_same_axis_adds_speed() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), 100);
        r.add_axis_velocity(Vec4::new(0, UNITS, 0, 0), 50);

        assert!(
            (r.axis_velocity.w - 150).abs() <= 2,
            "speeds along one axis add: {}",
            r.axis_velocity.w
        );
    }

    #[test]
    fn test_add_opposite_axis_cancels() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), 100);
        r.add_axis_velocity(Vec4::new(0, -UNITS, 0, 0), 100);

        assert!(
            r.axis_velocity.w <= 2,
            "opposite spin cancels, got speed {}",
            r.axis_velocity.w
        );
    }

    #[test]
    fn test_add_zero_velocity_is_noop() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, UNITS, 0, 0), 100);
        let before = r;

        assert!(!r.add_axis_velocity(Vec4::new(UNITS, 0, 0, 0), 0));
        assert_eq!(r, before);
    }

    #[test]
    fn test_stop_bakes_and_zeroes_speed() {
        let mut r = RotationState::new();
        r.set_axis_velocity(Vec4::new(0, 0, UNITS, 0), 9);
        r.current_angle = 40;

        let before = r.orientation();
        r.stop();

        assert_eq!(r.axis_velocity.w, 0);
        assert_eq!(r.current_angle, 0);

        // Baking re-normalizes the orientation, which may nudge a component
        // by one quantization step.
        let after = r.orientation();
        let reference = before.normalized4();
        for (got, want) in [
            (after.x, reference.x),
            (after.y, reference.y),
            (after.z, reference.z),
            (after.w, reference.w),
        ] {
            assert!(
                (got - want).abs() <= 1,
                "baked orientation component {} vs {}",
                got,
                want
            );
        }
    }
}
