//! Rigid Bodies and Shapes
//!
//! A [`Body`] is a center of mass with a [`Shape`], linear velocity and a
//! drift-free [`RotationState`]. Mass is a fixed-point scalar; a body whose
//! mass is [`INFINITY`] is static: it participates in collisions but never
//! moves.
//!
//! All bodies use the moment of inertia of a sphere regardless of shape. This
//! is physically wrong for boxes and capsules but keeps the angular math to a
//! single scalar, which is the trade this engine makes everywhere.

use crate::math::{
    angular_velocity_to_linear, mul_anti_zero, non_zero_wide, sign, sqrt_wide, Mat4, Unit, Vec4,
    INFINITY, UNITS,
};
use crate::rotation::RotationState;

// ============================================================================
// Anti-Vibration State
// ============================================================================

/// Frames of accumulated cooldown above which a body counts as vibrating and
/// gets its energy damped away.
pub const ANTI_VIBRATION_MAX_FRAMES: u8 = 100;

/// Cooldown added per collision while the reversal flag is armed.
pub const ANTI_VIBRATION_INCREMENT: u8 = 20;

/// Relative contact speed at which vibration damping is abandoned entirely;
/// motion this fast is a real bounce, not jitter.
pub const ANTI_VIBRATION_VELOCITY_BREAK: Unit = 60;

/// Detector for resting bodies that keep micro-bouncing in place.
///
/// The `active` flag is armed when a body's rotation axis reverses (the
/// signature of vibration). While armed, every collision adds cooldown
/// frames; once the accumulated frames exceed
/// [`ANTI_VIBRATION_MAX_FRAMES`] the resolver freezes the body's energy
/// instead of bouncing it. The cooldown decays by one frame per step, so a
/// body that stops colliding soon returns to normal resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AntiVibration {
    /// Armed when the rotation axis last flipped direction.
    pub active: bool,
    /// Frames of damping pressure left.
    pub cooldown_frames: u8,
}

impl AntiVibration {
    /// Per-step decay. When the cooldown runs out the armed flag clears too.
    pub fn decay(&mut self) {
        if self.cooldown_frames > 0 {
            self.cooldown_frames -= 1;

            if self.cooldown_frames == 0 {
                self.active = false;
            }
        }
    }

    /// Per-collision update. While armed, pushes the cooldown up by
    /// [`ANTI_VIBRATION_INCREMENT`] (saturating at 127).
    ///
    /// Returns `false` when the body has accumulated enough frames to count
    /// as vibrating.
    pub fn on_collision(&mut self) -> bool {
        if self.active {
            self.cooldown_frames = if self.cooldown_frames < 127 - ANTI_VIBRATION_INCREMENT {
                self.cooldown_frames + ANTI_VIBRATION_INCREMENT
            } else {
                127
            };
        }

        self.cooldown_frames <= ANTI_VIBRATION_MAX_FRAMES
    }

    /// Drop all damping state; used when a genuinely fast contact shows the
    /// motion is not vibration.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Shapes
// ============================================================================

/// Collision shape of a body, dimensions in [`Unit`]s.
///
/// Capsules, cylinders and cuboids are centered on the body position;
/// capsule and cylinder axes run along local Y before rotation. `height` of
/// a capsule is the distance between its two cap centers, so the total
/// extent is `height + 2 * radius`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Dimensionless point.
    Point,
    Sphere {
        radius: Unit,
    },
    Capsule {
        radius: Unit,
        height: Unit,
    },
    Cuboid {
        width: Unit,
        height: Unit,
        depth: Unit,
    },
    /// Axis-aligned rectangle in the local XZ plane, for grounds and walls.
    Plane {
        width: Unit,
        depth: Unit,
    },
    Cylinder {
        radius: Unit,
        height: Unit,
    },
    /// Indexed triangle mesh. Vertices are flat xyz triples in body space;
    /// geometry lives in static storage (typically ROM on embedded targets).
    TriMesh {
        vertices: &'static [Unit],
        indices: &'static [u16],
    },
}

impl Shape {
    /// Farthest distance from the body center to any point of the shape.
    #[must_use]
    pub fn max_extent(&self) -> Unit {
        match *self {
            Shape::Point => 0,
            Shape::Sphere { radius } => radius,
            Shape::Capsule { radius, height } => radius + height / 2,
            Shape::Cuboid {
                width,
                height,
                depth,
            } => Vec4::new(width / 2, height / 2, depth / 2, 0).len(),
            Shape::Plane { width, depth } => Vec4::new(width / 2, 0, depth / 2, 0).len(),
            Shape::Cylinder { radius, height } => Vec4::new(radius, height / 2, 0, 0).len(),
            Shape::TriMesh { vertices, .. } => {
                let mut best = 0;

                for v in vertices.chunks_exact(3) {
                    let len = Vec4::new(v[0], v[1], v[2], 0).len();

                    if len > best {
                        best = len;
                    }
                }

                best
            }
        }
    }
}

// ============================================================================
// Body
// ============================================================================

/// A rigid body: shape, mass, position, linear velocity and rotation state.
///
/// Fields are public; the world and resolver read and write them directly.
/// After changing the shape, call [`Body::recompute_bounds`] so the cached
/// bounding radius matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Body {
    pub shape: Shape,
    /// Mass in [`Unit`]s; [`INFINITY`] makes the body static.
    pub mass: Unit,
    /// Position of the center of mass.
    pub position: Vec4,
    pub velocity: Vec4,
    pub rotation: RotationState,
    /// Cached [`Shape::max_extent`], used for the broad-phase sphere check.
    pub bounding_sphere_radius: Unit,
    pub anti_vibration: AntiVibration,
    /// Simulated but ignored by collision detection.
    pub non_colliding: bool,
    /// Excluded from the simulation entirely.
    pub disabled: bool,
}

impl Body {
    /// Body of the given shape with unit mass, at the origin, at rest.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        let mut body = Self {
            shape,
            mass: UNITS,
            position: Vec4::ZERO,
            velocity: Vec4::ZERO,
            rotation: RotationState::new(),
            bounding_sphere_radius: 0,
            anti_vibration: AntiVibration::default(),
            non_colliding: false,
            disabled: false,
        };

        body.recompute_bounds();
        body
    }

    /// Same body made static (infinite mass).
    #[must_use]
    pub fn with_static_mass(mut self) -> Self {
        self.mass = INFINITY;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.mass == INFINITY
    }

    /// Whether the world should simulate this body at all.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.disabled
    }

    /// Refresh the cached bounding sphere radius from the current shape.
    pub fn recompute_bounds(&mut self) {
        self.bounding_sphere_radius = self.shape.max_extent();
    }

    /// Current orientation quaternion.
    #[inline]
    #[must_use]
    pub fn orientation(&self) -> Vec4 {
        self.rotation.orientation()
    }

    /// Overwrite the orientation directly.
    pub fn set_orientation(&mut self, orientation: Vec4) {
        self.rotation.set_orientation(orientation);
    }

    /// Model-to-world transform: rotation matrix with the position in the
    /// translation column.
    #[must_use]
    pub fn transform_matrix(&self) -> Mat4 {
        let mut m = self.orientation().rotation_matrix();

        m[0][3] = self.position.x;
        m[1][3] = self.position.y;
        m[2][3] = self.position.z;

        m
    }

    /// Advance the body by one time unit: integrate position and rotation
    /// angle (static bodies stay put) and decay anti-vibration.
    pub fn step(&mut self) {
        if !self.is_static() {
            self.position = self.position.plus(self.velocity);
            self.rotation.advance();
        }

        self.anti_vibration.decay();
    }

    /// Replace the body's spin. Arms anti-vibration when the new axis points
    /// against the old one.
    pub fn set_rotation(&mut self, axis: Vec4, velocity: Unit) {
        let reversed = self.rotation.set_axis_velocity(axis, velocity);
        self.anti_vibration.active = reversed;
    }

    /// Add a spin to the current one (vector addition of axis-scaled
    /// rotations). Arms anti-vibration on axis reversal; a zero velocity is
    /// a no-op.
    pub fn add_rotation(&mut self, axis: Vec4, velocity: Unit) {
        if velocity == 0 {
            return;
        }

        let reversed = self.rotation.add_axis_velocity(axis, velocity);
        self.anti_vibration.active = reversed;
    }

    /// Apply an impulse at a point given relative to the body center,
    /// changing linear and angular velocity. An impulse at the exact center
    /// is ignored (no lever arm, and the center point cannot be normalized).
    pub fn apply_impulse(&mut self, point: Vec4, impulse: Vec4) {
        let point_distance = point.len();

        if point_distance == 0 {
            return;
        }

        let u = UNITS as i64;
        let m = self.mass as i64;

        let linear = Vec4::new(
            (impulse.x as i64 * u / m) as Unit,
            (impulse.y as i64 * u / m) as Unit,
            (impulse.z as i64 * u / m) as Unit,
            0,
        );

        self.velocity = self.velocity.plus(linear);

        let point_unit = Vec4::new(
            (point.x as i64 * u / point_distance as i64) as Unit,
            (point.y as i64 * u / point_distance as i64) as Unit,
            (point.z as i64 * u / point_distance as i64) as Unit,
            0,
        );

        // Sphere moment of inertia for every shape: I = 2mr²/5
        let torque = linear.cross(point_unit);

        let ext = self.shape.max_extent() as i64;
        let r = non_zero_wide(2 * ext * ext / u);

        let mut angular = Vec4::new(
            (torque.x as i64 * 5 * u / r) as Unit,
            (torque.y as i64 * 5 * u / r) as Unit,
            (torque.z as i64 * 5 * u / r) as Unit,
            0,
        );

        // A torque too small for the lever arm still has to spin the body a
        // little, or light touches on big bodies would never rotate them
        if angular == Vec4::ZERO && torque != Vec4::ZERO {
            angular = Vec4::new(sign(torque.x), sign(torque.y), sign(torque.z), 0);
        }

        self.add_rotation(angular, angular.len());
    }

    /// Velocity of a point given relative to the body center, combining the
    /// body's linear velocity with the orbit around the rotation axis. The
    /// point may lie inside or outside the shape.
    #[must_use]
    pub fn point_velocity(&self, point: Vec4) -> Vec4 {
        let normal = point
            .cross(point.minus(self.rotation.axis_velocity))
            .times_plain(-1);

        let dist = normal.len();
        let speed = angular_velocity_to_linear(self.rotation.axis_velocity.w, dist);

        self.velocity.plus(normal.normalized().times(speed))
    }

    /// Overall speed scalar: linear speed plus the surface speed the spin
    /// produces at the bounding radius.
    #[must_use]
    pub fn net_speed(&self) -> Unit {
        self.velocity.len().saturating_add(angular_velocity_to_linear(
            self.rotation.axis_velocity.w,
            self.bounding_sphere_radius,
        ))
    }

    /// True when the body moves slower than `threshold`, counting both
    /// translation and spin. Settling checks use this to decide when a pile
    /// has come to rest.
    #[must_use]
    pub fn is_settled(&self, threshold: Unit) -> bool {
        self.net_speed() < threshold
    }

    /// Total kinetic energy: linear part plus rotational part with a sphere
    /// moment of inertia. Values that would truncate to zero while motion
    /// exists are floored at 1 so the energy corrector can still see them.
    /// Static bodies report zero.
    #[must_use]
    pub fn kinetic_energy(&self) -> Unit {
        if self.is_static() {
            return 0;
        }

        let u = UNITS as i64;

        let v = self.velocity.len() as i64;
        let v2 = v * v;
        let v2 = if v2 == 0 || v2 >= u { v2 / u } else { 1 };

        let linear = self.mass as i64 * v2 / (2 * u);

        let ext = self.shape.max_extent();
        let w = self.rotation.axis_velocity.w;

        let mut rotational = mul_anti_zero(mul_anti_zero(ext, ext), mul_anti_zero(w, w)) as i64
            * self.mass as i64
            / (5 * u);

        if rotational == 0 && w != 0 {
            rotational = 1;
        }

        (linear + rotational) as Unit
    }

    /// Scale the body's kinetic energy by the unit-scaled factor `f`:
    /// both velocities scale by `sqrt(f)`. A spinning body whose angular
    /// speed would truncate to zero keeps speed 1, as a fully stopped spin
    /// makes bodies balance forever on corners under gravity.
    pub fn multiply_kinetic_energy(&mut self, f: Unit) {
        if self.is_static() {
            return;
        }

        let s = sqrt_wide(f as i64 * UNITS as i64) as Unit;

        self.velocity = self.velocity.times(s);

        let old_sign = sign(self.rotation.axis_velocity.w);

        self.rotation.axis_velocity.w =
            (self.rotation.axis_velocity.w as i64 * s as i64 / UNITS as i64) as Unit;

        if s != 0 && old_sign != 0 && self.rotation.axis_velocity.w == 0 {
            self.rotation.axis_velocity.w = old_sign;
        }
    }
}
