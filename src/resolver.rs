//! Impulse-Based Collision Resolution
//!
//! Given a contact from the narrow phase, the resolver separates the bodies
//! positionally and then applies one impulse pair along the contact normal,
//! sized so the system keeps exactly `energy_multiplier` of its kinetic
//! energy (`UNITS` = perfectly elastic). Momentum is conserved by
//! construction since the two bodies receive equal and opposite impulses.
//!
//! Sizing the impulse is a quadratic equation in the impulse magnitude:
//! writing the post-impulse energies of both bodies (with the sphere moment
//! of inertia used everywhere in this engine) and subtracting the desired
//! energy gives `a·x² + b·x + c = 0`, where the linear term comes from the
//! current velocities along the normal and the constant term is the energy
//! surplus. Of the two roots one is always near zero (the "do nothing"
//! solution); the larger-magnitude root is the bounce.
//!
//! Two mechanisms keep fixed-point rounding from destabilizing resting
//! contacts: an anti-vibration gate that freezes bodies which keep
//! micro-bouncing (see [`AntiVibration`](crate::body::AntiVibration)), and a
//! final energy correction that rescales both bodies when the total energy
//! drifted past tolerance in the direction the restitution should not allow.

use crate::body::{Body, ANTI_VIBRATION_VELOCITY_BREAK};
use crate::collision::Collision;
use crate::math::{non_zero_wide, sqrt_wide, Unit, UNITS};

/// Relative energy drift tolerated before the post-resolution correction
/// rescales the bodies.
const ENERGY_CORRECTION_TOLERANCE: Unit = 10;

/// Resolve one contact between two bodies.
///
/// `collision` must come from testing `body1` against `body2` in this order
/// (its normal points away from `body1`). `energy_multiplier` is the
/// unit-scaled fraction of kinetic energy the pair keeps.
///
/// Static pairs are ignored; a static body never moves, and a contact with
/// one pushes the dynamic body out by the full depth instead of half.
pub fn resolve(body1: &mut Body, body2: &mut Body, collision: Collision, energy_multiplier: Unit) {
    if body1.is_static() && body2.is_static() {
        return;
    }

    // Normalize to "static body first" so the rest of the math only has to
    // special-case the first body.
    let (first, second, normal) = if body2.is_static() {
        (body2, body1, collision.normal.times_plain(-1))
    } else {
        (body1, body2, collision.normal)
    };

    let p1 = collision.point.minus(first.position);
    let p2 = collision.point.minus(second.position);

    // Positional separation comes first so the bodies no longer overlap
    // even when the impulse below ends up not being applied.
    if !first.is_static() {
        let shift = normal.times(collision.depth / 2);

        second.position = second.position.plus(shift);
        first.position = first.position.minus(shift);
    } else {
        second.position = second.position.plus(normal.times(collision.depth));
    }

    let vel1 = first.point_velocity(p1);
    let vel2 = second.point_velocity(p2);

    // Fast relative motion is a real bounce; drop any vibration suspicion
    if vel1.minus(vel2).len() >= ANTI_VIBRATION_VELOCITY_BREAK {
        first.anti_vibration.reset();
        second.anti_vibration.reset();
    }

    // Contact points already separating (e.g. resolved by an earlier
    // contact this frame): nothing to bounce
    if normal.dot(vel1) < normal.dot(vel2) {
        return;
    }

    let u = UNITS as i64;
    let dynamic = !first.is_static() as i64;

    // Rotational terms, sphere moment of inertia: w = m·d²/5 and its
    // reciprocal weight q = 2·UNITS²/w
    let inertia = |body: &Body| -> i64 {
        let ext = body.shape.max_extent() as i64;
        body.mass as i64 * ext / u * ext / u / 5
    };

    let w1 = inertia(first);
    let q1 = 2 * u * u / non_zero_wide(w1);
    let nxp1 = normal.cross(p1);
    let rot1 = first
        .rotation
        .axis_velocity
        .times(first.rotation.axis_velocity.w);

    let w2 = inertia(second);
    let q2 = 2 * u * u / non_zero_wide(w2);
    let nxp2 = normal.cross(p2);
    let rot2 = second
        .rotation
        .axis_velocity
        .times(second.rotation.axis_velocity.w);

    let a = (dynamic * u * u / first.mass as i64 + u * u / second.mass as i64) / 2
        + (dynamic * q1 * nxp1.dot(nxp1) as i64 + q2 * nxp2.dot(nxp2) as i64) / (2 * u);

    let b = second.velocity.dot(normal) as i64 + rot2.dot(nxp2) as i64
        - dynamic * (first.velocity.dot(normal) as i64 + rot1.dot(nxp1) as i64);

    let e1 = dynamic as Unit * first.kinetic_energy();
    let e2 = second.kinetic_energy();

    let c = (dynamic * first.mass as i64 * first.velocity.dot(first.velocity) as i64
        + second.mass as i64 * second.velocity.dot(second.velocity) as i64)
        / (2 * u)
        + (dynamic * w1 * rot1.dot(rot1) as i64 + w2 * rot2.dot(rot2) as i64) / u
        - (e1 + e2) as i64 * energy_multiplier as i64 / u;

    // The sign-mirroring sqrt turns a (numerically) negative discriminant
    // into a negative root instead of a crash; the solution degrades but
    // stays bounded
    let discriminant = sqrt_wide(b * b - 4 * a * c);

    let b = -b;
    let a = non_zero_wide(2 * a);

    let x1 = (b - discriminant) * u / a;
    let x2 = (b + discriminant) * u / a;

    // One root is always the "no impulse" solution near zero; the other is
    // the actual bounce
    let x = if x1.abs() < x2.abs() { x2 } else { x1 } as Unit;

    let impulse = normal.times(x);

    if second.anti_vibration.on_collision() {
        second.apply_impulse(p2, impulse);
    } else {
        second.multiply_kinetic_energy(0);
    }

    if !first.is_static() {
        if first.anti_vibration.on_collision() {
            first.apply_impulse(p1, impulse.times_plain(-1));
        } else {
            first.multiply_kinetic_energy(0);
        }
    }

    correct_energies(first, second, e1 + e2, energy_multiplier);
}

/// Compensate fixed-point rounding in the total energy of a resolved pair.
///
/// Compares the pair's energy after resolution with what `restitution`
/// says it should be; when the ratio is off by more than the tolerance,
/// both bodies are rescaled, but only if the rescale moves the energy in a
/// direction consistent with the restitution (damping must not add energy,
/// and vice versa).
fn correct_energies(body1: &mut Body, body2: &mut Body, previous_energy: Unit, restitution: Unit) {
    if previous_energy == 0 {
        return;
    }

    let u = UNITS as i64;

    let direction = if restitution > UNITS {
        1
    } else if restitution < UNITS {
        -1
    } else {
        0
    };

    let new_energy = body1.kinetic_energy() + body2.kinetic_energy();

    let ratio = new_energy as i64 * u / previous_energy as i64;

    let correction = if ratio != 0 {
        (restitution as i64 * u / ratio) as Unit
    } else {
        UNITS
    };

    if correction > UNITS + ENERGY_CORRECTION_TOLERANCE
        || correction < UNITS - ENERGY_CORRECTION_TOLERANCE
    {
        let corrected = previous_energy as i64 * correction as i64 / u;
        let previous = previous_energy as i64;

        let consistent = (direction < 0 && corrected < previous)
            || (direction == 0 && corrected == previous)
            || (direction > 0 && corrected > previous);

        if consistent {
            body1.multiply_kinetic_energy(correction);
            body2.multiply_kinetic_energy(correction);
        }
    }
}
