//! World Simulation Driver
//!
//! A [`World`] borrows a caller-owned slice of bodies and drives the
//! simulation over it: integration, gravity, and an O(n²) all-pairs
//! collision pass that feeds the narrow phase into the resolver. The core
//! never allocates for the slice itself, so the same code runs on heapless
//! embedded targets; only the optional [`World::detect_collisions`] query
//! builds a list.
//!
//! The all-pairs pass is deliberate: with the body counts this engine
//! targets, a broad phase would cost more in code and memory than it saves.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::body::Body;
use crate::collision::{detect, Collision};
use crate::math::{Unit, Vec4};
use crate::profiling::StepStats;
use crate::resolver::resolve;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fraction of kinetic energy pairs keep in the collision pass unless
/// configured otherwise; slightly inelastic so stacks settle.
pub const DEFAULT_RESTITUTION: Unit = 300;

/// Simulation over a borrowed slice of bodies.
///
/// Disabled bodies are skipped everywhere; non-colliding bodies are
/// integrated and feel gravity but pass through everything.
#[derive(Debug)]
pub struct World<'a> {
    pub bodies: &'a mut [Body],
    /// Energy multiplier handed to the resolver for every contact.
    pub restitution: Unit,
    /// Work counts from the most recent collision pass.
    pub stats: StepStats,
}

impl<'a> World<'a> {
    /// World over the given bodies with [`DEFAULT_RESTITUTION`].
    #[must_use]
    pub fn new(bodies: &'a mut [Body]) -> Self {
        Self {
            bodies,
            restitution: DEFAULT_RESTITUTION,
            stats: StepStats::default(),
        }
    }

    /// Advance every enabled body by one time unit.
    pub fn step_bodies(&mut self) {
        for body in self.bodies.iter_mut() {
            if body.is_active() {
                body.step();
            }
        }
    }

    /// Accelerate all dynamic bodies straight down (negative Y) by `g`.
    pub fn apply_gravity_down(&mut self, g: Unit) {
        for body in self.bodies.iter_mut() {
            if body.is_active() && !body.is_static() {
                body.velocity.y -= g;
            }
        }
    }

    /// Accelerate all dynamic bodies toward `center` by `g`, e.g. for a
    /// planet at the middle of the scene.
    pub fn apply_gravity_center(&mut self, center: Vec4, g: Unit) {
        for body in self.bodies.iter_mut() {
            if body.is_active() && !body.is_static() {
                body.velocity = body
                    .velocity
                    .plus(Vec4::from_to(body.position, center, g));
            }
        }
    }

    /// Check every body pair and resolve the contacts found, in index
    /// order. Static-static and non-colliding pairs are skipped before the
    /// narrow phase runs. Refills [`World::stats`] with this pass's counts.
    pub fn resolve_collisions_naive(&mut self) {
        self.stats = StepStats::default();

        for body in self.bodies.iter() {
            if body.is_active() {
                self.stats.active_bodies += 1;
                if body.is_static() {
                    self.stats.static_bodies += 1;
                }
            }
        }

        for i in 0..self.bodies.len() {
            let (head, tail) = self.bodies.split_at_mut(i + 1);
            let body1 = &mut head[i];

            if !body1.is_active() || body1.non_colliding {
                continue;
            }

            for body2 in tail.iter_mut() {
                if !body2.is_active() || body2.non_colliding {
                    continue;
                }

                if body1.is_static() && body2.is_static() {
                    continue;
                }

                self.stats.pairs_tested += 1;

                if let Some(collision) = detect(body1, body2) {
                    resolve(body1, body2, collision, self.restitution);
                    self.stats.contacts_resolved += 1;
                }
            }
        }
    }

    /// List all current contacts without resolving anything. Pairs come out
    /// ordered by body indices, so the result is deterministic; with the
    /// `parallel` feature the rows are tested on a thread pool.
    #[must_use]
    pub fn detect_collisions(&self) -> Vec<(u16, u16, Collision)> {
        let row = |i: usize| -> Vec<(u16, u16, Collision)> {
            let body1 = &self.bodies[i];

            if !body1.is_active() || body1.non_colliding {
                return Vec::new();
            }

            self.bodies[i + 1..]
                .iter()
                .enumerate()
                .filter(|(_, body2)| body2.is_active() && !body2.non_colliding)
                .filter(|(_, body2)| !(body1.is_static() && body2.is_static()))
                .filter_map(|(offset, body2)| {
                    detect(body1, body2)
                        .map(|c| (i as u16, (i + 1 + offset) as u16, c))
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        {
            (0..self.bodies.len())
                .into_par_iter()
                .map(row)
                .reduce(Vec::new, |mut acc, mut r| {
                    acc.append(&mut r);
                    acc
                })
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut contacts = Vec::new();

            for i in 0..self.bodies.len() {
                contacts.append(&mut row(i));
            }

            contacts
        }
    }
}

/// Accelerate two bodies toward each other, `acceleration` each. Static
/// bodies anchor the pair: they pull without being pulled.
pub fn attract(body1: &mut Body, body2: &mut Body, acceleration: Unit) {
    let direction = Vec4::from_to(body2.position, body1.position, acceleration);

    if !body2.is_static() {
        body2.velocity = body2.velocity.plus(direction);
    }

    if !body1.is_static() {
        body1.velocity = body1.velocity.minus(direction);
    }
}
