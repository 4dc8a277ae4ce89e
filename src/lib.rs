//! # Pebble Physics
//!
//! **Deterministic Fixed-Point Rigid-Body Physics**
//!
//! A small 3D physics core built entirely on 32-bit integer fixed-point
//! arithmetic. Every operation is bit-exact across platforms, so simulations
//! replay identically from the same inputs on a desktop, a microcontroller
//! or inside a lockstep-networked game.
//!
//! ## Features
//!
//! | Module | Description |
//! |--------|-------------|
//! | **math** | Fixed-point units, vectors, quaternions, lookup-table trig |
//! | **rotation** | Drift-free axis/angle rotation state |
//! | **body** | Shapes, mass, impulses, kinetic energy, anti-vibration |
//! | **collision** | Narrow-phase tests for sphere, capsule, cylinder, cuboid |
//! | **resolver** | Impulse-based contact resolution with energy correction |
//! | **world** | Naive all-pairs driver over a caller-owned body slice |
//! | **snapshot** | Binary save/restore of full body state |
//! | **profiling** | Deterministic per-pass work counters |
//!
//! ## Design Principles
//!
//! - **Bit-Exact Determinism**: integer math only, no floating point anywhere
//! - **Caller-Owned Storage**: the world borrows a body slice, it never owns one
//! - **no_std Compatible**: the core needs neither a heap nor an OS
//! - **Drift-Free Rotation**: orientation is derived, not integrated
//!
//! ## Quick Start
//!
//! ```rust
//! use pebble_physics::prelude::*;
//!
//! // Two unit-radius spheres above a big static ball acting as the ground
//! // (its top surface sits at y = 0).
//! let mut bodies = [
//!     Body::new(Shape::Sphere { radius: UNITS }),
//!     Body::new(Shape::Sphere { radius: UNITS }),
//!     Body::new(Shape::Sphere { radius: 20 * UNITS }).with_static_mass(),
//! ];
//! bodies[0].position = Vec4::new(0, 5 * UNITS, 0, 0);
//! bodies[1].position = Vec4::new(3 * UNITS, 8 * UNITS, 0, 0);
//! bodies[2].position = Vec4::new(0, -20 * UNITS, 0, 0);
//!
//! let mut world = World::new(&mut bodies);
//!
//! for _ in 0..100 {
//!     world.apply_gravity_down(5);
//!     world.resolve_collisions_naive();
//!     world.step_bodies();
//! }
//!
//! assert!(world.bodies[0].position.y > -2 * UNITS, "sphere rests on the ground");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod body;
pub mod collision;
pub mod error;
pub mod math;
pub mod profiling;
pub mod resolver;
pub mod rotation;
pub mod snapshot;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::body::{
        AntiVibration, Body, Shape, ANTI_VIBRATION_INCREMENT, ANTI_VIBRATION_MAX_FRAMES,
        ANTI_VIBRATION_VELOCITY_BREAK,
    };
    pub use crate::collision::{detect, Collision};
    pub use crate::error::PhysicsError;
    pub use crate::math::{Unit, Vec4, INFINITY, PI, UNITS};
    pub use crate::profiling::{StepProfiler, StepStats};
    pub use crate::resolver::resolve;
    pub use crate::rotation::RotationState;
    pub use crate::snapshot::{load_bodies, save_bodies};
    pub use crate::world::{attract, World, DEFAULT_RESTITUTION};
}

// Re-export main types at crate root
pub use prelude::*;
