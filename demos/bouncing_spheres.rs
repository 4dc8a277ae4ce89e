//! Bouncing Spheres Example
//!
//! Drops a handful of spheres onto a big static ball and prints their
//! heights as they bounce and settle.
//!
//! ```bash
//! cargo run --example bouncing_spheres
//! ```

use pebble_physics::prelude::*;

fn main() {
    // A big static ball acts as the ground; its top surface sits at y = 0.
    let mut ground = Body::new(Shape::Sphere { radius: 50 * UNITS }).with_static_mass();
    ground.position = Vec4::new(0, -50 * UNITS, 0, 0);

    let mut bodies = vec![ground];

    // Spheres dropped from increasing heights, slightly offset so they
    // scatter instead of stacking on one point.
    for i in 0..5 {
        let mut ball = Body::new(Shape::Sphere { radius: UNITS });
        ball.position = Vec4::new(i * 300 - 600, (6 + 2 * i) * UNITS, i * 150, 0);
        bodies.push(ball);
    }

    let mut world = World::new(&mut bodies);
    let mut profiler = StepProfiler::new();

    println!("pebble-physics Bouncing Spheres");
    println!("===============================");
    println!("Bodies: {}", world.bodies.len());
    println!();

    for frame in 0..300 {
        world.apply_gravity_down(5);
        world.resolve_collisions_naive();
        profiler.record_frame(&world.stats);
        world.step_bodies();

        if frame % 50 == 0 {
            let heights: Vec<Unit> = world.bodies[1..]
                .iter()
                .map(|b| b.position.y)
                .collect();
            println!(
                "Frame {:3}: heights (units of 1/{}) = {:?}",
                frame, UNITS, heights
            );
        }
    }

    println!();
    for (name, last, average, peak) in profiler.summary() {
        println!("{:18} last={:4} avg={:4} peak={:4}", name, last, average, peak);
    }
    println!();
    println!("Simulation complete (300 frames).");
}
