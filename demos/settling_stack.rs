//! Settling Stack Example
//!
//! Stacks dynamic cuboids on a static slab and lets the anti-vibration
//! damping bring the pile to rest, printing total kinetic energy so the
//! settling is visible.
//!
//! ```bash
//! cargo run --example settling_stack
//! ```

use pebble_physics::prelude::*;

fn box_body(size: Unit, x: Unit, y: Unit) -> Body {
    let mut body = Body::new(Shape::Cuboid {
        width: size,
        height: size,
        depth: size,
    });
    body.position = Vec4::new(x, y, 0, 0);
    body
}

fn main() {
    let mut slab = Body::new(Shape::Cuboid {
        width: 30 * UNITS,
        height: 2 * UNITS,
        depth: 30 * UNITS,
    })
    .with_static_mass();
    slab.position = Vec4::new(0, -3 * UNITS, 0, 0);

    // Shrinking sizes keep faces from lining up exactly, which helps the
    // edge-clipping narrow phase find contacts early.
    let mut bodies = vec![
        slab,
        box_body(2 * UNITS, 0, 2 * UNITS),
        box_body(3 * UNITS / 2, 100, 5 * UNITS),
        box_body(UNITS, -80, 8 * UNITS),
    ];

    let mut world = World::new(&mut bodies);

    println!("pebble-physics Settling Stack");
    println!("=============================");
    println!();

    for frame in 0..500 {
        world.apply_gravity_down(4);
        world.resolve_collisions_naive();
        world.step_bodies();

        if frame % 50 == 0 {
            let energy: Unit = world.bodies[1..]
                .iter()
                .map(|b| b.kinetic_energy())
                .sum();
            let settled = world.bodies[1..]
                .iter()
                .filter(|b| b.is_settled(30))
                .count();
            println!(
                "Frame {:3}: total kinetic energy = {:5}  contacts = {}  settled = {}/3",
                frame, energy, world.stats.contacts_resolved, settled
            );
        }
    }

    println!();
    println!("Simulation complete (500 frames).");
}
