//! Benchmarks for pebble-physics
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pebble_physics::prelude::*;

fn sphere_grid(n: usize) -> Vec<Body> {
    // Spheres on a loose 3D grid with a few near-contacts per row.
    (0..n)
        .map(|i| {
            let mut body = Body::new(Shape::Sphere { radius: UNITS });
            body.position = Vec4::new(
                (i % 8) as Unit * 3 * UNITS / 2,
                (i / 8 % 8) as Unit * 3 * UNITS / 2,
                (i / 64) as Unit * 3 * UNITS / 2,
                0,
            );
            body
        })
        .collect()
}

// ============================================================================
// World step benchmarks
// ============================================================================

fn bench_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");

    for &n in &[8usize, 32, 64] {
        group.bench_function(format!("naive_pass_{}_spheres", n), |b| {
            b.iter(|| {
                let mut bodies = sphere_grid(n);
                let mut world = World::new(&mut bodies);
                for _ in 0..10 {
                    world.apply_gravity_down(black_box(5));
                    world.resolve_collisions_naive();
                    world.step_bodies();
                }
                world.bodies[0].position
            });
        });
    }

    group.bench_function("detect_only_64_spheres", |b| {
        let mut bodies = sphere_grid(64);
        let world = World::new(&mut bodies);
        b.iter(|| black_box(world.detect_collisions().len()));
    });

    group.finish();
}

// ============================================================================
// Narrow phase benchmarks
// ============================================================================

fn bench_narrow_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("narrow_phase");

    let mut a = Body::new(Shape::Sphere { radius: UNITS });
    let mut b = Body::new(Shape::Sphere { radius: UNITS });
    b.position = Vec4::new(900, 0, 0, 0);

    group.bench_function("sphere_sphere_hit", |bench| {
        bench.iter(|| black_box(detect(black_box(&a), black_box(&b))));
    });

    let c1 = Body::new(Shape::Cuboid {
        width: 2 * UNITS,
        height: 2 * UNITS,
        depth: 2 * UNITS,
    });
    let mut c2 = Body::new(Shape::Cuboid {
        width: UNITS,
        height: UNITS,
        depth: UNITS,
    });
    c2.position = Vec4::new(UNITS, 200, -100, 0);

    group.bench_function("cuboid_cuboid_hit", |bench| {
        bench.iter(|| black_box(detect(black_box(&c1), black_box(&c2))));
    });

    a.position = Vec4::ZERO;
    b.position = Vec4::new(10 * UNITS, 0, 0, 0);
    group.bench_function("sphere_sphere_miss", |bench| {
        bench.iter(|| black_box(detect(black_box(&a), black_box(&b))));
    });

    group.finish();
}

// ============================================================================
// Math kernel benchmarks
// ============================================================================

fn bench_math_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("math_ops");

    let v = Vec4::new(300, -400, 120, 0);
    let w = Vec4::new(-150, 90, 510, 0);

    group.bench_function("vec_normalize", |bench| {
        bench.iter(|| black_box(black_box(v).normalized()));
    });

    group.bench_function("vec_cross", |bench| {
        bench.iter(|| black_box(black_box(v).cross(black_box(w))));
    });

    let q = Vec4::from_axis_angle(Vec4::new(0, UNITS, 0, 0), 100);
    group.bench_function("quat_rotate", |bench| {
        bench.iter(|| black_box(black_box(v).rotated_by(black_box(q))));
    });

    group.bench_function("fixed_sqrt", |bench| {
        bench.iter(|| black_box(pebble_physics::math::sqrt(black_box(1234567))));
    });

    group.finish();
}

criterion_group!(benches, bench_world_step, bench_narrow_phase, bench_math_ops);
criterion_main!(benches);
