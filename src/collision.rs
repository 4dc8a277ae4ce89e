//! Narrow-Phase Collision Detection
//!
//! Pairwise collision tests between body shapes. Every supported pair
//! reduces to one of three primitives:
//!
//! - sphere vs sphere (the base case everything funnels into),
//! - sphere vs cylinder (three contact regions: side, cap face, cap edge),
//! - cuboid vs cuboid (edge clipping against face-plane pairs).
//!
//! Capsules are handled by substituting a sphere at the closest point on the
//! capsule's axis segment. Shape pairs with no implemented test simply
//! report no collision.
//!
//! A contact reports the world-space collision point, a unit normal pointing
//! *away from the first body* (moving the first body against the normal by
//! the depth separates the pair) and the penetration depth along the normal.
//! Every test except sphere-sphere is preceded by a bounding-sphere check,
//! which both rejects far-apart pairs cheaply and keeps the long-distance
//! arithmetic below from being fed huge coordinates.

use crate::body::{Body, Shape};
use crate::math::{
    line_segment_closest_point, non_zero, non_zero_wide, Unit, Vec4, INFINITY, UNITS,
};

/// A detected contact between two bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collision {
    /// World-space contact point.
    pub point: Vec4,
    /// Unit normal pointing away from the first body of the tested pair.
    pub normal: Vec4,
    /// Penetration depth along the normal, at least 1.
    pub depth: Unit,
}

impl Collision {
    /// The same contact seen from the other body's side.
    #[must_use]
    fn flipped(self) -> Self {
        Self {
            normal: self.normal.times_plain(-1),
            ..self
        }
    }
}

/// Test two bodies for collision.
///
/// Returns `None` when the bodies do not touch or their shape pair has no
/// implemented test. The contact normal points away from `body1`.
#[must_use]
pub fn detect(body1: &Body, body2: &Body) -> Option<Collision> {
    let both_spheres = matches!(
        (&body1.shape, &body2.shape),
        (Shape::Sphere { .. }, Shape::Sphere { .. })
    );

    if !both_spheres
        && body1.position.dist(body2.position)
            > body1.bounding_sphere_radius + body2.bounding_sphere_radius
    {
        return None;
    }

    match (body1.shape, body2.shape) {
        (Shape::Sphere { radius: r1 }, Shape::Sphere { radius: r2 }) => {
            sphere_sphere(body1.position, r1, body2.position, r2)
        }

        (Shape::Sphere { radius }, Shape::Capsule { .. }) => {
            let closest = capsule_closest_point(body2, body1.position);
            sphere_sphere(body1.position, radius, closest.point, closest.radius)
        }

        (Shape::Capsule { .. }, Shape::Sphere { radius }) => {
            let closest = capsule_closest_point(body1, body2.position);
            sphere_sphere(closest.point, closest.radius, body2.position, radius)
        }

        (Shape::Capsule { radius: r1, .. }, Shape::Capsule { radius: r2, .. }) => {
            let (c1, c2) = capsule_capsule_closest_points(body1, body2);
            sphere_sphere(c1, r1, c2, r2)
        }

        (Shape::Sphere { radius }, Shape::Cylinder { .. }) => {
            sphere_cylinder(body1.position, radius, body2).map(Collision::flipped)
        }

        (Shape::Cylinder { .. }, Shape::Sphere { radius }) => {
            sphere_cylinder(body2.position, radius, body1)
        }

        (Shape::Cuboid { .. }, Shape::Cuboid { .. }) => cuboid_cuboid(body1, body2),

        _ => None,
    }
}

// ============================================================================
// Sphere Pairs
// ============================================================================

fn sphere_sphere(p1: Vec4, r1: Unit, p2: Vec4, r2: Unit) -> Option<Collision> {
    let direction = p2.minus(p1);
    let distance = direction.len() - (r1 + r2);

    if distance >= 0 {
        return None;
    }

    Some(Collision {
        point: p1.average(p2),
        normal: direction.normalized(),
        depth: -distance,
    })
}

/// World-space end points of a capsule's or cylinder's axis segment.
fn axis_endpoints(body: &Body, height: Unit) -> (Vec4, Vec4) {
    let orientation = body.orientation();

    let a = Vec4::new(0, height / 2, 0, 0).rotated_by(orientation);
    let b = Vec4::new(0, -height / 2, 0, 0).rotated_by(orientation);

    (a.plus(body.position), b.plus(body.position))
}

struct AxisSphere {
    point: Vec4,
    radius: Unit,
}

/// The sphere a capsule degenerates to for a query point: the capsule's
/// radius placed at the closest point of its axis segment.
fn capsule_closest_point(capsule: &Body, to: Vec4) -> AxisSphere {
    let Shape::Capsule { radius, height } = capsule.shape else {
        return AxisSphere {
            point: capsule.position,
            radius: 0,
        };
    };

    let (a, b) = axis_endpoints(capsule, height);

    AxisSphere {
        point: line_segment_closest_point(a, b, to),
        radius,
    }
}

/// Closest pair of points on two capsules' axis segments: seeded from the
/// closest end-point combination, then refined by two alternating
/// closest-point projections.
fn capsule_capsule_closest_points(body1: &Body, body2: &Body) -> (Vec4, Vec4) {
    let (Shape::Capsule { height: h1, .. }, Shape::Capsule { height: h2, .. }) =
        (body1.shape, body2.shape)
    else {
        return (body1.position, body2.position);
    };

    let (a1, b1) = axis_endpoints(body1, h1);
    let (a2, b2) = axis_endpoints(body2, h2);

    let sq = |u: Vec4, v: Vec4| {
        let d = u.minus(v);
        d.dot_plain(d)
    };

    let from_a = sq(a1, a2).min(sq(a1, b2));
    let from_b = sq(b1, a2).min(sq(b1, b2));

    let seed = if from_b < from_a { b1 } else { a1 };

    let on_2 = line_segment_closest_point(a2, b2, seed);
    let on_1 = line_segment_closest_point(a1, b1, on_2);

    (on_1, on_2)
}

// ============================================================================
// Sphere vs Cylinder
// ============================================================================

/// Sphere against cylinder; the returned normal points away from the
/// cylinder (the caller flips it when the sphere comes first).
///
/// Working in the cylinder's local frame, the sphere center falls into one
/// of three regions along the axis: beside the side wall, above a cap
/// within the radius, or diagonally off a cap edge.
fn sphere_cylinder(sphere_pos: Vec4, sphere_r: Unit, cylinder: &Body) -> Option<Collision> {
    let Shape::Cylinder { radius, height } = cylinder.shape else {
        return None;
    };

    let relative = sphere_pos.minus(cylinder.position);

    let axis = Vec4::new(0, UNITS, 0, 0).rotated_by(cylinder.orientation());
    let on_axis = relative.project_onto(axis);
    let axis_distance = on_axis.len();

    let half_height = height / 2;

    if axis_distance >= half_height + sphere_r {
        // beyond the caps entirely
        return None;
    }

    let axis_to_center = relative.minus(on_axis);
    let radial_distance = axis_to_center.len();

    if axis_distance < half_height {
        // beside the side wall
        let penetration = radius - (radial_distance - sphere_r);

        if penetration <= 0 {
            return None;
        }

        let normal = axis_to_center.normalized();

        return Some(Collision {
            point: cylinder.position.plus(on_axis.plus(normal.times(radius))),
            normal,
            depth: penetration,
        });
    }

    let cap_middle = on_axis.normalized().times(half_height);

    if radial_distance < radius {
        // over a cap face
        let penetration = half_height - (axis_distance - sphere_r);

        Some(Collision {
            point: cylinder.position.plus(axis_to_center.plus(cap_middle)),
            normal: on_axis.normalized(),
            // rounding can push the depth to zero here; report a touch
            depth: penetration.max(1),
        })
    } else {
        // off a cap edge
        let edge_point = cap_middle.plus(axis_to_center.normalized().times(radius));
        let penetration = sphere_r - edge_point.dist(relative);

        if penetration <= 0 {
            return None;
        }

        Some(Collision {
            point: cylinder.position.plus(edge_point),
            normal: relative.minus(edge_point).normalized(),
            depth: penetration,
        })
    }
}

// ============================================================================
// Cuboid vs Cuboid
// ============================================================================

/// Half-extent axes of a cuboid in world orientation.
fn cuboid_axes(body: &Body) -> [Vec4; 3] {
    let (w, h, d) = match body.shape {
        Shape::Cuboid {
            width,
            height,
            depth,
        } => (width, height, depth),
        _ => (0, 0, 0),
    };

    let q = body.orientation();

    [
        Vec4::new(w / 2, 0, 0, 0).rotated_by(q),
        Vec4::new(0, h / 2, 0, 0).rotated_by(q),
        Vec4::new(0, 0, d / 2, 0).rotated_by(q),
    ]
}

/// Cuboid edges as axis sign combinations: low three bits pick the +/- side
/// per axis (x, y, z) for the start corner, next three for the end corner.
#[rustfmt::skip]
const CUBOID_EDGES: [u8; 12] = [
    0x3b, 0x3e, 0x13, 0x16, // top face
    0x29, 0x2c, 0x01, 0x04, // bottom face
    0x3d, 0x19, 0x10, 0x34, // vertical sides
];

/// Restrict the parameter range `[t1, t2]` of the line `start + t * dir` to
/// the slab between the two planes with normal `side_offset` passing through
/// `center + side_offset` and `center - side_offset`. An empty result shows
/// up as `t1 > t2`.
///
/// Near-parallel lines make the plane intersection parameters huge, so the
/// range is kept in `i64` until the caller clamps it.
fn cut_segment_by_slab(
    center: Vec4,
    side_offset: Vec4,
    line_start: Vec4,
    line_dir: Vec4,
    t1: &mut i64,
    t2: &mut i64,
) {
    let start = line_start.minus(center);

    let da = side_offset.dot_plain(start);
    let extent = side_offset.dot_plain(side_offset);
    let denom = non_zero_wide(side_offset.dot_plain(line_dir));

    let ta = (extent - da) * UNITS as i64 / denom;
    let tb = (-extent - da) * UNITS as i64 / denom;

    let (near, far) = if tb < ta { (tb, ta) } else { (ta, tb) };

    if near > *t1 {
        *t1 = near;
    }

    if far < *t2 {
        *t2 = far;
    }
}

/// Cuboid-cuboid test: clip each body's 12 edges against the other body's
/// three face slabs, gather the surviving segment end points, and take their
/// bounding-box midpoint as the contact. The normal is the face axis (of
/// either body) that best matches the direction from its center to the
/// contact, and the depth comes from the same face.
fn cuboid_cuboid(body1: &Body, body2: &Body) -> Option<Collision> {
    let axes1 = cuboid_axes(body1);
    let axes2 = cuboid_axes(body2);

    let mut extent_min = Vec4::new(INFINITY, INFINITY, INFINITY, 0);
    let mut extent_max = Vec4::new(-INFINITY, -INFINITY, -INFINITY, 0);
    let mut any_hit = false;

    for (edge_body, edge_axes, slab_body, slab_axes) in [
        (body1, &axes1, body2, &axes2),
        (body2, &axes2, body1, &axes1),
    ] {
        for edge in CUBOID_EDGES {
            let mut start = edge_body.position;
            let mut end = edge_body.position;

            for (bit, axis) in [(0x04, 0), (0x02, 1), (0x01, 2)] {
                start = if edge & bit != 0 {
                    start.plus(edge_axes[axis])
                } else {
                    start.minus(edge_axes[axis])
                };
            }

            for (bit, axis) in [(0x20, 0), (0x10, 1), (0x08, 2)] {
                end = if edge & bit != 0 {
                    end.plus(edge_axes[axis])
                } else {
                    end.minus(edge_axes[axis])
                };
            }

            let dir = end.minus(start);

            let mut t1: i64 = 0;
            let mut t2: i64 = UNITS as i64;

            for slab in slab_axes {
                cut_segment_by_slab(slab_body.position, *slab, start, dir, &mut t1, &mut t2);

                if t1 > t2 {
                    break;
                }
            }

            if t2 > t1 {
                any_hit = true;

                for t in [t1 as Unit, t2 as Unit] {
                    let p = start.plus(dir.times(t));

                    extent_min.x = extent_min.x.min(p.x);
                    extent_min.y = extent_min.y.min(p.y);
                    extent_min.z = extent_min.z.min(p.z);
                    extent_max.x = extent_max.x.max(p.x);
                    extent_max.y = extent_max.y.max(p.y);
                    extent_max.z = extent_max.z.max(p.z);
                }
            }
        }
    }

    if !any_hit {
        return None;
    }

    let point = extent_min.average(extent_max);

    let mut best_depth = -INFINITY;
    let mut best_normal = Vec4::UNIT_X;

    // Both bodies propose a separating face; the deeper one wins. The
    // second body's proposal must be flipped to keep the normal pointing
    // away from the first body.
    for (candidate, candidate_axes, flip) in [(body2, &axes2, true), (body1, &axes1, false)] {
        let relative = point.minus(candidate.position);

        let mut best_axis = Vec4::UNIT_X;
        let mut best_dot: i64 = -1;

        for axis in candidate_axes {
            let fit = axis.dot(relative) as i64 * UNITS as i64
                / non_zero_wide(axis.dot(*axis) as i64);

            if fit > best_dot {
                best_dot = fit;
                best_axis = *axis;
            } else if -fit > best_dot {
                best_dot = -fit;
                best_axis = axis.times_plain(-1);
            }
        }

        let len = non_zero(best_axis.len()) as i64;
        let depth = (len - best_axis.dot_plain(relative) / len) as Unit;

        if depth > best_depth {
            best_depth = depth;

            best_normal = best_axis.normalized();

            if flip {
                best_normal = best_normal.times_plain(-1);
            }
        }
    }

    Some(Collision {
        point,
        normal: best_normal,
        depth: best_depth.max(1),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: Unit, y: Unit, z: Unit, radius: Unit) -> Body {
        let mut b = Body::new(Shape::Sphere { radius });
        b.position = Vec4::new(x, y, z, 0);
        b
    }

    #[test]
    fn test_separated_spheres_do_not_collide() {
        let a = sphere(0, 0, 0, UNITS);
        let b = sphere(3 * UNITS, 0, 0, UNITS);

        assert!(detect(&a, &b).is_none());
    }

    #[test]
    fn test_touching_spheres_do_not_collide() {
        let a = sphere(0, 0, 0, UNITS);
        let b = sphere(2 * UNITS, 0, 0, UNITS);

        assert!(detect(&a, &b).is_none(), "exact touch is not a collision");
    }

    #[test]
    fn test_overlapping_spheres() {
        let a = sphere(0, 0, 0, UNITS);
        let b = sphere(700, 0, 0, UNITS);

        let c = detect(&a, &b).unwrap();

        assert_eq!(c.depth, 2 * UNITS - 700);
        assert_eq!(c.point, Vec4::new(350, 0, 0, 0));
        assert_eq!(c.normal, Vec4::new(UNITS, 0, 0, 0), "normal away from body1");
    }

    #[test]
    fn test_sphere_pair_normals_mirror() {
        let a = sphere(0, 0, 0, UNITS);
        let b = sphere(700, 0, 0, UNITS);

        let ab = detect(&a, &b).unwrap();
        let ba = detect(&b, &a).unwrap();

        assert_eq!(ab.depth, ba.depth);
        assert_eq!(ab.normal, ba.normal.times_plain(-1));
    }

    #[test]
    fn test_sphere_capsule_side_contact() {
        let s = sphere(200, 0, 0, 128);

        let mut capsule = Body::new(Shape::Capsule {
            radius: 128,
            height: UNITS,
        });
        capsule.position = Vec4::ZERO;

        let c = detect(&s, &capsule).unwrap();

        assert_eq!(c.depth, 56);
        assert_eq!(
            c.normal,
            Vec4::new(-UNITS, 0, 0, 0),
            "normal points from the capsule toward body1's far side"
        );
    }

    #[test]
    fn test_sphere_misses_capsule_past_cap() {
        let s = sphere(0, UNITS + 300, 0, 128);

        let capsule = Body::new(Shape::Capsule {
            radius: 128,
            height: UNITS,
        });

        assert!(detect(&s, &capsule).is_none());
    }

    #[test]
    fn test_parallel_capsules() {
        let mut c1 = Body::new(Shape::Capsule {
            radius: 128,
            height: UNITS,
        });
        let mut c2 = c1;

        c1.position = Vec4::ZERO;
        c2.position = Vec4::new(200, 0, 0, 0);

        let c = detect(&c1, &c2).unwrap();

        assert_eq!(c.depth, 56);
        assert_eq!(c.normal.x, UNITS);
    }

    #[test]
    fn test_sphere_cylinder_side_contact() {
        let s = sphere(400, 0, 0, 256);

        let cylinder = Body::new(Shape::Cylinder {
            radius: 256,
            height: UNITS,
        });

        let c = detect(&s, &cylinder).unwrap();

        assert_eq!(c.depth, 112);
        assert_eq!(c.normal, Vec4::new(-UNITS, 0, 0, 0));
        assert_eq!(c.point, Vec4::new(256, 0, 0, 0));
    }

    #[test]
    fn test_sphere_cylinder_cap_contact() {
        let s = sphere(0, 400, 0, 256);

        let cylinder = Body::new(Shape::Cylinder {
            radius: 256,
            height: UNITS,
        });

        let c = detect(&s, &cylinder).unwrap();

        assert!(c.depth > 0);
        assert_eq!(
            c.normal.y, -UNITS,
            "cap contact pushes body1 along the axis"
        );
    }

    #[test]
    fn test_sphere_cylinder_edge_contact() {
        // Sphere diagonally off the top rim
        let s = sphere(400, 400, 0, 256);

        let cylinder = Body::new(Shape::Cylinder {
            radius: 256,
            height: UNITS,
        });

        let c = detect(&s, &cylinder).unwrap();

        assert!(c.depth > 0);
        assert!(c.normal.x < 0 && c.normal.y < 0, "normal points off the rim toward body1's opposite");
    }

    #[test]
    fn test_sphere_clear_of_cylinder() {
        let s = sphere(700, 0, 0, 128);

        let cylinder = Body::new(Shape::Cylinder {
            radius: 256,
            height: UNITS,
        });

        assert!(detect(&s, &cylinder).is_none());
    }

    #[test]
    fn test_cuboid_overlap() {
        let mut big = Body::new(Shape::Cuboid {
            width: UNITS,
            height: UNITS,
            depth: UNITS,
        });
        big.position = Vec4::ZERO;

        let mut small = Body::new(Shape::Cuboid {
            width: 256,
            height: 256,
            depth: 256,
        });
        small.position = Vec4::new(300, 0, 0, 0);

        let c = detect(&big, &small).unwrap();

        assert_eq!(c.depth, 42);
        assert_eq!(c.normal, Vec4::new(UNITS, 0, 0, 0));
        assert_eq!(c.point, Vec4::new(214, 0, 0, 0));
    }

    #[test]
    fn test_cuboid_overlap_flipped_order() {
        let mut big = Body::new(Shape::Cuboid {
            width: UNITS,
            height: UNITS,
            depth: UNITS,
        });
        big.position = Vec4::ZERO;

        let mut small = Body::new(Shape::Cuboid {
            width: 256,
            height: 256,
            depth: 256,
        });
        small.position = Vec4::new(300, 0, 0, 0);

        let c = detect(&small, &big).unwrap();

        assert_eq!(c.depth, 42);
        assert_eq!(c.normal, Vec4::new(-UNITS, 0, 0, 0));
    }

    #[test]
    fn test_distant_cuboids_rejected_by_bounding_sphere() {
        let mut a = Body::new(Shape::Cuboid {
            width: UNITS,
            height: UNITS,
            depth: UNITS,
        });
        a.position = Vec4::ZERO;

        let mut b = a;
        b.position = Vec4::new(100 * UNITS, 0, 0, 0);

        assert!(detect(&a, &b).is_none());
    }

    #[test]
    fn test_unsupported_pair_reports_nothing() {
        let s = sphere(0, 0, 0, UNITS);

        let mut cuboid = Body::new(Shape::Cuboid {
            width: UNITS,
            height: UNITS,
            depth: UNITS,
        });
        cuboid.position = Vec4::new(100, 0, 0, 0);

        assert!(detect(&s, &cuboid).is_none());
    }
}
