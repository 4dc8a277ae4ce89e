//! Body Snapshots
//!
//! Save and restore the full dynamic state of a body set as a compact
//! binary image. Every field is raw fixed-point data written little-endian,
//! so a snapshot restored on any platform replays bit-for-bit — the pair of
//! [`save_bodies`] and [`load_bodies`] is the determinism story's transport
//! layer (record a snapshot plus inputs, replay anywhere).
//!
//! # Format
//!
//! ```text
//! Magic:   "PBSN" (4 bytes)
//! Version: u32 LE
//! Count:   u32 LE
//! Bodies:  count fixed-size records
//! ```
//!
//! A body record is a shape tag byte, three shape parameters, then mass,
//! position, velocity, the whole rotation state, anti-vibration and flags.
//! The bounding sphere radius is recomputed on load rather than stored.
//!
//! Triangle meshes cannot be snapshotted: their geometry lives in static
//! storage outside the body, and a byte stream cannot restore a borrow.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::body::{AntiVibration, Body, Shape};
use crate::error::PhysicsError;
use crate::math::{Unit, Vec4};
use crate::rotation::RotationState;

const MAGIC: &[u8; 4] = b"PBSN";
const VERSION: u32 = 1;

const TAG_POINT: u8 = 0;
const TAG_SPHERE: u8 = 1;
const TAG_CAPSULE: u8 = 2;
const TAG_CUBOID: u8 = 3;
const TAG_PLANE: u8 = 4;
const TAG_CYLINDER: u8 = 5;

const FLAG_NON_COLLIDING: u8 = 0x01;
const FLAG_DISABLED: u8 = 0x02;

/// Serialized size of one body record: shape tag + three parameters,
/// mass, position, velocity, two quaternions, angle, anti-vibration
/// state and the flags byte.
const BODY_RECORD_BYTES: usize = 1 + 3 * 4 + 4 + 3 * 4 + 3 * 4 + 4 * 4 + 4 * 4 + 4 + 2 + 1;

// ============================================================================
// Saving
// ============================================================================

fn put_unit(out: &mut Vec<u8>, v: Unit) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_vec3(out: &mut Vec<u8>, v: Vec4) {
    put_unit(out, v.x);
    put_unit(out, v.y);
    put_unit(out, v.z);
}

fn put_vec4(out: &mut Vec<u8>, v: Vec4) {
    put_vec3(out, v);
    put_unit(out, v.w);
}

fn shape_record(shape: &Shape) -> Result<(u8, [Unit; 3]), PhysicsError> {
    Ok(match *shape {
        Shape::Point => (TAG_POINT, [0, 0, 0]),
        Shape::Sphere { radius } => (TAG_SPHERE, [radius, 0, 0]),
        Shape::Capsule { radius, height } => (TAG_CAPSULE, [radius, height, 0]),
        Shape::Cuboid {
            width,
            height,
            depth,
        } => (TAG_CUBOID, [width, height, depth]),
        Shape::Plane { width, depth } => (TAG_PLANE, [width, depth, 0]),
        Shape::Cylinder { radius, height } => (TAG_CYLINDER, [radius, height, 0]),
        Shape::TriMesh { .. } => return Err(PhysicsError::UnserializableShape),
    })
}

/// Serialize a body slice into a snapshot image.
pub fn save_bodies(bodies: &[Body]) -> Result<Vec<u8>, PhysicsError> {
    let mut out = Vec::new();

    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(bodies.len() as u32).to_le_bytes());

    for body in bodies {
        let (tag, params) = shape_record(&body.shape)?;

        out.push(tag);

        for p in params {
            put_unit(&mut out, p);
        }

        put_unit(&mut out, body.mass);
        put_vec3(&mut out, body.position);
        put_vec3(&mut out, body.velocity);
        put_vec4(&mut out, body.rotation.original_orientation);
        put_vec4(&mut out, body.rotation.axis_velocity);
        put_unit(&mut out, body.rotation.current_angle);

        out.push(body.anti_vibration.active as u8);
        out.push(body.anti_vibration.cooldown_frames);

        let mut flags = 0u8;
        if body.non_colliding {
            flags |= FLAG_NON_COLLIDING;
        }
        if body.disabled {
            flags |= FLAG_DISABLED;
        }
        out.push(flags);
    }

    Ok(out)
}

// ============================================================================
// Loading
// ============================================================================

/// Write a snapshot image straight to a file.
#[cfg(feature = "std")]
pub fn save_bodies_to_file(bodies: &[Body], path: &std::path::Path) -> std::io::Result<()> {
    let image = save_bodies(bodies)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    std::fs::write(path, image)
}

/// Restore a body set from a snapshot file.
#[cfg(feature = "std")]
pub fn load_bodies_from_file(path: &std::path::Path) -> std::io::Result<Vec<Body>> {
    let data = std::fs::read(path)?;
    load_bodies(&data).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

struct Reader<'a> {
    data: &'a [u8],
}

impl Reader<'_> {
    fn bytes<const N: usize>(&mut self) -> Result<[u8; N], PhysicsError> {
        if self.data.len() < N {
            return Err(PhysicsError::TruncatedData {
                expected: N,
                remaining: self.data.len(),
            });
        }

        let (head, tail) = self.data.split_at(N);
        self.data = tail;

        let mut out = [0u8; N];
        out.copy_from_slice(head);
        Ok(out)
    }

    fn byte(&mut self) -> Result<u8, PhysicsError> {
        Ok(self.bytes::<1>()?[0])
    }

    fn word(&mut self) -> Result<u32, PhysicsError> {
        Ok(u32::from_le_bytes(self.bytes::<4>()?))
    }

    fn unit(&mut self) -> Result<Unit, PhysicsError> {
        Ok(Unit::from_le_bytes(self.bytes::<4>()?))
    }

    fn vec3(&mut self) -> Result<Vec4, PhysicsError> {
        Ok(Vec4::new(self.unit()?, self.unit()?, self.unit()?, 0))
    }

    fn vec4(&mut self) -> Result<Vec4, PhysicsError> {
        Ok(Vec4::new(
            self.unit()?,
            self.unit()?,
            self.unit()?,
            self.unit()?,
        ))
    }
}

fn shape_from_record(tag: u8, p: [Unit; 3]) -> Result<Shape, PhysicsError> {
    Ok(match tag {
        TAG_POINT => Shape::Point,
        TAG_SPHERE => Shape::Sphere { radius: p[0] },
        TAG_CAPSULE => Shape::Capsule {
            radius: p[0],
            height: p[1],
        },
        TAG_CUBOID => Shape::Cuboid {
            width: p[0],
            height: p[1],
            depth: p[2],
        },
        TAG_PLANE => Shape::Plane {
            width: p[0],
            depth: p[1],
        },
        TAG_CYLINDER => Shape::Cylinder {
            radius: p[0],
            height: p[1],
        },
        _ => return Err(PhysicsError::InvalidShapeTag { tag }),
    })
}

/// Restore a body set from a snapshot image produced by [`save_bodies`].
pub fn load_bodies(data: &[u8]) -> Result<Vec<Body>, PhysicsError> {
    let mut r = Reader { data };

    if &r.bytes::<4>()? != MAGIC {
        return Err(PhysicsError::BadMagic);
    }

    let version = r.word()?;
    if version != VERSION {
        return Err(PhysicsError::UnsupportedVersion { version });
    }

    let count = r.word()? as usize;

    // The header is untrusted: check the declared count against what the
    // buffer can actually hold before sizing the allocation from it.
    let expected = count.saturating_mul(BODY_RECORD_BYTES);
    if expected > r.data.len() {
        return Err(PhysicsError::TruncatedData {
            expected,
            remaining: r.data.len(),
        });
    }

    let mut bodies = Vec::with_capacity(count);

    for _ in 0..count {
        let tag = r.byte()?;
        let params = [r.unit()?, r.unit()?, r.unit()?];
        let shape = shape_from_record(tag, params)?;

        let mass = r.unit()?;
        if mass <= 0 {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "body mass must be positive",
            });
        }

        let position = r.vec3()?;
        let velocity = r.vec3()?;

        let rotation = RotationState {
            original_orientation: r.vec4()?,
            axis_velocity: r.vec4()?,
            current_angle: r.unit()?,
        };

        let anti_vibration = AntiVibration {
            active: r.byte()? != 0,
            cooldown_frames: r.byte()?,
        };

        let flags = r.byte()?;

        let mut body = Body::new(shape);
        body.mass = mass;
        body.position = position;
        body.velocity = velocity;
        body.rotation = rotation;
        body.anti_vibration = anti_vibration;
        body.non_colliding = flags & FLAG_NON_COLLIDING != 0;
        body.disabled = flags & FLAG_DISABLED != 0;

        bodies.push(body);
    }

    Ok(bodies)
}
