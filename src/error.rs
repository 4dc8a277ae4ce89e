//! Error Types
//!
//! Unified error type for the engine. The simulation core itself cannot
//! fail (fixed-point math degrades instead of crashing), so errors come
//! from the edges: snapshot decoding and configuration.

use core::fmt;

/// Unified error type for physics operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// Snapshot data ended before the announced content did.
    TruncatedData {
        /// Bytes the decoder needed next
        expected: usize,
        /// Bytes actually left
        remaining: usize,
    },
    /// Snapshot does not start with the format magic.
    BadMagic,
    /// Snapshot was written by an incompatible format version.
    UnsupportedVersion {
        /// Version found in the header
        version: u32,
    },
    /// Snapshot contains a shape tag this build does not know.
    InvalidShapeTag {
        /// The unknown tag byte
        tag: u8,
    },
    /// The shape cannot be carried through a snapshot (triangle meshes
    /// reference static geometry that a byte stream cannot restore).
    UnserializableShape,
    /// Invalid configuration parameter.
    InvalidConfiguration {
        /// Description of the invalid configuration
        reason: &'static str,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedData {
                expected,
                remaining,
            } => {
                write!(
                    f,
                    "snapshot truncated: needed {expected} bytes, {remaining} left"
                )
            }
            Self::BadMagic => write!(f, "not a physics snapshot (bad magic)"),
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported snapshot version {version}")
            }
            Self::InvalidShapeTag { tag } => write!(f, "unknown shape tag {tag}"),
            Self::UnserializableShape => {
                write!(f, "shape cannot be serialized (mesh geometry is external)")
            }
            Self::InvalidConfiguration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PhysicsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = PhysicsError::TruncatedData {
            expected: 4,
            remaining: 1,
        };
        assert!(e.to_string().contains("truncated"));

        assert!(PhysicsError::BadMagic.to_string().contains("magic"));

        let e = PhysicsError::UnsupportedVersion { version: 9 };
        assert!(e.to_string().contains('9'));

        let e = PhysicsError::InvalidShapeTag { tag: 250 };
        assert!(e.to_string().contains("250"));
    }
}
