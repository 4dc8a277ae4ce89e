//! Deterministic Fixed-Point Mathematics
//!
//! Integer-only math kernel shared by the whole engine. No IEEE 754 floating
//! point anywhere: every operation produces bit-identical results on any
//! platform with two's-complement integers and truncating division.
//!
//! # Units
//!
//! All quantities (distance, time, mass, velocity, angle) are [`Unit`] values
//! interpreted as `value / UNITS`, with [`UNITS`] = 512 playing the role of
//! `1.0`. A full turn is `UNITS` angle units rather than 2π; [`PI`] is
//! supplied for circumference math.
//!
//! # Types
//!
//! - [`Unit`]: `i32` fixed-point scalar
//! - [`Vec4`]: dual-use 3-vector / quaternion (x, y, z, w)
//! - [`Mat4`]: 4×4 matrix indexed `[column][row]`
//!
//! Products that could overflow 32 bits are computed through `i64`
//! intermediates; the truncating-division rounding matches the 32-bit
//! arithmetic wherever the 32-bit form did not overflow.

/// Fixed-point scalar. Interpreted as `value / UNITS`.
pub type Unit = i32;

/// How many fractions a unit is split into ("1.0"). Not meant to be changed;
/// table contents and overflow headroom assume this value.
pub const UNITS: Unit = 512;

/// Marks an infinite quantity; a body with this mass is static.
pub const INFINITY: Unit = i32::MAX;

/// Pi in [`Unit`]s. Only used for circumference conversions — angles
/// themselves split the full turn into `UNITS` parts.
pub const PI: Unit = 1608;

// ============================================================================
// Scalar Helpers
// ============================================================================

/// Wrap `value` into `[0, modulus)`.
#[inline]
#[must_use]
pub const fn wrap(value: Unit, modulus: Unit) -> Unit {
    if value >= 0 {
        value % modulus
    } else {
        modulus + (value % modulus) - 1
    }
}

/// Clamp `v` into `[lo, hi]`. Unlike `i32::clamp` this never panics; for an
/// inverted range `lo` wins.
#[inline]
#[must_use]
pub const fn clamp(v: Unit, lo: Unit, hi: Unit) -> Unit {
    if v >= lo {
        if v <= hi {
            v
        } else {
            hi
        }
    } else {
        lo
    }
}

/// Nudge a zero denominator to 1 so a division can proceed. Deliberate
/// approximation, not a crash path.
#[inline]
#[must_use]
pub const fn non_zero(x: Unit) -> Unit {
    if x == 0 {
        1
    } else {
        x
    }
}

/// Wide variant of [`non_zero`] for `i64` intermediates.
#[inline]
#[must_use]
pub(crate) const fn non_zero_wide(x: i64) -> i64 {
    if x == 0 {
        1
    } else {
        x
    }
}

/// Sign of `x` as -1, 0 or 1.
#[inline]
#[must_use]
pub const fn sign(x: Unit) -> Unit {
    if x > 0 {
        1
    } else if x < 0 {
        -1
    } else {
        0
    }
}

/// Unit-scaled product that is 0 only if one factor is 0: a nonzero product
/// whose scaled value would truncate to 0 is floored at 1 instead. Keeps
/// tiny squared speeds and extents from silently vanishing in energy math.
#[inline]
#[must_use]
pub fn mul_anti_zero(a: Unit, b: Unit) -> Unit {
    let product = a as i64 * b as i64;

    if product >= UNITS as i64 {
        (product / UNITS as i64) as Unit
    } else if product != 0 {
        1
    } else {
        0
    }
}

/// Integer square root, bit-by-bit method. Negative input mirrors the sign:
/// `sqrt(-x) == -sqrt(x)`.
#[inline]
#[must_use]
pub fn sqrt(value: Unit) -> Unit {
    sqrt_wide(value as i64) as Unit
}

/// Integer square root over the full `i64` range of squared lengths.
#[must_use]
pub fn sqrt_wide(value: i64) -> i64 {
    let (sign, value) = if value < 0 { (-1, -value) } else { (1, value) };

    let mut result: u64 = 0;
    let mut a = value as u64;
    let mut b = 1u64 << 62;

    while b > a {
        b >>= 2;
    }

    while b != 0 {
        if a >= result + b {
            a -= result + b;
            result += 2 * b;
        }

        b >>= 2;
        result >>= 1;
    }

    sign * result as i64
}

// ============================================================================
// Sine Table
// ============================================================================

const SIN_TABLE_LEN: usize = 128;

/// Angle units covered by one table entry; the table spans a quarter turn.
const SIN_TABLE_STEP: Unit = UNITS / (SIN_TABLE_LEN as Unit * 4);

/// Quarter-wave sine sample scaled to `UNITS`; numerators are sine values
/// sampled at 511 = "1.0".
const fn st(numerator: i32) -> Unit {
    (numerator * UNITS) / 511
}

#[rustfmt::skip]
const SIN_TABLE: [Unit; SIN_TABLE_LEN] = [
    st(0),   st(6),   st(12),  st(18),  st(25),  st(31),  st(37),  st(43),
    st(50),  st(56),  st(62),  st(68),  st(74),  st(81),  st(87),  st(93),
    st(99),  st(105), st(111), st(118), st(124), st(130), st(136), st(142),
    st(148), st(154), st(160), st(166), st(172), st(178), st(183), st(189),
    st(195), st(201), st(207), st(212), st(218), st(224), st(229), st(235),
    st(240), st(246), st(251), st(257), st(262), st(268), st(273), st(278),
    st(283), st(289), st(294), st(299), st(304), st(309), st(314), st(319),
    st(324), st(328), st(333), st(338), st(343), st(347), st(352), st(356),
    st(361), st(365), st(370), st(374), st(378), st(382), st(386), st(391),
    st(395), st(398), st(402), st(406), st(410), st(414), st(417), st(421),
    st(424), st(428), st(431), st(435), st(438), st(441), st(444), st(447),
    st(450), st(453), st(456), st(459), st(461), st(464), st(467), st(469),
    st(472), st(474), st(476), st(478), st(481), st(483), st(485), st(487),
    st(488), st(490), st(492), st(494), st(495), st(497), st(498), st(499),
    st(501), st(502), st(503), st(504), st(505), st(506), st(507), st(507),
    st(508), st(509), st(509), st(510), st(510), st(510), st(510), st(510),
];

/// Sine of `x`, both in [`Unit`]s (a full turn is `UNITS` angle units).
#[must_use]
pub fn sin(x: Unit) -> Unit {
    const QUARTER: Unit = SIN_TABLE_LEN as Unit;

    let x = wrap(x / SIN_TABLE_STEP, QUARTER * 4);

    let (index, positive) = if x < QUARTER {
        (x, true)
    } else if x < QUARTER * 2 {
        (QUARTER * 2 - x - 1, true)
    } else if x < QUARTER * 3 {
        (x - QUARTER * 2, false)
    } else {
        (QUARTER - (x - QUARTER * 3) - 1, false)
    };

    let value = SIN_TABLE[index as usize];

    if positive {
        value
    } else {
        -value
    }
}

/// Cosine of `x` in [`Unit`]s.
#[inline]
#[must_use]
pub fn cos(x: Unit) -> Unit {
    sin(x + UNITS / 4)
}

/// Arcsine via binary search over the sine table. Input is clamped to
/// `[-UNITS, UNITS]`; the result is in angle units.
#[must_use]
pub fn asin(x: Unit) -> Unit {
    let x = clamp(x, -UNITS, UNITS);
    let (sign, x) = if x < 0 { (-1, -x) } else { (1, x) };

    let mut low: i32 = 0;
    let mut high: i32 = SIN_TABLE_LEN as i32 - 1;
    let mut middle: i32 = 0;

    while low <= high {
        middle = (low + high) / 2;

        let v = SIN_TABLE[middle as usize];

        if v > x {
            high = middle - 1;
        } else if v < x {
            low = middle + 1;
        } else {
            break;
        }
    }

    sign * middle * SIN_TABLE_STEP
}

/// Arccosine in angle units.
#[inline]
#[must_use]
pub fn acos(x: Unit) -> Unit {
    asin(-x) + UNITS / 4
}

// ============================================================================
// Vec4 — Dual-Use 3-Vector / Quaternion
// ============================================================================

/// Four fixed-point fields used either as a 3-vector (`w` ignored or zero)
/// or as a rotation quaternion (`x ~ i`, `y ~ j`, `z ~ k`, `w` real part).
///
/// All operations return new values; nothing mutates through out-parameters.
/// The 3-vector operations leave `w` untouched unless documented otherwise,
/// which lets rotation state carry angular speed in `w` across axis
/// arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vec4 {
    pub x: Unit,
    pub y: Unit,
    pub z: Unit,
    pub w: Unit,
}

impl Vec4 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Canonical +X axis, also the fallback result of normalizing a
    /// zero-length vector.
    pub const UNIT_X: Self = Self::new(UNITS, 0, 0, 0);

    /// Rotation identity quaternion (not the zero quaternion).
    pub const IDENTITY: Self = Self::new(0, 0, 0, UNITS);

    /// Create from components.
    #[inline]
    #[must_use]
    pub const fn new(x: Unit, y: Unit, z: Unit, w: Unit) -> Self {
        Self { x, y, z, w }
    }

    // ------------------------------------------------------------------
    // 3-vector operations
    // ------------------------------------------------------------------

    /// Component-wise sum of the xyz parts.
    #[inline]
    #[must_use]
    pub const fn plus(self, b: Self) -> Self {
        Self::new(self.x + b.x, self.y + b.y, self.z + b.z, self.w)
    }

    /// Component-wise difference of the xyz parts.
    #[inline]
    #[must_use]
    pub const fn minus(self, b: Self) -> Self {
        Self::new(self.x - b.x, self.y - b.y, self.z - b.z, self.w)
    }

    /// Midpoint of two points. `w` is zeroed.
    #[inline]
    #[must_use]
    pub const fn average(self, b: Self) -> Self {
        Self::new(
            (self.x + b.x) / 2,
            (self.y + b.y) / 2,
            (self.z + b.z) / 2,
            0,
        )
    }

    /// Scale the xyz part by a unit-scaled factor `f`.
    #[inline]
    #[must_use]
    pub fn times(self, f: Unit) -> Self {
        Self::new(
            (self.x as i64 * f as i64 / UNITS as i64) as Unit,
            (self.y as i64 * f as i64 / UNITS as i64) as Unit,
            (self.z as i64 * f as i64 / UNITS as i64) as Unit,
            self.w,
        )
    }

    /// Scale the xyz part by a plain (non-normalized) integer factor.
    #[inline]
    #[must_use]
    pub const fn times_plain(self, f: Unit) -> Self {
        Self::new(self.x * f, self.y * f, self.z * f, self.w)
    }

    /// Cross product of the xyz parts, unit-scaled. `w` is zeroed.
    #[inline]
    #[must_use]
    pub fn cross(self, b: Self) -> Self {
        Self::new(
            ((self.y as i64 * b.z as i64 - self.z as i64 * b.y as i64) / UNITS as i64) as Unit,
            ((self.z as i64 * b.x as i64 - self.x as i64 * b.z as i64) / UNITS as i64) as Unit,
            ((self.x as i64 * b.y as i64 - self.y as i64 * b.x as i64) / UNITS as i64) as Unit,
            0,
        )
    }

    /// Unit-scaled dot product of the xyz parts.
    #[inline]
    #[must_use]
    pub fn dot(self, b: Self) -> Unit {
        (self.dot_plain(b) / UNITS as i64) as Unit
    }

    /// Raw dot product of the xyz parts, without unit normalization. Wide so
    /// large coordinates cannot wrap.
    #[inline]
    #[must_use]
    pub fn dot_plain(self, b: Self) -> i64 {
        self.x as i64 * b.x as i64 + self.y as i64 * b.y as i64 + self.z as i64 * b.z as i64
    }

    /// Euclidean length of the xyz part.
    #[inline]
    #[must_use]
    pub fn len(self) -> Unit {
        sqrt_wide(self.dot_plain(self)) as Unit
    }

    /// Taxicab (L1) length of the xyz part; cheap bound on [`Self::len`].
    #[inline]
    #[must_use]
    pub const fn taxicab_len(self) -> Unit {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    /// Distance between two points.
    #[inline]
    #[must_use]
    pub fn dist(self, b: Self) -> Unit {
        self.minus(b).len()
    }

    /// Length over all four components.
    #[inline]
    #[must_use]
    pub fn len4(self) -> Unit {
        sqrt_wide(self.dot_plain(self) + self.w as i64 * self.w as i64) as Unit
    }

    /// Normalize the xyz part to length `UNITS`. A zero-length input falls
    /// back to the canonical +X axis instead of dividing by zero.
    #[must_use]
    pub fn normalized(self) -> Self {
        let l = self.len();

        if l == 0 {
            return Self::new(UNITS, 0, 0, self.w);
        }

        Self::new(
            (self.x as i64 * UNITS as i64 / l as i64) as Unit,
            (self.y as i64 * UNITS as i64 / l as i64) as Unit,
            (self.z as i64 * UNITS as i64 / l as i64) as Unit,
            self.w,
        )
    }

    /// Normalize all four components; used to keep derived quaternions at
    /// unit length. Zero length falls back to the +X axis.
    #[must_use]
    pub fn normalized4(self) -> Self {
        let l = self.len4();

        if l == 0 {
            return Self::UNIT_X;
        }

        Self::new(
            (self.x as i64 * UNITS as i64 / l as i64) as Unit,
            (self.y as i64 * UNITS as i64 / l as i64) as Unit,
            (self.z as i64 * UNITS as i64 / l as i64) as Unit,
            (self.w as i64 * UNITS as i64 / l as i64) as Unit,
        )
    }

    /// Project the xyz part onto `base` (which should be unit length).
    #[must_use]
    pub fn project_onto(self, base: Self) -> Self {
        let p = self.dot(base);

        Self::new(
            (p as i64 * base.x as i64 / UNITS as i64) as Unit,
            (p as i64 * base.y as i64 / UNITS as i64) as Unit,
            (p as i64 * base.z as i64 / UNITS as i64) as Unit,
            0,
        )
    }

    /// Vector of length `size` pointing from `from` toward `to`.
    #[inline]
    #[must_use]
    pub fn from_to(from: Self, to: Self, size: Unit) -> Self {
        to.minus(from).normalized().times(size)
    }

    // ------------------------------------------------------------------
    // Quaternion operations
    // ------------------------------------------------------------------

    /// Hamilton product chaining two rotations: `self` is performed first,
    /// then `b`. Not commutative.
    #[must_use]
    pub fn q_mul(self, b: Self) -> Self {
        let (ax, ay, az, aw) = (self.x as i64, self.y as i64, self.z as i64, self.w as i64);
        let (bx, by, bz, bw) = (b.x as i64, b.y as i64, b.z as i64, b.w as i64);
        let u = UNITS as i64;

        Self::new(
            ((aw * bx + ax * bw + ay * bz - az * by) / u) as Unit,
            ((aw * by - ax * bz + ay * bw + az * bx) / u) as Unit,
            ((aw * bz + ax * by - ay * bx + az * bw) / u) as Unit,
            ((aw * bw - ax * bx - ay * by - az * bz) / u) as Unit,
        )
    }

    /// Opposite rotation.
    #[inline]
    #[must_use]
    pub const fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotation quaternion from an axis (any length, normalized internally)
    /// and an angle around it by the right-hand rule.
    #[must_use]
    pub fn from_axis_angle(axis: Self, angle: Unit) -> Self {
        let axis = axis.normalized();
        let half = angle / 2;
        let s = sin(half) as i64;

        Self::new(
            (s * axis.x as i64 / UNITS as i64) as Unit,
            (s * axis.y as i64 / UNITS as i64) as Unit,
            (s * axis.z as i64 / UNITS as i64) as Unit,
            cos(half),
        )
    }

    /// Recover the rotation axis and angle from a unit quaternion.
    #[must_use]
    pub fn to_axis_angle(self) -> (Self, Unit) {
        let angle = 2 * acos(self.w);

        let w2 = (self.w as i64 * self.w as i64 / UNITS as i64) as Unit;
        let scale = non_zero(sqrt((UNITS - w2) * UNITS));

        let axis = Self::new(
            (self.x as i64 * UNITS as i64 / scale as i64) as Unit,
            (self.y as i64 * UNITS as i64 / scale as i64) as Unit,
            (self.z as i64 * UNITS as i64 / scale as i64) as Unit,
            0,
        );

        (axis, angle)
    }

    /// 4×4 rotation matrix of a unit quaternion, indexed `[column][row]`.
    #[must_use]
    pub fn rotation_matrix(self) -> Mat4 {
        let u = UNITS as i64;
        let (x, y, z, w) = (self.x as i64, self.y as i64, self.z as i64, self.w as i64);

        let xx2 = (2 * x * x / u) as Unit;
        let yy2 = (2 * y * y / u) as Unit;
        let zz2 = (2 * z * z / u) as Unit;
        let xy2 = (2 * x * y / u) as Unit;
        let xw2 = (2 * x * w / u) as Unit;
        let zw2 = (2 * z * w / u) as Unit;
        let xz2 = (2 * x * z / u) as Unit;
        let yw2 = (2 * y * w / u) as Unit;
        let yz2 = (2 * y * z / u) as Unit;

        [
            [UNITS - yy2 - zz2, xy2 + zw2, xz2 - yw2, 0],
            [xy2 - zw2, UNITS - xx2 - zz2, yz2 + xw2, 0],
            [xz2 + yw2, yz2 - xw2, UNITS - xx2 - yy2, 0],
            [0, 0, 0, UNITS],
        ]
    }

    /// Rotate a point by a unit quaternion, through its rotation matrix.
    /// `w` is carried through unchanged.
    #[must_use]
    pub fn rotated_by(self, quaternion: Self) -> Self {
        let m = quaternion.rotation_matrix();
        let u = UNITS as i64;
        let (x, y, z) = (self.x as i64, self.y as i64, self.z as i64);

        Self::new(
            ((x * m[0][0] as i64 + y * m[0][1] as i64 + z * m[0][2] as i64) / u) as Unit,
            ((x * m[1][0] as i64 + y * m[1][1] as i64 + z * m[1][2] as i64) / u) as Unit,
            ((x * m[2][0] as i64 + y * m[2][1] as i64 + z * m[2][2] as i64) / u) as Unit,
            self.w,
        )
    }
}

/// 4×4 fixed-point matrix indexed `[column][row]`.
pub type Mat4 = [[Unit; 4]; 4];

// ============================================================================
// Geometry and Kinematics Helpers
// ============================================================================

/// Closest point on the segment `(a, b)` to the point `p`.
#[must_use]
pub fn line_segment_closest_point(a: Vec4, b: Vec4, p: Vec4) -> Vec4 {
    let ab = b.minus(a);

    let t = (ab.dot(p.minus(a)) as i64 * UNITS as i64 / non_zero_wide(ab.dot(ab) as i64)) as Unit;
    let t = clamp(t, 0, UNITS);

    a.plus(ab.times(t))
}

/// Angular speed (angle units per time unit) of a point orbiting at
/// `distance` with linear speed `velocity`.
#[must_use]
pub fn linear_velocity_to_angular(velocity: Unit, distance: Unit) -> Unit {
    let circumference = (2 * PI as i64 * distance as i64 / UNITS as i64) as Unit;

    (velocity as i64 * UNITS as i64 / non_zero_wide(circumference as i64)) as Unit
}

/// Inverse of [`linear_velocity_to_angular`].
#[must_use]
pub fn angular_velocity_to_linear(velocity: Unit, distance: Unit) -> Unit {
    let circumference = (2 * PI as i64 * distance as i64 / UNITS as i64) as Unit;

    (velocity as i64 * circumference as i64 / UNITS as i64) as Unit
}

/// New velocities of two point masses after a head-on 1D collision with the
/// given elasticity (unit-scaled; `UNITS` = perfectly elastic).
///
/// Momentum is conserved exactly up to truncation.
#[must_use]
pub fn velocities_after_collision(
    v1: Unit,
    v2: Unit,
    m1: Unit,
    m2: Unit,
    elasticity: Unit,
) -> (Unit, Unit) {
    let u = UNITS as i64;
    let (m1, m2) = (m1 as i64, m2 as i64);
    let (v1, v2) = (v1 as i64, v2 as i64);

    let mass_sum = non_zero_wide(m1 + m2);
    let dv = non_zero_wide(v2 - v1);
    let momentum = m1 * v1 + m2 * v2;

    let out1 = ((elasticity as i64 * m2 / u) * dv + momentum) / mass_sum;
    let out2 = ((elasticity as i64 * m1 / u) * -dv + momentum) / mass_sum;

    (out1 as Unit, out2 as Unit)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_exact_squares() {
        assert_eq!(sqrt(0), 0);
        assert_eq!(sqrt(1), 1);
        assert_eq!(sqrt(4), 2);
        assert_eq!(sqrt(144), 12);
        assert_eq!(sqrt(262144), 512);
        assert_eq!(sqrt(-144), -12, "negative input mirrors the sign");
    }

    #[test]
    fn test_sqrt_truncates() {
        assert_eq!(sqrt(2), 1);
        assert_eq!(sqrt(263000), 512);
    }

    #[test]
    fn test_sqrt_wide_large() {
        let v: i64 = 1 << 40;
        assert_eq!(sqrt_wide(v), 1 << 20);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(0, 512), 0);
        assert_eq!(wrap(511, 512), 511);
        assert_eq!(wrap(512, 512), 0);
        assert_eq!(wrap(700, 512), 188);
        assert!((0..512).contains(&wrap(-1, 512)));
        assert!((0..512).contains(&wrap(-513, 512)));
    }

    #[test]
    fn test_sin_quarters() {
        assert_eq!(sin(0), 0);
        assert_eq!(sin(UNITS / 2), 0);
        assert!(sin(UNITS / 4) > UNITS - 4, "peak near one unit");
        assert!(sin(UNITS / 4 + UNITS / 2) < -(UNITS - 4));
        assert_eq!(sin(UNITS + 100), sin(100), "periodic in a full turn");
    }

    #[test]
    fn test_sin_cos_unit_circle() {
        for angle in (0..UNITS).step_by(37) {
            let s = sin(angle) as i64;
            let c = cos(angle) as i64;
            let len2 = s * s + c * c;
            let expected = UNITS as i64 * UNITS as i64;

            // Table quantization keeps the circle radius within a few percent
            assert!(
                (len2 - expected).abs() < expected / 20,
                "sin²+cos² off at angle {}: {}",
                angle,
                len2
            );
        }
    }

    #[test]
    fn test_asin_inverts_sin() {
        // The quarter-wave table is flat at its tail (several inputs near the
        // peak all map to the same sample), so stop short of the last few.
        for angle in [0, 16, 40, 77, 100, 120] {
            let recovered = asin(sin(angle));
            assert!(
                (recovered - angle).abs() <= 2,
                "asin(sin({})) = {}",
                angle,
                recovered
            );
        }
    }

    #[test]
    fn test_mul_anti_zero() {
        assert_eq!(mul_anti_zero(0, 100), 0);
        assert_eq!(mul_anti_zero(100, 0), 0);
        assert_eq!(mul_anti_zero(1, 1), 1, "tiny nonzero product floors at 1");
        assert_eq!(mul_anti_zero(UNITS, UNITS), UNITS);
        assert_eq!(mul_anti_zero(2 * UNITS, 3 * UNITS), 6 * UNITS);
    }

    #[test]
    fn test_normalize_unit_length() {
        let cases = [
            Vec4::new(100, 200, 300, 0),
            Vec4::new(-512, 512, 0, 0),
            Vec4::new(1, 0, 0, 0),
            Vec4::new(30000, -20000, 10000, 0),
        ];

        for v in cases {
            let n = v.normalized();
            let len = n.len();
            assert!(
                (len - UNITS).abs() <= 8,
                "normalized {:?} has length {}",
                v,
                len
            );
        }
    }

    #[test]
    fn test_normalize_zero_falls_back_to_x_axis() {
        let n = Vec4::ZERO.normalized();
        assert_eq!(n.x, UNITS);
        assert_eq!(n.y, 0);
        assert_eq!(n.z, 0);
    }

    #[test]
    fn test_cross_is_orthogonal() {
        let a = Vec4::new(UNITS, 0, 0, 0);
        let b = Vec4::new(0, UNITS, 0, 0);
        let c = a.cross(b);

        assert_eq!(c, Vec4::new(0, 0, UNITS, 0));
        assert_eq!(a.dot(c), 0);
        assert_eq!(b.dot(c), 0);
    }

    #[test]
    fn test_quaternion_identity_no_rotation() {
        let p = Vec4::new(100, -200, 300, 0);
        let r = p.rotated_by(Vec4::IDENTITY);
        assert_eq!(r.x, p.x);
        assert_eq!(r.y, p.y);
        assert_eq!(r.z, p.z);
    }

    #[test]
    fn test_quarter_turn_about_z() {
        // The rotation matrix is applied row-major against the point, which
        // is the transpose of the textbook convention: a quarter turn about
        // +Z carries +X to -Y rather than +Y.
        let q = Vec4::from_axis_angle(Vec4::new(0, 0, UNITS, 0), UNITS / 4);
        let p = Vec4::new(UNITS, 0, 0, 0).rotated_by(q);

        assert!(p.x.abs() < 16, "x should vanish, got {}", p.x);
        assert!((p.y + UNITS).abs() < 16, "y should be minus one unit, got {}", p.y);
        assert!(p.z.abs() < 16);
    }

    #[test]
    fn test_axis_angle_round_trip() {
        for angle in [20, 60, 100, 160, 200, UNITS / 2 - 20] {
            let axis = Vec4::new(0, UNITS, 0, 0);
            let q = Vec4::from_axis_angle(axis, angle);
            let (recovered_axis, recovered_angle) = q.to_axis_angle();

            assert!(
                (recovered_angle - angle).abs() <= 8,
                "angle {} recovered as {}",
                angle,
                recovered_angle
            );

            let n = recovered_axis.normalized();
            assert!(
                n.y > UNITS - 32 && n.x.abs() < 48 && n.z.abs() < 48,
                "axis drifted: {:?}",
                n
            );
        }
    }

    #[test]
    fn test_segment_closest_point_clamps_to_ends() {
        let a = Vec4::new(0, 0, 0, 0);
        let b = Vec4::new(10 * UNITS, 0, 0, 0);

        let before = line_segment_closest_point(a, b, Vec4::new(-5 * UNITS, UNITS, 0, 0));
        assert_eq!(before.x, 0);

        let beyond = line_segment_closest_point(a, b, Vec4::new(20 * UNITS, UNITS, 0, 0));
        assert_eq!(beyond.x, 10 * UNITS);

        let middle = line_segment_closest_point(a, b, Vec4::new(5 * UNITS, UNITS, 0, 0));
        assert!((middle.x - 5 * UNITS).abs() <= 8);
        assert_eq!(middle.y, 0);
    }

    #[test]
    fn test_angular_linear_velocity_round_trip() {
        let linear = 2 * UNITS;
        let distance = 3 * UNITS;

        let angular = linear_velocity_to_angular(linear, distance);
        let back = angular_velocity_to_linear(angular, distance);

        assert!(
            (back - linear).abs() <= 32,
            "round trip drifted: {} -> {} -> {}",
            linear,
            angular,
            back
        );
    }

    #[test]
    fn test_elastic_equal_masses_swap_velocities() {
        let (v1, v2) = velocities_after_collision(UNITS, 0, UNITS, UNITS, UNITS);
        assert_eq!(v1, 0);
        assert_eq!(v2, UNITS);
    }

    #[test]
    fn test_inelastic_equal_masses_share_momentum() {
        let (v1, v2) = velocities_after_collision(UNITS, 0, UNITS, UNITS, 0);
        assert_eq!(v1, UNITS / 2);
        assert_eq!(v2, UNITS / 2);
    }

    #[test]
    fn test_collision_conserves_momentum() {
        let (m1, m2) = (3 * UNITS, 5 * UNITS);
        let (v1_in, v2_in) = (700, -300);

        for elasticity in [0, 128, 300, UNITS] {
            let (v1, v2) = velocities_after_collision(v1_in, v2_in, m1, m2, elasticity);

            let before = m1 as i64 * v1_in as i64 + m2 as i64 * v2_in as i64;
            let after = m1 as i64 * v1 as i64 + m2 as i64 * v2 as i64;

            assert!(
                (before - after).abs() <= (m1 + m2) as i64,
                "momentum drifted at e={}: {} vs {}",
                elasticity,
                before,
                after
            );
        }
    }
}
