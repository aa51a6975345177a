use super::Vec3;

/// 4×4 matrix, column-major.
pub type Mat4 = [f32; 16];

#[rustfmt::skip]
pub const IDENTITY: Mat4 = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Composes two matrices: the result applies `b` first, then `a`.
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = b[col * 4] * a[row]
                + b[col * 4 + 1] * a[4 + row]
                + b[col * 4 + 2] * a[8 + row]
                + b[col * 4 + 3] * a[12 + row];
        }
    }
    out
}

/// Inverts `a` by cofactor expansion over 2×2 sub-determinants.
///
/// Only meaningful for non-singular input. A singular matrix divides by a zero
/// determinant and yields non-finite entries; it does not panic.
pub fn inverse(a: &Mat4) -> Mat4 {
    let b00 = a[0] * a[5] - a[1] * a[4];
    let b01 = a[0] * a[6] - a[2] * a[4];
    let b02 = a[0] * a[7] - a[3] * a[4];
    let b03 = a[1] * a[6] - a[2] * a[5];
    let b04 = a[1] * a[7] - a[3] * a[5];
    let b05 = a[2] * a[7] - a[3] * a[6];
    let b06 = a[8] * a[13] - a[9] * a[12];
    let b07 = a[8] * a[14] - a[10] * a[12];
    let b08 = a[8] * a[15] - a[11] * a[12];
    let b09 = a[9] * a[14] - a[10] * a[13];
    let b10 = a[9] * a[15] - a[11] * a[13];
    let b11 = a[10] * a[15] - a[11] * a[14];

    let det = b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06;
    let inv = 1.0 / det;

    [
        (a[5] * b11 - a[6] * b10 + a[7] * b09) * inv,
        (a[2] * b10 - a[1] * b11 - a[3] * b09) * inv,
        (a[13] * b05 - a[14] * b04 + a[15] * b03) * inv,
        (a[10] * b04 - a[9] * b05 - a[11] * b03) * inv,
        (a[6] * b08 - a[4] * b11 - a[7] * b07) * inv,
        (a[0] * b11 - a[2] * b08 + a[3] * b07) * inv,
        (a[14] * b02 - a[12] * b05 - a[15] * b01) * inv,
        (a[8] * b05 - a[10] * b02 + a[11] * b01) * inv,
        (a[4] * b10 - a[5] * b08 + a[7] * b06) * inv,
        (a[1] * b08 - a[0] * b10 - a[3] * b06) * inv,
        (a[12] * b04 - a[13] * b02 + a[15] * b00) * inv,
        (a[9] * b02 - a[8] * b04 - a[11] * b00) * inv,
        (a[5] * b07 - a[4] * b09 - a[6] * b06) * inv,
        (a[0] * b09 - a[1] * b07 + a[2] * b06) * inv,
        (a[13] * b01 - a[12] * b03 - a[14] * b00) * inv,
        (a[8] * b03 - a[9] * b01 + a[10] * b00) * inv,
    ]
}

/// Transforms a point (`w = 1`) and returns the homogeneous result.
pub fn transform_point(m: &Mat4, p: Vec3) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (row, slot) in out.iter_mut().enumerate() {
        *slot = m[row] * p[0] + m[4 + row] * p[1] + m[8 + row] * p[2] + m[12 + row];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_close(a: &Mat4, b: &Mat4, eps: f32) {
        for i in 0..16 {
            assert!(
                (a[i] - b[i]).abs() <= eps,
                "entry {i}: {} vs {} (eps {eps})",
                a[i],
                b[i]
            );
        }
    }

    #[rustfmt::skip]
    fn rigid() -> Mat4 {
        // Rotation about Y by 30°, uniform scale 2, translation (3, -4, 5).
        let (s, c) = 30f32.to_radians().sin_cos();
        [
            2.0 * c, 0.0, -2.0 * s, 0.0,
            0.0,     2.0,  0.0,     0.0,
            2.0 * s, 0.0,  2.0 * c, 0.0,
            3.0,    -4.0,  5.0,     1.0,
        ]
    }

    #[rustfmt::skip]
    fn skewed() -> Mat4 {
        [
            4.0, 1.0, 0.5, 0.0,
            0.2, 3.0, 0.1, 0.3,
            0.0, 0.7, 2.0, 0.0,
            1.0, 0.0, 0.4, 1.5,
        ]
    }

    // ── multiply ──────────────────────────────────────────────────────────

    #[test]
    fn multiply_by_identity_is_noop() {
        let m = skewed();
        assert_eq!(multiply(&m, &IDENTITY), m);
        assert_eq!(multiply(&IDENTITY, &m), m);
    }

    #[test]
    fn multiply_matches_glam_composition() {
        let a = rigid();
        let b = skewed();
        let expected = (glam::Mat4::from_cols_array(&a) * glam::Mat4::from_cols_array(&b))
            .to_cols_array();
        assert_close(&multiply(&a, &b), &expected, EPS);
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        #[rustfmt::skip]
        let translate: Mat4 = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            10.0, 0.0, 0.0, 1.0,
        ];
        #[rustfmt::skip]
        let scale: Mat4 = [
            2.0, 0.0, 0.0, 0.0,
            0.0, 2.0, 0.0, 0.0,
            0.0, 0.0, 2.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        // scale ∘ translate: (1 + 10) * 2
        let p = transform_point(&multiply(&scale, &translate), [1.0, 0.0, 0.0]);
        assert_eq!(p, [22.0, 0.0, 0.0, 1.0]);
    }

    // ── inverse ───────────────────────────────────────────────────────────

    #[test]
    fn inverse_of_identity_is_identity() {
        assert_close(&inverse(&IDENTITY), &IDENTITY, 0.0);
    }

    #[test]
    fn matrix_times_inverse_is_identity() {
        for m in [rigid(), skewed()] {
            assert_close(&multiply(&m, &inverse(&m)), &IDENTITY, EPS);
            assert_close(&multiply(&inverse(&m), &m), &IDENTITY, EPS);
        }
    }

    #[test]
    fn inverse_matches_glam() {
        let m = skewed();
        let expected = glam::Mat4::from_cols_array(&m).inverse().to_cols_array();
        assert_close(&inverse(&m), &expected, EPS);
    }

    #[test]
    fn inverse_of_singular_matrix_is_non_finite_without_panicking() {
        let singular = [0.0; 16];
        assert!(inverse(&singular).iter().any(|v| !v.is_finite()));
    }

    // ── transform_point ───────────────────────────────────────────────────

    #[test]
    fn transform_point_applies_translation() {
        let p = transform_point(&rigid(), [0.0, 0.0, 0.0]);
        assert_eq!(p, [3.0, -4.0, 5.0, 1.0]);
    }
}
