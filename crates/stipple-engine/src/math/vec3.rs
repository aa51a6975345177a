/// Three-component vector.
pub type Vec3 = [f32; 3];

/// Returns `v` scaled to unit length.
///
/// A zero-length input yields `[0.0, 0.0, 0.0]` rather than NaNs.
pub fn normalize(v: Vec3) -> Vec3 {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn subtract(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn normalize_produces_unit_length() {
        let n = normalize([3.0, 0.0, 4.0]);
        assert!(approx(n, [0.6, 0.0, 0.8]));
    }

    #[test]
    fn normalize_zero_vector_falls_back_to_zero() {
        assert_eq!(normalize([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(cross([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_eq!(cross([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn cross_of_parallel_vectors_is_zero() {
        assert_eq!(cross([0.0, 2.0, 0.0], [0.0, 5.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn subtract_is_componentwise() {
        assert_eq!(subtract([0.0, 0.0, 100.0], [1.0, 2.0, 3.0]), [-1.0, -2.0, 97.0]);
    }
}
