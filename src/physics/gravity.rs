use crate::dynamics::state::{Vec3, G};

/// Newtonian gravitational acceleration on every body from all the others.
///
/// `a_i = sum_{j != i} G m_j (x_j - x_i) / |x_j - x_i|^3`
///
/// Each pair is visited once and its term is applied to both bodies, so the
/// pairwise forces are equal and opposite. Coincident positions divide by
/// zero: callers must keep bodies separated.
pub fn accelerations(masses: &[f64], positions: &[Vec3]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::zeros(); positions.len()];
    accumulate_accelerations(masses, positions, &mut acc);
    acc
}

/// Same as [`accelerations`], adding into a caller-owned buffer.
pub fn accumulate_accelerations(masses: &[f64], positions: &[Vec3], acc: &mut [Vec3]) {
    let n = positions.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let delta = positions[j] - positions[i];
            let r2 = delta.norm_squared();
            let r = r2.sqrt();
            // G (x_j - x_i) / r^3, scaled per body below
            let pull = delta * (G / (r2 * r));
            acc[i] += pull * masses[j];
            acc[j] -= pull * masses[i];
        }
    }
}

/// Acceleration at `pos` due to a single point mass at `source`.
pub fn point_mass_accel(pos: &Vec3, source: &Vec3, mass: f64) -> Vec3 {
    let delta = source - pos;
    let r = delta.norm();
    delta * (G * mass / (r * r * r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const M_EARTH: f64 = 5.9723e24;
    const M_MOON: f64 = 7.349e22;

    #[test]
    fn surface_gravity_order_of_magnitude() {
        let acc = accelerations(&[1.0, M_EARTH], &[Vec3::new(6.371e6, 0.0, 0.0), Vec3::zeros()]);
        // ~9.82 m/s^2 pointing at the Earth
        assert_relative_eq!(acc[0].x, -9.82, max_relative = 1e-2);
        assert_eq!(acc[0].y, 0.0);
    }

    #[test]
    fn three_body_is_sum_of_pairs() {
        let pos = [
            Vec3::new(7.0e6, 0.0, 0.0),
            Vec3::zeros(),
            Vec3::new(3.844e8, 0.0, 0.0),
        ];
        let masses = [8_000.0, M_EARTH, M_MOON];
        let acc = accelerations(&masses, &pos);
        let expected = point_mass_accel(&pos[0], &pos[1], M_EARTH)
            + point_mass_accel(&pos[0], &pos[2], M_MOON);
        assert_relative_eq!(acc[0], expected, max_relative = 1e-12);
    }

    #[test]
    fn massless_body_exerts_nothing() {
        let acc = accelerations(&[0.0, 1.0e20], &[Vec3::new(1.0e6, 0.0, 0.0), Vec3::zeros()]);
        assert_eq!(acc[1], Vec3::zeros());
        assert!(acc[0].norm() > 0.0);
    }

    #[test]
    fn single_body_feels_nothing() {
        let acc = accelerations(&[M_EARTH], &[Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(acc, vec![Vec3::zeros()]);
    }

    proptest! {
        #[test]
        fn newton_third_law(
            m1 in 1.0f64..1e25,
            m2 in 1.0f64..1e25,
            x in -1e9f64..1e9,
            y in -1e9f64..1e9,
            z in -1e9f64..1e9,
        ) {
            let p2 = Vec3::new(x, y, z);
            prop_assume!(p2.norm() > 1.0);
            let acc = accelerations(&[m1, m2], &[Vec3::zeros(), p2]);
            let f1 = acc[0] * m1;
            let f2 = acc[1] * m2;
            let scale = f1.norm().max(f2.norm());
            prop_assert!((f1 + f2).norm() <= 1e-12 * scale,
                "net force {:?} not ~0 (scale {})", f1 + f2, scale);
        }
    }
}
