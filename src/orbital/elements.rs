use crate::dynamics::state::Vec3;

/// Osculating two-body elements of a body relative to a central mass.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalElements {
    pub sma: f64,              // semi-major axis, m (negative when unbound)
    pub ecc: f64,              // eccentricity (0 = circular)
    pub energy: f64,           // specific orbital energy, J/kg
    pub angular_momentum: f64, // specific angular momentum, m^2/s
    pub periapsis: f64,        // m
    pub apoapsis: f64,         // m, infinite when unbound
}

impl OrbitalElements {
    /// Elements from position and velocity relative to the central body.
    pub fn from_state_vector(pos: &Vec3, vel: &Vec3, mu: f64) -> Self {
        let r = pos.norm();
        let v = vel.norm();

        let h = pos.cross(vel).norm();

        // Eccentricity vector
        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();

        let energy = 0.5 * v * v - mu / r;
        let sma = -mu / (2.0 * energy);

        let p = h * h / mu; // semi-latus rectum
        let periapsis = p / (1.0 + ecc);
        let apoapsis = if ecc < 1.0 { p / (1.0 - ecc) } else { f64::INFINITY };

        OrbitalElements {
            sma,
            ecc,
            energy,
            angular_momentum: h,
            periapsis,
            apoapsis,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.energy < 0.0
    }

    /// Orbital period (s) of a bound orbit.
    pub fn period(&self, mu: f64) -> Option<f64> {
        self.is_bound()
            .then(|| 2.0 * std::f64::consts::PI * (self.sma.powi(3) / mu).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::G;
    use crate::orbital::maneuvers::{circular_velocity, hohmann};
    use approx::assert_relative_eq;

    const MU: f64 = G * 5.9723e24;

    #[test]
    fn circular_orbit() {
        let r = 7.0e6;
        let el = OrbitalElements::from_state_vector(
            &Vec3::new(r, 0.0, 0.0),
            &Vec3::new(0.0, circular_velocity(r, MU), 0.0),
            MU,
        );
        assert_relative_eq!(el.sma, r, max_relative = 1e-12);
        assert!(el.ecc < 1e-12);
        assert_relative_eq!(el.period(MU).unwrap(), 2.0 * std::f64::consts::PI * (r.powi(3) / MU).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn transfer_orbit_spans_both_radii() {
        let (r1, r2) = (7.0e6, 3.844e8);
        let h = hohmann(r1, r2, MU);
        let v = circular_velocity(r1, MU) + h.dv1;
        let el = OrbitalElements::from_state_vector(&Vec3::new(r1, 0.0, 0.0), &Vec3::new(0.0, v, 0.0), MU);
        assert_relative_eq!(el.periapsis, r1, max_relative = 1e-9);
        assert_relative_eq!(el.apoapsis, r2, max_relative = 1e-9);
        assert_relative_eq!(el.ecc, (r2 - r1) / (r2 + r1), max_relative = 1e-9);
        assert_relative_eq!(el.period(MU).unwrap() / 2.0, h.transfer_time, max_relative = 1e-9);
    }

    #[test]
    fn escape_is_unbound() {
        let r = 7.0e6;
        let v = (2.0 * MU / r).sqrt() * 1.01;
        let el = OrbitalElements::from_state_vector(&Vec3::new(r, 0.0, 0.0), &Vec3::new(0.0, v, 0.0), MU);
        assert!(!el.is_bound());
        assert!(el.period(MU).is_none());
        assert!(el.apoapsis.is_infinite());
    }
}
