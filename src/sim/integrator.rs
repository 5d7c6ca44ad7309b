use crate::dynamics;
use crate::dynamics::state::{State, System};
use crate::error::IntegrationError;
use crate::physics::thrust::ThrustDirective;

use super::adaptive::{self, AdaptiveStepControl};

// ---------------------------------------------------------------------------
// Step strategies
// ---------------------------------------------------------------------------

/// How [`advance`] moves a state forward over one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepMethod {
    /// Semi-implicit Euler, the tick split into `substeps` equal parts.
    SemiImplicitEuler { substeps: usize },
    /// Dormand-Prince 5(4) with local error control.
    DormandPrince(AdaptiveStepControl),
}

impl Default for StepMethod {
    fn default() -> Self {
        StepMethod::SemiImplicitEuler { substeps: 1 }
    }
}

/// Advance `state` by `dt` seconds and return the new state.
///
/// Thrust is applied to the system's thrust target only. Both methods step
/// backwards for a negative `dt` and reject a non-finite one. The adaptive
/// method also fails when it cannot meet its tolerance within its step
/// budget.
pub fn advance(
    system: &System,
    state: &State,
    dt: f64,
    directive: &ThrustDirective,
    method: &StepMethod,
) -> Result<State, IntegrationError> {
    if !dt.is_finite() {
        return Err(IntegrationError::InvalidTimeStep { dt });
    }
    match method {
        StepMethod::SemiImplicitEuler { substeps } => {
            let next = advance_fixed(system, state, dt, *substeps, directive);
            if !next.is_finite() {
                return Err(IntegrationError::NonFinite { time: state.time });
            }
            Ok(next)
        }
        StepMethod::DormandPrince(control) => {
            adaptive::integrate(system, state, dt, directive, control)
        }
    }
}

/// Fixed-step advance: `substeps` semi-implicit Euler steps of `dt / substeps`.
/// A substep count of 0 is treated as 1.
pub fn advance_fixed(
    system: &System,
    state: &State,
    dt: f64,
    substeps: usize,
    directive: &ThrustDirective,
) -> State {
    let substeps = substeps.max(1);
    let dt_sub = dt / substeps as f64;
    let mut next = state.clone();
    for _ in 0..substeps {
        semi_implicit_euler_step(system, &mut next, dt_sub, directive);
    }
    next.time = state.time + dt;
    next
}

/// One semi-implicit Euler step, in place.
///
/// Accelerations for every body are evaluated from the same snapshot of
/// positions, then all velocities are updated, then all positions from the
/// new velocities.
pub fn semi_implicit_euler_step(
    system: &System,
    state: &mut State,
    dt: f64,
    directive: &ThrustDirective,
) {
    let acc = dynamics::accelerations(system, state, directive);
    for (b, a) in state.bodies.iter_mut().zip(&acc) {
        b.vel += a * dt;
    }
    for b in state.bodies.iter_mut() {
        b.pos += b.vel * dt;
    }
    state.time += dt;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{Body, BodyState, Vec3, G};
    use crate::physics::thrust::{Sign, ThrustMode};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    const M_EARTH: f64 = 5.9723e24;
    const R_LEO: f64 = 7.0e6;

    fn craft_earth() -> (System, State) {
        let system = System::new(
            vec![Body::new("craft", 8_000.0), Body::new("earth", M_EARTH)],
            0,
            1,
        );
        let v = (G * M_EARTH / R_LEO).sqrt();
        let state = State::new(
            0.0,
            vec![
                BodyState::new(Vec3::new(R_LEO, 0.0, 0.0), Vec3::new(0.0, v, 0.0)),
                BodyState::new(Vec3::zeros(), Vec3::zeros()),
            ],
        );
        (system, state)
    }

    fn period() -> f64 {
        2.0 * PI * (R_LEO.powi(3) / (G * M_EARTH)).sqrt()
    }

    #[test]
    fn semi_implicit_order_of_updates() {
        let (system, state) = craft_earth();
        let dt = 10.0;
        let acc = dynamics::accelerations(&system, &state, &ThrustDirective::off());
        let mut next = state.clone();
        semi_implicit_euler_step(&system, &mut next, dt, &ThrustDirective::off());
        // position uses the already-updated velocity
        let v1 = state.bodies[0].vel + acc[0] * dt;
        assert_relative_eq!(next.bodies[0].vel, v1);
        assert_relative_eq!(next.bodies[0].pos, state.bodies[0].pos + v1 * dt);
        assert_eq!(next.time, dt);
    }

    #[test]
    fn circular_orbit_closes_within_one_percent() {
        let (system, mut state) = craft_earth();
        let dt = 5.0;
        let steps = (period() / dt).round() as usize;
        let mut max_dev: f64 = 0.0;
        for _ in 0..steps {
            state = advance_fixed(&system, &state, dt, 1, &ThrustDirective::off());
            let r = state.radius(0, 1);
            max_dev = max_dev.max((r - R_LEO).abs() / R_LEO);
        }
        assert!(max_dev < 0.01, "radius deviated {:.3}%", max_dev * 100.0);
        assert!((state.radius(0, 1) - R_LEO).abs() / R_LEO < 0.01);
    }

    #[test]
    fn substeps_tighten_the_orbit() {
        let (system, state) = craft_earth();
        let run = |substeps| {
            let mut s = state.clone();
            for _ in 0..((period() / 10.0) as usize) {
                s = advance_fixed(&system, &s, 10.0, substeps, &ThrustDirective::off());
            }
            (s.radius(0, 1) - R_LEO).abs()
        };
        let coarse = run(1);
        let fine = run(10);
        assert!(fine < coarse, "fine {fine} vs coarse {coarse}");
        assert!(fine / R_LEO < 1e-3);
    }

    #[test]
    fn momentum_and_energy_conserved_over_ten_thousand_steps() {
        let (system, mut state) = craft_earth();
        let p0 = system.total_momentum(&state);
        let e0 = system.total_energy(&state);
        for _ in 0..10_000 {
            state = advance_fixed(&system, &state, 1.0, 1, &ThrustDirective::off());
        }
        let dp = (system.total_momentum(&state) - p0).norm() / p0.norm();
        let de = ((system.total_energy(&state) - e0) / e0).abs();
        assert!(dp < 1e-9, "momentum drift {dp:e}");
        assert!(de < 1e-2, "energy drift {de:e}");
    }

    #[test]
    fn adaptive_and_fixed_agree_over_short_arc() {
        let (system, state) = craft_earth();
        let fixed = advance(&system, &state, 60.0, &ThrustDirective::off(),
            &StepMethod::SemiImplicitEuler { substeps: 600 }).unwrap();
        let adaptive = advance(&system, &state, 60.0, &ThrustDirective::off(),
            &StepMethod::DormandPrince(AdaptiveStepControl::default())).unwrap();
        assert!((fixed.bodies[0].pos - adaptive.bodies[0].pos).norm() < 50.0);
        assert_eq!(fixed.time, adaptive.time);
    }

    #[test]
    fn both_methods_step_backwards_alike() {
        let (system, state) = craft_earth();
        let fixed = advance(&system, &state, -60.0, &ThrustDirective::off(),
            &StepMethod::SemiImplicitEuler { substeps: 600 }).unwrap();
        let adaptive = advance(&system, &state, -60.0, &ThrustDirective::off(),
            &StepMethod::DormandPrince(AdaptiveStepControl::default())).unwrap();
        assert_eq!(fixed.time, -60.0);
        assert_eq!(adaptive.time, -60.0);
        // moving counter-clockwise, so the past lies at negative y
        assert!(adaptive.bodies[0].pos.y < -400_000.0);
        assert!((fixed.bodies[0].pos - adaptive.bodies[0].pos).norm() < 50.0);
    }

    #[test]
    fn non_finite_dt_fails_for_both_methods() {
        let (system, state) = craft_earth();
        for method in [
            StepMethod::SemiImplicitEuler { substeps: 1 },
            StepMethod::DormandPrince(AdaptiveStepControl::default()),
        ] {
            let err = advance(&system, &state, f64::NAN, &ThrustDirective::off(), &method)
                .unwrap_err();
            assert!(matches!(err, IntegrationError::InvalidTimeStep { .. }), "{method:?}");
        }
    }

    #[test]
    fn fixed_step_reports_non_finite_state() {
        let (system, mut state) = craft_earth();
        state.bodies[0].vel.x = f64::NAN;
        let err = advance(&system, &state, 10.0, &ThrustDirective::off(),
            &StepMethod::SemiImplicitEuler { substeps: 1 }).unwrap_err();
        assert_eq!(err, IntegrationError::NonFinite { time: 0.0 });
    }

    #[test]
    fn prograde_thrust_raises_energy() {
        let (system, state) = craft_earth();
        let d = ThrustDirective::new(true, ThrustMode::Prograde, 1.0).unwrap();
        let coast = advance_fixed(&system, &state, 100.0, 10, &ThrustDirective::off());
        let burn = advance_fixed(&system, &state, 100.0, 10, &d);
        assert!(system.total_energy(&burn) > system.total_energy(&coast));
        let retro = d.with_mode(ThrustMode::FixedSign(Sign::Negative));
        let brake = advance_fixed(&system, &state, 100.0, 10, &retro);
        assert!(system.total_energy(&brake) < system.total_energy(&coast));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn thrust_off_ignores_mode_and_magnitude(
            magnitude in 0.0f64..10.0,
            mode_idx in 0usize..6,
            adaptive in any::<bool>(),
        ) {
            let modes = [
                ThrustMode::FixedSign(Sign::Positive),
                ThrustMode::FixedSign(Sign::Negative),
                ThrustMode::Prograde,
                ThrustMode::Retrograde,
                ThrustMode::RadialOutward,
                ThrustMode::RadialInward,
            ];
            let (system, state) = craft_earth();
            let method = if adaptive {
                StepMethod::DormandPrince(AdaptiveStepControl::default())
            } else {
                StepMethod::SemiImplicitEuler { substeps: 3 }
            };
            let off = ThrustDirective::new(false, modes[mode_idx], magnitude).unwrap();
            let a = advance(&system, &state, 30.0, &off, &method).unwrap();
            let b = advance(&system, &state, 30.0, &ThrustDirective::off(), &method).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
