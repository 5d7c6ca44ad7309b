pub mod state;

use crate::physics::gravity;
use crate::physics::thrust::{thrust_accel, ThrustDirective};
use state::{Deriv, State, System, Vec3};

// ---------------------------------------------------------------------------
// Equations of motion (n-body point masses + thrust on one body)
// ---------------------------------------------------------------------------

/// Accelerations of every body: mutual gravity, plus the directive's thrust
/// on the system's thrust target.
///
/// All gravity terms come from the positions in `state` as given, so every
/// body sees the same snapshot.
pub fn accelerations(system: &System, state: &State, directive: &ThrustDirective) -> Vec<Vec3> {
    let masses = system.masses();
    let positions: Vec<Vec3> = state.bodies.iter().map(|b| b.pos).collect();
    let mut acc = gravity::accelerations(&masses, &positions);

    if directive.enabled() {
        let target = system.thrust_target;
        let rel_pos = state.relative_position(target, system.thrust_reference);
        acc[target] += thrust_accel(&state.bodies[target].vel, &rel_pos, directive);
    }
    acc
}

/// State derivatives: d(pos)/dt = vel, d(vel)/dt = gravity + thrust.
pub fn derivatives(system: &System, state: &State, directive: &ThrustDirective) -> Deriv {
    Deriv {
        dpos: state.bodies.iter().map(|b| b.vel).collect(),
        dvel: accelerations(system, state, directive),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
