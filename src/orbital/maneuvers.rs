use log::{debug, warn};

use crate::dynamics::state::{BodyState, State, System, Vec3};
use crate::sim::event::{EventDetector, EventKind, RadiusWindowDetector};

/// Result of a Hohmann transfer calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannTransfer {
    pub dv1: f64,           // m/s, first burn (negative for an inward transfer)
    pub dv2: f64,           // m/s, second burn (circularize)
    pub total_dv: f64,      // m/s, |dv1| + |dv2|
    pub transfer_time: f64, // s, half the transfer orbit period
    pub r1: f64,            // m, initial orbit radius
    pub r2: f64,            // m, final orbit radius
}

/// Compute the Hohmann transfer between two coplanar circular orbits.
///
/// `r1` and `r2` are orbital radii (not altitudes), in meters; `mu` is the
/// gravitational parameter of the central body.
pub fn hohmann(r1: f64, r2: f64, mu: f64) -> HohmannTransfer {
    let a_transfer = (r1 + r2) / 2.0;

    let dv1 = circular_velocity(r1, mu) * ((2.0 * r2 / (r1 + r2)).sqrt() - 1.0);
    let dv2 = circular_velocity(r2, mu) * (1.0 - (2.0 * r1 / (r1 + r2)).sqrt());

    let transfer_time = std::f64::consts::PI * (a_transfer.powi(3) / mu).sqrt();

    HohmannTransfer {
        dv1,
        dv2,
        total_dv: dv1.abs() + dv2.abs(),
        transfer_time,
        r1,
        r2,
    }
}

/// Circular orbit speed at radius `r`.
pub fn circular_velocity(r: f64, mu: f64) -> f64 {
    (mu / r).sqrt()
}

/// Period of a circular orbit of radius `r`.
pub fn circular_period(r: f64, mu: f64) -> f64 {
    2.0 * std::f64::consts::PI * (r.powi(3) / mu).sqrt()
}

/// Unit vector along the direction of motion of a counter-clockwise orbit in
/// the x-y plane: `(-y, x, 0) / r` for the position relative to the central body.
pub fn tangential_direction(rel_pos: &Vec3) -> Vec3 {
    let r = rel_pos.x.hypot(rel_pos.y);
    if r == 0.0 {
        return Vec3::zeros();
    }
    Vec3::new(-rel_pos.y / r, rel_pos.x / r, 0.0)
}

/// Instantaneous velocity change. `direction` must already be a unit vector.
/// Position and time are untouched.
pub fn apply_impulse(body: &mut BodyState, delta_v: f64, direction: &Vec3) {
    body.vel += direction * delta_v;
}

// ---------------------------------------------------------------------------
// Two-burn transfer sequencing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManeuverPhase {
    #[default]
    NotStarted,
    FirstBurnApplied,
    TransferComplete,
}

/// Hohmann transfer of the system's thrust target around its reference body.
///
/// The first burn is applied on request; the second is applied automatically,
/// once, when the target's radius comes within `tolerance` of `r2`.
#[derive(Debug, Clone)]
pub struct HohmannManeuver {
    transfer: HohmannTransfer,
    tolerance: f64,
    phase: ManeuverPhase,
    arrival: RadiusWindowDetector,
}

impl HohmannManeuver {
    pub fn new(transfer: HohmannTransfer, tolerance: f64) -> Self {
        Self {
            transfer,
            tolerance,
            phase: ManeuverPhase::NotStarted,
            arrival: RadiusWindowDetector::new(transfer.r2, tolerance),
        }
    }

    /// Plan a transfer from the target's current radius to `target_radius`.
    pub fn plan(system: &System, state: &State, target_radius: f64, tolerance: f64) -> Self {
        let r1 = state.radius(system.thrust_target, system.thrust_reference);
        Self::new(hohmann(r1, target_radius, system.reference_mu()), tolerance)
    }

    pub fn transfer(&self) -> &HohmannTransfer {
        &self.transfer
    }

    pub fn phase(&self) -> ManeuverPhase {
        self.phase
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Back to `NotStarted`, keeping the planned transfer.
    pub fn reset(&mut self) {
        self.phase = ManeuverPhase::NotStarted;
        self.arrival = RadiusWindowDetector::new(self.transfer.r2, self.tolerance);
    }

    /// Apply the first burn if the transfer has not started yet.
    /// Returns the applied delta-v.
    pub fn trigger(&mut self, system: &System, state: &mut State) -> Option<f64> {
        if self.phase != ManeuverPhase::NotStarted {
            warn!("transfer already started ({:?}), ignoring trigger", self.phase);
            return None;
        }
        burn(system, state, self.transfer.dv1);
        self.phase = ManeuverPhase::FirstBurnApplied;
        debug!("first burn at t={:.1} s: dv={:.2} m/s", state.time, self.transfer.dv1);
        Some(self.transfer.dv1)
    }

    /// Per-tick check after the state moved from `prev` to `state`. Applies
    /// the second burn once the target arrives at `r2`; returns its delta-v.
    pub fn update(&mut self, system: &System, prev: &State, state: &mut State) -> Option<f64> {
        if self.phase != ManeuverPhase::FirstBurnApplied {
            return None;
        }
        match self.arrival.check(prev, state, system) {
            Some(EventKind::RadiusReached { .. }) => {
                burn(system, state, self.transfer.dv2);
                self.phase = ManeuverPhase::TransferComplete;
                debug!("second burn at t={:.1} s: dv={:.2} m/s", state.time, self.transfer.dv2);
                Some(self.transfer.dv2)
            }
            _ => None,
        }
    }
}

/// Tangential impulse on the thrust target, relative to its reference body.
fn burn(system: &System, state: &mut State, delta_v: f64) {
    let rel = state.relative_position(system.thrust_target, system.thrust_reference);
    let direction = tangential_direction(&rel);
    apply_impulse(&mut state.bodies[system.thrust_target], delta_v, &direction);
}
