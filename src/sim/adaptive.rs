//! Dormand-Prince 5(4) embedded Runge-Kutta with local error control.
//!
//! The fifth-order solution is propagated; the embedded fourth-order
//! solution only feeds the error estimate. A call integrates exactly over
//! `[t, t + dt]` and returns the end state; intermediate steps stay internal.

use log::trace;
use serde::Deserialize;

use crate::dynamics;
use crate::dynamics::state::{Deriv, State, System, Vec3};
use crate::error::IntegrationError;
use crate::physics::thrust::ThrustDirective;

const STAGES: usize = 7;

/// Butcher tableau of an embedded explicit Runge-Kutta pair.
pub struct ButcherTableau<const S: usize> {
    pub a: [[f64; S]; S],
    /// Weights of the propagated solution.
    pub b: [f64; S],
    /// Weights of the embedded (error) solution.
    pub b_star: [f64; S],
    pub c: [f64; S],
    /// Order of the embedded solution, drives the step size exponent.
    pub error_order: u32,
}

impl ButcherTableau<STAGES> {
    pub const DORMAND_PRINCE_45: Self = Self {
        a: [
            [0., 0., 0., 0., 0., 0., 0.],
            [1. / 5., 0., 0., 0., 0., 0., 0.],
            [3. / 40., 9. / 40., 0., 0., 0., 0., 0.],
            [44. / 45., -56. / 15., 32. / 9., 0., 0., 0., 0.],
            [19372. / 6561., -25360. / 2187., 64448. / 6561., -212. / 729., 0., 0., 0.],
            [9017. / 3168., -355. / 33., 46732. / 5247., 49. / 176., -5103. / 18656., 0., 0.],
            [35. / 384., 0., 500. / 1113., 125. / 192., -2187. / 6784., 11. / 84., 0.],
        ],
        b: [35. / 384., 0., 500. / 1113., 125. / 192., -2187. / 6784., 11. / 84., 0.],
        b_star: [
            5179. / 57600.,
            0.,
            7571. / 16695.,
            393. / 640.,
            -92097. / 339200.,
            187. / 2100.,
            1. / 40.,
        ],
        c: [0., 1. / 5., 3. / 10., 4. / 5., 8. / 9., 1., 1.],
        error_order: 4,
    };
}

/// Adaptive step size controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdaptiveStepControl {
    /// Absolute tolerance used for error estimation.
    pub abs_tol: f64,
    /// Relative tolerance used for error estimation.
    pub rel_tol: f64,
    pub safety: f64,
    pub min_growth: f64,
    pub max_growth: f64,
    /// Smallest internal step before giving up, s.
    pub min_dt: f64,
    /// Internal step budget per call.
    pub max_steps: usize,
}

impl Default for AdaptiveStepControl {
    fn default() -> Self {
        Self {
            abs_tol: 1e-12,
            rel_tol: 1e-9,
            safety: 0.9,
            min_growth: 0.2,
            max_growth: 5.0,
            min_dt: 1e-9,
            max_steps: 100_000,
        }
    }
}

impl AdaptiveStepControl {
    pub fn with_abs_tol(mut self, abs_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self
    }

    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Next step size from the current one and its normalized error.
    fn next_dt(&self, dt: f64, error: f64, order: u32) -> f64 {
        let factor = if error == 0.0 {
            self.max_growth
        } else {
            (self.safety * error.powf(-1.0 / (order as f64 + 1.0)))
                .clamp(self.min_growth, self.max_growth)
        };
        dt * factor
    }
}

/// Integrate `state` over `dt` seconds. A negative `dt` integrates backwards.
///
/// The first internal step tries the whole interval; the last step is
/// clipped to land on `t + dt` exactly.
pub fn integrate(
    system: &System,
    state: &State,
    dt: f64,
    directive: &ThrustDirective,
    control: &AdaptiveStepControl,
) -> Result<State, IntegrationError> {
    if !dt.is_finite() {
        return Err(IntegrationError::InvalidTimeStep { dt });
    }
    let tableau = &ButcherTableau::DORMAND_PRINCE_45;
    let t_end = state.time + dt;
    let direction = dt.signum();
    let mut x = state.clone();
    let mut h = dt;
    let mut steps = 0;
    // first-same-as-last: k7 of an accepted step is k1 of the next
    let mut k_first = dynamics::derivatives(system, &x, directive);

    while (t_end - x.time) * direction > 0.0 {
        if steps >= control.max_steps {
            return Err(IntegrationError::MaxStepsExceeded {
                max_steps: control.max_steps,
                time: x.time,
            });
        }
        steps += 1;

        let remaining = t_end - x.time;
        let last = h.abs() >= remaining.abs();
        let h_try = if last { remaining } else { h };

        let (y, y_star, k_last) = step(system, &x, h_try, directive, tableau, &k_first);
        if !y.is_finite() {
            return Err(IntegrationError::NonFinite { time: x.time });
        }
        let error = error_norm(&x, &y, &y_star, control);

        if error <= 1.0 {
            x = y;
            if last {
                // avoid drift from accumulated time sums
                x.time = t_end;
            }
            k_first = k_last;
            h = control.next_dt(h_try, error, tableau.error_order);
        } else {
            h = control.next_dt(h_try, error, tableau.error_order);
            trace!("rejected step at t={:.3}: dt={:e}, err={:.3}", x.time, h_try, error);
            if h.abs() < control.min_dt {
                return Err(IntegrationError::StepSizeUnderflow { time: x.time, dt: h });
            }
        }
    }
    Ok(x)
}

/// One trial step. Returns (fifth-order, fourth-order, derivative at the end).
fn step(
    system: &System,
    x: &State,
    h: f64,
    directive: &ThrustDirective,
    tableau: &ButcherTableau<STAGES>,
    k_first: &Deriv,
) -> (State, State, Deriv) {
    let mut k: Vec<Deriv> = Vec::with_capacity(STAGES);
    k.push(k_first.clone());
    for s in 1..STAGES {
        let stage = combine(x, &k, &tableau.a[s][..s], h, tableau.c[s] * h);
        k.push(dynamics::derivatives(system, &stage, directive));
    }
    // the last row of `a` equals `b`, so the final stage point is the solution
    let y = combine(x, &k, &tableau.b, h, h);
    let y_star = combine(x, &k, &tableau.b_star, h, h);
    let k_last = k.pop().unwrap_or_else(|| Deriv::zeros(x.bodies.len()));
    (y, y_star, k_last)
}

/// x + h * sum_s w_s k_s, with time advanced by `dt_time`.
fn combine(x: &State, k: &[Deriv], weights: &[f64], h: f64, dt_time: f64) -> State {
    let mut out = x.clone();
    out.time = x.time + dt_time;
    for (ks, &w) in k.iter().zip(weights) {
        if w == 0.0 {
            continue;
        }
        for (b, (dp, dv)) in out.bodies.iter_mut().zip(ks.dpos.iter().zip(&ks.dvel)) {
            b.pos += dp * (h * w);
            b.vel += dv * (h * w);
        }
    }
    out
}

/// RMS of the component errors, each scaled by `abs_tol + rel_tol * max(|x|, |y|)`.
fn error_norm(x: &State, y: &State, y_star: &State, control: &AdaptiveStepControl) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    let mut accumulate = |x0: &Vec3, y5: &Vec3, y4: &Vec3| {
        for i in 0..3 {
            let scale = control.abs_tol + control.rel_tol * x0[i].abs().max(y5[i].abs());
            let e = (y5[i] - y4[i]) / scale;
            sum += e * e;
            n += 1;
        }
    };
    for ((bx, by), bs) in x.bodies.iter().zip(&y.bodies).zip(&y_star.bodies) {
        accumulate(&bx.pos, &by.pos, &bs.pos);
        accumulate(&bx.vel, &by.vel, &bs.vel);
    }
    if n == 0 {
        0.0
    } else {
        (sum / n as f64).sqrt()
    }
}
