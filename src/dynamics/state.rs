use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G: f64 = 6.674_30e-11; // gravitational constant, m^3/(kg s^2)

pub type Vec3 = Vector3<f64>;

// ---------------------------------------------------------------------------
// Immutable body parameters
// ---------------------------------------------------------------------------

/// A massive body. Mass never changes during a run and is not integrated.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    pub mass: f64, // kg
}

impl Body {
    pub fn new(name: impl Into<String>, mass: f64) -> Self {
        Self { name: name.into(), mass }
    }

    /// Gravitational parameter mu = G * m.
    pub fn mu(&self) -> f64 {
        G * self.mass
    }
}

/// The fixed set of bodies in one run, plus which body receives thrust and
/// which body it is measured against (radial thrust, maneuvers).
///
/// Body `i` here is body `i` in every [`State`] of the run.
#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>,
    pub thrust_target: usize,
    pub thrust_reference: usize,
}

impl System {
    pub fn new(bodies: Vec<Body>, thrust_target: usize, thrust_reference: usize) -> Self {
        Self { bodies, thrust_target, thrust_reference }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn masses(&self) -> Vec<f64> {
        self.bodies.iter().map(|b| b.mass).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }

    /// mu of the reference body, used for transfer and element calculations.
    pub fn reference_mu(&self) -> f64 {
        self.bodies[self.thrust_reference].mu()
    }

    /// Total linear momentum, kg m/s.
    pub fn total_momentum(&self, state: &State) -> Vec3 {
        self.bodies
            .iter()
            .zip(&state.bodies)
            .fold(Vec3::zeros(), |p, (b, s)| p + s.vel * b.mass)
    }

    /// Kinetic plus pairwise potential energy, J.
    pub fn total_energy(&self, state: &State) -> f64 {
        let mut kinetic = 0.0;
        let mut potential = 0.0;
        for (i, (bi, si)) in self.bodies.iter().zip(&state.bodies).enumerate() {
            kinetic += 0.5 * bi.mass * si.vel.norm_squared();
            for (bj, sj) in self.bodies.iter().zip(&state.bodies).skip(i + 1) {
                potential -= G * bi.mass * bj.mass / (sj.pos - si.pos).norm();
            }
        }
        kinetic + potential
    }

    pub fn center_of_mass(&self, state: &State) -> Vec3 {
        let total: f64 = self.bodies.iter().map(|b| b.mass).sum();
        self.bodies
            .iter()
            .zip(&state.bodies)
            .fold(Vec3::zeros(), |c, (b, s)| c + s.pos * (b.mass / total))
    }
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub pos: Vec3, // m, shared inertial frame
    pub vel: Vec3, // m/s
}

impl BodyState {
    pub fn new(pos: Vec3, vel: Vec3) -> Self {
        Self { pos, vel }
    }

    pub fn speed(&self) -> f64 {
        self.vel.norm()
    }
}

/// Positions and velocities of every body at one instant.
///
/// Cloning is a deep copy: the body vector is never shared between clones.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub time: f64, // s
    pub bodies: Vec<BodyState>,
}

impl State {
    pub fn new(time: f64, bodies: Vec<BodyState>) -> Self {
        Self { time, bodies }
    }

    /// Advance state by a derivative scaled by dt (used inside Runge-Kutta stages).
    pub fn apply(&self, d: &Deriv, dt: f64) -> State {
        State {
            time: self.time + dt,
            bodies: self
                .bodies
                .iter()
                .zip(d.dpos.iter().zip(&d.dvel))
                .map(|(b, (dp, dv))| BodyState {
                    pos: b.pos + dp * dt,
                    vel: b.vel + dv * dt,
                })
                .collect(),
        }
    }

    pub fn position(&self, idx: usize) -> Vec3 {
        self.bodies[idx].pos
    }

    pub fn velocity(&self, idx: usize) -> Vec3 {
        self.bodies[idx].vel
    }

    /// Position of `idx` relative to `reference`.
    pub fn relative_position(&self, idx: usize, reference: usize) -> Vec3 {
        self.bodies[idx].pos - self.bodies[reference].pos
    }

    pub fn relative_velocity(&self, idx: usize, reference: usize) -> Vec3 {
        self.bodies[idx].vel - self.bodies[reference].vel
    }

    /// Distance between `idx` and `reference`.
    pub fn radius(&self, idx: usize, reference: usize) -> f64 {
        self.relative_position(idx, reference).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.bodies.iter().all(|b| {
                b.pos.iter().all(|x| x.is_finite()) && b.vel.iter().all(|x| x.is_finite())
            })
    }
}

// ---------------------------------------------------------------------------
// State derivative (dp/dt, dv/dt per body)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Deriv {
    pub dpos: Vec<Vec3>, // velocity
    pub dvel: Vec<Vec3>, // acceleration
}

impl Deriv {
    pub fn zeros(n: usize) -> Self {
        Self { dpos: vec![Vec3::zeros(); n], dvel: vec![Vec3::zeros(); n] }
    }
}
