pub mod config;
pub mod dynamics;
pub mod error;
pub mod orbital;
pub mod physics;
pub mod scenario;
pub mod sim;

// Convenience re-exports for the driving loop
pub mod prelude {
    pub use crate::config::{load_scenario, ScenarioConfig};
    pub use crate::dynamics::state::{Body, BodyState, State, System, Vec3, G};
    pub use crate::error::{ConfigError, DirectiveError, IntegrationError};
    pub use crate::orbital::{HohmannManeuver, ManeuverPhase, OrbitalElements};
    pub use crate::physics::thrust::{Sign, ThrustDirective, ThrustMode};
    pub use crate::scenario::{presets, Scenario};
    pub use crate::sim::{advance, project, EventKind, SimEvent, Simulation, StepMethod};
}
