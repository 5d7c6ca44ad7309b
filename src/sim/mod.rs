pub mod adaptive;
pub mod event;
pub mod integrator;
pub mod projector;
pub mod runner;

pub use adaptive::AdaptiveStepControl;
pub use event::{ApsisDetector, EventDetector, EventKind, RadiusWindowDetector, SimEvent};
pub use integrator::{advance, StepMethod};
pub use projector::{project, project_with, ProjectionSettings, Projector};
pub use runner::Simulation;
