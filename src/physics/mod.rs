pub mod gravity;
pub mod thrust;

pub use gravity::accelerations;
pub use thrust::{thrust_accel, Sign, ThrustDirective, ThrustMode};
