pub mod elements;
pub mod maneuvers;

pub use elements::OrbitalElements;
pub use maneuvers::{
    apply_impulse, circular_velocity, hohmann, tangential_direction, HohmannManeuver,
    HohmannTransfer, ManeuverPhase,
};
