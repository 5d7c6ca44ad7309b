use thiserror::Error;

/// Rejected thrust directive. Raised when the directive is built, never
/// during integration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DirectiveError {
    #[error("unknown thrust mode `{0}`")]
    UnknownMode(String),
    #[error("thrust sign must be -1, 0 or +1, got {0}")]
    InvalidSign(i32),
    #[error("thrust magnitude must be finite and non-negative, got {0}")]
    InvalidMagnitude(f64),
}

/// Fatal failure of an integration call. There is no partial result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("time step must be finite, got {dt}")]
    InvalidTimeStep { dt: f64 },
    #[error("step size underflow at t={time:.3} s (dt={dt:e} s)")]
    StepSizeUnderflow { time: f64, dt: f64 },
    #[error("exceeded {max_steps} internal steps at t={time:.3} s")]
    MaxStepsExceeded { max_steps: usize, time: f64 },
    #[error("non-finite state at t={time:.3} s")]
    NonFinite { time: f64 },
}

/// Errors raised while loading or validating a scenario.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error("scenario needs at least 2 bodies, got {0}")]
    NotEnoughBodies(usize),
    #[error("body `{name}` has invalid mass {mass}")]
    InvalidMass { name: String, mass: f64 },
    #[error("duplicate body name `{0}`")]
    DuplicateBody(String),
    #[error("unknown body `{0}`")]
    UnknownBody(String),
    #[error("thrust target and reference are both `{0}`")]
    SelfReference(String),
    #[error("bodies `{a}` and `{b}` start at the same position")]
    CoincidentBodies { a: String, b: String },
    #[error("time factors must be non-empty and positive")]
    InvalidTimeFactors,
    #[error("base time step must be positive, got {0}")]
    InvalidTimeStep(f64),
    #[error("transfer target radius must be positive, got {0}")]
    InvalidTransfer(f64),
    #[error("transfer arrival tolerance must be positive, got {0}")]
    InvalidArrivalTolerance(f64),
    #[error("body `{0}` has a non-finite position or velocity")]
    NonFiniteInitialState(String),
}
