use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::dynamics::state::Vec3;
use crate::error::DirectiveError;

/// Below this speed (m/s) or separation (m) the thrust direction is undefined
/// and the thrust contributes nothing for that instant.
pub const DIRECTION_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn value(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// Thrust pointing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ThrustMode {
    /// Along (+) or against (-) the velocity.
    FixedSign(Sign),
    Prograde,
    Retrograde,
    /// Away from the reference body.
    RadialOutward,
    /// Toward the reference body.
    RadialInward,
}

impl FromStr for ThrustMode {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed+" | "fixed-positive" => Ok(ThrustMode::FixedSign(Sign::Positive)),
            "fixed-" | "fixed-negative" => Ok(ThrustMode::FixedSign(Sign::Negative)),
            "prograde" => Ok(ThrustMode::Prograde),
            "retrograde" => Ok(ThrustMode::Retrograde),
            "radial-outward" | "radial" => Ok(ThrustMode::RadialOutward),
            "radial-inward" | "anti-radial" => Ok(ThrustMode::RadialInward),
            _ => Err(DirectiveError::UnknownMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for ThrustMode {
    type Error = DirectiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ThrustMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThrustMode::FixedSign(Sign::Positive) => "fixed+",
            ThrustMode::FixedSign(Sign::Negative) => "fixed-",
            ThrustMode::Prograde => "prograde",
            ThrustMode::Retrograde => "retrograde",
            ThrustMode::RadialOutward => "radial-outward",
            ThrustMode::RadialInward => "radial-inward",
        };
        f.write_str(s)
    }
}

/// Control input for one tick: on/off, pointing mode and acceleration (m/s^2).
///
/// Fields are private so every directive has gone through validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustDirective {
    enabled: bool,
    mode: ThrustMode,
    magnitude: f64,
}

impl Default for ThrustDirective {
    fn default() -> Self {
        Self::off()
    }
}

impl ThrustDirective {
    pub fn new(enabled: bool, mode: ThrustMode, magnitude: f64) -> Result<Self, DirectiveError> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(DirectiveError::InvalidMagnitude(magnitude));
        }
        Ok(Self { enabled, mode, magnitude })
    }

    /// Thrust disabled.
    pub fn off() -> Self {
        Self { enabled: false, mode: ThrustMode::Prograde, magnitude: 0.0 }
    }

    /// Binary signed-thrust model: 0 is off, +1/-1 thrust along/against velocity.
    pub fn from_sign(sign: i32, magnitude: f64) -> Result<Self, DirectiveError> {
        match sign {
            0 => Self::new(false, ThrustMode::FixedSign(Sign::Positive), magnitude),
            1 => Self::new(true, ThrustMode::FixedSign(Sign::Positive), magnitude),
            -1 => Self::new(true, ThrustMode::FixedSign(Sign::Negative), magnitude),
            other => Err(DirectiveError::InvalidSign(other)),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> ThrustMode {
        self.mode
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    pub fn with_mode(self, mode: ThrustMode) -> Self {
        Self { mode, ..self }
    }
}

/// Thrust acceleration on a body with velocity `vel`, located at
/// `rel_pos` from the reference body.
///
/// The result is added to the body's gravitational acceleration.
pub fn thrust_accel(vel: &Vec3, rel_pos: &Vec3, directive: &ThrustDirective) -> Vec3 {
    if !directive.enabled {
        return Vec3::zeros();
    }
    let (axis, scale) = match directive.mode {
        ThrustMode::FixedSign(sign) => (vel, sign.value()),
        ThrustMode::Prograde => (vel, 1.0),
        ThrustMode::Retrograde => (vel, -1.0),
        ThrustMode::RadialOutward => (rel_pos, 1.0),
        ThrustMode::RadialInward => (rel_pos, -1.0),
    };
    let len = axis.norm();
    if len < DIRECTION_FLOOR {
        return Vec3::zeros();
    }
    axis * (scale * directive.magnitude / len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn on(mode: ThrustMode) -> ThrustDirective {
        ThrustDirective::new(true, mode, 2.0).unwrap()
    }

    #[test]
    fn velocity_modes() {
        let vel = Vec3::new(0.0, 3.0, 0.0);
        let r = Vec3::new(7.0e6, 0.0, 0.0);
        assert_relative_eq!(thrust_accel(&vel, &r, &on(ThrustMode::Prograde)), Vec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(thrust_accel(&vel, &r, &on(ThrustMode::Retrograde)), Vec3::new(0.0, -2.0, 0.0));
        assert_relative_eq!(
            thrust_accel(&vel, &r, &on(ThrustMode::FixedSign(Sign::Negative))),
            Vec3::new(0.0, -2.0, 0.0)
        );
    }

    #[test]
    fn radial_modes() {
        let vel = Vec3::new(0.0, 3.0, 0.0);
        let r = Vec3::new(-4.0, 0.0, 3.0);
        assert_relative_eq!(
            thrust_accel(&vel, &r, &on(ThrustMode::RadialOutward)),
            Vec3::new(-1.6, 0.0, 1.2)
        );
        assert_relative_eq!(
            thrust_accel(&vel, &r, &on(ThrustMode::RadialInward)),
            Vec3::new(1.6, 0.0, -1.2)
        );
    }

    #[test]
    fn zero_speed_guard() {
        let d = on(ThrustMode::Prograde);
        let a = thrust_accel(&Vec3::new(1e-12, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0), &d);
        assert_eq!(a, Vec3::zeros());
        let a = thrust_accel(&Vec3::zeros(), &Vec3::zeros(), &on(ThrustMode::RadialInward));
        assert_eq!(a, Vec3::zeros());
    }

    #[test]
    fn parse_modes() {
        assert_eq!("prograde".parse::<ThrustMode>(), Ok(ThrustMode::Prograde));
        assert_eq!("Anti-Radial".parse::<ThrustMode>(), Ok(ThrustMode::RadialInward));
        assert_eq!("fixed-".parse::<ThrustMode>(), Ok(ThrustMode::FixedSign(Sign::Negative)));
        assert_eq!(
            "sideways".parse::<ThrustMode>(),
            Err(DirectiveError::UnknownMode("sideways".into()))
        );
        for mode in [
            ThrustMode::FixedSign(Sign::Positive),
            ThrustMode::FixedSign(Sign::Negative),
            ThrustMode::Prograde,
            ThrustMode::Retrograde,
            ThrustMode::RadialOutward,
            ThrustMode::RadialInward,
        ] {
            assert_eq!(mode.to_string().parse::<ThrustMode>(), Ok(mode));
        }
    }

    #[test]
    fn signed_directive() {
        assert!(!ThrustDirective::from_sign(0, 1e-3).unwrap().enabled());
        let minus = ThrustDirective::from_sign(-1, 1e-3).unwrap();
        assert_eq!(minus.mode(), ThrustMode::FixedSign(Sign::Negative));
        assert_eq!(ThrustDirective::from_sign(2, 1e-3), Err(DirectiveError::InvalidSign(2)));
    }

    #[test]
    fn rejects_bad_magnitude() {
        assert!(ThrustDirective::new(true, ThrustMode::Prograde, -1.0).is_err());
        assert!(ThrustDirective::new(true, ThrustMode::Prograde, f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn disabled_is_zero(
            vx in -1e4f64..1e4, vy in -1e4f64..1e4,
            rx in -1e9f64..1e9, ry in -1e9f64..1e9,
            mag in 0.0f64..100.0,
            mode_idx in 0usize..6,
        ) {
            let modes = [
                ThrustMode::FixedSign(Sign::Positive),
                ThrustMode::FixedSign(Sign::Negative),
                ThrustMode::Prograde,
                ThrustMode::Retrograde,
                ThrustMode::RadialOutward,
                ThrustMode::RadialInward,
            ];
            let d = ThrustDirective::new(false, modes[mode_idx], mag).unwrap();
            let a = thrust_accel(&Vec3::new(vx, vy, 0.0), &Vec3::new(rx, ry, 0.0), &d);
            prop_assert_eq!(a, Vec3::zeros());
        }
    }
}
