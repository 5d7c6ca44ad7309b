//! Built-in scenarios.

use crate::config::{
    BodyConfig, ClockConfig, IntegratorConfig, ProjectionConfig, ScenarioConfig, ThrustConfig,
    TransferConfig,
};
use crate::dynamics::state::G;
use crate::physics::thrust::{Sign, ThrustMode};
use crate::sim::adaptive::AdaptiveStepControl;

pub const M_EARTH: f64 = 5.9723e24; // kg
pub const M_MOON: f64 = 7.349e22; // kg
pub const M_CRAFT: f64 = 8_000.0; // kg
pub const R_PARKING: f64 = 7.0e6; // m, low Earth parking orbit
pub const R_MOON: f64 = 3.844e8; // m, mean Earth-Moon distance
pub const V_MOON: f64 = 1_022.0; // m/s

fn circular_speed(mass: f64, r: f64) -> f64 {
    (G * mass / r).sqrt()
}

/// Earth, Moon and a craft in a circular parking orbit; fixed-step
/// integration and continuous thrust in any mode.
pub fn earth_moon_craft() -> ScenarioConfig {
    ScenarioConfig {
        name: "earth-moon-craft".into(),
        bodies: vec![
            BodyConfig::new("earth", M_EARTH, [0.0; 3], [0.0; 3]),
            BodyConfig::new("moon", M_MOON, [R_MOON, 0.0, 0.0], [0.0, V_MOON, 0.0]),
            BodyConfig::new(
                "craft",
                M_CRAFT,
                [R_PARKING, 0.0, 0.0],
                [0.0, circular_speed(M_EARTH, R_PARKING), 0.0],
            ),
        ],
        thrust_target: "craft".into(),
        thrust_reference: "earth".into(),
        integrator: IntegratorConfig::SemiImplicitEuler,
        clock: ClockConfig::default(),
        thrust: ThrustConfig::default(),
        projection: ProjectionConfig::default(),
        transfer: None,
    }
}

/// Hohmann transfer from the parking orbit to lunar distance around a lone Earth.
pub fn lunar_transfer() -> ScenarioConfig {
    ScenarioConfig {
        name: "lunar-transfer".into(),
        bodies: vec![
            BodyConfig::new("earth", M_EARTH, [0.0; 3], [0.0; 3]),
            BodyConfig::new(
                "craft",
                M_CRAFT,
                [R_PARKING, 0.0, 0.0],
                [0.0, circular_speed(M_EARTH, R_PARKING), 0.0],
            ),
        ],
        thrust_target: "craft".into(),
        thrust_reference: "earth".into(),
        integrator: IntegratorConfig::DormandPrince(AdaptiveStepControl::default()),
        clock: ClockConfig::default(),
        thrust: ThrustConfig::default(),
        projection: ProjectionConfig::default(),
        transfer: Some(TransferConfig { target_radius: R_MOON, tolerance: 50_000.0 }),
    }
}

/// Craft released at geostationary radius well below circular speed; falls
/// into a highly eccentric orbit.
pub fn geo_flyby() -> ScenarioConfig {
    ScenarioConfig {
        name: "geo-flyby".into(),
        bodies: vec![
            BodyConfig::new("craft", M_CRAFT, [0.0, 4.2164e7, 0.0], [1_000.0, 0.0, 0.0]),
            BodyConfig::new("earth", M_EARTH, [0.0; 3], [0.0; 3]),
        ],
        thrust_target: "craft".into(),
        thrust_reference: "earth".into(),
        integrator: IntegratorConfig::DormandPrince(AdaptiveStepControl::default()),
        clock: ClockConfig { base_dt: 60.0, ..ClockConfig::default() },
        thrust: ThrustConfig::default(),
        projection: ProjectionConfig::default(),
        transfer: None,
    }
}

/// Craft orbiting the Moon while the Moon orbits Earth; weak signed thrust.
pub fn lunar_escape() -> ScenarioConfig {
    let r_craft = 4.1e8;
    let r_moon = 3.85e8;
    let v_craft = circular_speed(M_MOON, r_craft - r_moon) + V_MOON;
    ScenarioConfig {
        name: "lunar-escape".into(),
        bodies: vec![
            BodyConfig::new("earth", M_EARTH, [0.0; 3], [0.0; 3]),
            BodyConfig::new("moon", M_MOON, [r_moon, 0.0, 0.0], [0.0, V_MOON, 0.0]),
            BodyConfig::new("craft", M_CRAFT, [r_craft, 0.0, 0.0], [0.0, v_craft, 0.0]),
        ],
        thrust_target: "craft".into(),
        thrust_reference: "moon".into(),
        integrator: IntegratorConfig::DormandPrince(AdaptiveStepControl::default()),
        clock: ClockConfig {
            base_dt: 1_000.0,
            time_factors: vec![1.0, 5.0, 10.0],
            ..ClockConfig::default()
        },
        thrust: ThrustConfig { mode: ThrustMode::FixedSign(Sign::Positive), magnitude: 1e-3 },
        projection: ProjectionConfig { steps: 100 },
        transfer: None,
    }
}

/// Every preset, keyed by scenario name.
pub fn all() -> Vec<(&'static str, ScenarioConfig)> {
    vec![
        ("earth-moon-craft", earth_moon_craft()),
        ("lunar-transfer", lunar_transfer()),
        ("geo-flyby", geo_flyby()),
        ("lunar-escape", lunar_escape()),
    ]
}

pub fn by_name(name: &str) -> Option<ScenarioConfig> {
    all().into_iter().find(|(n, _)| *n == name).map(|(_, cfg)| cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("lunar-escape").unwrap().bodies.len(), 3);
        assert!(by_name("mars-direct").is_none());
    }

    #[test]
    fn parking_orbit_is_circular() {
        let cfg = earth_moon_craft();
        let craft = &cfg.bodies[2];
        assert!((craft.velocity[1] - 7_546.0).abs() < 5.0, "{}", craft.velocity[1]);
    }
}
