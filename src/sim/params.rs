use serde::{Deserialize, Serialize};
use std::fmt;

/// Preset physics configurations, cycled as a unit from the UI
pub mod presets {
    /// Slippery: things drift a long way
    pub const LOW_FRICTION: FrictionPreset = FrictionPreset {
        name: "friction: low",
        v_friction: 0.9,
        bg_friction: 0.1,
        inertia: 0.2,
        spring_force: 10.0,
        spring_damping: 0.6,
        bounce: 0.4,
    };

    /// The default feel
    pub const MEDIUM_FRICTION: FrictionPreset = FrictionPreset {
        name: "friction: med",
        v_friction: 0.3,
        bg_friction: 0.4,
        inertia: 0.3,
        spring_force: 15.0,
        spring_damping: 0.4,
        bounce: 0.7,
    };

    /// Sticky background, everything settles quickly
    pub const HIGH_FRICTION: FrictionPreset = FrictionPreset {
        name: "friction: high",
        v_friction: 0.1,
        bg_friction: 0.7,
        inertia: 0.2,
        spring_force: 20.0,
        spring_damping: 0.3,
        bounce: 0.7,
    };

    pub const ALL: [FrictionPreset; 3] = [LOW_FRICTION, MEDIUM_FRICTION, HIGH_FRICTION];

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct FrictionPreset {
        pub name: &'static str,
        pub v_friction: f32,
        pub bg_friction: f32,
        pub inertia: f32,
        pub spring_force: f32,
        pub spring_damping: f32,
        pub bounce: f32,
    }
}

use presets::FrictionPreset;

/// Tunable constants for one simulation world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// How hard touching bubbles push each other apart
    pub bounce: f32,
    /// How hard nearby (not touching) bubbles push apart
    pub repulsion: f32,
    /// Stiffness of stick-to springs
    pub spring_force: f32,
    /// Damping of stick-to springs
    pub spring_damping: f32,
    /// Velocity to displacement scale
    pub inertia: f32,
    /// Forces smaller than this (per axis) are ignored
    pub bg_friction: f32,
    /// Velocity kept per unit of time: 1 floats freely, 0 stops dead
    pub v_friction: f32,
    /// Overall strength of bubble gravity
    pub gravity_scale: f32,
    /// Distance over which gravity halves
    pub gravity_half_distance: f32,
    /// Steering strength of seekers
    pub seek_speed: f32,
    /// Seekers slow down inside this distance of their goal
    pub seek_slow_distance: f32,
    /// Seekers stop steering inside this distance
    pub seek_stop_distance: f32,
    /// Smoothing passes over the outline each step
    pub surface_fuzz: usize,
    /// Radius kept per unit of time while popping
    pub pop_decay: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radius of the circular world
    pub world_radius: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            bounce: 0.7,
            repulsion: 2.0,
            spring_force: 15.0,
            spring_damping: 0.4,
            inertia: 0.3,
            bg_friction: 0.4,
            v_friction: 0.3,
            gravity_scale: 3.0,
            gravity_half_distance: 500.0,
            seek_speed: 20.0,
            seek_slow_distance: 50.0,
            seek_stop_distance: 10.0,
            surface_fuzz: 3,
            pop_decay: 0.3,
            min_radius: 15.0,
            max_radius: 2000.0,
            world_radius: 6000.0,
        }
    }
}

impl SimParams {
    pub fn apply_preset(&mut self, preset: &FrictionPreset) {
        self.v_friction = preset.v_friction;
        self.bg_friction = preset.bg_friction;
        self.inertia = preset.inertia;
        self.spring_force = preset.spring_force;
        self.spring_damping = preset.spring_damping;
        self.bounce = preset.bounce;
    }

    /// The preset matching the current friction values, if any
    pub fn matching_preset(&self) -> Option<usize> {
        presets::ALL.iter().position(|p| {
            p.v_friction == self.v_friction
                && p.bg_friction == self.bg_friction
                && p.inertia == self.inertia
        })
    }

    /// Velocity decay over a step of length `dt`
    pub fn friction(&self, dt: f32) -> f32 {
        self.v_friction.powf(dt)
    }

    pub fn clamp_radius(&self, r: f32) -> f32 {
        r.clamp(self.min_radius, self.max_radius)
    }

    /// Parse params from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let params: SimParams = serde_json::from_str(json).map_err(LoadError::Parse)?;
        params.validate()?;
        Ok(params)
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<(), LoadError> {
        let finite = [
            ("bounce", self.bounce),
            ("repulsion", self.repulsion),
            ("spring_force", self.spring_force),
            ("spring_damping", self.spring_damping),
            ("inertia", self.inertia),
            ("bg_friction", self.bg_friction),
            ("v_friction", self.v_friction),
            ("gravity_scale", self.gravity_scale),
            ("gravity_half_distance", self.gravity_half_distance),
            ("seek_speed", self.seek_speed),
            ("seek_slow_distance", self.seek_slow_distance),
            ("seek_stop_distance", self.seek_stop_distance),
            ("pop_decay", self.pop_decay),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("world_radius", self.world_radius),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(LoadError::Invalid(format!("{name} must be finite")));
            }
        }

        if !(0.0..=1.0).contains(&self.v_friction) {
            return Err(LoadError::Invalid("v_friction must be in [0, 1]".into()));
        }
        if !(self.pop_decay > 0.0 && self.pop_decay < 1.0) {
            return Err(LoadError::Invalid("pop_decay must be in (0, 1)".into()));
        }
        if self.min_radius <= 0.0 || self.min_radius > self.max_radius {
            return Err(LoadError::Invalid(
                "radius range must satisfy 0 < min_radius <= max_radius".into(),
            ));
        }
        if self.gravity_half_distance <= 0.0 {
            return Err(LoadError::Invalid("gravity_half_distance must be positive".into()));
        }
        if self.world_radius <= self.max_radius {
            return Err(LoadError::Invalid("world_radius must exceed max_radius".into()));
        }
        Ok(())
    }
}

/// Failure to load params or a saved world
#[derive(Debug)]
pub enum LoadError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(e) => write!(f, "Malformed JSON: {}", e),
            LoadError::Invalid(reason) => write!(f, "Invalid value: {}", reason),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Parse(e) => Some(e),
            LoadError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_medium_preset() {
        let params = SimParams::default();
        assert_eq!(params.matching_preset(), Some(1));
        let mut medium = params.clone();
        medium.apply_preset(&presets::MEDIUM_FRICTION);
        assert_eq!(medium, params);
    }

    #[test]
    fn test_preset_swaps_as_a_unit() {
        let mut params = SimParams::default();
        params.apply_preset(&presets::HIGH_FRICTION);

        assert_eq!(params.v_friction, 0.1);
        assert_eq!(params.bg_friction, 0.7);
        assert_eq!(params.inertia, 0.2);
        assert_eq!(params.spring_force, 20.0);
        assert_eq!(params.spring_damping, 0.3);
        assert_eq!(params.matching_preset(), Some(2));
        // untouched by presets
        assert_eq!(params.repulsion, 2.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let params = SimParams::from_json(r#"{ "repulsion": 5.0, "surface_fuzz": 1 }"#).unwrap();

        assert_eq!(params.repulsion, 5.0);
        assert_eq!(params.surface_fuzz, 1);
        assert_eq!(params.world_radius, 6000.0);
    }

    #[test]
    fn test_bad_json_is_rejected() {
        assert!(matches!(
            SimParams::from_json("{ not json"),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            SimParams::from_json(r#"{ "min_radius": 50.0, "max_radius": 10.0 }"#),
            Err(LoadError::Invalid(_))
        ));
        assert!(matches!(
            SimParams::from_json(r#"{ "v_friction": 1.5 }"#),
            Err(LoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_friction_decays_with_dt() {
        let params = SimParams::default();
        assert!((params.friction(1.0) - 0.3).abs() < 1e-6);
        assert!((params.friction(0.0) - 1.0).abs() < 1e-6);
        assert!(params.friction(0.1) > 0.3);
    }
}
