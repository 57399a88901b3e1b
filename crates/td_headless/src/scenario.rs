//! Scenario scripts and file loading.
//!
//! A scenario describes a complete scripted session: the configuration,
//! the buildings available in the catalog, and a step list of phase
//! switches, selections, and held input frames. Scenarios and level
//! layouts are RON files; this module owns all the file IO the core
//! deliberately avoids.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use td_core::catalog::{BuildingDefinition, BuildingTypeId, PrefabId};
use td_core::level::{GameConfig, LevelLayout};
use td_core::phase::Phase;

/// Errors that can occur while loading levels and scenarios.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("failed to read file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON file.
    #[error("failed to parse RON file '{path}': {source}")]
    Parse {
        /// Path to the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },
}

/// A building made available to the scripted session's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSpec {
    /// Building type ID.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Coin price.
    pub price: u32,
    /// Visual prefab handle.
    #[serde(default)]
    pub prefab: u32,
    /// Attack behavior profile.
    #[serde(default)]
    pub attack_profile: u32,
}

impl BuildingSpec {
    /// Convert to a core building definition.
    #[must_use]
    pub fn to_definition(&self) -> BuildingDefinition {
        BuildingDefinition::new(
            BuildingTypeId::new(self.id),
            self.name.clone(),
            self.price,
            PrefabId::new(self.prefab),
            self.attack_profile,
        )
    }
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Request a phase switch.
    SwitchPhase(Phase),
    /// Select a building from the catalog by type ID.
    Select(u32),
    /// Clear the build-menu selection.
    ClearSelection,
    /// Grant coins from an external income source.
    Credit(u32),
    /// Advance `count` frames with the pointer held at `pointer`.
    ///
    /// `build` and `confirm` are edge triggers: they fire on the first
    /// frame of the step only, matching a single key press or click.
    Frames {
        /// Number of frames to advance.
        count: u32,
        /// Pointer world position `(x, y, z)` held for the whole step.
        #[serde(default)]
        pointer: (f32, f32, f32),
        /// Press the build control on the first frame.
        #[serde(default)]
        build: bool,
        /// Press the confirm control on the first frame.
        #[serde(default)]
        confirm: bool,
        /// Whether the build-timer surface is shown.
        #[serde(default = "default_true")]
        timer_surface: bool,
        /// Seconds per frame.
        #[serde(default = "default_delta")]
        delta: f32,
    },
}

fn default_true() -> bool {
    true
}

fn default_delta() -> f32 {
    1.0 / 60.0
}

/// A complete scripted session.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     name: "first_tower",
///     buildings: [
///         (id: 1, name: "watchtower", price: 100),
///     ],
///     steps: [
///         SwitchPhase(Building),
///         Select(1),
///         Frames(count: 1, pointer: (3.5, 0.0, 2.5), build: true),
///         Frames(count: 1, pointer: (3.5, 0.0, 2.5), confirm: true),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, echoed into the run report.
    pub name: String,
    /// Session configuration.
    #[serde(default)]
    pub config: GameConfig,
    /// Buildings registered with the catalog before the first step.
    #[serde(default)]
    pub buildings: Vec<BuildingSpec>,
    /// Steps executed in order.
    pub steps: Vec<Step>,
}

fn load_ron<T>(path: &Path) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load a level layout from a RON file.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or parsed.
pub fn load_level(path: &Path) -> Result<LevelLayout, LoadError> {
    load_ron(path)
}

/// Load a scenario script from a RON file.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or parsed.
pub fn load_scenario(path: &Path) -> Result<Scenario, LoadError> {
    load_ron(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_parses_with_defaults() {
        let source = r#"
            Scenario(
                name: "smoke",
                buildings: [
                    (id: 1, name: "watchtower", price: 100),
                ],
                steps: [
                    SwitchPhase(Building),
                    Select(1),
                    Frames(count: 5, pointer: (2.5, 0.0, 2.5), build: true),
                    Frames(count: 1, confirm: true),
                ],
            )
        "#;

        let scenario: Scenario = ron::from_str(source).unwrap();
        assert_eq!(scenario.name, "smoke");
        assert_eq!(scenario.config.starting_coins, 800);
        assert_eq!(scenario.buildings[0].prefab, 0);

        match &scenario.steps[2] {
            Step::Frames {
                count,
                build,
                confirm,
                timer_surface,
                ..
            } => {
                assert_eq!(*count, 5);
                assert!(*build);
                assert!(!*confirm);
                assert!(*timer_surface);
            }
            other => panic!("unexpected step: {other:?}"),
        }
    }
}
