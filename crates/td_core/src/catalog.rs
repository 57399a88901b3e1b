//! Building definitions and the build-menu selection.
//!
//! Definitions are immutable values selected through the catalog; the
//! placement engine reads the selection once per placement attempt and only
//! ever writes a definition's attack-behavior anchor, once, at commit time.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Unique identifier for building types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingTypeId(pub u32);

impl BuildingTypeId {
    /// Create a new building type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Opaque handle to a building's visual prefab.
///
/// The core never dereferences this; the rendering layer resolves it to an
/// actual asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabId(pub u32);

impl PrefabId {
    /// Create a new prefab handle.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Handle to a building instance placed in the world.
pub type InstanceId = u64;

/// Attack-behavior descriptor carried by a building definition.
///
/// The combat layer interprets `profile`; the core only binds `anchor` to
/// the placed world instance when a placement commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackBehavior {
    /// Behavior profile identifier, resolved by the combat layer.
    pub profile: u32,
    /// World instance this behavior is anchored to. `None` until a
    /// placement commits.
    pub anchor: Option<InstanceId>,
}

impl AttackBehavior {
    /// Create an unanchored behavior descriptor.
    #[must_use]
    pub const fn new(profile: u32) -> Self {
        Self {
            profile,
            anchor: None,
        }
    }

    /// Bind the behavior to a placed world instance.
    pub fn bind_anchor(&mut self, instance: InstanceId) {
        self.anchor = Some(instance);
    }
}

/// Immutable description of a placeable building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingDefinition {
    /// Unique identifier for this building type.
    pub id: BuildingTypeId,
    /// Display name of the building.
    pub name: String,
    /// Coin cost to place this building.
    pub price: u32,
    /// Visual prefab for the placed instance.
    pub visual: PrefabId,
    /// Attack behavior attached to placed instances.
    pub attack: AttackBehavior,
}

impl BuildingDefinition {
    /// Create a new building definition.
    #[must_use]
    pub fn new(
        id: BuildingTypeId,
        name: impl Into<String>,
        price: u32,
        visual: PrefabId,
        attack_profile: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            visual,
            attack: AttackBehavior::new(attack_profile),
        }
    }
}

/// Registry of available buildings plus the current build-menu selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingCatalog {
    /// Registered building definitions.
    buildings: Vec<BuildingDefinition>,
    /// Currently selected building type, if any.
    selected: Option<BuildingTypeId>,
}

impl BuildingCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from a list of definitions.
    #[must_use]
    pub fn with_buildings(buildings: Vec<BuildingDefinition>) -> Self {
        Self {
            buildings,
            selected: None,
        }
    }

    /// Register a building definition.
    pub fn register(&mut self, definition: BuildingDefinition) {
        self.buildings.push(definition);
    }

    /// Look up a definition by type ID.
    #[must_use]
    pub fn get(&self, id: BuildingTypeId) -> Option<&BuildingDefinition> {
        self.buildings.iter().find(|definition| definition.id == id)
    }

    /// Select a building for placement.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownBuilding`] if no definition with this ID
    /// is registered.
    pub fn select(&mut self, id: BuildingTypeId) -> Result<()> {
        if self.get(id).is_none() {
            return Err(GameError::UnknownBuilding(id.0));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the current selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The currently selected building definition, if any.
    #[must_use]
    pub fn selected_building(&self) -> Option<&BuildingDefinition> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Check if the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}
