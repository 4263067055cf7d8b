//! Catalog types for the six-phase emotional cycle
//!
//! The catalog is fetched once per session and treated as read-only
//! shared state. Layer id 0 is reserved for self-care strategies; every
//! other layer groups emotion curriculum entries. Phase order is itself
//! data (`phase_order`), and phase names are unique across layers.

use serde::{Deserialize, Serialize};

/// Layer id reserved for self-care strategies.
pub const STRATEGY_LAYER_ID: i64 = 0;

/// The emotional cycle has a fixed number of phases.
pub const PHASE_COUNT: usize = 6;

/// Medicinal/toxic classification of a curriculum entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dosage {
    Medicinal,
    Toxic,
}

/// A catalogued emotional expression under a phase, layer, and dosage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumEntry {
    pub id: i64,
    pub dosage: Dosage,
    pub expression: String,
}

/// A self-care strategy available in a phase of the strategy layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    pub id: i64,
    /// Display label (`strategy` on the wire)
    #[serde(rename = "strategy")]
    pub label: String,
    /// Color tag for the host UI (`color` on the wire)
    #[serde(rename = "color")]
    pub color_tag: String,
}

/// One of the six cyclical emotional stages within a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: i64,
    pub name: String,
    /// Curriculum entries with medicinal dosage
    #[serde(default)]
    pub medicinal: Vec<CurriculumEntry>,
    /// Curriculum entries with toxic dosage
    #[serde(default)]
    pub toxic: Vec<CurriculumEntry>,
    /// Self-care strategies (populated only in the strategy layer)
    #[serde(default)]
    pub strategies: Vec<StrategyEntry>,
}

impl Phase {
    /// Iterate over all curriculum entries regardless of dosage.
    pub fn curriculum_entries(&self) -> impl Iterator<Item = &CurriculumEntry> {
        self.medicinal.iter().chain(self.toxic.iter())
    }

    /// Whether this phase contains the given curriculum entry.
    pub fn contains_curriculum(&self, id: i64) -> bool {
        self.curriculum_entries().any(|entry| entry.id == id)
    }
}

/// Thematic grouping of phases. Layer 0 holds self-care strategies,
/// ids >= 1 hold emotion curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: i64,
    #[serde(rename = "color")]
    pub color_tag: String,
    pub title: String,
    pub subtitle: String,
    pub phases: Vec<Phase>,
}

impl Layer {
    /// Whether this is the reserved self-care strategy layer.
    pub fn is_strategy_layer(&self) -> bool {
        self.id == STRATEGY_LAYER_ID
    }
}

/// Location of a curriculum entry within the catalog.
#[derive(Debug, Clone, Copy)]
pub struct CurriculumRef<'a> {
    pub layer: &'a Layer,
    pub phase: &'a Phase,
    pub entry: &'a CurriculumEntry,
}

/// Top-level catalog payload delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Canonical phase ordering by name
    pub phase_order: Vec<String>,
    pub layers: Vec<Layer>,
}

impl Catalog {
    /// Number of phases in the cycle.
    pub fn phase_count(&self) -> usize {
        self.phase_order.len()
    }

    /// Iterate over emotion layers (everything except layer 0).
    pub fn emotion_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|layer| !layer.is_strategy_layer())
    }

    /// The reserved self-care strategy layer, if present.
    pub fn strategy_layer(&self) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.is_strategy_layer())
    }

    /// Locate a curriculum entry across all emotion layers.
    ///
    /// Returns `None` for unknown or stale ids - callers degrade to
    /// "not found" rather than erroring.
    pub fn locate_curriculum(&self, id: i64) -> Option<CurriculumRef<'_>> {
        for layer in self.emotion_layers() {
            for phase in &layer.phases {
                if let Some(entry) = phase.curriculum_entries().find(|e| e.id == id) {
                    return Some(CurriculumRef { layer, phase, entry });
                }
            }
        }
        None
    }

    /// Find a curriculum entry by id across all emotion layers.
    pub fn find_curriculum(&self, id: i64) -> Option<&CurriculumEntry> {
        self.locate_curriculum(id).map(|found| found.entry)
    }

    /// Find a self-care strategy by id within the strategy layer.
    pub fn find_strategy(&self, id: i64) -> Option<&StrategyEntry> {
        self.strategy_layer()?
            .phases
            .iter()
            .flat_map(|phase| phase.strategies.iter())
            .find(|strategy| strategy.id == id)
    }

    /// Position of a phase name within the canonical phase order.
    pub fn phase_position(&self, name: &str) -> Option<usize> {
        self.phase_order.iter().position(|phase| phase == name)
    }
}
