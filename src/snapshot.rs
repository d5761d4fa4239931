//! Render boundary
//!
//! A renderer never reads the live registry. It gets a copy of every entity's
//! bounds taken after the frame's physics step, so it can run on another
//! thread without racing pipe spawns and removals.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::registry::EntityKind;
use crate::sim::state::{GamePhase, Session};

/// One entity as a renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    /// Stable registry key, e.g. `pipe4-cap`
    pub key: String,
    /// Picks the sprite/renderer
    pub kind: EntityKind,
    pub min: Vec2,
    pub max: Vec2,
}

impl EntityView {
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub score: u32,
    pub best_score: u32,
    /// Flap animation pose (1..=3)
    pub pose: u8,
    pub tick: u64,
    pub entities: Vec<EntityView>,
}

impl RenderSnapshot {
    pub fn capture(session: &Session) -> Self {
        let world = session.world();
        let entities = world
            .registry
            .iter()
            .filter_map(|(key, record)| {
                let bounds = world.engine.body(record.body)?.bounds();
                Some(EntityView {
                    key: key.to_string(),
                    kind: record.kind,
                    min: bounds.min,
                    max: bounds.max,
                })
            })
            .collect();

        Self {
            phase: session.phase(),
            score: session.score(),
            best_score: session.best_score(),
            pose: world.pose,
            tick: world.tick,
            entities,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Entities of one kind
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityView> {
        self.entities.iter().filter(move |view| view.kind == kind)
    }
}
