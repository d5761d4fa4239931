//! Fixed-timestep simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only, one tick per frame
//! - Seeded RNG only (pipe gaps)
//! - Stable iteration order (registry and engine are ordered maps)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod generator;
pub mod physics;
pub mod registry;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use autopilot::{autopilot, next_gap_center};
pub use collision::Aabb;
pub use generator::generate_gap;
pub use physics::{Body, BodyDesc, BodyHandle, BodyKind, CollisionStart, EngineOptions, PhysicsEngine};
pub use registry::{EntityKey, EntityKind, EntityRecord, Registry};
pub use spawn::{PipePart, despawn_pair, pair_layout, spawn_pair};
pub use state::{GameEvent, GamePhase, Session};
pub use tick::{InputEvent, TickInput, tick};
pub use world::World;
