//! Scene context for card layout.
//!
//! Every job owns one [`Scene`]: an arena of entities addressed by
//! [`EntityHandle`]. Components take the scene as an explicit parameter;
//! there is no ambient global state.
//!
//! - [`Scene::import`] loads a model file and returns an [`ImportResult`]
//!   with a deterministically chosen primary sub-mesh
//! - [`Scene::bake`] folds a transform into geometry (`Raw → Baked`)
//! - [`Scene::set_transform`] commits a placement (`→ Placed`)
//! - [`Scene::parent_keep_world`] groups entities without moving them
//! - [`AabbOracle`] is the read-only view the layout engine works against
//! - [`card_plate`] and [`TextFactory`] build the card and text primitives
//!
//! # Layer 0 Crate
//!
//! Pure Rust, single-threaded, no rendering.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod entity;
mod error;
mod oracle;
mod primitives;
mod scene;
mod text;

pub use entity::{Entity, EntityHandle, EntityState};
pub use error::{SceneError, SceneResult};
pub use oracle::AabbOracle;
pub use primitives::{CORNER_SEGMENTS, card_plate};
pub use scene::{ImportResult, Scene};
pub use text::{BlockTextFactory, TextFactory, TextSpec};
