//! Read access the layout engine needs from a scene.

use card_transform::Transform;
use card_types::{Aabb, Role};

use crate::entity::{EntityHandle, EntityState};
use crate::error::SceneResult;

/// World-space bounds of an entity as a pure function of its placement.
///
/// The layout engine never reads geometry directly. It asks for the box an
/// entity *would* occupy under a candidate local transform, compares, and
/// returns a new transform for the caller to commit.
pub trait AabbOracle {
    /// World AABB if the entity's local transform were `local`.
    ///
    /// Covers the entity's own mesh and every descendant. Returns an empty
    /// box for entities with no geometry anywhere below them.
    ///
    /// # Errors
    ///
    /// Fails if the handle is not part of the scene.
    fn aabb_with(&self, handle: EntityHandle, local: &Transform) -> SceneResult<Aabb>;

    /// Current local transform.
    ///
    /// # Errors
    ///
    /// Fails if the handle is not part of the scene.
    fn local_transform(&self, handle: EntityHandle) -> SceneResult<Transform>;

    /// Lifecycle state.
    ///
    /// # Errors
    ///
    /// Fails if the handle is not part of the scene.
    fn state(&self, handle: EntityHandle) -> SceneResult<EntityState>;

    /// Placement in world space, folding the parent chain.
    ///
    /// # Errors
    ///
    /// Fails if the handle is not part of the scene.
    fn world_transform(&self, handle: EntityHandle) -> SceneResult<Transform>;

    /// What the entity is on the card.
    ///
    /// # Errors
    ///
    /// Fails if the handle is not part of the scene.
    fn role(&self, handle: EntityHandle) -> SceneResult<Role>;

    /// Entity name, for diagnostics.
    ///
    /// # Errors
    ///
    /// Fails if the handle is not part of the scene.
    fn name(&self, handle: EntityHandle) -> SceneResult<&str>;

    /// World AABB under the current transform.
    ///
    /// # Errors
    ///
    /// Fails if the handle is not part of the scene.
    fn world_aabb(&self, handle: EntityHandle) -> SceneResult<Aabb> {
        let local = self.local_transform(handle)?;
        self.aabb_with(handle, &local)
    }
}
