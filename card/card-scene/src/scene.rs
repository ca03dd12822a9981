//! The scene arena.

use std::path::Path;

use hashbrown::HashMap;
use tracing::{debug, info};

use card_transform::Transform;
use card_types::{Aabb, Mesh, Point3, Rgba, Role};

use crate::entity::{Entity, EntityHandle, EntityState};
use crate::error::{SceneError, SceneResult};
use crate::oracle::AabbOracle;

/// Entities created by one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    /// The most significant sub-mesh: most vertices, then largest bounding
    /// volume, then first in file order.
    pub primary: EntityHandle,
    /// Every sub-mesh in file order, `primary` included.
    pub all: Vec<EntityHandle>,
}

/// Explicit scene context owning every entity of one job.
///
/// Entities live in an arena and are addressed by [`EntityHandle`]. Names
/// are unique; a clashing name gets a `.001`-style suffix.
///
/// # Example
///
/// ```
/// use card_scene::{AabbOracle, Scene};
/// use card_types::{Point3, Role, box_mesh};
///
/// let mut scene = Scene::new();
/// let cube = scene.add_mesh("cube", Role::Figure, box_mesh(Point3::origin(), Point3::new(2.0, 2.0, 2.0)));
/// let aabb = scene.world_aabb(cube).unwrap();
/// assert_eq!(aabb.size().x, 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: Vec<Entity>,
    names: HashMap<String, EntityHandle>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the scene holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All handles in creation order.
    pub fn handles(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        (0..self.entities.len()).map(EntityHandle)
    }

    /// Look up an entity by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<EntityHandle> {
        self.names.get(name).copied()
    }

    /// Borrow an entity.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn entity(&self, handle: EntityHandle) -> SceneResult<&Entity> {
        self.entities
            .get(handle.0)
            .ok_or(SceneError::UnknownEntity { handle })
    }

    fn entity_mut(&mut self, handle: EntityHandle) -> SceneResult<&mut Entity> {
        self.entities
            .get_mut(handle.0)
            .ok_or(SceneError::UnknownEntity { handle })
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.names.contains_key(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{base}.{i:03}"))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn push(&mut self, entity: Entity) -> EntityHandle {
        let handle = EntityHandle(self.entities.len());
        self.names.insert(entity.name.clone(), handle);
        self.entities.push(entity);
        handle
    }

    /// Add a mesh entity in the `Raw` state with an identity transform.
    pub fn add_mesh(&mut self, name: &str, role: Role, mesh: Mesh) -> EntityHandle {
        let name = self.unique_name(name);
        self.push(Entity::new(name, role, Some(mesh)))
    }

    /// Add an empty pivot located at `pivot`.
    ///
    /// Groups have no geometry of their own; their AABB is the union of
    /// their descendants.
    pub fn add_group(&mut self, name: &str, role: Role, pivot: Point3<f64>) -> EntityHandle {
        let name = self.unique_name(name);
        let mut entity = Entity::new(name, role, None);
        entity.transform = Transform::from_translation(pivot.coords);
        entity.state = EntityState::Placed;
        self.push(entity)
    }

    /// Import a model file and pick its primary sub-mesh.
    ///
    /// The primary takes `role`; other sub-meshes become hidden
    /// [`Role::Auxiliary`] entities so they never reach an export.
    ///
    /// # Errors
    ///
    /// - [`SceneError::AssetNotFound`] if the file is missing
    /// - [`SceneError::Import`] if it cannot be parsed
    /// - [`SceneError::EmptyImport`] if it has no faces
    pub fn import<P: AsRef<Path>>(&mut self, path: P, role: Role) -> SceneResult<ImportResult> {
        let path = path.as_ref();
        let parts = card_io::load_meshes(path).map_err(|e| SceneError::from_io(e, path))?;

        let mut best: Option<(usize, usize, f64)> = None;
        for (i, part) in parts.iter().enumerate() {
            let verts = part.mesh.vertex_count();
            let volume = part.mesh.bounds().volume();
            let better = match best {
                None => true,
                Some((_, bv, bvol)) => verts > bv || (verts == bv && volume > bvol),
            };
            if better {
                best = Some((i, verts, volume));
            }
        }
        let Some((primary_idx, _, _)) = best else {
            return Err(SceneError::EmptyImport {
                path: path.to_path_buf(),
            });
        };

        let mut all = Vec::with_capacity(parts.len());
        let mut primary = None;
        for (i, part) in parts.into_iter().enumerate() {
            let is_primary = i == primary_idx;
            let part_role = if is_primary { role } else { Role::Auxiliary };
            let handle = self.add_mesh(&part.name, part_role, part.mesh);
            if is_primary {
                primary = Some(handle);
            } else {
                self.hide(handle)?;
            }
            all.push(handle);
        }
        let primary = primary.ok_or_else(|| SceneError::EmptyImport {
            path: path.to_path_buf(),
        })?;

        info!(
            "imported {} as {role} ({} sub-mesh(es), primary '{}')",
            path.display(),
            all.len(),
            self.entity(primary)?.name
        );
        Ok(ImportResult { primary, all })
    }

    /// Fold the local transform into the mesh and reset it to identity.
    ///
    /// Children keep their world placement. Irreversible.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn bake(&mut self, handle: EntityHandle) -> SceneResult<()> {
        let entity = self.entity_mut(handle)?;
        let folded = entity.transform;
        if let Some(mesh) = entity.mesh.as_mut() {
            *mesh = folded.apply_to_mesh(mesh);
        }
        entity.transform = Transform::identity();
        entity.state = EntityState::Baked;
        let children = entity.children.clone();
        for child in children {
            let c = self.entity_mut(child)?;
            c.transform = folded.compose(&c.transform);
        }
        debug!("baked {}", self.entity(handle)?.name);
        Ok(())
    }

    /// Commit a new local transform. The entity becomes `Placed`.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn set_transform(&mut self, handle: EntityHandle, transform: Transform) -> SceneResult<()> {
        let entity = self.entity_mut(handle)?;
        entity.transform = transform;
        entity.state = EntityState::Placed;
        Ok(())
    }

    /// Placement in world space, folding the parent chain.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn world_transform(&self, handle: EntityHandle) -> SceneResult<Transform> {
        let entity = self.entity(handle)?;
        let local = entity.transform;
        match entity.parent {
            Some(parent) => Ok(self.world_transform(parent)?.compose(&local)),
            None => Ok(local),
        }
    }

    fn parent_world(&self, handle: EntityHandle) -> SceneResult<Transform> {
        match self.entity(handle)?.parent {
            Some(parent) => self.world_transform(parent),
            None => Ok(Transform::identity()),
        }
    }

    /// Re-parent `child` under `parent` without moving it.
    ///
    /// The child's local transform is rewritten so its world placement is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`SceneError::CyclicParent`] if `parent` is `child` or below it
    /// - [`SceneError::NonInvertible`] if the parent's world scale is not
    ///   uniform and non-zero
    pub fn parent_keep_world(&mut self, child: EntityHandle, parent: EntityHandle) -> SceneResult<()> {
        let mut cursor = Some(parent);
        while let Some(h) = cursor {
            if h == child {
                return Err(SceneError::CyclicParent {
                    child: self.entity(child)?.name.clone(),
                    parent: self.entity(parent)?.name.clone(),
                });
            }
            cursor = self.entity(h)?.parent;
        }

        let child_world = self.world_transform(child)?;
        let inverse = self
            .world_transform(parent)?
            .inverse()
            .ok_or_else(|| SceneError::NonInvertible {
                entity: self.entities[parent.0].name.clone(),
            })?;

        if let Some(old) = self.entity(child)?.parent {
            self.entity_mut(old)?.children.retain(|&c| c != child);
        }
        let c = self.entity_mut(child)?;
        c.transform = inverse.compose(&child_world);
        c.parent = Some(parent);
        c.state = EntityState::Placed;
        self.entity_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Assign a flat color.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn set_material(&mut self, handle: EntityHandle, color: Rgba) -> SceneResult<()> {
        self.entity_mut(handle)?.material = Some(color);
        Ok(())
    }

    /// Exclude the entity from exports.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn hide(&mut self, handle: EntityHandle) -> SceneResult<()> {
        self.entity_mut(handle)?.visible = false;
        Ok(())
    }

    /// Record the font a text entity was created with.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn set_font(&mut self, handle: EntityHandle, font: Option<&Path>) -> SceneResult<()> {
        self.entity_mut(handle)?.font = font.map(Path::to_path_buf);
        Ok(())
    }

    /// The entity's own mesh in world coordinates.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] for foreign handles.
    pub fn world_mesh(&self, handle: EntityHandle) -> SceneResult<Option<Mesh>> {
        let world = self.world_transform(handle)?;
        Ok(self.entity(handle)?.mesh.as_ref().map(|m| world.apply_to_mesh(m)))
    }

    /// Merge the world meshes of every visible entity accepted by `filter`.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures, which indicate a corrupted arena.
    pub fn merged_world_mesh<F>(&self, mut filter: F) -> SceneResult<Mesh>
    where
        F: FnMut(&Entity) -> bool,
    {
        let mut merged = Mesh::new();
        for handle in self.handles() {
            let entity = self.entity(handle)?;
            if !entity.visible || !filter(entity) {
                continue;
            }
            if let Some(mesh) = self.world_mesh(handle)? {
                merged.merge(&mesh);
            }
        }
        Ok(merged)
    }

    fn accumulate(&self, handle: EntityHandle, world: &Transform, into: &mut Aabb) -> SceneResult<()> {
        let entity = self.entity(handle)?;
        if let Some(mesh) = &entity.mesh {
            *into = into.union(&world.mesh_bounds(mesh));
        }
        for &child in &entity.children {
            let child_world = world.compose(&self.entity(child)?.transform);
            self.accumulate(child, &child_world, into)?;
        }
        Ok(())
    }
}

impl AabbOracle for Scene {
    fn aabb_with(&self, handle: EntityHandle, local: &Transform) -> SceneResult<Aabb> {
        let world = self.parent_world(handle)?.compose(local);
        let mut aabb = Aabb::empty();
        self.accumulate(handle, &world, &mut aabb)?;
        Ok(aabb)
    }

    fn local_transform(&self, handle: EntityHandle) -> SceneResult<Transform> {
        Ok(self.entity(handle)?.transform)
    }

    fn state(&self, handle: EntityHandle) -> SceneResult<EntityState> {
        Ok(self.entity(handle)?.state)
    }

    fn world_transform(&self, handle: EntityHandle) -> SceneResult<Transform> {
        Scene::world_transform(self, handle)
    }

    fn role(&self, handle: EntityHandle) -> SceneResult<Role> {
        Ok(self.entity(handle)?.role)
    }

    fn name(&self, handle: EntityHandle) -> SceneResult<&str> {
        Ok(&self.entity(handle)?.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use card_transform::{Axis, quarter_turn};
    use card_types::{Vector3, box_mesh};

    fn cube(scene: &mut Scene, name: &str, min: [f64; 3], max: [f64; 3]) -> EntityHandle {
        scene.add_mesh(
            name,
            Role::Figure,
            box_mesh(Point3::from(min), Point3::from(max)),
        )
    }

    #[test]
    fn duplicate_names_get_suffixes() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "part", [0.0; 3], [1.0; 3]);
        let b = cube(&mut scene, "part", [0.0; 3], [1.0; 3]);
        assert_eq!(scene.entity(a).unwrap().name(), "part");
        assert_eq!(scene.entity(b).unwrap().name(), "part.001");
        assert_eq!(scene.find("part.001"), Some(b));
    }

    #[test]
    fn bake_folds_transform_and_resets() {
        let mut scene = Scene::new();
        let h = cube(&mut scene, "c", [0.0; 3], [1.0, 2.0, 3.0]);
        scene
            .set_transform(h, Transform::identity().with_scale_factor(2.0))
            .unwrap();
        assert_eq!(AabbOracle::state(&scene, h).unwrap(), EntityState::Placed);

        let before = scene.world_aabb(h).unwrap();
        scene.bake(h).unwrap();
        let after = scene.world_aabb(h).unwrap();

        assert_eq!(AabbOracle::state(&scene, h).unwrap(), EntityState::Baked);
        assert!(scene.local_transform(h).unwrap().is_identity());
        assert_relative_eq!(before.max, after.max, epsilon = 1e-12);
    }

    #[test]
    fn aabb_with_does_not_commit() {
        let mut scene = Scene::new();
        let h = cube(&mut scene, "c", [0.0; 3], [10.0, 5.0, 20.0]);
        let rolled = Transform::from_rotation(quarter_turn(Axis::X, 1));
        let size = scene.aabb_with(h, &rolled).unwrap().size();
        assert_relative_eq!(size.y, 20.0, epsilon = 1e-12);
        assert!(scene.local_transform(h).unwrap().is_identity());
        assert_eq!(AabbOracle::state(&scene, h).unwrap(), EntityState::Raw);
    }

    #[test]
    fn parenting_keeps_world_position() {
        let mut scene = Scene::new();
        let h = cube(&mut scene, "title", [-4.0, 2.0, 0.0], [4.0, 6.0, 1.0]);
        scene
            .set_transform(h, Transform::from_translation(Vector3::new(1.0, 1.0, 0.0)))
            .unwrap();
        let before = scene.world_aabb(h).unwrap();

        let group = scene.add_group("text", Role::TextGroup, Point3::new(3.0, -2.0, 0.5));
        scene.parent_keep_world(h, group).unwrap();

        let after = scene.world_aabb(h).unwrap();
        assert_relative_eq!(before.min, after.min, epsilon = 1e-12);
        assert_relative_eq!(before.max, after.max, epsilon = 1e-12);
        assert_eq!(scene.entity(group).unwrap().children(), &[h]);
    }

    #[test]
    fn group_aabb_is_union_and_moves_children() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "a", [0.0; 3], [1.0; 3]);
        let b = cube(&mut scene, "b", [4.0, 0.0, 0.0], [5.0, 1.0, 1.0]);
        let g = scene.add_group("g", Role::TextGroup, Point3::origin());
        scene.parent_keep_world(a, g).unwrap();
        scene.parent_keep_world(b, g).unwrap();

        let union = scene.world_aabb(g).unwrap();
        assert_relative_eq!(union.size().x, 5.0, epsilon = 1e-12);

        let moved = scene
            .local_transform(g)
            .unwrap()
            .translated(Vector3::new(0.0, 10.0, 0.0));
        scene.set_transform(g, moved).unwrap();
        assert_relative_eq!(scene.world_aabb(b).unwrap().min.y, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn cyclic_parent_is_rejected() {
        let mut scene = Scene::new();
        let g1 = scene.add_group("g1", Role::TextGroup, Point3::origin());
        let g2 = scene.add_group("g2", Role::TextGroup, Point3::origin());
        scene.parent_keep_world(g2, g1).unwrap();
        assert!(matches!(
            scene.parent_keep_world(g1, g2),
            Err(SceneError::CyclicParent { .. })
        ));
    }

    #[test]
    fn empty_group_has_empty_aabb() {
        let mut scene = Scene::new();
        let g = scene.add_group("g", Role::TextGroup, Point3::origin());
        assert!(scene.world_aabb(g).unwrap().is_degenerate());
    }

    #[test]
    fn merged_mesh_skips_hidden() {
        let mut scene = Scene::new();
        cube(&mut scene, "a", [0.0; 3], [1.0; 3]);
        let b = cube(&mut scene, "b", [0.0; 3], [1.0; 3]);
        scene.hide(b).unwrap();
        let merged = scene.merged_world_mesh(|_| true).unwrap();
        assert_eq!(merged.face_count(), 12);
        let hidden_only = scene.merged_world_mesh(|e| e.name() == "b").unwrap();
        assert!(hidden_only.is_empty());
    }

    #[test]
    fn foreign_handle_is_an_error() {
        let scene = Scene::new();
        assert!(matches!(
            scene.entity(EntityHandle(3)),
            Err(SceneError::UnknownEntity { .. })
        ));
    }
}
