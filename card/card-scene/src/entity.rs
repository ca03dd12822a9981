//! Scene entities and their handles.

use std::fmt;
use std::path::{Path, PathBuf};

use card_transform::Transform;
use card_types::{Mesh, Rgba, Role};

/// Index of an entity in its [`Scene`](crate::Scene) arena.
///
/// Handles are only meaningful for the scene that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub(crate) usize);

impl EntityHandle {
    /// Position in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an entity is in its placement lifecycle.
///
/// ```text
/// Raw ──bake──▶ Baked ──set_transform──▶ Placed
///  │                                       ▲
///  └────────────set_transform──────────────┘
/// ```
///
/// Only `Baked` entities carry an identity transform over flattened
/// geometry, which is what orientation search requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Freshly imported; the transform has not been folded into the mesh.
    Raw,
    /// Transform folded into the mesh and reset to identity.
    Baked,
    /// A placement transform has been committed.
    Placed,
}

/// A node in the scene: optional geometry plus a local placement.
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) name: String,
    pub(crate) role: Role,
    pub(crate) mesh: Option<Mesh>,
    pub(crate) transform: Transform,
    pub(crate) state: EntityState,
    pub(crate) parent: Option<EntityHandle>,
    pub(crate) children: Vec<EntityHandle>,
    pub(crate) material: Option<Rgba>,
    pub(crate) visible: bool,
    pub(crate) font: Option<PathBuf>,
}

impl Entity {
    pub(crate) fn new(name: String, role: Role, mesh: Option<Mesh>) -> Self {
        Self {
            name,
            role,
            mesh,
            transform: Transform::identity(),
            state: EntityState::Raw,
            parent: None,
            children: Vec::new(),
            material: None,
            visible: true,
            font: None,
        }
    }

    /// Unique name within the scene.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the entity is on the card.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Local geometry, `None` for group pivots.
    #[must_use]
    pub const fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Placement relative to the parent (or world).
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EntityState {
        self.state
    }

    /// Parent, if parented.
    #[must_use]
    pub const fn parent(&self) -> Option<EntityHandle> {
        self.parent
    }

    /// Children in parenting order.
    #[must_use]
    pub fn children(&self) -> &[EntityHandle] {
        &self.children
    }

    /// Assigned color.
    #[must_use]
    pub const fn material(&self) -> Option<Rgba> {
        self.material
    }

    /// Whether the entity takes part in exports.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Font recorded for text entities.
    #[must_use]
    pub fn font(&self) -> Option<&Path> {
        self.font.as_deref()
    }
}
