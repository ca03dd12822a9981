//! Text primitives.

use std::path::PathBuf;

use tracing::debug;

use card_types::{Mesh, Point3, Role, box_mesh};

use crate::entity::EntityHandle;
use crate::error::SceneResult;
use crate::scene::Scene;

/// What to write and how big.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    /// The string.
    pub body: String,
    /// Nominal font size in millimeters.
    pub size: f64,
    /// Extrusion depth along +Z.
    pub extrude: f64,
    /// Font file, recorded on the entity.
    pub font: Option<PathBuf>,
}

impl TextSpec {
    /// Text of `size` with no extrusion and the default font.
    pub fn new(body: impl Into<String>, size: f64) -> Self {
        Self {
            body: body.into(),
            size,
            extrude: 0.0,
            font: None,
        }
    }

    /// Set the extrusion depth.
    #[must_use]
    pub const fn with_extrude(mut self, extrude: f64) -> Self {
        self.extrude = extrude;
        self
    }

    /// Set the font file.
    #[must_use]
    pub fn with_font(mut self, font: Option<PathBuf>) -> Self {
        self.font = font;
        self
    }
}

/// Creates flat, face-up text entities.
///
/// Implementations must return an entity that reads correctly from +Z,
/// baseline along +X, with its extrusion along +Z.
pub trait TextFactory {
    /// Create a text entity in `scene`.
    ///
    /// # Errors
    ///
    /// Implementation specific; the bundled factory only fails on scene
    /// lookups.
    fn create_text(&self, scene: &mut Scene, name: &str, role: Role, spec: &TextSpec) -> SceneResult<EntityHandle>;
}

/// Text as a row of boxes, one per non-space character.
///
/// Matches a monospace font's footprint closely enough for layout without
/// loading glyph outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTextFactory {
    /// Horizontal advance per character, as a fraction of size.
    pub advance: f64,
    /// Glyph height, as a fraction of size.
    pub cap_height: f64,
}

impl Default for BlockTextFactory {
    fn default() -> Self {
        Self {
            advance: 0.6,
            cap_height: 0.7,
        }
    }
}

impl BlockTextFactory {
    /// Build the mesh without adding it to a scene.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mesh(&self, spec: &TextSpec) -> Mesh {
        let advance = self.advance * spec.size;
        let glyph_w = 0.8 * advance;
        let cap = self.cap_height * spec.size;
        let mut mesh = Mesh::new();
        for (i, ch) in spec.body.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = i as f64 * advance;
            mesh.merge(&box_mesh(
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + glyph_w, cap, spec.extrude),
            ));
        }
        mesh
    }
}

impl TextFactory for BlockTextFactory {
    fn create_text(&self, scene: &mut Scene, name: &str, role: Role, spec: &TextSpec) -> SceneResult<EntityHandle> {
        let mesh = self.mesh(spec);
        debug!("text '{}' -> {} glyph boxes", spec.body, mesh.face_count() / 12);
        let handle = scene.add_mesh(name, role, mesh);
        scene.set_font(handle, spec.font.as_deref())?;
        scene.bake(handle)?;
        Ok(handle)
    }
}
