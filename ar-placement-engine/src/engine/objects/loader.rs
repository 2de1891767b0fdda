use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::record::{ObjectContent, ObjectHandle};

/// Produces renderable content for a template.
///
/// Called from the async compute pool, never from the frame context.
pub trait ContentLoader: Send + Sync + 'static {
    fn load(&self, template_id: &str) -> Result<ObjectContent, LoadError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("no template named '{0}' in catalog")]
    UnknownTemplate(String),

    #[error("template '{template}' failed to load: {reason}")]
    Failed { template: String, reason: String },
}

/// Result of one background load, carried back to the frame context.
#[derive(Debug)]
pub struct LoadCompletion {
    pub handle: ObjectHandle,
    pub result: Result<ObjectContent, LoadError>,
}

/// Catalog entry describing a placeable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    pub id: String,
    pub scene_path: String,
    /// Bounding box size in metres (x, y, z).
    pub size: [f32; 3],
}

impl ObjectTemplate {
    /// Bounding size with degenerate axes clamped to a millimetre.
    fn bounds_size(&self) -> Option<Vec3> {
        let size = Vec3::from_array(self.size);
        if !size.is_finite() {
            return None;
        }
        Some(size.max(Vec3::splat(0.001)))
    }
}

/// Loader resolving templates from the configured catalog.
pub struct CatalogLoader {
    templates: HashMap<String, ObjectTemplate>,
}

impl CatalogLoader {
    pub fn new(templates: impl IntoIterator<Item = ObjectTemplate>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|template| (template.id.clone(), template))
                .collect(),
        }
    }
}

impl ContentLoader for CatalogLoader {
    fn load(&self, template_id: &str) -> Result<ObjectContent, LoadError> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| LoadError::UnknownTemplate(template_id.to_string()))?;

        let size = template.bounds_size().ok_or_else(|| LoadError::Failed {
            template: template_id.to_string(),
            reason: "bounding size is not finite".to_string(),
        })?;

        Ok(ObjectContent {
            template_id: template.id.clone(),
            scene_path: template.scene_path.clone(),
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogLoader {
        CatalogLoader::new([
            ObjectTemplate {
                id: "car".to_string(),
                scene_path: "models/car.scn".to_string(),
                size: [1.9, 1.3, 4.5],
            },
            ObjectTemplate {
                id: "flat".to_string(),
                scene_path: "models/flat.scn".to_string(),
                size: [1.0, 0.0, 1.0],
            },
            ObjectTemplate {
                id: "broken".to_string(),
                scene_path: "models/broken.scn".to_string(),
                size: [f32::NAN, 1.0, 1.0],
            },
        ])
    }

    #[test]
    fn loads_known_template() {
        let content = catalog().load("car").unwrap();
        assert_eq!(content.scene_path, "models/car.scn");
        assert_eq!(content.size, Vec3::new(1.9, 1.3, 4.5));
    }

    #[test]
    fn clamps_degenerate_axes() {
        let content = catalog().load("flat").unwrap();
        assert_eq!(content.size.y, 0.001);
    }

    #[test]
    fn rejects_unknown_and_invalid_templates() {
        let loader = catalog();
        assert_eq!(
            loader.load("boat"),
            Err(LoadError::UnknownTemplate("boat".to_string()))
        );
        assert!(matches!(
            loader.load("broken"),
            Err(LoadError::Failed { .. })
        ));
    }
}
