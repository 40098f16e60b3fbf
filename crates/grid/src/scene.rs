//! Loading of scene description files. A scene is a JSON document listing
//! static colliders of the world.

use std::io;

use async_std::{fs, path::Path};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::collider::{Collider, ColliderError, StaticWorld};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    colliders: Vec<Collider>,
}

impl SceneDescription {
    pub fn new(colliders: Vec<Collider>) -> Self {
        Self { colliders }
    }

    pub fn colliders(&self) -> &[Collider] {
        self.colliders.as_slice()
    }

    /// Validates the scene and builds a world which can be scanned.
    pub fn into_world(self) -> Result<StaticWorld, ColliderError> {
        StaticWorld::new(self.colliders)
    }
}

/// Loads a scene file and builds its world.
pub async fn load_scene<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<StaticWorld, SceneLoadingError> {
    let path = Path::new(path.as_ref().as_os_str());
    info!("Loading scene from {}", path.to_string_lossy());

    let text = fs::read_to_string(path)
        .await
        .map_err(|source| SceneLoadingError::Io { source })?;
    let description: SceneDescription = serde_json::from_str(text.as_str())
        .map_err(|source| SceneLoadingError::JsonParsing { source })?;

    info!(
        "Scene with {} colliders loaded",
        description.colliders().len()
    );
    description
        .into_world()
        .map_err(|source| SceneLoadingError::Validation { source })
}

#[derive(Error, Debug)]
pub enum SceneLoadingError {
    #[error(transparent)]
    Io { source: io::Error },
    #[error("Scene JSON parsing error")]
    JsonParsing { source: serde_json::Error },
    #[error("Invalid scene collider")]
    Validation { source: ColliderError },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use async_std::task;
    use glam::Vec2;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::world::{LayerMask, WeightSource, WorldQuery};

    #[test]
    fn test_load_scene() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "colliders": [
                    {{
                        "shape": {{"circle": {{"radius": 2.0}}}},
                        "position": [1.0, 2.0],
                        "layers": 1
                    }},
                    {{
                        "shape": {{"rectangle": {{"half_extents": [3.0, 1.0]}}}},
                        "position": [-5.0, 0.0],
                        "layers": 2,
                        "weight": 15.0
                    }}
                ]
            }}"#
        )
        .unwrap();

        let world = task::block_on(load_scene(file.path())).unwrap();
        assert_eq!(world.colliders().len(), 2);
        assert!(world
            .overlap_circle(Vec2::new(1., 3.), 0.1, LayerMask::new(1))
            .is_some());
        let hazard = world
            .overlap_circle(Vec2::new(-7., 0.5), 0.1, LayerMask::new(2))
            .unwrap();
        assert_eq!(hazard.weight(), 15.);
    }

    #[test]
    fn test_load_invalid_scene() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"colliders": [{{"shape": {{"circle": {{"radius": -1.0}}}}, "position": [0, 0], "layers": 1}}]}}"#
        )
        .unwrap();
        match task::block_on(load_scene(file.path())) {
            Err(SceneLoadingError::Validation { source }) => {
                assert_eq!(source, ColliderError::Radius(-1.))
            }
            _ => unreachable!(),
        }

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let error = task::block_on(load_scene(file.path())).unwrap_err();
        assert!(matches!(error, SceneLoadingError::JsonParsing { .. }));
        assert_eq!(error.to_string(), "Scene JSON parsing error");

        assert!(matches!(
            task::block_on(load_scene("/nonexistent/scene.json")),
            Err(SceneLoadingError::Io { .. })
        ));
    }
}
