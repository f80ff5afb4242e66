//! JSON snapshot of a scene, used by the command line tool and by tests to
//! move rigs in and out of the pipeline.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use super::{Armature, Mesh, Scene, UvLayer, VertexGroup};
use crate::error::FixError;

fn identity_rows() -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoneDocument {
    pub name: String,
    pub head: [f32; 3],
    pub tail: [f32; 3],
    #[serde(default)]
    pub roll: f32,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmatureDocument {
    pub name: String,
    /// Row-major world transform.
    #[serde(default = "identity_rows")]
    pub matrix_world: [[f32; 4]; 4],
    #[serde(default)]
    pub animation_action: Option<String>,
    pub bones: Vec<BoneDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexGroupDocument {
    pub name: String,
    /// `(vertex index, weight)` pairs.
    pub weights: Vec<(usize, f32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UvLayerDocument {
    pub name: String,
    /// `null` components stand for NaN, which JSON cannot carry.
    pub coords: Vec<[Option<f32>; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDocument {
    pub name: String,
    #[serde(default)]
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub vertex_groups: Vec<VertexGroupDocument>,
    #[serde(default)]
    pub uv_layers: Vec<UvLayerDocument>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub rotation_euler: [f32; 3],
    #[serde(default)]
    pub animation_action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDocument {
    pub armature: ArmatureDocument,
    #[serde(default)]
    pub meshes: Vec<MeshDocument>,
}

impl TryFrom<SceneDocument> for Scene {
    type Error = FixError;

    fn try_from(document: SceneDocument) -> Result<Self, Self::Error> {
        let source = document.armature;
        let mut armature = Armature::new(source.name);
        let rows = source.matrix_world;
        armature.matrix_world = Matrix4::from_fn(|r, c| rows[r][c]);
        armature.animation_action = source.animation_action;

        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(source.bones.len());
        for bone in &source.bones {
            if !seen.insert(bone.name.as_str()) {
                return Err(FixError::InvalidScene(format!(
                    "duplicate bone name '{}'",
                    bone.name
                )));
            }
            let id = armature.add_bone(&bone.name, bone.head.into(), bone.tail.into());
            if let Some(record) = armature.bone_mut(id) {
                record.roll = bone.roll;
                record.use_connect = bone.connected;
            }
            ids.push(id);
        }

        for (bone, id) in source.bones.iter().zip(ids) {
            let Some(parent_name) = &bone.parent else {
                continue;
            };
            let parent = armature.find(parent_name).ok_or_else(|| {
                FixError::InvalidScene(format!(
                    "bone '{}' refers to unknown parent '{}'",
                    bone.name, parent_name
                ))
            })?;
            if !armature.set_parent(id, Some(parent)) {
                return Err(FixError::InvalidScene(format!(
                    "parent cycle through bone '{}'",
                    bone.name
                )));
            }
        }

        let meshes = document.meshes.into_iter().map(Mesh::from).collect();
        Ok(Scene { armature, meshes })
    }
}

impl From<MeshDocument> for Mesh {
    fn from(document: MeshDocument) -> Self {
        let mut mesh = Mesh::new(document.name);
        mesh.vertices = document.vertices.into_iter().map(Vector3::from).collect();
        mesh.vertex_groups = document
            .vertex_groups
            .into_iter()
            .map(|group| VertexGroup {
                name: group.name,
                weights: group.weights.into_iter().collect(),
            })
            .collect();
        mesh.uv_layers = document
            .uv_layers
            .into_iter()
            .map(|layer| UvLayer {
                name: layer.name,
                coords: layer
                    .coords
                    .into_iter()
                    .map(|[u, v]| [u.unwrap_or(f32::NAN), v.unwrap_or(f32::NAN)])
                    .collect(),
            })
            .collect();
        mesh.materials = document.materials;
        mesh.rotation_euler = document.rotation_euler.into();
        mesh.animation_action = document.animation_action;
        mesh
    }
}

impl From<&Scene> for SceneDocument {
    fn from(scene: &Scene) -> Self {
        let armature = &scene.armature;
        let matrix = armature.matrix_world;
        let bones = armature
            .bones()
            .map(|(_, bone)| BoneDocument {
                name: bone.name().to_string(),
                head: bone.head.into(),
                tail: bone.tail.into(),
                roll: bone.roll,
                parent: bone
                    .parent()
                    .and_then(|parent| armature.name(parent))
                    .map(ToOwned::to_owned),
                connected: bone.use_connect,
            })
            .collect();

        let meshes = scene
            .meshes
            .iter()
            .map(|mesh| MeshDocument {
                name: mesh.name.clone(),
                vertices: mesh.vertices.iter().map(|v| (*v).into()).collect(),
                vertex_groups: mesh
                    .vertex_groups
                    .iter()
                    .map(|group| VertexGroupDocument {
                        name: group.name.clone(),
                        weights: group.weights.iter().map(|(v, w)| (*v, *w)).collect(),
                    })
                    .collect(),
                uv_layers: mesh
                    .uv_layers
                    .iter()
                    .map(|layer| UvLayerDocument {
                        name: layer.name.clone(),
                        coords: layer
                            .coords
                            .iter()
                            .map(|[u, v]| [finite(*u), finite(*v)])
                            .collect(),
                    })
                    .collect(),
                materials: mesh.materials.clone(),
                rotation_euler: mesh.rotation_euler.into(),
                animation_action: mesh.animation_action.clone(),
            })
            .collect();

        SceneDocument {
            armature: ArmatureDocument {
                name: armature.name.clone(),
                matrix_world: std::array::from_fn(|r| std::array::from_fn(|c| matrix[(r, c)])),
                animation_action: armature.animation_action.clone(),
                bones,
            },
            meshes,
        }
    }
}

fn finite(value: f32) -> Option<f32> {
    (!value.is_nan()).then_some(value)
}

/// Load a scene document from a JSON file.
pub fn read_scene(path: &Path) -> Result<Scene> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene file: {}", path.display()))?;
    let document: SceneDocument =
        serde_json::from_str(&content).context("failed to parse scene JSON")?;
    let scene = Scene::try_from(document)
        .with_context(|| format!("invalid scene file: {}", path.display()))?;
    Ok(scene)
}

/// Write a scene document as pretty JSON.
pub fn write_scene(path: &Path, scene: &Scene) -> Result<()> {
    let content = serde_json::to_string_pretty(&SceneDocument::from(scene))
        .context("failed to serialize scene as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to write scene file: {}", path.display()))?;
    Ok(())
}
