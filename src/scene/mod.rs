//! In-memory stand-in for the host scene: one armature and the meshes it
//! deforms.

mod armature;
pub mod document;
mod mesh;

pub use armature::{Armature, Bone, BoneId};
pub use mesh::{Mesh, UvLayer, VertexGroup};

/// Case-insensitive name comparison used by every table lookup.
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub armature: Armature,
    pub meshes: Vec<Mesh>,
}

/// Full copy of a scene taken before a run so the run can be discarded.
#[derive(Debug, Clone)]
pub struct SceneSnapshot(Scene);

impl Scene {
    pub fn new(armature: Armature) -> Self {
        Self {
            armature,
            meshes: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: SceneSnapshot) {
        *self = snapshot.0;
    }

    /// Rename a bone and every vertex group that follows it.
    pub fn rename_bone(&mut self, id: BoneId, new_name: &str) -> Option<String> {
        let old_name = self.armature.name(id)?.to_string();
        let final_name = self.armature.rename_bone(id, new_name)?;
        if final_name != old_name {
            for mesh in &mut self.meshes {
                mesh.rename_group(&old_name, &final_name);
            }
        }
        Some(final_name)
    }

    /// Give `id` exactly `name`, moving any other holder of that name aside.
    pub fn claim_bone_name(&mut self, id: BoneId, name: &str) -> Option<String> {
        if let Some(holder) = self.armature.find(name)
            && holder != id
        {
            let displaced = self.armature.unique_name(name);
            log::debug!("moving '{name}' aside as '{displaced}'");
            self.rename_bone(holder, &displaced)?;
        }
        self.rename_bone(id, name)
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    pub fn remove_mesh(&mut self, name: &str) -> Option<Mesh> {
        let position = self.meshes.iter().position(|mesh| mesh.name == name)?;
        Some(self.meshes.remove(position))
    }
}
