use std::collections::{HashMap, HashSet};

use nalgebra::{Matrix4, Point3, Vector3};

use super::names_match;

/// Stable handle of a bone inside one armature. Handles are never reused,
/// so a handle stays valid across renames and reparenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(usize);

impl BoneId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Edit-mode bone record.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    name: String,
    parent: Option<BoneId>,
    pub head: Vector3<f32>,
    pub tail: Vector3<f32>,
    pub roll: f32,
    pub use_connect: bool,
}

impl Bone {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<BoneId> {
        self.parent
    }

    pub fn length(&self) -> f32 {
        (self.tail - self.head).norm()
    }
}

/// Skeleton stored as an arena of bones plus a name index.
#[derive(Debug, Clone)]
pub struct Armature {
    pub name: String,
    pub matrix_world: Matrix4<f32>,
    pub animation_action: Option<String>,
    bones: Vec<Option<Bone>>,
    index: HashMap<String, BoneId>,
}

impl Armature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix_world: Matrix4::identity(),
            animation_action: None,
            bones: Vec::new(),
            index: HashMap::new(),
        }
    }

    // ─── Lookup ──────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.0).and_then(Option::as_ref)
    }

    pub fn bone_mut(&mut self, id: BoneId) -> Option<&mut Bone> {
        self.bones.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Exact-name lookup.
    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.index.get(name).copied()
    }

    /// Case-insensitive lookup; the oldest matching bone wins.
    pub fn find_ci(&self, name: &str) -> Option<BoneId> {
        self.bones()
            .find(|(_, bone)| names_match(&bone.name, name))
            .map(|(id, _)| id)
    }

    pub fn name(&self, id: BoneId) -> Option<&str> {
        self.bone(id).map(Bone::name)
    }

    pub fn parent(&self, id: BoneId) -> Option<BoneId> {
        self.bone(id).and_then(Bone::parent)
    }

    /// Live bones in creation order.
    pub fn bones(&self) -> impl Iterator<Item = (BoneId, &Bone)> {
        self.bones
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|bone| (BoneId(index), bone)))
    }

    pub fn ids(&self) -> Vec<BoneId> {
        self.bones().map(|(id, _)| id).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.bones().map(|(_, bone)| bone.name.clone()).collect()
    }

    /// Direct children in creation order.
    pub fn children(&self, id: BoneId) -> Vec<BoneId> {
        self.bones()
            .filter(|(_, bone)| bone.parent == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    pub fn roots(&self) -> Vec<BoneId> {
        self.bones()
            .filter(|(_, bone)| bone.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Parent chain from the immediate parent up to the root.
    pub fn ancestors(&self, id: BoneId) -> Vec<BoneId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.parent(parent);
        }
        chain
    }

    pub fn is_ancestor(&self, ancestor: BoneId, of: BoneId) -> bool {
        self.ancestors(of).contains(&ancestor)
    }

    // ─── Editing ─────────────────────────────────────────────────────────────

    /// Create a parentless bone. A taken name is made unique with a numeric
    /// suffix, like the host does for duplicates.
    pub fn add_bone(&mut self, name: &str, head: Vector3<f32>, tail: Vector3<f32>) -> BoneId {
        let name = self.unique_name(name);
        let id = BoneId(self.bones.len());
        self.bones.push(Some(Bone {
            name: name.clone(),
            parent: None,
            head,
            tail,
            roll: 0.0,
            use_connect: false,
        }));
        self.index.insert(name, id);
        id
    }

    /// Remove a bone; its children are re-linked to its parent.
    pub fn remove_bone(&mut self, id: BoneId) -> Option<Bone> {
        let bone = self.bones.get_mut(id.0)?.take()?;
        self.index.remove(&bone.name);
        for slot in self.bones.iter_mut().flatten() {
            if slot.parent == Some(id) {
                slot.parent = bone.parent;
                slot.use_connect = false;
            }
        }
        Some(bone)
    }

    /// Rename a bone and return the name it actually received.
    pub fn rename_bone(&mut self, id: BoneId, new_name: &str) -> Option<String> {
        let old_name = self.name(id)?.to_string();
        if old_name == new_name {
            return Some(old_name);
        }
        let final_name = self.unique_name(new_name);
        self.index.remove(&old_name);
        self.index.insert(final_name.clone(), id);
        if let Some(bone) = self.bone_mut(id) {
            bone.name = final_name.clone();
        }
        Some(final_name)
    }

    /// Reparent a bone. Returns `false` when the link would make the bone its
    /// own ancestor.
    pub fn set_parent(&mut self, id: BoneId, parent: Option<BoneId>) -> bool {
        if let Some(parent) = parent {
            if parent == id || self.bone(parent).is_none() || self.is_ancestor(id, parent) {
                log::warn!(
                    "refusing to parent '{}' to '{}': would create a cycle",
                    self.name(id).unwrap_or("?"),
                    self.name(parent).unwrap_or("?")
                );
                return false;
            }
        }
        match self.bone_mut(id) {
            Some(bone) => {
                bone.parent = parent;
                true
            }
            None => false,
        }
    }

    pub fn unique_name(&self, base: &str) -> String {
        if !self.index.contains_key(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n:03}"))
            .find(|candidate| !self.index.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    // ─── Transforms ──────────────────────────────────────────────────────────

    /// Per-axis scale of the world transform.
    pub fn scale(&self) -> Vector3<f32> {
        let m = &self.matrix_world;
        Vector3::new(
            Vector3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]).norm(),
            Vector3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]).norm(),
            Vector3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]).norm(),
        )
    }

    /// World-space position of an armature-space point.
    pub fn to_world(&self, point: &Vector3<f32>) -> Vector3<f32> {
        self.matrix_world
            .transform_point(&Point3::from(*point))
            .coords
    }

    /// Bake the world transform into bone positions and reset it to identity.
    /// Returns the matrix that was applied.
    pub fn apply_transform(&mut self) -> Matrix4<f32> {
        let matrix = self.matrix_world;
        for bone in self.bones.iter_mut().flatten() {
            bone.head = matrix.transform_point(&Point3::from(bone.head)).coords;
            bone.tail = matrix.transform_point(&Point3::from(bone.tail)).coords;
        }
        self.matrix_world = Matrix4::identity();
        matrix
    }
}
