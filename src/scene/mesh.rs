use std::collections::BTreeMap;

use nalgebra::Vector3;

use super::names_match;

/// Sparse per-vertex weights for one bone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexGroup {
    pub name: String,
    pub weights: BTreeMap<usize, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    pub fn total(&self) -> f32 {
        self.weights.values().sum()
    }

    pub fn has_positive_weight(&self) -> bool {
        self.weights.values().any(|weight| *weight > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UvLayer {
    pub name: String,
    pub coords: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vector3<f32>>,
    pub vertex_groups: Vec<VertexGroup>,
    pub uv_layers: Vec<UvLayer>,
    pub materials: Vec<String>,
    pub rotation_euler: Vector3<f32>,
    pub animation_action: Option<String>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            vertex_groups: Vec::new(),
            uv_layers: Vec::new(),
            materials: Vec::new(),
            rotation_euler: Vector3::zeros(),
            animation_action: None,
        }
    }

    // ─── Vertex groups ───────────────────────────────────────────────────────

    pub fn group(&self, name: &str) -> Option<&VertexGroup> {
        self.vertex_groups.iter().find(|group| group.name == name)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group(name).is_some()
    }

    /// Case-insensitive group lookup returning the stored name.
    pub fn find_group_ci(&self, name: &str) -> Option<&str> {
        self.vertex_groups
            .iter()
            .find(|group| names_match(&group.name, name))
            .map(|group| group.name.as_str())
    }

    /// Return the named group, creating an empty one when absent.
    pub fn ensure_group(&mut self, name: &str) -> &mut VertexGroup {
        let position = match self.vertex_groups.iter().position(|g| g.name == name) {
            Some(position) => position,
            None => {
                self.vertex_groups.push(VertexGroup::new(name));
                self.vertex_groups.len() - 1
            }
        };
        &mut self.vertex_groups[position]
    }

    pub fn remove_group(&mut self, name: &str) -> Option<VertexGroup> {
        let position = self.vertex_groups.iter().position(|g| g.name == name)?;
        Some(self.vertex_groups.remove(position))
    }

    /// Follow a bone rename. A stale group already holding the new name
    /// absorbs the renamed group's weights.
    pub fn rename_group(&mut self, from: &str, to: &str) {
        if from == to || !self.has_group(from) {
            return;
        }
        if self.has_group(to) {
            self.merge_group_into(from, to);
        } else if let Some(group) = self.vertex_groups.iter_mut().find(|g| g.name == from) {
            group.name = to.to_string();
        }
    }

    pub fn set_weight(&mut self, group: &str, vertex: usize, weight: f32) {
        self.ensure_group(group).weights.insert(vertex, weight);
    }

    /// Add every weight of `from` onto `to` and delete `from`.
    ///
    /// Both groups must exist and differ. Returns the total weight moved.
    pub fn merge_group_into(&mut self, from: &str, to: &str) -> Option<f32> {
        if from == to || !self.has_group(to) {
            return None;
        }
        let source = self.remove_group(from)?;
        let moved = source.total();
        let target = self.ensure_group(to);
        for (vertex, weight) in source.weights {
            if weight == 0.0 {
                continue;
            }
            *target.weights.entry(vertex).or_insert(0.0) += weight;
        }
        Some(moved)
    }

    /// Sum of a vertex's weights across all groups.
    pub fn vertex_weight_total(&self, vertex: usize) -> f32 {
        self.vertex_groups
            .iter()
            .filter_map(|group| group.weights.get(&vertex))
            .sum()
    }

    // ─── Joining ─────────────────────────────────────────────────────────────

    /// Append another mesh's vertices, groups, UVs and materials.
    pub fn join(&mut self, other: Mesh) {
        let offset = self.vertices.len();
        let added = other.vertices.len();
        self.vertices.extend(other.vertices);

        for group in other.vertex_groups {
            let target = self.ensure_group(&group.name);
            for (vertex, weight) in group.weights {
                *target.weights.entry(vertex + offset).or_insert(0.0) += weight;
            }
        }

        for layer in &mut self.uv_layers {
            layer.coords.resize(offset, [0.0, 0.0]);
        }
        for layer in other.uv_layers {
            match self.uv_layers.iter_mut().find(|l| l.name == layer.name) {
                Some(existing) => existing.coords.extend(layer.coords),
                None => {
                    let mut coords = vec![[0.0, 0.0]; offset];
                    coords.extend(layer.coords);
                    self.uv_layers.push(UvLayer {
                        name: layer.name,
                        coords,
                    });
                }
            }
        }
        for layer in &mut self.uv_layers {
            layer.coords.resize(offset + added, [0.0, 0.0]);
        }

        self.materials.extend(other.materials);
    }
}
