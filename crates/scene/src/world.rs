use std::collections::BTreeMap;

use crate::components::Visibility;
use crate::model::Model;
use foundation::bounds::Aabb3;
use foundation::ids::{FragmentId, ModelId};

/// A fragment mesh as the main scene sees it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mesh {
    pub id: FragmentId,
    pub model: ModelId,
    pub bounds: Aabb3,
    pub visibility: Visibility,
}

/// Authoritative mesh set of the 3D viewport.
///
/// Ordering contract: every iterator walks meshes in ascending `FragmentId`
/// and groups in ascending `ModelId`, so replays are deterministic.
#[derive(Debug, Default)]
pub struct World {
    meshes: BTreeMap<FragmentId, Mesh>,
    groups: BTreeMap<ModelId, Vec<FragmentId>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every fragment of `model` as a visible mesh.
    ///
    /// Re-adding a fragment id replaces the previous entry rather than
    /// duplicating it. Returns the ids that were registered.
    pub fn add_model(&mut self, model: &Model) -> Vec<FragmentId> {
        let mut added = Vec::with_capacity(model.fragments.len());
        for fragment in &model.fragments {
            let previous = self.meshes.get(&fragment.id).map(|m| m.model);
            if let Some(previous) = previous
                && previous != model.id
            {
                self.detach_from_group(previous, fragment.id);
            }
            self.meshes.insert(
                fragment.id,
                Mesh {
                    id: fragment.id,
                    model: model.id,
                    bounds: fragment.bounds,
                    visibility: Visibility::visible(),
                },
            );
            added.push(fragment.id);
        }

        let members = self.groups.entry(model.id).or_default();
        for id in &added {
            if !members.contains(id) {
                members.push(*id);
            }
        }
        added
    }

    /// Removes one mesh by id. Unknown ids are ignored.
    pub fn remove_mesh(&mut self, id: FragmentId) -> Option<Mesh> {
        let mesh = self.meshes.remove(&id)?;
        self.detach_from_group(mesh.model, id);
        Some(mesh)
    }

    /// Removes a whole group and its meshes, returning the fragment ids removed.
    pub fn remove_group(&mut self, model: ModelId) -> Vec<FragmentId> {
        let Some(members) = self.groups.remove(&model) else {
            return Vec::new();
        };
        members
            .into_iter()
            .filter(|id| self.meshes.remove(id).is_some())
            .collect()
    }

    pub fn mesh(&self, id: FragmentId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn contains(&self, id: FragmentId) -> bool {
        self.meshes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.values()
    }

    pub fn mesh_ids(&self) -> Vec<FragmentId> {
        self.meshes.keys().copied().collect()
    }

    pub fn group_ids(&self) -> Vec<ModelId> {
        self.groups.keys().copied().collect()
    }

    pub fn group(&self, model: ModelId) -> Option<&[FragmentId]> {
        self.groups.get(&model).map(|v| v.as_slice())
    }

    /// Returns `false` if the mesh is not part of the scene.
    pub fn set_visibility(&mut self, id: FragmentId, visibility: Visibility) -> bool {
        match self.meshes.get_mut(&id) {
            Some(mesh) => {
                mesh.visibility = visibility;
                true
            }
            None => false,
        }
    }

    pub fn visible_meshes(&self) -> Vec<&Mesh> {
        self.meshes
            .values()
            .filter(|m| m.visibility.visible)
            .collect()
    }

    /// Union of every mesh's bounds, or `None` for an empty scene.
    pub fn bounds(&self) -> Option<Aabb3> {
        self.meshes
            .values()
            .map(|m| m.bounds)
            .reduce(|a, b| a.union(&b))
    }

    fn detach_from_group(&mut self, model: ModelId, id: FragmentId) {
        if let Some(members) = self.groups.get_mut(&model) {
            members.retain(|m| *m != id);
            if members.is_empty() {
                self.groups.remove(&model);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::Visibility;
    use crate::model::{Fragment, Model};
    use foundation::bounds::Aabb3;
    use foundation::ids::{FragmentId, ModelId};
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    fn model(id: u64, fragments: &[u64]) -> Model {
        Model::new(
            ModelId(id),
            format!("m{id}"),
            fragments
                .iter()
                .map(|f| Fragment::new(FragmentId(*f), Aabb3::point(Vec3::new(*f as f64, 0.0, 0.0))))
                .collect(),
        )
    }

    #[test]
    fn add_model_registers_meshes_and_group() {
        let mut world = World::new();
        let added = world.add_model(&model(1, &[3, 1, 2]));
        assert_eq!(added, vec![FragmentId(3), FragmentId(1), FragmentId(2)]);
        assert_eq!(world.mesh_ids(), vec![FragmentId(1), FragmentId(2), FragmentId(3)]);
        assert_eq!(world.group(ModelId(1)).map(|g| g.len()), Some(3));
    }

    #[test]
    fn re_adding_does_not_duplicate() {
        let mut world = World::new();
        world.add_model(&model(1, &[1, 2]));
        world.add_model(&model(1, &[1, 2]));
        assert_eq!(world.len(), 2);
        assert_eq!(world.group(ModelId(1)), Some(&[FragmentId(1), FragmentId(2)][..]));
    }

    #[test]
    fn removing_last_mesh_drops_group() {
        let mut world = World::new();
        world.add_model(&model(7, &[1]));
        assert!(world.remove_mesh(FragmentId(1)).is_some());
        assert!(world.remove_mesh(FragmentId(1)).is_none());
        assert!(world.group_ids().is_empty());
    }

    #[test]
    fn remove_group_returns_removed_ids() {
        let mut world = World::new();
        world.add_model(&model(1, &[1, 2]));
        world.add_model(&model(2, &[3]));
        assert_eq!(world.remove_group(ModelId(1)), vec![FragmentId(1), FragmentId(2)]);
        assert_eq!(world.mesh_ids(), vec![FragmentId(3)]);
        assert!(world.remove_group(ModelId(1)).is_empty());
    }

    #[test]
    fn hidden_meshes_are_filtered_and_bounds_cover_all() {
        let mut world = World::new();
        world.add_model(&model(1, &[1, 4]));
        assert!(world.set_visibility(FragmentId(4), Visibility::hidden()));
        assert!(!world.set_visibility(FragmentId(9), Visibility::hidden()));

        let visible: Vec<_> = world.visible_meshes().iter().map(|m| m.id).collect();
        assert_eq!(visible, vec![FragmentId(1)]);

        let b = world.bounds().unwrap();
        assert_eq!(b.min.x, 1.0);
        assert_eq!(b.max.x, 4.0);
    }
}
