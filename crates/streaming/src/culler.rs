use std::collections::{BTreeMap, BTreeSet};

use foundation::ids::FragmentId;
use foundation::math::Vec3;
use foundation::time::TimeMs;
use scene::World;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::residency::{MeshState, ReloadSource};

/// Tunable thresholds of the streaming policy, constant per session.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityBudget {
    /// Meshes farther than this from the resting camera are hidden.
    pub distance_threshold: f64,
    /// Time since last seen after which a hidden mesh releases its GPU data.
    pub max_hidden_duration_ms: u64,
    /// Time since last seen after which a mesh is dropped from memory.
    pub max_evicted_duration_ms: u64,
}

impl Default for VisibilityBudget {
    fn default() -> Self {
        Self {
            distance_threshold: 10.0,
            max_hidden_duration_ms: 1_000,
            max_evicted_duration_ms: 40_000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TrackedMesh {
    pub id: FragmentId,
    pub last_visible: TimeMs,
    pub state: MeshState,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReloadRequest {
    pub id: FragmentId,
    pub source: ReloadSource,
}

/// Transitions produced by one `mark_camera_rest` or `tick` call.
///
/// Every list is in ascending fragment id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityChanges {
    pub shown: Vec<FragmentId>,
    pub hidden: Vec<FragmentId>,
    pub unloaded: Vec<FragmentId>,
    pub evicted: Vec<FragmentId>,
    pub reloads: Vec<ReloadRequest>,
    /// Ids dropped because the scene no longer has them.
    pub untracked: Vec<FragmentId>,
}

impl VisibilityChanges {
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
            && self.hidden.is_empty()
            && self.unloaded.is_empty()
            && self.evicted.is_empty()
            && self.reloads.is_empty()
            && self.untracked.is_empty()
    }
}

/// Distance- and idle-time-driven visibility policy for streamed fragments.
///
/// The culler only knows fragment ids. Positions are looked up in the
/// [`World`] on every camera rest, so it never extends a mesh's lifetime.
/// Hiding is conservative: a mesh at exactly `distance_threshold` stays
/// visible.
#[derive(Debug, Default)]
pub struct Culler {
    budget: VisibilityBudget,
    tracked: BTreeMap<FragmentId, TrackedMesh>,
    reload_pending: BTreeSet<FragmentId>,
}

impl Culler {
    pub fn new(budget: VisibilityBudget) -> Self {
        Self {
            budget,
            tracked: BTreeMap::new(),
            reload_pending: BTreeSet::new(),
        }
    }

    pub fn budget(&self) -> VisibilityBudget {
        self.budget
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn tracked(&self, id: FragmentId) -> Option<&TrackedMesh> {
        self.tracked.get(&id)
    }

    pub fn state(&self, id: FragmentId) -> Option<MeshState> {
        self.tracked.get(&id).map(|t| t.state)
    }

    /// Start tracking a freshly added fragment as visible.
    ///
    /// Tracking an id twice keeps the existing entry.
    pub fn track(&mut self, id: FragmentId, now: TimeMs) {
        self.tracked.entry(id).or_insert(TrackedMesh {
            id,
            last_visible: now,
            state: MeshState::Visible,
        });
    }

    /// Track `id` as visible again, whatever state it was in.
    ///
    /// Used when fresh geometry for an already tracked fragment arrives
    /// through a normal load; any outstanding reload is dropped.
    pub fn retrack(&mut self, id: FragmentId, now: TimeMs) {
        self.reload_pending.remove(&id);
        self.tracked.insert(
            id,
            TrackedMesh {
                id,
                last_visible: now,
                state: MeshState::Visible,
            },
        );
    }

    pub fn untrack(&mut self, id: FragmentId) -> bool {
        self.reload_pending.remove(&id);
        self.tracked.remove(&id).is_some()
    }

    /// Re-evaluate every tracked fragment against the resting camera.
    pub fn mark_camera_rest(
        &mut self,
        world: &World,
        camera: Vec3,
        now: TimeMs,
    ) -> VisibilityChanges {
        let threshold = self.budget.distance_threshold;
        let mut changes = VisibilityChanges::default();

        for (id, tracked) in self.tracked.iter_mut() {
            let Some(mesh) = world.mesh(*id) else {
                changes.untracked.push(*id);
                continue;
            };

            let distance = mesh.bounds.distance_to(camera);
            if distance <= threshold {
                match tracked.state {
                    MeshState::Visible => tracked.last_visible = now,
                    MeshState::Hidden => {
                        tracked.state = MeshState::Visible;
                        tracked.last_visible = now;
                        changes.shown.push(*id);
                    }
                    MeshState::Unloaded | MeshState::Evicted => {
                        // Wanted again: hold off eviction until the reload lands.
                        tracked.last_visible = now;
                        if self.reload_pending.insert(*id)
                            && let Some(source) = ReloadSource::for_state(tracked.state)
                        {
                            changes.reloads.push(ReloadRequest { id: *id, source });
                        }
                    }
                }
            } else {
                self.reload_pending.remove(id);
                if tracked.state == MeshState::Visible {
                    tracked.state = MeshState::Hidden;
                    changes.hidden.push(*id);
                }
            }
        }

        for id in &changes.untracked {
            self.tracked.remove(id);
            self.reload_pending.remove(id);
        }

        debug!(
            shown = changes.shown.len(),
            hidden = changes.hidden.len(),
            reloads = changes.reloads.len(),
            untracked = changes.untracked.len(),
            "camera rest culling pass"
        );
        changes
    }

    /// Age hidden fragments: release GPU data, then memory.
    pub fn tick(&mut self, now: TimeMs) -> VisibilityChanges {
        let max_hidden = self.budget.max_hidden_duration_ms;
        let max_evicted = self.budget.max_evicted_duration_ms;
        let mut changes = VisibilityChanges::default();

        for (id, tracked) in self.tracked.iter_mut() {
            if self.reload_pending.contains(id) {
                continue;
            }
            let idle = now.since(tracked.last_visible);
            match tracked.state {
                MeshState::Hidden | MeshState::Unloaded if idle > max_evicted => {
                    tracked.state = MeshState::Evicted;
                    changes.evicted.push(*id);
                }
                MeshState::Hidden if idle > max_hidden => {
                    tracked.state = MeshState::Unloaded;
                    changes.unloaded.push(*id);
                }
                _ => {}
            }
        }

        if !changes.is_empty() {
            debug!(
                unloaded = changes.unloaded.len(),
                evicted = changes.evicted.len(),
                "streaming tick"
            );
        }
        changes
    }

    /// Called once the reload collaborator has geometry back in the scene.
    pub fn mark_reloaded(&mut self, id: FragmentId, now: TimeMs) -> bool {
        self.reload_pending.remove(&id);
        match self.tracked.get_mut(&id) {
            Some(tracked) => {
                tracked.state = MeshState::Visible;
                tracked.last_visible = now;
                true
            }
            None => false,
        }
    }
}
