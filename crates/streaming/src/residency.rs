/// Per-fragment lifecycle under the streaming policy.
///
/// Visible → Hidden → Unloaded → Evicted, with Hidden → Visible directly.
/// Unloaded and Evicted only come back through an explicit reload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeshState {
    /// Drawn.
    Visible,
    /// Kept on the GPU but not drawn.
    Hidden,
    /// GPU geometry released; the decoded copy is still cached.
    Unloaded,
    /// Dropped from memory; must be fetched again.
    Evicted,
}

impl MeshState {
    /// Whether GPU geometry is still present.
    pub fn is_resident(self) -> bool {
        matches!(self, MeshState::Visible | MeshState::Hidden)
    }
}

/// Where a reload has to fetch geometry from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReloadSource {
    /// Rebuild GPU buffers from the in-memory cache.
    Cache,
    /// Fetch and decode the tile again.
    Origin,
}

impl ReloadSource {
    pub fn for_state(state: MeshState) -> Option<ReloadSource> {
        match state {
            _ if state.is_resident() => None,
            MeshState::Unloaded => Some(ReloadSource::Cache),
            _ => Some(ReloadSource::Origin),
        }
    }
}
