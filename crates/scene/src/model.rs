use foundation::bounds::Aabb3;
use foundation::ids::{FragmentId, ModelId};

/// One independently loadable piece of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub id: FragmentId,
    pub bounds: Aabb3,
}

impl Fragment {
    pub fn new(id: FragmentId, bounds: Aabb3) -> Self {
        Self { id, bounds }
    }
}

/// A group of fragments delivered by one load.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    /// Whether the source carried semantic property data worth indexing.
    pub has_properties: bool,
    pub fragments: Vec<Fragment>,
}

impl Model {
    pub fn new(id: ModelId, name: impl Into<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            id,
            name: name.into(),
            has_properties: false,
            fragments,
        }
    }

    pub fn with_properties(mut self, has_properties: bool) -> Self {
        self.has_properties = has_properties;
        self
    }
}
