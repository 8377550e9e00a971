use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, StreamId};

/// A category whose members are defined by a saved product stream rather than
/// by static product assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStreamBinding {
    pub category_id: CategoryId,
    pub stream_id: StreamId,
}

impl CategoryStreamBinding {
    pub fn new(category_id: impl Into<CategoryId>, stream_id: impl Into<StreamId>) -> Self {
        Self {
            category_id: category_id.into(),
            stream_id: stream_id.into(),
        }
    }
}
