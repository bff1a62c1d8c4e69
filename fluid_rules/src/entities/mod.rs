//! Identity and capabilities of objects that can be placed inside an organ.

mod insertable;

pub use insertable::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag carried by an object for as long as it exists, whether it is held,
/// ejected or handed back. Removal looks objects up by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Tag a freshly made object.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Placeholder for objects built before they are given a real tag.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Short form for logs: the first eight hex digits.
impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let simple = self.0.simple().to_string();
        write!(f, "obj-{}", &simple[..8])
    }
}
