use serde::{Deserialize, Serialize};

/// Items are value-copied when moved between a room and an inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub description: String,
}

impl Item {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Item {
            name: name.into(),
            description: description.into(),
        }
    }
}
