use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifier for a user-declared class within a project's classification
/// set (e.g. "nucleus", "debris").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u16);

/// One entry of a project's classification set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub class_id: ClassId,
    pub name: String,
    pub color: String,
    pub default_measurements: Vec<String>,
}

/// The full classification set declared by a project; referenced by every
/// pipeline's `defaultClassId` and by object-filter/classify commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationSet {
    classes: HashMap<ClassId, Classification>,
}

impl ClassificationSet {
    pub fn new(classes: Vec<Classification>) -> Self {
        Self { classes: classes.into_iter().map(|c| (c.class_id, c)).collect() }
    }

    pub fn contains(&self, class_id: ClassId) -> bool {
        self.classes.contains_key(&class_id)
    }

    pub fn get(&self, class_id: ClassId) -> Option<&Classification> {
        self.classes.get(&class_id)
    }

    pub fn covers(&self, referenced: impl IntoIterator<Item = ClassId>) -> bool {
        referenced.into_iter().all(|id| self.contains(id))
    }
}
