use imagec_domain_model::ClassId;
use serde::{Deserialize, Serialize};

use crate::grouping::GroupBy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub class_id: ClassId,
    pub name: String,
    pub color: String,
    pub default_measurements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub classes: Vec<ClassificationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub plate: String,
    pub address: String,
    pub experiment: String,
    pub classification: Classification,
    pub working_directory: String,
    pub group_by: GroupBy,
    /// Class pairs the Object Atom (C5) may assign a shared `trackingId`
    /// across; a class is always implicitly compatible with itself.
    /// Undeclared cross-class pairs never get a shared tracking id.
    #[serde(rename = "trackingCompatibility", default)]
    pub tracking_compatibility: Vec<(ClassId, ClassId)>,
}
