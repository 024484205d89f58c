//! Object Atom (C5): owns the per-image `ObjectList`s produced by every
//! pipeline and assigns cross-pipeline `trackingId`s once they are all in.

mod compatibility;
mod tracking;

use std::collections::HashMap;

use imagec_domain_model::{ClassId, Object, ObjectId};

pub use compatibility::ClassCompatibility;

/// Owner of one image's per-pipeline object lists. Mutated only by that
/// image's own workers; never shared across images.
#[derive(Debug, Default)]
pub struct ObjectAtom {
    /// Pipelines in the order their objects were inserted — the order the
    /// drain iterator (and the Result Sink) observes.
    pipelines: Vec<(String, Vec<Object>)>,
    index: HashMap<String, usize>,
}

impl ObjectAtom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one pipeline's finished `ObjectList`. Overwrites any
    /// previous entry for the same `pipeline_uid` (a pipeline only runs
    /// once per image).
    pub fn insert_pipeline_objects(&mut self, pipeline_uid: impl Into<String>, objects: Vec<Object>) {
        let pipeline_uid = pipeline_uid.into();
        if let Some(&slot) = self.index.get(&pipeline_uid) {
            self.pipelines[slot].1 = objects;
        } else {
            self.index.insert(pipeline_uid.clone(), self.pipelines.len());
            self.pipelines.push((pipeline_uid, objects));
        }
    }

    pub fn by_pipeline(&self, pipeline_uid: &str) -> &[Object] {
        self.index.get(pipeline_uid).map(|&slot| self.pipelines[slot].1.as_slice()).unwrap_or(&[])
    }

    pub fn by_class(&self, class: ClassId) -> Vec<&Object> {
        self.pipelines.iter().flat_map(|(_, objects)| objects.iter()).filter(|o| o.class == class).collect()
    }

    pub fn by_tracking_id(&self, tracking_id: u64) -> Vec<&Object> {
        self.pipelines
            .iter()
            .flat_map(|(_, objects)| objects.iter())
            .filter(|o| o.tracking_id == Some(tracking_id))
            .collect()
    }

    /// Assigns a `trackingId` to every object once every pipeline for this
    /// image has contributed its list (§4.5). See [`tracking::assign`] for
    /// the matching algorithm.
    pub fn assign_tracking_ids(&mut self, compatibility: &ClassCompatibility) {
        tracking::assign(&mut self.pipelines, compatibility);
    }

    /// Drains every object in pipeline-order x objectId-order, the
    /// deterministic order the Result Sink commits in.
    pub fn drain(self) -> Vec<Object> {
        let mut all: Vec<Object> = self.pipelines.into_iter().flat_map(|(_, objects)| objects).collect();
        all.sort_by_key(|o| o.object_id);
        all
    }

    pub fn pipeline_uids(&self) -> impl Iterator<Item = &str> {
        self.pipelines.iter().map(|(uid, _)| uid.as_str())
    }

    pub fn object_count(&self) -> usize {
        self.pipelines.iter().map(|(_, objects)| objects.len()).sum()
    }
}
