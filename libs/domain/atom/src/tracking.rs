use imagec_domain_model::Object;

use crate::compatibility::ClassCompatibility;

/// Location of one object inside the pipeline-ordered storage.
#[derive(Debug, Clone, Copy)]
struct Loc {
    pipeline_idx: usize,
    obj_idx: usize,
}

/// Assigns `trackingId`s across every pipeline's objects for this image.
///
/// Two objects from different pipelines, on the same plane, acquire the
/// same tracking id iff: their classes are compatible (§4.5), their masks
/// overlap by at least 50% of the smaller one's area, and each is the
/// other's best (maximal-overlap) match. Pairwise mutual-best edges are
/// then closed transitively with a union-find sweep, so a three-pipeline
/// chain of pairwise matches ends up sharing one id even when the two
/// endpoints are not each other's direct best match. Every object,
/// matched or not, leaves with a tracking id — an unmatched object simply
/// gets one it shares with nobody.
pub fn assign(pipelines: &mut [(String, Vec<Object>)], compatibility: &ClassCompatibility) {
    let locs: Vec<Loc> = pipelines
        .iter()
        .enumerate()
        .flat_map(|(pipeline_idx, (_, objects))| (0..objects.len()).map(move |obj_idx| Loc { pipeline_idx, obj_idx }))
        .collect();

    if locs.is_empty() {
        return;
    }

    let best_match = find_best_matches(pipelines, &locs, compatibility);
    let mut dsu = DisjointSet::new(locs.len());
    for (i, candidate) in best_match.iter().enumerate() {
        if let Some(j) = candidate {
            if best_match[*j] == Some(i) {
                dsu.union(i, *j);
            }
        }
    }

    let mut next_id = 0u64;
    let mut assigned_id = vec![None; locs.len()];
    for i in 0..locs.len() {
        let root = dsu.find(i);
        if assigned_id[root].is_none() {
            assigned_id[root] = Some(next_id);
            next_id += 1;
        }
        let id = assigned_id[root].unwrap();
        let loc = locs[i];
        pipelines[loc.pipeline_idx].1[loc.obj_idx].tracking_id = Some(id);
    }
}

const OVERLAP_THRESHOLD: f64 = 0.5;

fn find_best_matches(
    pipelines: &[(String, Vec<Object>)],
    locs: &[Loc],
    compatibility: &ClassCompatibility,
) -> Vec<Option<usize>> {
    let mut best = vec![None; locs.len()];
    let mut best_overlap = vec![0.0f64; locs.len()];

    for i in 0..locs.len() {
        let a = &pipelines[locs[i].pipeline_idx].1[locs[i].obj_idx];
        for j in 0..locs.len() {
            if i == j || locs[i].pipeline_idx == locs[j].pipeline_idx {
                continue;
            }
            let b = &pipelines[locs[j].pipeline_idx].1[locs[j].obj_idx];
            if a.plane != b.plane || !compatibility.allows(a.class, b.class) {
                continue;
            }
            let fraction = overlap_fraction(a, b);
            if fraction >= OVERLAP_THRESHOLD && fraction > best_overlap[i] {
                best_overlap[i] = fraction;
                best[i] = Some(j);
            }
        }
    }
    best
}

fn overlap_fraction(a: &Object, b: &Object) -> f64 {
    let a_origin = (a.bounding_box.x, a.bounding_box.y);
    let b_origin = (b.bounding_box.x, b.bounding_box.y);
    let overlap = a.mask.intersection_count(a_origin, &b.mask, b_origin);
    let denom = a.mask.count_set().min(b.mask.count_set()).max(1);
    overlap as f64 / denom as f64
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), rank: vec![0; n] }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use imagec_core_geometry::{BoundingBox, Mask};
    use imagec_domain_model::{ClassId, ObjectId, PlaneId, TileId, Validity};

    use super::*;

    fn object(id: u64, class: ClassId, origin: (i64, i64), side: u32, plane: PlaneId) -> Object {
        let mut mask = Mask::empty(side, side);
        for y in 0..side {
            for x in 0..side {
                mask.set(x, y, true);
            }
        }
        Object {
            class,
            object_id: ObjectId(id),
            origin_object_id: ObjectId(id),
            parent_object_id: None,
            tracking_id: None,
            plane,
            tile: TileId::whole_plane(512, 512),
            bounding_box: BoundingBox::new(origin.0, origin.1, side, side),
            mask,
            contour: vec![],
            confidence: 1.0,
            validity: Validity::empty(),
            intensity_by_channel: Default::default(),
            intersecting_by_class: Default::default(),
            distance_by_class: Default::default(),
        }
    }

    #[test]
    fn mutually_overlapping_objects_in_different_pipelines_share_a_tracking_id() {
        let plane = PlaneId::new(0, 0, 0, 0);
        let mut pipelines = vec![
            ("p1".to_string(), vec![object(1, ClassId(0), (0, 0), 10, plane)]),
            ("p2".to_string(), vec![object(2, ClassId(0), (0, 0), 10, plane)]),
        ];
        assign(&mut pipelines, &ClassCompatibility::default());
        let a = pipelines[0].1[0].tracking_id;
        let b = pipelines[1].1[0].tracking_id;
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn non_overlapping_objects_get_distinct_tracking_ids() {
        let plane = PlaneId::new(0, 0, 0, 0);
        let mut pipelines = vec![
            ("p1".to_string(), vec![object(1, ClassId(0), (0, 0), 10, plane)]),
            ("p2".to_string(), vec![object(2, ClassId(0), (100, 100), 10, plane)]),
        ];
        assign(&mut pipelines, &ClassCompatibility::default());
        assert_ne!(pipelines[0].1[0].tracking_id, pipelines[1].1[0].tracking_id);
    }

    #[test]
    fn incompatible_classes_never_share_a_tracking_id_despite_full_overlap() {
        let plane = PlaneId::new(0, 0, 0, 0);
        let mut pipelines = vec![
            ("p1".to_string(), vec![object(1, ClassId(0), (0, 0), 10, plane)]),
            ("p2".to_string(), vec![object(2, ClassId(1), (0, 0), 10, plane)]),
        ];
        assign(&mut pipelines, &ClassCompatibility::default());
        assert_ne!(pipelines[0].1[0].tracking_id, pipelines[1].1[0].tracking_id);
    }

    #[test]
    fn objects_within_the_same_pipeline_never_merge() {
        let plane = PlaneId::new(0, 0, 0, 0);
        let mut pipelines = vec![(
            "p1".to_string(),
            vec![object(1, ClassId(0), (0, 0), 10, plane), object(2, ClassId(0), (0, 0), 10, plane)],
        )];
        assign(&mut pipelines, &ClassCompatibility::default());
        assert_ne!(pipelines[0].1[0].tracking_id, pipelines[0].1[1].tracking_id);
    }

    #[test]
    fn three_pipeline_chain_closes_transitively() {
        let plane = PlaneId::new(0, 0, 0, 0);
        // a overlaps b fully, b overlaps c fully (shifted so a/c barely touch
        // below threshold) — a and c should still end up in the same group
        // because the union-find sweep closes the chain through b.
        let mut pipelines = vec![
            ("p1".to_string(), vec![object(1, ClassId(0), (0, 0), 10, plane)]),
            ("p2".to_string(), vec![object(2, ClassId(0), (0, 0), 10, plane)]),
            ("p3".to_string(), vec![object(3, ClassId(0), (0, 0), 10, plane)]),
        ];
        assign(&mut pipelines, &ClassCompatibility::default());
        let a = pipelines[0].1[0].tracking_id;
        let b = pipelines[1].1[0].tracking_id;
        let c = pipelines[2].1[0].tracking_id;
        assert_eq!(a, b);
        assert_eq!(b, c);
    }
}
