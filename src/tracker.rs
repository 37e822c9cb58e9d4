use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::detection::BoundingBox;
use crate::my_types::*;

pub const DEFAULT_MAX_DISAPPEARED: usize = 5;

/// Assigns persistent identities to centroids across frames by greedy
/// nearest-centroid matching.
///
/// Tracked objects are kept in `BTreeMap`s keyed by identity. Identities
/// are handed out in increasing order, so iterating the map visits objects
/// in registration order and the matching is deterministic.
#[derive(Debug, Clone)]
pub struct CentroidTracker {
    next_id: ObjectId,
    objects: BTreeMap<ObjectId, Vector2d>,
    disappeared: BTreeMap<ObjectId, usize>,
    max_disappeared: usize,
    // identity given to each input index of the latest update
    assignments: Vec<Option<ObjectId>>,
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISAPPEARED)
    }
}

impl CentroidTracker {
    /// An object unmatched for more than `max_disappeared` consecutive
    /// frames is dropped. With 0 it is dropped on its first miss.
    pub fn new(max_disappeared: usize) -> Self {
        CentroidTracker {
            next_id: 0,
            objects: BTreeMap::new(),
            disappeared: BTreeMap::new(),
            max_disappeared,
            assignments: vec![],
        }
    }

    pub fn max_disappeared(&self) -> usize {
        self.max_disappeared
    }

    /// The identity the next registration will receive
    pub fn next_id(&self) -> ObjectId {
        self.next_id
    }

    pub fn objects(&self) -> &BTreeMap<ObjectId, Vector2d> {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn centroid(&self, id: ObjectId) -> Option<Vector2d> {
        self.objects.get(&id).copied()
    }

    /// Consecutive frames `id` went unmatched
    pub fn disappeared(&self, id: ObjectId) -> Option<usize> {
        self.disappeared.get(&id).copied()
    }

    /// For every centroid passed to the latest `update`, the identity it was
    /// matched to or registered as. `None` means the centroid was dropped.
    pub fn assignments(&self) -> &[Option<ObjectId>] {
        &self.assignments
    }

    /// Forget every tracked object. The identity counter keeps counting.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.disappeared.clear();
        self.assignments.clear();
    }

    pub fn update_boxes(&mut self, boxes: &[BoundingBox]) -> &BTreeMap<ObjectId, Vector2d> {
        let centroids: Vec<Vector2d> = boxes.iter().map(|b| b.centroid()).collect();
        self.update(&centroids)
    }

    /// Match this frame's centroids against the tracked objects and return
    /// the tracked set after registrations and deregistrations.
    pub fn update(&mut self, centroids: &[Vector2d]) -> &BTreeMap<ObjectId, Vector2d> {
        self.assignments.clear();
        self.assignments.resize(centroids.len(), None);

        if self.objects.is_empty() {
            for (col, centroid) in centroids.iter().enumerate() {
                let id = self.register(*centroid);
                self.assignments[col] = Some(id);
            }
            self.check_invariants();
            return &self.objects;
        }

        let ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        let rows = ids.len();
        let cols = centroids.len();
        let distances = self.distance_matrix(&ids, centroids);

        let mut used_rows = vec![false; rows];
        let mut used_cols = vec![false; cols];
        for (row, col) in greedy_matches(&distances) {
            if used_rows[row] || used_cols[col] {
                continue;
            }
            let id = ids[row];
            self.objects.insert(id, centroids[col]);
            self.disappeared.insert(id, 0);
            self.assignments[col] = Some(id);
            used_rows[row] = true;
            used_cols[col] = true;
        }

        if rows < cols {
            // more detections than tracked objects: new objects entered
            for col in (0..cols).filter(|&c| !used_cols[c]) {
                let id = self.register(centroids[col]);
                self.assignments[col] = Some(id);
            }
        } else {
            let dropped = used_cols.iter().filter(|used| !**used).count();
            if dropped > 0 {
                trace!("{} centroids left unassigned", dropped);
            }
        }

        // Every tracked object that was not matched ages exactly once per
        // frame, whichever side of the rows/cols comparison we are on.
        for row in (0..rows).filter(|&r| !used_rows[r]) {
            self.mark_missing(ids[row]);
        }

        self.check_invariants();
        &self.objects
    }

    fn distance_matrix(&self, ids: &[ObjectId], centroids: &[Vector2d]) -> Matrixd {
        Matrixd::from_fn(ids.len(), centroids.len(), |row, col| {
            (self.objects[&ids[row]] - centroids[col]).norm()
        })
    }

    fn register(&mut self, centroid: Vector2d) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, centroid);
        self.disappeared.insert(id, 0);
        debug!("registered object {} at ({:.1}, {:.1})", id, centroid.x, centroid.y);
        id
    }

    fn deregister(&mut self, id: ObjectId) {
        self.objects.remove(&id);
        self.disappeared.remove(&id);
        debug!("deregistered object {}", id);
    }

    fn mark_missing(&mut self, id: ObjectId) {
        let count = self
            .disappeared
            .get_mut(&id)
            .expect("tracked object without disappearance counter");
        *count += 1;
        if *count > self.max_disappeared {
            self.deregister(id);
        }
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.objects.keys().eq(self.disappeared.keys()),
            "tracked objects and disappearance counters diverged"
        );
        debug_assert!(self.objects.keys().all(|id| *id < self.next_id));
    }
}

/// Candidate (row, column) pairs in the order they get to claim a match.
///
/// Rows are ranked by their smallest distance, ascending, ties kept in row
/// order. Each row proposes its argmin column, lowest column on ties. Rows
/// without columns propose nothing.
fn greedy_matches(distances: &Matrixd) -> Vec<(usize, usize)> {
    if distances.ncols() == 0 {
        return vec![];
    }

    let mut candidates: Vec<(usize, usize, f64)> = distances
        .row_iter()
        .enumerate()
        .map(|(row, values)| {
            let (col, min) = values.iter().enumerate().fold(
                (0, f64::INFINITY),
                |(best_col, best), (col, &value)| {
                    if value < best {
                        (col, value)
                    } else {
                        (best_col, best)
                    }
                },
            );
            (row, col, min)
        })
        .collect();

    // sort_by is stable
    candidates.sort_by(|a, b| a.2.total_cmp(&b.2));
    candidates.into_iter().map(|(row, col, _)| (row, col)).collect()
}
