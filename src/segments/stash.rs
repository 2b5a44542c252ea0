// src/segments/stash.rs - Ordered, identity-indexed segment container
//
// The stash keeps segments in a doubly linked list whose nodes live in a
// slot arena. Links are slot indices, and `index` maps a segment id to its
// slot, so neighbour lookups, appends, inserts and deletes by id are O(1).
use std::collections::HashMap;

use crate::segments::{Segment, SegmentId};
use crate::util::fast_math;

#[derive(Debug, Clone)]
struct Node<T> {
    segment: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ordered collection of segments. Used both for the top-level body of a
/// profile and for the basic segments inside a composite segment.
#[derive(Debug, Clone)]
pub struct Stash<T: Segment> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    index: HashMap<SegmentId, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T: Segment> Default for Stash<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Segment> Stash<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    fn node(&self, slot: usize) -> &Node<T> {
        self.slots[slot].as_ref().expect("stash slot linked but empty")
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<T> {
        self.slots[slot].as_mut().expect("stash slot linked but empty")
    }

    fn allocate(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Insert `segment` in front of the segment identified by `before`, or
    /// append it when `before` is `None`.
    ///
    /// The segment is handed back unchanged if `before` does not resolve or a
    /// segment with the same id is already stored.
    pub fn insert_at(&mut self, segment: T, before: Option<SegmentId>) -> Result<SegmentId, T> {
        let id = segment.id();
        if self.index.contains_key(&id) {
            return Err(segment);
        }

        match before {
            None => {
                let slot = self.allocate(Node { segment, prev: self.tail, next: None });
                match self.tail {
                    Some(tail) => self.node_mut(tail).next = Some(slot),
                    None => self.head = Some(slot),
                }
                self.tail = Some(slot);
                self.index.insert(id, slot);
            }
            Some(before_id) => {
                let Some(&existing) = self.index.get(&before_id) else {
                    return Err(segment);
                };
                let prev = self.node(existing).prev;
                let slot = self.allocate(Node { segment, prev, next: Some(existing) });
                self.node_mut(existing).prev = Some(slot);
                match prev {
                    Some(prev) => self.node_mut(prev).next = Some(slot),
                    None => self.head = Some(slot),
                }
                self.index.insert(id, slot);
            }
        }

        self.len += 1;
        Ok(id)
    }

    /// Append at the end of the list.
    pub fn push(&mut self, segment: T) -> Result<SegmentId, T> {
        self.insert_at(segment, None)
    }

    /// Remove the segment and hand it back to the caller.
    pub fn delete(&mut self, id: SegmentId) -> Option<T> {
        let slot = self.index.remove(&id)?;
        let node = self.slots[slot].take()?;

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(slot);
        self.len -= 1;
        Some(node.segment)
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn find_by_id(&self, id: SegmentId) -> Option<&T> {
        self.index.get(&id).map(|&slot| &self.node(slot).segment)
    }

    pub fn find_by_id_mut(&mut self, id: SegmentId) -> Option<&mut T> {
        let slot = *self.index.get(&id)?;
        Some(&mut self.node_mut(slot).segment)
    }

    pub fn get_next_segment(&self, id: SegmentId) -> Option<&T> {
        let slot = self.node(*self.index.get(&id)?).next?;
        Some(&self.node(slot).segment)
    }

    pub fn get_previous_segment(&self, id: SegmentId) -> Option<&T> {
        let slot = self.node(*self.index.get(&id)?).prev?;
        Some(&self.node(slot).segment)
    }

    pub fn next_id(&self, id: SegmentId) -> Option<SegmentId> {
        self.get_next_segment(id).map(Segment::id)
    }

    pub fn previous_id(&self, id: SegmentId) -> Option<SegmentId> {
        self.get_previous_segment(id).map(Segment::id)
    }

    pub fn first_segment(&self) -> Option<&T> {
        self.head.map(|slot| &self.node(slot).segment)
    }

    pub fn last_segment(&self) -> Option<&T> {
        self.tail.map(|slot| &self.node(slot).segment)
    }

    pub fn count_segments(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Segments in list order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { stash: self, cursor: self.head, remaining: self.len }
    }

    pub fn get_all_segments(&self) -> Vec<&T> {
        self.iter().collect()
    }

    pub fn ids(&self) -> Vec<SegmentId> {
        self.iter().map(Segment::id).collect()
    }

    pub fn clear_all_segments(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Clear, then load `segments` preserving their order.
    pub fn initialize_with_segments(&mut self, segments: Vec<T>) {
        self.clear_all_segments();
        for segment in segments {
            if let Err(rejected) = self.push(segment) {
                tracing::warn!("Skipping duplicate segment id {} during stash initialization", rejected.id());
            }
        }
    }

    /// First segment (in list order) whose initial time equals `initial_time`.
    pub fn find_segment_with_initial_time(&self, initial_time: f64) -> Option<&T> {
        self.iter()
            .find(|segment| fast_math::equal(initial_time, segment.initial_time()))
    }

    /// First segment whose span intersects `[t0, tf]`. Spans that only touch
    /// at an endpoint do not overlap.
    pub fn find_overlapping_segment(&self, t0: f64, tf: f64) -> Option<&T> {
        self.iter().find(|segment| {
            let start = segment.initial_time();
            let end = segment.final_time();

            let end_inside = fast_math::gt(tf, start) && fast_math::leq(tf, end);
            let start_inside = fast_math::geq(t0, start) && fast_math::lt(t0, end);
            let envelops = fast_math::leq(t0, start) && fast_math::geq(tf, end);
            let enveloped = fast_math::geq(t0, start) && fast_math::leq(tf, end);

            end_inside || start_inside || envelops || enveloped
        })
    }

    /// First segment whose final time is at or after `t0`.
    pub fn get_previous_by_initial_time(&self, t0: f64) -> Option<&T> {
        self.iter().find(|segment| fast_math::geq(segment.final_time(), t0))
    }
}

pub struct Iter<'a, T: Segment> {
    stash: &'a Stash<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T: Segment> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.stash.node(slot);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Segment> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T: Segment> IntoIterator for &'a Stash<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
