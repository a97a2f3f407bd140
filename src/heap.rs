use std::cmp::Ordering;
use std::ops::Index;

/// Stable reference to an element of an [`IndexedHeap`]. Stays valid until
/// the element is removed or extracted, whatever else happens to the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

// Marks a handle slot whose element has left the heap.
const VACANT: usize = usize::MAX;

#[derive(Debug, Clone)]
struct Element<T> {
    value: T,
    handle: Handle,
}

/// Binary min-heap addressed by stable handles.
///
/// The heap never compares values on its own: every operation that may move
/// elements takes the comparator from the caller. The owner is responsible
/// for passing a comparator consistent with the current heap order, and for
/// calling [`IndexedHeap::sieve_up`] / [`IndexedHeap::sieve_down`] after it
/// changes the priority of a stored value behind the heap's back.
#[derive(Debug, Clone)]
pub struct IndexedHeap<T> {
    store: Vec<Element<T>>,
    index_by_handle: Vec<usize>,
    free_handles: Vec<Handle>,
}

impl<T> Default for IndexedHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IndexedHeap<T> {
    pub fn new() -> Self {
        IndexedHeap {
            store: Vec::new(),
            index_by_handle: Vec::new(),
            free_handles: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn top(&self) -> Option<&T> {
        self.store.first().map(|element| &element.value)
    }

    /// Value at heap position `position` (0 is the root).
    pub fn get(&self, position: usize) -> Option<&T> {
        self.store.get(position).map(|element| &element.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.store.iter().map(|element| &element.value)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.position(handle).is_some()
    }

    /// Current heap position of the element behind `handle`.
    pub fn position(&self, handle: Handle) -> Option<usize> {
        self.index_by_handle
            .get(handle.0)
            .copied()
            .filter(|&position| position != VACANT)
    }

    pub fn value(&self, handle: Handle) -> Option<&T> {
        self.position(handle).map(|position| &self.store[position].value)
    }

    pub fn insert<F>(&mut self, value: T, cmp: F) -> Handle
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let position = self.store.len();
        let handle = match self.free_handles.pop() {
            Some(handle) => {
                self.index_by_handle[handle.0] = position;
                handle
            }
            None => {
                self.index_by_handle.push(position);
                Handle(self.index_by_handle.len() - 1)
            }
        };

        self.store.push(Element { value, handle });
        self.sieve_up(handle, cmp);

        handle
    }

    /// Removes an arbitrary element. The element moved into its slot may
    /// belong either above or below it, so it is sifted both ways.
    pub fn remove<F>(&mut self, handle: Handle, cmp: F) -> T
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let position = self.checked_position(handle);

        let element = self.store.swap_remove(position);
        self.index_by_handle[handle.0] = VACANT;
        self.free_handles.push(handle);

        if position < self.store.len() {
            let moved = self.store[position].handle;
            self.index_by_handle[moved.0] = position;
            self.sieve_up(moved, &cmp);
            self.sieve_down(moved, &cmp);
        }

        element.value
    }

    pub fn extract_min<F>(&mut self, cmp: F) -> Option<T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let root = self.store.first()?.handle;
        Some(self.remove(root, cmp))
    }

    pub fn sieve_up<F>(&mut self, handle: Handle, cmp: F)
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let mut position = self.checked_position(handle);

        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.less(position, parent, &cmp) {
                break;
            }
            self.swap_positions(position, parent);
            position = parent;
        }
    }

    pub fn sieve_down<F>(&mut self, handle: Handle, cmp: F)
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let mut position = self.checked_position(handle);

        loop {
            let left = 2 * position + 1;
            let right = left + 1;

            let mut smallest = position;
            if left < self.store.len() && self.less(left, smallest, &cmp) {
                smallest = left;
            }
            if right < self.store.len() && self.less(right, smallest, &cmp) {
                smallest = right;
            }

            if smallest == position {
                break;
            }
            self.swap_positions(position, smallest);
            position = smallest;
        }
    }

    /// Drops every element. Handles handed out before are invalidated and
    /// numbering restarts from zero.
    pub fn clear(&mut self) {
        self.store.clear();
        self.index_by_handle.clear();
        self.free_handles.clear();
    }

    fn checked_position(&self, handle: Handle) -> usize {
        match self.position(handle) {
            Some(position) => position,
            None => panic!("handle {handle:?} does not refer to an element of the heap"),
        }
    }

    fn less<F>(&self, first: usize, second: usize, cmp: &F) -> bool
    where
        F: Fn(&T, &T) -> Ordering,
    {
        cmp(&self.store[first].value, &self.store[second].value) == Ordering::Less
    }

    fn swap_positions(&mut self, first: usize, second: usize) {
        self.store.swap(first, second);
        self.index_by_handle[self.store[first].handle.0] = first;
        self.index_by_handle[self.store[second].handle.0] = second;
    }
}

impl<T> Index<usize> for IndexedHeap<T> {
    type Output = T;

    fn index(&self, position: usize) -> &T {
        &self.store[position].value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashMap;

    fn natural(a: &i64, b: &i64) -> Ordering {
        a.cmp(b)
    }

    fn assert_root_is_min<T: Copy + Ord + std::fmt::Debug>(heap: &IndexedHeap<T>) {
        if let Some(top) = heap.top() {
            for position in 0..heap.len() {
                assert!(*top <= heap[position], "root {top:?} > {:?}", heap[position]);
            }
        }
    }

    #[test]
    fn test_extract_in_order() {
        let mut heap = IndexedHeap::new();
        for value in [5, 3, 9, -1, 7, 3, 0] {
            heap.insert(value, natural);
        }
        assert_eq!(heap.len(), 7);
        assert_eq!(heap.top(), Some(&-1));

        let mut extracted = Vec::new();
        while let Some(value) = heap.extract_min(natural) {
            extracted.push(value);
        }
        assert_eq!(extracted, vec![-1, 0, 3, 3, 5, 7, 9]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_empty_heap() {
        let mut heap: IndexedHeap<i64> = IndexedHeap::new();
        assert!(heap.top().is_none());
        assert!(heap.get(0).is_none());
        assert_eq!(heap.extract_min(natural), None);
    }

    #[test]
    fn test_remove_non_root() {
        let mut heap = IndexedHeap::new();
        let handles: Vec<Handle> = [10, 4, 8, 1, 6, 2]
            .iter()
            .map(|&value| heap.insert(value, natural))
            .collect();

        assert_eq!(heap.remove(handles[2], natural), 8);
        assert_eq!(heap.remove(handles[0], natural), 10);
        assert!(!heap.contains(handles[2]));
        assert_root_is_min(&heap);

        let mut extracted = Vec::new();
        while let Some(value) = heap.extract_min(natural) {
            extracted.push(value);
        }
        assert_eq!(extracted, vec![1, 2, 4, 6]);
    }

    #[test]
    fn test_remove_last_element() {
        let mut heap = IndexedHeap::new();
        heap.insert(1, natural);
        let last = heap.insert(2, natural);

        assert_eq!(heap.remove(last, natural), 2);
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.top(), Some(&1));
    }

    #[test]
    fn test_handle_stability() {
        let mut heap = IndexedHeap::new();
        let handles: Vec<(Handle, i64)> = (0..50)
            .map(|value| (value * 37) % 50)
            .map(|value| (heap.insert(value, natural), value))
            .collect();

        for (handle, _) in handles.iter().step_by(3) {
            heap.remove(*handle, natural);
        }
        let extracted: Vec<i64> = (0..5).filter_map(|_| heap.extract_min(natural)).collect();
        assert_eq!(extracted.len(), 5);

        for (index, (handle, value)) in handles.iter().enumerate() {
            if index % 3 == 0 || extracted.contains(value) {
                assert!(!heap.contains(*handle));
                continue;
            }
            assert_eq!(heap.value(*handle), Some(value));
        }
    }

    #[test]
    fn test_handles_are_recycled() {
        let mut heap = IndexedHeap::new();
        let first = heap.insert(3, natural);
        let second = heap.insert(4, natural);

        heap.remove(first, natural);
        let reused = heap.insert(5, natural);
        assert_eq!(reused, first);
        assert_eq!(heap.value(reused), Some(&5));
        assert_eq!(heap.value(second), Some(&4));

        let fresh = heap.insert(6, natural);
        assert_eq!(fresh.index(), 2);
    }

    #[test]
    fn test_clear_restarts_handles() {
        let mut heap = IndexedHeap::new();
        for value in 0..4 {
            heap.insert(value, natural);
        }
        heap.clear();
        assert!(heap.is_empty());

        let handle = heap.insert(42, natural);
        assert_eq!(handle.index(), 0);
        assert_eq!(heap.top(), Some(&42));
    }

    #[test]
    fn test_external_priority_decrease_and_increase() {
        let mut priorities = vec![10, 20, 30, 40, 50];
        let mut heap = IndexedHeap::new();
        let handles: Vec<Handle> = (0..priorities.len())
            .map(|id| heap.insert(id, |a: &usize, b: &usize| priorities[*a].cmp(&priorities[*b])))
            .collect();
        assert_eq!(heap.top(), Some(&0));

        priorities[4] = 5;
        heap.sieve_up(handles[4], |a: &usize, b: &usize| priorities[*a].cmp(&priorities[*b]));
        assert_eq!(heap.top(), Some(&4));

        priorities[4] = 100;
        heap.sieve_down(handles[4], |a: &usize, b: &usize| priorities[*a].cmp(&priorities[*b]));
        assert_eq!(heap.top(), Some(&0));
        assert_eq!(heap.value(handles[4]), Some(&4));

        let mut order = Vec::new();
        while let Some(id) =
            heap.extract_min(|a: &usize, b: &usize| priorities[*a].cmp(&priorities[*b]))
        {
            order.push(id);
        }
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn test_remove_stale_handle_panics() {
        let mut heap = IndexedHeap::new();
        let handle = heap.insert(1, natural);
        heap.remove(handle, natural);
        heap.remove(handle, natural);
    }

    #[test]
    fn test_random_operations_keep_heap_property() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut priorities: Vec<i64> = Vec::new();
        let mut heap: IndexedHeap<usize> = IndexedHeap::new();
        let mut live: HashMap<Handle, usize> = HashMap::new();

        for _ in 0..3000 {
            let operation = rng.gen_range(0..4);
            match operation {
                0 | 1 => {
                    let id = priorities.len();
                    priorities.push(rng.gen_range(-1000..1000));
                    let handle =
                        heap.insert(id, |a: &usize, b: &usize| priorities[*a].cmp(&priorities[*b]));
                    assert!(live.insert(handle, id).is_none());
                }
                2 if !live.is_empty() => {
                    let handle = *live.keys().nth(rng.gen_range(0..live.len())).unwrap();
                    let id = live[&handle];
                    priorities[id] -= rng.gen_range(0..500);
                    heap.sieve_up(handle, |a: &usize, b: &usize| {
                        priorities[*a].cmp(&priorities[*b])
                    });
                }
                3 if !live.is_empty() => {
                    if rng.gen_bool(0.5) {
                        let handle = *live.keys().nth(rng.gen_range(0..live.len())).unwrap();
                        let id = heap.remove(handle, |a: &usize, b: &usize| {
                            priorities[*a].cmp(&priorities[*b])
                        });
                        assert_eq!(live.remove(&handle), Some(id));
                    } else {
                        let minimum = live.values().map(|id| priorities[*id]).min().unwrap();
                        let id = heap
                            .extract_min(|a: &usize, b: &usize| priorities[*a].cmp(&priorities[*b]))
                            .unwrap();
                        assert_eq!(priorities[id], minimum);
                        live.retain(|_, live_id| *live_id != id);
                    }
                }
                _ => {}
            }

            assert_eq!(heap.len(), live.len());
            if let Some(&top) = heap.top() {
                for position in 0..heap.len() {
                    assert!(priorities[top] <= priorities[heap[position]]);
                }
            }
            for (handle, id) in &live {
                assert_eq!(heap.value(*handle), Some(id));
            }
        }
    }
}
