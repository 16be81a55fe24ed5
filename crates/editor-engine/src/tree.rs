//! Weighted implicit treap.
//!
//! A balanced sequence keyed by position. Every item reports a byte weight and each node caches
//! the total weight and item count of its subtree, so "which item contains byte N", "how many
//! bytes precede item K" and splicing a run of items are all O(log n) expected.
//!
//! Both the piece table ([`crate::storage`]) and the line index ([`crate::line_index`]) are
//! built on top of this structure.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::ops::Range;

const PRIORITY_SEED: u64 = 0x5eed_1e55_d0c5_f00d;

/// An item stored in a [`WeightTree`].
pub(crate) trait Weighted {
    /// Number of bytes this item covers.
    fn weight(&self) -> usize;
}

impl Weighted for usize {
    fn weight(&self) -> usize {
        *self
    }
}

type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug, Clone)]
struct Node<T> {
    item: T,
    priority: u32,
    total: usize,
    count: usize,
    left: Link<T>,
    right: Link<T>,
}

impl<T: Weighted> Node<T> {
    fn new(item: T, priority: u32) -> Self {
        Self {
            total: item.weight(),
            item,
            priority,
            count: 1,
            left: None,
            right: None,
        }
    }

    fn update(&mut self) {
        self.total = self.item.weight() + total(&self.left) + total(&self.right);
        self.count = 1 + count(&self.left) + count(&self.right);
    }
}

fn total<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |node| node.total)
}

fn count<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |node| node.count)
}

fn merge<T: Weighted>(left: Link<T>, right: Link<T>) -> Link<T> {
    match (left, right) {
        (None, right) => right,
        (left, None) => left,
        (Some(mut l), Some(mut r)) => {
            if l.priority >= r.priority {
                l.right = merge(l.right.take(), Some(r));
                l.update();
                Some(l)
            } else {
                r.left = merge(Some(l), r.left.take());
                r.update();
                Some(r)
            }
        }
    }
}

/// Split into the first `index` items and the remainder.
fn split<T: Weighted>(link: Link<T>, index: usize) -> (Link<T>, Link<T>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let left_count = count(&node.left);
    if index <= left_count {
        let (l, r) = split(node.left.take(), index);
        node.left = r;
        node.update();
        (l, Some(node))
    } else {
        let (l, r) = split(node.right.take(), index - left_count - 1);
        node.right = l;
        node.update();
        (Some(node), r)
    }
}

/// Build a treap from items in order in O(n) (Cartesian tree construction over the right spine).
fn build<T: Weighted>(items: impl IntoIterator<Item = T>, rng: &mut SmallRng) -> Link<T> {
    let mut spine: Vec<Box<Node<T>>> = Vec::new();

    for item in items {
        let mut node = Box::new(Node::new(item, rng.next_u32()));
        let mut last: Link<T> = None;
        while let Some(mut top) = spine.pop_if(|top| top.priority < node.priority) {
            top.right = last;
            top.update();
            last = Some(top);
        }
        node.left = last;
        spine.push(node);
    }

    let mut last: Link<T> = None;
    while let Some(mut top) = spine.pop() {
        top.right = last;
        top.update();
        last = Some(top);
    }
    last
}

/// Balanced sequence of weighted items.
#[derive(Debug, Clone)]
pub(crate) struct WeightTree<T> {
    root: Link<T>,
    rng: SmallRng,
}

impl<T: Weighted> WeightTree<T> {
    pub(crate) fn new() -> Self {
        Self {
            root: None,
            rng: SmallRng::seed_from_u64(PRIORITY_SEED),
        }
    }

    pub(crate) fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut rng = SmallRng::seed_from_u64(PRIORITY_SEED);
        let root = build(items, &mut rng);
        Self { root, rng }
    }

    /// Number of items.
    pub(crate) fn len(&self) -> usize {
        count(&self.root)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Sum of all item weights.
    pub(crate) fn total_weight(&self) -> usize {
        total(&self.root)
    }

    pub(crate) fn get(&self, mut index: usize) -> Option<&T> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let left_count = count(&node.left);
            if index < left_count {
                current = node.left.as_deref();
            } else if index == left_count {
                return Some(&node.item);
            } else {
                index -= left_count + 1;
                current = node.right.as_deref();
            }
        }
        None
    }

    pub(crate) fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Find the item covering byte `offset`.
    ///
    /// Returns `(index, weight before the item)`, or `None` when `offset >= total_weight()`.
    /// Zero-weight items never cover an offset.
    pub(crate) fn locate(&self, mut offset: usize) -> Option<(usize, usize)> {
        let mut current = self.root.as_deref();
        let mut index_base = 0;
        let mut weight_base = 0;

        while let Some(node) = current {
            let left_total = total(&node.left);
            if offset < left_total {
                current = node.left.as_deref();
                continue;
            }

            let weight = node.item.weight();
            let own_index = index_base + count(&node.left);
            if offset < left_total + weight {
                return Some((own_index, weight_base + left_total));
            }

            offset -= left_total + weight;
            weight_base += left_total + weight;
            index_base = own_index + 1;
            current = node.right.as_deref();
        }
        None
    }

    /// Total weight of the first `index` items.
    pub(crate) fn weight_before(&self, mut index: usize) -> usize {
        let mut current = self.root.as_deref();
        let mut acc = 0;
        while let Some(node) = current {
            let left_count = count(&node.left);
            if index <= left_count {
                current = node.left.as_deref();
            } else {
                acc += total(&node.left) + node.item.weight();
                index -= left_count + 1;
                current = node.right.as_deref();
            }
        }
        acc
    }

    /// Replace the items in `range` with `items`.
    pub(crate) fn splice(&mut self, range: Range<usize>, items: impl IntoIterator<Item = T>) {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        let (head, rest) = split(self.root.take(), start);
        let (_removed, tail) = split(rest, end - start);
        let middle = build(items, &mut self.rng);
        self.root = merge(merge(head, middle), tail);
    }

    pub(crate) fn insert(&mut self, index: usize, item: T) {
        self.splice(index..index, std::iter::once(item));
    }

    pub(crate) fn push(&mut self, item: T) {
        let len = self.len();
        self.splice(len..len, std::iter::once(item));
    }

    /// Replace every item, reusing the priority generator.
    pub(crate) fn rebuild(&mut self, items: impl IntoIterator<Item = T>) {
        self.root = build(items, &mut self.rng);
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        self.iter_from(0)
    }

    /// In-order iterator starting at item `index`.
    pub(crate) fn iter_from(&self, mut index: usize) -> Iter<'_, T> {
        let mut stack = Vec::new();
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let left_count = count(&node.left);
            if index < left_count {
                stack.push(node);
                current = node.left.as_deref();
            } else if index == left_count {
                stack.push(node);
                break;
            } else {
                index -= left_count + 1;
                current = node.right.as_deref();
            }
        }
        Iter { stack }
    }
}

impl<T: Weighted> Default for WeightTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mut current = node.right.as_deref();
        while let Some(child) = current {
            self.stack.push(child);
            current = child.left.as_deref();
        }
        Some(&node.item)
    }
}
