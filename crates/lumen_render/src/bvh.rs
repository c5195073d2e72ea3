//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and reference their children by index. The tree
//! is built breadth-first from a task queue, and traversal walks it with an
//! explicit stack supplied by the caller, so neither phase recurses.

use std::collections::VecDeque;

use lumen_math::{axis_component, Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitCache, Primitive};

/// Maximum primitives per leaf node before splitting.
pub const LEAF_MAX_SIZE: usize = 8;

/// Depth from which the midpoint split is no longer attempted.
pub const MAX_SPLIT_DEPTH: u32 = 64;

/// BVH node - either an interior node with two children or a leaf with a
/// contiguous range of primitives.
#[derive(Debug, Clone, Copy)]
pub enum BvhNode {
    Interior { bbox: Aabb, left: u32, right: u32 },
    Leaf { bbox: Aabb, start: u32, end: u32 },
}

impl BvhNode {
    const PLACEHOLDER: BvhNode = BvhNode::Leaf {
        bbox: Aabb::EMPTY,
        start: 0,
        end: 0,
    };

    pub fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Interior { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Build statistics, logged after every build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub primitive_count: usize,
    pub node_count: usize,
    pub leaf_count: usize,
    pub max_depth: u32,
    /// Splits that fell back to a count median
    pub fallback_splits: usize,
}

/// Scratch stack for traversal. Keep one per worker and reuse it.
#[derive(Debug, Default)]
pub struct TraversalStack {
    nodes: Vec<u32>,
}

impl TraversalStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }
}

/// Primitive plus the data the builder keeps reading while partitioning.
struct BuildEntry<P> {
    primitive: P,
    bbox: Aabb,
    centroid: Vec3,
}

/// Range of entries whose node slot has been reserved but not yet filled.
struct BuildTask {
    node: u32,
    start: usize,
    end: usize,
    depth: u32,
}

/// Bounding volume hierarchy over primitives of type `P`.
#[derive(Debug)]
pub struct Bvh<P> {
    nodes: Vec<BvhNode>,
    primitives: Vec<P>,
    stats: BvhStats,
}

impl<P: Primitive> Bvh<P> {
    /// Build a BVH from primitives and their bounding boxes.
    ///
    /// Splits at the midpoint of the widest centroid extent. When that leaves
    /// one side empty, or the depth bound is reached, the range is split at
    /// its count median instead.
    pub fn new(items: impl IntoIterator<Item = (P, Aabb)>) -> Self {
        let mut entries: Vec<BuildEntry<P>> = items
            .into_iter()
            .map(|(primitive, bbox)| BuildEntry {
                primitive,
                bbox,
                centroid: bbox.centroid(),
            })
            .collect();

        let mut stats = BvhStats {
            primitive_count: entries.len(),
            ..Default::default()
        };
        let mut nodes = Vec::new();

        if !entries.is_empty() {
            nodes.reserve(2 * entries.len().div_ceil(LEAF_MAX_SIZE));
            nodes.push(BvhNode::PLACEHOLDER);

            let mut queue = VecDeque::new();
            queue.push_back(BuildTask {
                node: 0,
                start: 0,
                end: entries.len(),
                depth: 0,
            });

            while let Some(task) = queue.pop_front() {
                let range = &mut entries[task.start..task.end];
                stats.max_depth = stats.max_depth.max(task.depth);

                let mut bbox = Aabb::EMPTY;
                let mut centroid_bounds = Aabb::EMPTY;
                for entry in range.iter() {
                    bbox.extend_box(&entry.bbox);
                    centroid_bounds.extend_point(entry.centroid);
                }

                if range.len() <= LEAF_MAX_SIZE {
                    nodes[task.node as usize] = BvhNode::Leaf {
                        bbox,
                        start: task.start as u32,
                        end: task.end as u32,
                    };
                    stats.leaf_count += 1;
                    continue;
                }

                let axis = centroid_bounds.longest_axis();
                let mut split = 0;
                if task.depth < MAX_SPLIT_DEPTH {
                    let midpoint = axis_component(centroid_bounds.centroid(), axis);
                    split = partition_in_place(range, |e| axis_component(e.centroid, axis) < midpoint);
                }
                if split == 0 || split == range.len() {
                    split = range.len() / 2;
                    range.select_nth_unstable_by(split, |a, b| {
                        axis_component(a.centroid, axis).total_cmp(&axis_component(b.centroid, axis))
                    });
                    stats.fallback_splits += 1;
                }

                let left = nodes.len() as u32;
                nodes.push(BvhNode::PLACEHOLDER);
                nodes.push(BvhNode::PLACEHOLDER);
                nodes[task.node as usize] = BvhNode::Interior {
                    bbox,
                    left,
                    right: left + 1,
                };

                let mid = task.start + split;
                queue.push_back(BuildTask {
                    node: left,
                    start: task.start,
                    end: mid,
                    depth: task.depth + 1,
                });
                queue.push_back(BuildTask {
                    node: left + 1,
                    start: mid,
                    end: task.end,
                    depth: task.depth + 1,
                });
            }
        }

        stats.node_count = nodes.len();
        log::info!(
            "BVH built: {} primitives, {} nodes, {} leaves, max depth {}, {} fallback splits",
            stats.primitive_count,
            stats.node_count,
            stats.leaf_count,
            stats.max_depth,
            stats.fallback_splits
        );

        Self {
            nodes,
            primitives: entries.into_iter().map(|e| e.primitive).collect(),
            stats,
        }
    }

    /// Find the nearest intersection within `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval, stack: &mut TraversalStack) -> Option<HitCache> {
        if self.nodes.is_empty() {
            return None;
        }

        stack.nodes.clear();
        stack.nodes.push(0);

        let mut nearest = None;
        let mut closest = ray_t.max;
        let mut cache = HitCache::default();

        while let Some(index) = stack.nodes.pop() {
            let interval = Interval::new(ray_t.min, closest);
            match self.nodes[index as usize] {
                BvhNode::Leaf { bbox, start, end } => {
                    if !bbox.hit(ray, interval) {
                        continue;
                    }
                    for primitive in &self.primitives[start as usize..end as usize] {
                        if primitive.hit(ray, Interval::new(ray_t.min, closest), &mut cache) {
                            closest = cache.t;
                            nearest = Some(cache);
                        }
                    }
                }
                BvhNode::Interior { bbox, left, right } => {
                    if bbox.hit(ray, interval) {
                        stack.nodes.push(right);
                        stack.nodes.push(left);
                    }
                }
            }
        }

        nearest
    }

    /// True if anything intersects the ray within `ray_t`. Stops at the first hit.
    pub fn hit_fast(&self, ray: &Ray, ray_t: Interval, stack: &mut TraversalStack) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        stack.nodes.clear();
        stack.nodes.push(0);

        while let Some(index) = stack.nodes.pop() {
            match self.nodes[index as usize] {
                BvhNode::Leaf { bbox, start, end } => {
                    if !bbox.hit(ray, ray_t) {
                        continue;
                    }
                    if self.primitives[start as usize..end as usize]
                        .iter()
                        .any(|p| p.hit_fast(ray, ray_t))
                    {
                        return true;
                    }
                }
                BvhNode::Interior { bbox, left, right } => {
                    if bbox.hit(ray, ray_t) {
                        stack.nodes.push(right);
                        stack.nodes.push(left);
                    }
                }
            }
        }

        false
    }

    /// Bounds of the whole tree (EMPTY for an empty tree).
    pub fn bounding_box(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |n| *n.bbox())
    }

    pub fn stats(&self) -> &BvhStats {
        &self.stats
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Primitives in leaf order.
    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    /// `start..end` primitive range of every leaf, in node order.
    pub fn leaf_ranges(&self) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
        self.nodes.iter().filter_map(|node| match *node {
            BvhNode::Leaf { start, end, .. } => Some(start as usize..end as usize),
            BvhNode::Interior { .. } => None,
        })
    }
}

/// Move every item satisfying `pred` to the front. Returns how many did.
fn partition_in_place<T>(items: &mut [T], pred: impl Fn(&T) -> bool) -> usize {
    let mut first = 0;
    for i in 0..items.len() {
        if pred(&items[i]) {
            items.swap(first, i);
            first += 1;
        }
    }
    first
}
