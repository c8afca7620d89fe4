//! Bounding volume hierarchy over facet boxes.
//!
//! Median split along the longest axis of each node. Queries return every
//! leaf whose box intersects the query box (closed intervals), so facets
//! that merely touch are reported as candidates.

use crate::aabb::Aabb;

#[derive(Debug)]
enum BvhNode {
    Leaf { aabb: Aabb, items: Vec<usize> },
    Internal { aabb: Aabb, left: Box<BvhNode>, right: Box<BvhNode> },
}

impl BvhNode {
    const fn aabb(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Static BVH over a slice of boxes, addressed by slice index.
#[derive(Debug)]
pub struct Bvh {
    root: Option<BvhNode>,
    len: usize,
}

impl Bvh {
    pub fn build(boxes: &[Aabb], max_leaf_size: usize) -> Self {
        if boxes.is_empty() {
            return Self { root: None, len: 0 };
        }
        let indices: Vec<usize> = (0..boxes.len()).collect();
        Self {
            root: Some(Self::build_recursive(boxes, indices, max_leaf_size.max(1))),
            len: boxes.len(),
        }
    }

    fn build_recursive(boxes: &[Aabb], mut indices: Vec<usize>, max_leaf_size: usize) -> BvhNode {
        let aabb = indices
            .iter()
            .fold(Aabb::empty(), |acc, &i| acc.merged(&boxes[i]));

        if indices.len() <= max_leaf_size {
            return BvhNode::Leaf { aabb, items: indices };
        }

        let axis = aabb.longest_axis();
        indices.sort_by(|&a, &b| boxes[a].center()[axis].total_cmp(&boxes[b].center()[axis]));
        let right = indices.split_off(indices.len() / 2);

        BvhNode::Internal {
            aabb,
            left: Box::new(Self::build_recursive(boxes, indices, max_leaf_size)),
            right: Box::new(Self::build_recursive(boxes, right, max_leaf_size)),
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of all boxes that intersect `query`, unordered.
    pub fn query(&self, boxes: &[Aabb], query: &Aabb, out: &mut Vec<usize>) {
        let Some(root) = &self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !node.aabb().intersects(query) {
                continue;
            }
            match node {
                BvhNode::Leaf { items, .. } => {
                    out.extend(items.iter().copied().filter(|&i| boxes[i].intersects(query)));
                },
                BvhNode::Internal { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                },
            }
        }
    }

    /// All unordered pairs `(i, j)`, `i < j`, of intersecting boxes, sorted.
    pub fn self_pairs(&self, boxes: &[Aabb]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let mut hits = Vec::new();
        for (i, aabb) in boxes.iter().enumerate() {
            hits.clear();
            self.query(boxes, aabb, &mut hits);
            pairs.extend(hits.iter().filter(|&&j| j > i).map(|&j| (i, j)));
        }
        pairs.sort_unstable();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn unit_box_at(x: f64) -> Aabb {
        Aabb::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
    }

    #[test]
    fn pairs_match_brute_force() {
        let boxes: Vec<Aabb> = (0..40).map(|i| unit_box_at(i as f64 * 0.7)).collect();
        let bvh = Bvh::build(&boxes, 3);
        assert_eq!(bvh.len(), 40);

        let mut expected = Vec::new();
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                if boxes[i].intersects(&boxes[j]) {
                    expected.push((i, j));
                }
            }
        }
        assert_eq!(bvh.self_pairs(&boxes), expected);
    }

    #[test]
    fn empty_bvh_reports_nothing() {
        let bvh = Bvh::build(&[], 8);
        assert!(bvh.is_empty());
        assert!(bvh.self_pairs(&[]).is_empty());
    }
}
