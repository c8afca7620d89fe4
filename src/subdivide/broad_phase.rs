//! Broad-phase strategies: own BVH, sweep-and-prune, and parry's `Qbvh`.

use crate::aabb::Aabb;
use crate::bvh::Bvh;
use crate::subdivide::traits::BroadPhase;

/// Median-split BVH.
#[derive(Debug, Clone, Copy)]
pub struct BvhBroadPhase {
    pub leaf_size: usize,
}

impl BroadPhase for BvhBroadPhase {
    fn candidate_pairs(&self, boxes: &[Aabb]) -> Vec<(usize, usize)> {
        Bvh::build(boxes, self.leaf_size).self_pairs(boxes)
    }
}

/// Sort by `x` and sweep an active list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepAndPrune;

impl BroadPhase for SweepAndPrune {
    fn candidate_pairs(&self, boxes: &[Aabb]) -> Vec<(usize, usize)> {
        let mut order: Vec<usize> = (0..boxes.len()).collect();
        order.sort_by(|&a, &b| boxes[a].mins.x.total_cmp(&boxes[b].mins.x).then(a.cmp(&b)));

        let mut active: Vec<usize> = Vec::new();
        let mut pairs = Vec::new();
        for &i in &order {
            active.retain(|&j| boxes[j].maxs.x >= boxes[i].mins.x);
            pairs.extend(
                active
                    .iter()
                    .filter(|&&j| boxes[i].intersects(&boxes[j]))
                    .map(|&j| (i.min(j), i.max(j))),
            );
            active.push(i);
        }
        pairs.sort_unstable();
        pairs
    }
}

/// Delegates the hierarchy to `parry3d`.
#[cfg(feature = "parry")]
#[derive(Debug, Clone, Copy, Default)]
pub struct QbvhBroadPhase;

#[cfg(feature = "parry")]
impl BroadPhase for QbvhBroadPhase {
    fn candidate_pairs(&self, boxes: &[Aabb]) -> Vec<(usize, usize)> {
        use crate::float_types::parry3d::bounding_volume::Aabb as ParryAabb;
        use crate::float_types::parry3d::partitioning::Qbvh;

        let mut qbvh: Qbvh<usize> = Qbvh::new();
        let leaves: Vec<(usize, ParryAabb)> = boxes
            .iter()
            .enumerate()
            .map(|(i, aabb)| (i, aabb.padded().into()))
            .collect();
        qbvh.clear_and_rebuild(leaves.into_iter(), 0.0);

        let mut pairs = Vec::new();
        let mut hits = Vec::new();
        for (i, aabb) in boxes.iter().enumerate() {
            hits.clear();
            qbvh.intersect_aabb(&aabb.padded().into(), &mut hits);
            // padded query, exact filter
            pairs.extend(
                hits.iter()
                    .filter(|&&j| j > i && aabb.intersects(&boxes[j]))
                    .map(|&j| (i, j)),
            );
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn boxes() -> Vec<Aabb> {
        (0..30)
            .map(|i| {
                let x = (i * 7 % 11) as f64 * 0.5;
                let y = (i % 3) as f64;
                Aabb::new(Point3::new(x, y, 0.0), Point3::new(x + 1.0, y + 1.0, 1.0))
            })
            .collect()
    }

    #[test]
    fn strategies_agree() {
        let boxes = boxes();
        let reference = BvhBroadPhase { leaf_size: 4 }.candidate_pairs(&boxes);
        assert!(!reference.is_empty());
        assert_eq!(SweepAndPrune.candidate_pairs(&boxes), reference);
        #[cfg(feature = "parry")]
        assert_eq!(QbvhBroadPhase.candidate_pairs(&boxes), reference);
    }
}
