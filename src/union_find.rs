//! Disjoint-set forest used by the clustering and labelling stages.

/// Union-find with path compression and union by rank.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets of `a` and `b`; returns `false` if they were already merged.
    pub(crate) fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            },
        }
        true
    }

    /// Dense group id per element, numbered in order of each group's lowest element.
    pub(crate) fn labels(&mut self) -> (Vec<usize>, usize) {
        let n = self.parent.len();
        let mut root_label = vec![usize::MAX; n];
        let mut labels = Vec::with_capacity(n);
        let mut count = 0;
        for x in 0..n {
            let root = self.find(x);
            if root_label[root] == usize::MAX {
                root_label[root] = count;
                count += 1;
            }
            labels.push(root_label[root]);
        }
        (labels, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_lowest_member() {
        let mut uf = UnionFind::new(5);
        assert!(uf.union(3, 1));
        assert!(uf.union(4, 2));
        assert!(!uf.union(1, 3));
        let (labels, count) = uf.labels();
        assert_eq!(count, 3);
        assert_eq!(labels, vec![0, 1, 2, 1, 2]);
    }
}
