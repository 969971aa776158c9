//!
//! A disjoint-set (union-find) structure with path compression and
//! union-by-rank, used by the [connected-component extractor](crate::fragment::components)
//! to merge vertices and triangles that share a position into topological
//! islands.
//!

///
/// Disjoint-set over `0..size`, with path compression in [UnionFind::find]
/// and union-by-rank in [UnionFind::union].
///
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    /// Creates a new disjoint-set where every element is its own root.
    pub fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns true if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    ///
    /// Finds the root of `x`, compressing the path from `x` to the root as it goes.
    ///
    pub fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    ///
    /// Unions the sets containing `x` and `y` by rank. Returns the resulting root.
    ///
    pub fn union(&mut self, x: usize, y: usize) -> usize {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return rx;
        }
        if self.rank[rx] < self.rank[ry] {
            self.parent[rx] = ry;
            ry
        } else if self.rank[rx] > self.rank[ry] {
            self.parent[ry] = rx;
            rx
        } else {
            self.parent[ry] = rx;
            self.rank[rx] += 1;
            rx
        }
    }

    ///
    /// Unions the sets containing `x` and `y`, preferring `x` as the surviving root
    /// when the ranks tie (and even when they don't, since the component extractor
    /// relies on the lower, non-cut index remaining a valid root). Used where the
    /// caller needs a specific element to win ties, rather than an arbitrary one.
    ///
    pub fn union_preferring(&mut self, x: usize, y: usize) -> usize {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return rx;
        }
        self.parent[ry] = rx;
        if self.rank[rx] <= self.rank[ry] {
            self.rank[rx] = self.rank[ry] + 1;
        }
        rx
    }

    /// Direct read access to the parent array, e.g. to read out roots after a full `find` pass.
    pub fn parents(&self) -> &[usize] {
        &self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find_ten_elements() {
        let mut uf = UnionFind::new(10);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(1, 3);
        uf.union(5, 6);

        assert_eq!(uf.find(0), uf.find(2));
        assert_eq!(uf.find(0), uf.find(3));
        assert_eq!(uf.find(5), uf.find(6));
        assert_ne!(uf.find(5), uf.find(0));
        assert_eq!(uf.find(4), 4);
    }

    #[test]
    fn test_find_is_idempotent_after_compression() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(1, 2);
        uf.union(2, 3);
        for x in 0..4 {
            let root = uf.find(x);
            assert_eq!(uf.find(root), root);
        }
    }

    #[test]
    fn test_union_preferring_keeps_x_as_root() {
        let mut uf = UnionFind::new(4);
        let root = uf.union_preferring(0, 3);
        assert_eq!(root, 0);
        assert_eq!(uf.find(3), 0);
    }
}
