/// A disjoint-set forest over a fixed universe of vertex ids.
///
/// Tracks which vertices have been contracted into the same cluster.
/// Every id starts as its own singleton class; `union` merges two classes
/// and `find` returns the class representative. Union-by-rank with path
/// compression gives near-constant amortized operations.
///
/// The universe is sized at construction and never grows: a solve over n
/// input points allocates 2n ids up front, because at most n − 1 merges
/// can occur and each merge mints one fresh id.
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    nr_roots: usize,
}

impl UnionFind {
    /// Creates a forest of `nr_elements` singleton classes.
    pub fn new(nr_elements: usize) -> Self {
        UnionFind {
            parent: (0..nr_elements).collect(),
            rank: vec![0; nr_elements],
            nr_roots: nr_elements,
        }
    }

    /// Returns the representative of the class containing `x`, compressing
    /// the path walked along the way.
    ///
    /// # Panics
    ///
    /// Panics if `x` is outside the universe.
    pub fn find(&mut self, x: usize) -> usize {
        assert!(x < self.parent.len());

        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Second pass: point everything on the walked path at the root.
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }

        root
    }

    /// Merges the classes containing `a` and `b`. Merging a class with
    /// itself is a no-op.
    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }

        self.nr_roots -= 1;
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    /// Number of distinct classes currently in the forest.
    pub fn count(&self) -> usize {
        self.nr_roots
    }

    /// Size of the universe the forest was built over.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if the universe is empty.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}
