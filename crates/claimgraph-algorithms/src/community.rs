//! Community detection algorithms
//!
//! Weakly Connected Components over a `GraphView`.

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

/// Result of WCC algorithm
#[derive(Debug, Clone, Default)]
pub struct WccResult {
    /// Components in order of their lowest dense index; members in index order
    pub components: Vec<Vec<NodeId>>,
    /// Map of NodeId -> position in `components`
    pub node_component: HashMap<NodeId, usize>,
}

impl WccResult {
    /// Components with at least `min_size` members
    pub fn components_of_size(&self, min_size: usize) -> impl Iterator<Item = &Vec<NodeId>> {
        self.components.iter().filter(move |c| c.len() >= min_size)
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i == root_j {
            return;
        }
        if self.rank[root_i] < self.rank[root_j] {
            self.parent[root_i] = root_j;
        } else if self.rank[root_i] > self.rank[root_j] {
            self.parent[root_j] = root_i;
        } else {
            self.parent[root_j] = root_i;
            self.rank[root_i] += 1;
        }
    }
}

/// Weakly Connected Components (WCC)
///
/// Finds all disjoint subgraphs in the graph.
/// Ignores edge direction.
pub fn weakly_connected_components(view: &GraphView) -> WccResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.successors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    let mut root_to_component: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<NodeId>> = Vec::new();
    let mut node_component = HashMap::with_capacity(n);

    for i in 0..n {
        let root = uf.find(i);
        let component = *root_to_component.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        let node_id = view.index_to_node[i];
        components[component].push(node_id);
        node_component.insert(node_id, component);
    }

    WccResult {
        components,
        node_component,
    }
}
