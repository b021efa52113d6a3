//! Root resolution
//!
//! For every node, find its topmost ancestor under "an edge `u -> v` makes `u` a parent
//! of `v`". A root is a node with no incoming edge. Resolution is a breadth-first walk
//! up the reverse adjacency with an external memo table; no recursion.
//!
//! The resolved root of `n` is the nearest root (fewest parent hops), ties broken by the
//! smallest dense index. That makes the result a pure function of the graph, so the
//! memo can be filled in any order and repeated runs agree. Build the view with nodes in
//! identifier order to get identifier-order tie-breaks.

use super::common::GraphView;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Memo {
    /// Nearest root and its distance in parent hops
    Resolved { root: usize, distance: usize },
    /// No root is reachable; the node maps to itself
    Unresolved,
}

/// Result of resolving every node of a view
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootAssignment {
    /// Dense index -> index of its resolved root (itself when unresolved)
    pub root_of: Vec<usize>,
    /// Dense index -> hops to the resolved root; `None` for the self-mapping fallback
    pub distance: Vec<Option<usize>>,
    /// Dense index -> whether the node is in the root set
    pub is_root: Vec<bool>,
}

impl RootAssignment {
    /// Number of nodes in the root set
    pub fn root_count(&self) -> usize {
        self.is_root.iter().filter(|r| **r).count()
    }

    /// Non-root nodes whose ancestry never reaches a root
    pub fn unresolved(&self) -> impl Iterator<Item = usize> + '_ {
        self.distance
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_none())
            .map(|(idx, _)| idx)
    }

    /// Longest distance from any node to its resolved root
    pub fn max_depth(&self) -> usize {
        self.distance.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Root index -> number of other nodes resolved to it
    pub fn descendant_counts(&self) -> HashMap<usize, usize> {
        let mut counts = HashMap::new();
        for (idx, &root) in self.root_of.iter().enumerate() {
            if idx != root {
                *counts.entry(root).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Memoized upward BFS over a [`GraphView`]
pub struct RootResolver<'a, N> {
    view: &'a GraphView<N>,
    is_root: Vec<bool>,
    memo: Vec<Option<Memo>>,
}

impl<'a, N> RootResolver<'a, N> {
    /// Resolver whose root set is every node with in-degree zero in the view
    pub fn new(view: &'a GraphView<N>) -> Self {
        let is_root = (0..view.node_count).map(|idx| view.in_degree(idx) == 0).collect();
        Self::with_root_set(view, is_root)
    }

    /// Resolver with an explicit root set.
    ///
    /// Use this when the view omits edges that still disqualify a node from being a
    /// root, e.g. edges whose source is not part of the view.
    ///
    /// # Panics
    ///
    /// Panics if `is_root.len()` differs from the view's node count.
    pub fn with_root_set(view: &'a GraphView<N>, is_root: Vec<bool>) -> Self {
        assert_eq!(
            is_root.len(),
            view.node_count,
            "root set must cover every node of the view"
        );
        Self {
            view,
            is_root,
            memo: vec![None; view.node_count],
        }
    }

    /// Whether a node is in the root set
    pub fn is_root(&self, idx: usize) -> bool {
        self.is_root[idx]
    }

    /// Size of the root set
    pub fn root_count(&self) -> usize {
        self.is_root.iter().filter(|r| **r).count()
    }

    /// Resolve one node, returning the index of its root (itself if none is reachable)
    pub fn resolve(&mut self, idx: usize) -> usize {
        match self.lookup(idx) {
            Memo::Resolved { root, .. } => root,
            Memo::Unresolved => idx,
        }
    }

    /// Resolve every node and hand back the finished assignment
    pub fn resolve_all(mut self) -> RootAssignment {
        let n = self.view.node_count;
        let mut root_of = Vec::with_capacity(n);
        let mut distance = Vec::with_capacity(n);

        for idx in 0..n {
            match self.lookup(idx) {
                Memo::Resolved { root, distance: d } => {
                    root_of.push(root);
                    distance.push(Some(d));
                }
                Memo::Unresolved => {
                    root_of.push(idx);
                    distance.push(None);
                }
            }
        }

        RootAssignment {
            root_of,
            distance,
            is_root: self.is_root,
        }
    }

    fn lookup(&mut self, idx: usize) -> Memo {
        if let Some(memo) = self.memo[idx] {
            return memo;
        }
        if self.is_root[idx] {
            let memo = Memo::Resolved { root: idx, distance: 0 };
            self.memo[idx] = Some(memo);
            return memo;
        }
        self.walk_up(idx)
    }

    fn walk_up(&mut self, start: usize) -> Memo {
        // index -> (BFS tree parent, depth)
        let mut discovered: HashMap<usize, (Option<usize>, usize)> = HashMap::new();
        let mut queue = VecDeque::new();
        discovered.insert(start, (None, 0));
        queue.push_back(start);

        // (distance, root, node that supplied the candidate)
        let mut best: Option<(usize, usize, usize)> = None;

        while let Some(current) = queue.pop_front() {
            let depth = discovered[&current].1;
            if let Some((best_distance, _, _)) = best {
                if depth > best_distance {
                    break;
                }
            }

            let candidate = if self.is_root[current] {
                Some((depth, current))
            } else {
                match self.memo[current] {
                    Some(Memo::Resolved { root, distance }) if current != start => {
                        Some((depth + distance, root))
                    }
                    // Nothing above this node reaches a root
                    Some(Memo::Unresolved) if current != start => continue,
                    _ => None,
                }
            };

            if let Some((distance, root)) = candidate {
                let better = match best {
                    None => true,
                    Some((best_distance, best_root, _)) => {
                        (distance, root) < (best_distance, best_root)
                    }
                };
                if better {
                    best = Some((distance, root, current));
                }
                continue;
            }

            // Parents would sit past the best distance already found
            if let Some((best_distance, _, _)) = best {
                if depth + 1 > best_distance {
                    continue;
                }
            }

            for &parent in self.view.predecessors(current) {
                if !discovered.contains_key(&parent) {
                    discovered.insert(parent, (Some(current), depth + 1));
                    queue.push_back(parent);
                }
            }
        }

        match best {
            Some((distance, root, via)) => {
                // Every node on the BFS tree path lies on a shortest path to `root`,
                // so it resolves to the same root.
                let mut cursor = Some(via);
                while let Some(node) = cursor {
                    let (parent, depth) = discovered[&node];
                    if self.memo[node].is_none() {
                        self.memo[node] = Some(Memo::Resolved {
                            root,
                            distance: distance - depth,
                        });
                    }
                    cursor = parent;
                }
                Memo::Resolved { root, distance }
            }
            None => {
                // The whole ancestry was exhausted without a root
                for node in discovered.keys() {
                    if self.memo[*node].is_none() {
                        self.memo[*node] = Some(Memo::Unresolved);
                    }
                }
                Memo::Unresolved
            }
        }
    }
}

/// Resolve every node of a view using its in-degree-zero nodes as the root set
pub fn resolve_roots<N>(view: &GraphView<N>) -> RootAssignment {
    RootResolver::new(view).resolve_all()
}
