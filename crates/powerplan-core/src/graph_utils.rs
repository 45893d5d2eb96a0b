use std::collections::{HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};

/// Weakly connected components of a directed graph (breadth-first search,
/// following edges in both directions).
///
/// Components are returned in order of their lowest node index, and the
/// members of each component are sorted by index, so the result is stable
/// for a given graph.
pub fn weak_components<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let mut visited = HashSet::new();
    let mut components = Vec::new();
    for start in graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(node);
            for neighbor in graph.neighbors_undirected(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        members.sort();
        components.push(members);
    }
    components
}
