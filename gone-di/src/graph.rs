//! Cycle detection and topological ordering over arbitrary node types.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A dependency cycle, where the first and last nodes are the same.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Cycle<N>(pub Vec<N>);

/// Orders nodes so that every prerequisite comes before its dependents. The input maps a node to
/// its prerequisites; prerequisites which are not keys are treated as nodes without any.
///
/// Among nodes ready at the same time, the one with the lower key is processed first, which makes
/// the order deterministic.
pub fn topological_order<N: Ord + Copy>(
    prerequisites: &BTreeMap<N, Vec<N>>,
) -> Result<Vec<N>, Cycle<N>> {
    let mut in_degree: BTreeMap<N, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<N, Vec<N>> = BTreeMap::new();

    for (node, node_prerequisites) in prerequisites {
        in_degree.entry(*node).or_insert(0);

        for prerequisite in node_prerequisites.iter().collect::<BTreeSet<_>>() {
            in_degree.entry(*prerequisite).or_insert(0);
            *in_degree.entry(*node).or_insert(0) += 1;
            dependents.entry(*prerequisite).or_default().push(*node);
        }
    }

    let mut queue: VecDeque<N> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(node, _)| *node)
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(node) = queue.pop_front() {
        order.push(node);

        for dependent in dependents.get(&node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*dependent);
                }
            }
        }
    }

    if order.len() == in_degree.len() {
        return Ok(order);
    }

    let residual: BTreeSet<N> = in_degree
        .into_iter()
        .filter(|(_, degree)| *degree > 0)
        .map(|(node, _)| node)
        .collect();

    Err(find_cycle(prerequisites, &residual))
}

fn find_cycle<N: Ord + Copy>(prerequisites: &BTreeMap<N, Vec<N>>, residual: &BTreeSet<N>) -> Cycle<N> {
    let mut visited = BTreeSet::new();
    for start in residual {
        let mut path = Vec::new();
        if let Some(cycle) = visit(*start, prerequisites, residual, &mut visited, &mut path) {
            return Cycle(cycle);
        }
    }

    // every residual node lies on or behind a cycle, so the search above always succeeds
    Cycle(residual.iter().copied().collect())
}

fn visit<N: Ord + Copy>(
    node: N,
    prerequisites: &BTreeMap<N, Vec<N>>,
    residual: &BTreeSet<N>,
    visited: &mut BTreeSet<N>,
    path: &mut Vec<N>,
) -> Option<Vec<N>> {
    if let Some(position) = path.iter().position(|on_path| *on_path == node) {
        let mut cycle = path[position..].to_vec();
        cycle.push(node);
        return Some(cycle);
    }

    if !visited.insert(node) {
        return None;
    }

    path.push(node);
    for prerequisite in prerequisites
        .get(&node)
        .into_iter()
        .flatten()
        .filter(|prerequisite| residual.contains(prerequisite))
    {
        if let Some(cycle) = visit(*prerequisite, prerequisites, residual, visited, path) {
            return Some(cycle);
        }
    }

    path.pop();
    None
}
