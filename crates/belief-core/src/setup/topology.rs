//! Topology Generators
//!
//! Seeded graph generators used by the scenario presets. Every generator
//! returns undirected edges as `(u, v)` with `u < v`, sorted, so the same
//! RNG state always yields the same edge list.

use rand::Rng;
use std::collections::BTreeSet;

use crate::error::NetworkError;

/// Undirected edge list with `u < v`
pub type EdgeList = Vec<(usize, usize)>;

fn ordered(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

fn collect(adjacency: &[BTreeSet<usize>]) -> EdgeList {
    let mut edges = BTreeSet::new();
    for (u, neighbors) in adjacency.iter().enumerate() {
        for &v in neighbors {
            edges.insert(ordered(u, v));
        }
    }
    edges.into_iter().collect()
}

/// Every node joined to its `k / 2` nearest neighbors on each side of a ring.
pub fn ring_lattice(n: usize, k: usize) -> EdgeList {
    collect(&lattice_adjacency(n, k))
}

fn lattice_adjacency(n: usize, k: usize) -> Vec<BTreeSet<usize>> {
    let mut adjacency = vec![BTreeSet::new(); n];
    if n < 2 {
        return adjacency;
    }
    for u in 0..n {
        for j in 1..=(k / 2) {
            let v = (u + j) % n;
            if v != u {
                adjacency[u].insert(v);
                adjacency[v].insert(u);
            }
        }
    }
    adjacency
}

/// Complete graph on `n` nodes.
pub fn complete(n: usize) -> EdgeList {
    (0..n)
        .flat_map(|u| ((u + 1)..n).map(move |v| (u, v)))
        .collect()
}

/// Small-world graph: a ring lattice whose edges are each rewired to a
/// random new endpoint with probability `p`. `k >= n` gives a complete graph.
pub fn watts_strogatz<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> Result<EdgeList, NetworkError> {
    if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
        return Err(NetworkError::InvalidParameter {
            name: "rewire_probability",
            value: p,
        });
    }
    if k >= n {
        return Ok(complete(n));
    }

    let mut adjacency = lattice_adjacency(n, k);
    for j in 1..=(k / 2) {
        for u in 0..n {
            let v = (u + j) % n;
            if rng.gen::<f64>() >= p {
                continue;
            }
            // Nowhere left to rewire to
            if adjacency[u].len() >= n - 1 {
                continue;
            }
            let mut w = rng.gen_range(0..n);
            while w == u || adjacency[u].contains(&w) {
                w = rng.gen_range(0..n);
            }
            adjacency[u].remove(&v);
            adjacency[v].remove(&u);
            adjacency[u].insert(w);
            adjacency[w].insert(u);
        }
    }

    Ok(collect(&adjacency))
}

/// Scale-free graph by preferential attachment: starts from a star on
/// `m + 1` nodes, then each new node attaches to `m` distinct existing nodes
/// chosen with probability proportional to degree.
pub fn barabasi_albert<R: Rng + ?Sized>(
    n: usize,
    m: usize,
    rng: &mut R,
) -> Result<EdgeList, NetworkError> {
    if m < 1 || m >= n {
        return Err(NetworkError::InvalidParameter {
            name: "attachments",
            value: m as f64,
        });
    }

    let mut edges: BTreeSet<(usize, usize)> = (1..=m).map(|i| (0, i)).collect();
    // One entry per edge endpoint, so sampling is degree-proportional
    let mut repeated: Vec<usize> = Vec::with_capacity(2 * n * m);
    repeated.extend(std::iter::repeat(0).take(m));
    repeated.extend(1..=m);

    for source in (m + 1)..n {
        let mut targets = BTreeSet::new();
        while targets.len() < m {
            targets.insert(repeated[rng.gen_range(0..repeated.len())]);
        }
        for &t in &targets {
            edges.insert(ordered(source, t));
        }
        repeated.extend(targets.iter().copied());
        repeated.extend(std::iter::repeat(source).take(m));
    }

    Ok(edges.into_iter().collect())
}

/// Node 0 joined to every other node.
pub fn star(n: usize) -> EdgeList {
    (1..n).map(|leaf| (0, leaf)).collect()
}

/// Degree of every node in `0..n`.
pub fn degrees(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut degree = vec![0; n];
    for &(u, v) in edges {
        degree[u] += 1;
        degree[v] += 1;
    }
    degree
}

/// Highest-degree node; the lowest index wins ties.
pub fn max_degree_node(n: usize, edges: &[(usize, usize)]) -> Option<usize> {
    degrees(n, edges)
        .into_iter()
        .enumerate()
        .max_by(|(ia, da), (ib, db)| da.cmp(db).then(ib.cmp(ia)))
        .map(|(i, _)| i)
}

/// The `count` lowest-degree nodes, ties broken by index.
pub fn lowest_degree_nodes(n: usize, edges: &[(usize, usize)], count: usize) -> Vec<usize> {
    let degree = degrees(n, edges);
    let mut nodes: Vec<usize> = (0..n).collect();
    nodes.sort_by_key(|&i| (degree[i], i));
    nodes.truncate(count);
    nodes
}
