use super::topology::Topology;
use log::debug;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Most vertices of a triangle mesh have six or fewer neighbours
type Neighbours = SmallVec<[u32; 8]>;

/// Undirected vertex graph where two vertices are linked iff they share a
/// face. Neighbour lists are sorted and free of duplicates and self-loops.
#[derive(Clone, Debug)]
pub struct Adjacency {
    neighbours: Vec<Neighbours>,
}

impl Adjacency {
    #[must_use]
    pub fn new(topology: &Topology) -> Self {
        let mut neighbours = vec![Neighbours::new(); topology.vertex_count()];
        for face in topology.faces() {
            for (i, a) in face.iter().enumerate() {
                for b in face.iter().skip(i + 1) {
                    // Degenerate faces may repeat a vertex
                    if a != b {
                        neighbours[*a as usize].push(*b);
                        neighbours[*b as usize].push(*a);
                    }
                }
            }
        }
        for list in &mut neighbours {
            list.sort_unstable();
            list.dedup();
        }
        Self { neighbours }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Number of undirected edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neighbours.iter().map(SmallVec::len).sum::<usize>() / 2
    }

    /// Neighbours of `vertex`, empty if the vertex does not exist
    #[must_use]
    pub fn neighbours(&self, vertex: usize) -> &[u32] {
        self.neighbours.get(vertex).map_or(&[][..], |n| n.as_slice())
    }

    #[must_use]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        u32::try_from(b).map_or(false, |b| {
            self.neighbours(a).binary_search(&b).is_ok()
        })
    }

    /// Breadth-first expansion of `seeds` by up to `hops` edges. Returns a
    /// membership flag per vertex covering the seeds and every vertex
    /// reachable from them within the hop limit.
    ///
    /// Each vertex is queued at most once, so the traversal terminates on
    /// cyclic graphs and costs at most one visit per vertex. Seeds beyond
    /// the vertex count are ignored.
    #[must_use]
    pub fn expand(&self, seeds: &[bool], hops: usize) -> Vec<bool> {
        let mut visited = vec![false; self.vertex_count()];
        let mut queue = VecDeque::new();
        for (v, _) in seeds.iter().enumerate().filter(|(_, s)| **s) {
            if v < visited.len() {
                visited[v] = true;
                queue.push_back((v, 0));
            } else {
                debug!("seed {} beyond {} vertices", v, visited.len());
            }
        }
        while let Some((v, depth)) = queue.pop_front() {
            if depth >= hops {
                continue;
            }
            for n in &self.neighbours[v] {
                let n = *n as usize;
                if !visited[n] {
                    visited[n] = true;
                    queue.push_back((n, depth + 1));
                }
            }
        }
        visited
    }
}
