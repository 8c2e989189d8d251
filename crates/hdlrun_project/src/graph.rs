//! The file-level dependency graph and its deterministic compile order.
//!
//! Nodes are source files; an edge A -> B means "A must be compiled after
//! B" because a unit in A references a unit defined in B (or, under the
//! package-body backend quirk, because A uses a package whose body B
//! defines). The graph must be acyclic; a cycle is a fatal configuration
//! error and no order is emitted for it.

use crate::source_file::FileId;
use petgraph::graph::{DiGraph, NodeIndex};

/// Why a dependency edge exists.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EdgeKind {
    /// A unit in the source file references a unit defined in the target.
    Reference,
    /// Synthetic edge: the source file uses a package whose body the target
    /// defines, and the active backend requires package users to depend on
    /// bodies.
    PackageBody,
}

/// Node colors for the depth-first compile order walk.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// The directed dependency graph over a project's source files.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<FileId, EdgeKind>,
    nodes: Vec<NodeIndex>,
}

impl DependencyGraph {
    /// Creates a graph with one node per file and no edges.
    ///
    /// Node order matches file registration order, which the ordering walk
    /// uses as its deterministic tie-breaker.
    pub fn new(file_count: usize) -> Self {
        let mut graph = DiGraph::new();
        let nodes = (0..file_count).map(|i| graph.add_node(FileId(i))).collect();
        Self { graph, nodes }
    }

    /// Number of file nodes.
    pub fn file_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds an edge "`from` is compiled after `to`".
    ///
    /// Self-edges and duplicates are ignored: a file referencing its own
    /// units imposes no ordering, and one edge per file pair is enough.
    pub fn add_edge(&mut self, from: FileId, to: FileId, kind: EdgeKind) {
        if from == to {
            return;
        }
        let (a, b) = (self.nodes[from.index()], self.nodes[to.index()]);
        if !self.graph.contains_edge(a, b) {
            self.graph.add_edge(a, b, kind);
        }
    }

    /// Returns `true` if `from` directly depends on `to`.
    pub fn has_edge(&self, from: FileId, to: FileId) -> bool {
        self.graph
            .contains_edge(self.nodes[from.index()], self.nodes[to.index()])
    }

    /// Direct dependencies of `file`, sorted by registration order.
    pub fn direct_deps(&self, file: FileId) -> Vec<FileId> {
        let mut deps: Vec<FileId> = self
            .graph
            .neighbors_directed(self.nodes[file.index()], petgraph::Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        deps.sort();
        deps
    }

    /// Direct dependents of `file` (files that must compile after it),
    /// sorted by registration order.
    pub fn dependents(&self, file: FileId) -> Vec<FileId> {
        let mut deps: Vec<FileId> = self
            .graph
            .neighbors_directed(self.nodes[file.index()], petgraph::Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        deps.sort();
        deps
    }

    /// Computes the total compile order.
    ///
    /// Depth-first postorder: a file is emitted only after everything it
    /// depends on. Roots are tried in registration order and dependencies
    /// are visited in registration order, so independent files keep their
    /// registration order across runs.
    ///
    /// On a cycle, returns `Err` with the participating files in cycle
    /// order (first file repeated at the end); no partial order is emitted.
    pub fn compile_order(&self) -> Result<Vec<FileId>, Vec<FileId>> {
        let n = self.nodes.len();
        let mut color = vec![Color::White; n];
        let mut order = Vec::with_capacity(n);

        for start in 0..n {
            if color[start] != Color::White {
                continue;
            }
            color[start] = Color::Gray;
            let mut stack: Vec<(usize, Vec<FileId>, usize)> =
                vec![(start, self.direct_deps(FileId(start)), 0)];

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if frame.2 < frame.1.len() {
                    let next = frame.1[frame.2].index();
                    frame.2 += 1;
                    match color[next] {
                        Color::White => {
                            color[next] = Color::Gray;
                            stack.push((next, self.direct_deps(FileId(next)), 0));
                        }
                        Color::Gray => {
                            // Back edge: everything from `next`'s frame to
                            // the top of the stack participates.
                            let pos = stack
                                .iter()
                                .position(|(id, _, _)| *id == next)
                                .expect("gray node must be on the stack");
                            let mut cycle: Vec<FileId> =
                                stack[pos..].iter().map(|(id, _, _)| FileId(*id)).collect();
                            cycle.push(FileId(next));
                            return Err(cycle);
                        }
                        Color::Black => {}
                    }
                } else {
                    color[node] = Color::Black;
                    order.push(FileId(node));
                    stack.pop();
                }
            }
        }

        Ok(order)
    }

    /// All files reachable from `roots` through dependency edges, including
    /// the roots themselves, sorted by registration order.
    ///
    /// This is the dependency closure used to decide whether a test
    /// configuration may run: every file in the closure of its library must
    /// have compiled successfully.
    pub fn closure(&self, roots: &[FileId]) -> Vec<FileId> {
        let n = self.nodes.len();
        let mut seen = vec![false; n];
        let mut stack: Vec<FileId> = roots.to_vec();
        for &r in roots {
            seen[r.index()] = true;
        }
        while let Some(file) = stack.pop() {
            for dep in self.direct_deps(file) {
                if !seen[dep.index()] {
                    seen[dep.index()] = true;
                    stack.push(dep);
                }
            }
        }
        (0..n).filter(|&i| seen[i]).map(FileId).collect()
    }
}
