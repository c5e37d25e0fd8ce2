//! Dependency graph construction and traversal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use podlock_core::version::Version;

/// A node in the resolved dependency graph. The root node is the project
/// itself and carries no version.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedNode {
    pub name: String,
    pub version: Option<Version>,
}

impl fmt::Display for ResolvedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} ({version})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Edge label: the requirement the source imposes on the target.
#[derive(Debug, Clone)]
pub struct DepEdge {
    pub requirement: String,
}

/// A resolved dependency graph backed by petgraph.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<ResolvedNode, DepEdge>,
    /// Lookup from package name to node index.
    index: HashMap<String, NodeIndex>,
    pub root: Option<NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            root: None,
        }
    }

    /// Add or retrieve a node. If the name already exists, returns the
    /// existing index.
    pub fn add_node(&mut self, node: ResolvedNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.name) {
            return idx;
        }
        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(name, idx);
        idx
    }

    /// Set the root node of the graph (the project itself).
    pub fn set_root(&mut self, idx: NodeIndex) {
        self.root = Some(idx);
    }

    /// Add a dependency edge from `from` to `to`.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DepEdge) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, edge);
        }
    }

    /// Look up a node by package name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    /// Get the node data for an index.
    pub fn node(&self, idx: NodeIndex) -> &ResolvedNode {
        &self.graph[idx]
    }

    /// All resolved nodes (excluding root), sorted by name.
    pub fn all_nodes(&self) -> Vec<&ResolvedNode> {
        let mut nodes: Vec<&ResolvedNode> = self
            .graph
            .node_indices()
            .filter(|&idx| Some(idx) != self.root)
            .map(|idx| &self.graph[idx])
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    /// Direct dependencies of a node, sorted by name.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        let mut deps: Vec<(NodeIndex, &DepEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        deps.sort_by(|a, b| self.graph[a.0].name.cmp(&self.graph[b.0].name));
        deps
    }

    /// Reverse dependencies (who depends on this node), sorted by name.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        let mut deps: Vec<(NodeIndex, &DepEdge)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect();
        deps.sort_by(|a, b| self.graph[a.0].name.cmp(&self.graph[b.0].name));
        deps
    }

    /// The first dependency cycle found among resolved packages, if any.
    ///
    /// Reported as the name of a package on the cycle; dependency graphs
    /// are DAGs by construction, so a cycle is a configuration error.
    pub fn find_cycle(&self) -> Option<String> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(_) => None,
            Err(cycle) => Some(self.graph[cycle.node_id()].name.clone()),
        }
    }

    /// Print the dependency tree to a string.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let root = match self.root {
            Some(r) => r,
            None => return output,
        };

        output.push_str(&format!("{}\n", self.graph[root]));

        let mut visited = HashSet::new();
        visited.insert(root);

        let deps = self.dependencies_of(root);
        let count = deps.len();
        for (i, (idx, _edge)) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(&mut output, *idx, "", is_last, 1, max_depth, &mut visited);
        }

        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, _)) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(
                output,
                *child,
                &child_prefix,
                is_last,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Find the path from root to a specific package.
    pub fn find_path(&self, target: &str) -> Option<Vec<&ResolvedNode>> {
        let root = self.root?;
        let target = self.find(target)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(root, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for (child, _) in self.dependencies_of(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        visited.remove(&current);
        false
    }

    /// Print a full inverted tree showing every package and what depends
    /// on it, with the requirement each dependent imposes.
    pub fn print_full_inverted_tree(&self) -> String {
        let mut output = String::new();
        let root = match self.root {
            Some(r) => r,
            None => return output,
        };

        let mut nodes: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| idx != root)
            .collect();
        nodes.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));

        for idx in nodes {
            let dependents = self.dependents_of(idx);
            if dependents.is_empty() {
                continue;
            }
            output.push_str(&format!("{}\n", self.graph[idx]));
            let count = dependents.len();
            for (i, (dep_idx, edge)) in dependents.iter().enumerate() {
                let connector = if i == count - 1 { "└── " } else { "├── " };
                output.push_str(&format!(
                    "{connector}{} requires {}\n",
                    self.graph[*dep_idx], edge.requirement
                ));
            }
            output.push('\n');
        }

        output
    }

    /// Number of resolved packages (excluding root).
    pub fn len(&self) -> usize {
        let total = self.graph.node_count();
        if self.root.is_some() {
            total.saturating_sub(1)
        } else {
            total
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(name: &str, version: &str) -> ResolvedNode {
        ResolvedNode {
            name: name.to_string(),
            version: Some(Version::parse(version).unwrap()),
        }
    }

    fn root_node(name: &str) -> ResolvedNode {
        ResolvedNode {
            name: name.to_string(),
            version: None,
        }
    }

    fn edge(requirement: &str) -> DepEdge {
        DepEdge {
            requirement: requirement.to_string(),
        }
    }

    #[test]
    fn add_and_find() {
        let mut g = DependencyGraph::new();
        let idx = g.add_node(make_node("FirebaseCore", "10.29.0"));
        assert_eq!(g.find("FirebaseCore"), Some(idx));
        assert_eq!(
            g.node(idx).version.as_ref().unwrap().as_str(),
            "10.29.0"
        );
    }

    #[test]
    fn duplicate_add_returns_same_index() {
        let mut g = DependencyGraph::new();
        let idx1 = g.add_node(make_node("Lib", "1.0"));
        let idx2 = g.add_node(make_node("Lib", "1.0"));
        assert_eq!(idx1, idx2);
    }

    #[test]
    fn tree_printing() {
        let mut g = DependencyGraph::new();
        let root = g.add_node(root_node("Runner"));
        g.set_root(root);

        let a = g.add_node(make_node("A", "1.0"));
        let b = g.add_node(make_node("B", "2.0"));
        let c = g.add_node(make_node("C", "3.0"));

        g.add_edge(root, a, edge(">= 1.0"));
        g.add_edge(root, b, edge("*"));
        g.add_edge(a, c, edge("= 3.0"));

        let tree = g.print_tree(None);
        assert!(tree.starts_with("Runner\n"));
        assert!(tree.contains("A (1.0)"));
        assert!(tree.contains("B (2.0)"));
        assert!(tree.contains("C (3.0)"));
    }

    #[test]
    fn tree_depth_limit() {
        let mut g = DependencyGraph::new();
        let root = g.add_node(root_node("Runner"));
        g.set_root(root);
        let a = g.add_node(make_node("A", "1.0"));
        let b = g.add_node(make_node("B", "1.0"));
        g.add_edge(root, a, edge("*"));
        g.add_edge(a, b, edge("*"));

        let tree = g.print_tree(Some(1));
        assert!(tree.contains("A (1.0)"));
        assert!(!tree.contains("B (1.0)"));
    }

    #[test]
    fn find_path_exists() {
        let mut g = DependencyGraph::new();
        let root = g.add_node(root_node("Runner"));
        g.set_root(root);

        let a = g.add_node(make_node("A", "1.0"));
        let b = g.add_node(make_node("B", "1.0"));
        g.add_edge(root, a, edge("*"));
        g.add_edge(a, b, edge("*"));

        let path = g.find_path("B").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0].name, "Runner");
        assert_eq!(path[1].name, "A");
        assert_eq!(path[2].name, "B");
    }

    #[test]
    fn find_path_not_found() {
        let mut g = DependencyGraph::new();
        let root = g.add_node(root_node("Runner"));
        g.set_root(root);
        assert!(g.find_path("Missing").is_none());
    }

    #[test]
    fn inverted_tree_shows_requirements() {
        let mut g = DependencyGraph::new();
        let root = g.add_node(root_node("Runner"));
        g.set_root(root);
        let a = g.add_node(make_node("A", "1.0"));
        let b = g.add_node(make_node("B", "1.0"));
        g.add_edge(root, a, edge("*"));
        g.add_edge(a, b, edge("~> 1.0"));

        let inv = g.print_full_inverted_tree();
        assert!(inv.contains("B (1.0)"));
        assert!(inv.contains("A (1.0) requires ~> 1.0"));
    }

    #[test]
    fn cycle_detection() {
        let mut g = DependencyGraph::new();
        let root = g.add_node(root_node("Runner"));
        g.set_root(root);
        let a = g.add_node(make_node("A", "1.0"));
        let b = g.add_node(make_node("B", "1.0"));
        g.add_edge(root, a, edge("*"));
        g.add_edge(a, b, edge("*"));
        assert!(g.find_cycle().is_none());

        g.add_edge(b, a, edge("*"));
        assert!(g.find_cycle().is_some());
    }
}
