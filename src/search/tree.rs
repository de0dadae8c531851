use super::data::Data;
use super::node::Node;
use crate::game::action::Action;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;

/// The search tree for one decision: a directed graph whose vertices are
/// [`Data`] (spot + statistics) and whose edges are the actions between
/// them. Nodes live in the graph's arena and are addressed by index, so
/// parent↔child references never form ownership cycles. A tree is built
/// for exactly one invocation and discarded with it.
#[derive(Debug, Default)]
pub struct Tree(DiGraph<Data, Action>);

impl From<Data> for Tree {
    fn from(root: Data) -> Self {
        let mut graph = DiGraph::default();
        graph.add_node(root);
        Self(graph)
    }
}

impl Tree {
    pub fn root(&self) -> Node {
        self.at(NodeIndex::new(0))
    }
    pub fn at(&self, index: NodeIndex) -> Node {
        Node::from((index, &self.0))
    }
    pub fn at_mut(&mut self, index: NodeIndex) -> &mut Data {
        self.0.node_weight_mut(index).expect("valid node index")
    }
    pub fn n(&self) -> usize {
        self.0.node_count()
    }
    /// Attach a new child under `parent` along `action`.
    pub fn extend(&mut self, parent: NodeIndex, action: Action, data: Data) -> NodeIndex {
        let child = self.0.add_node(data);
        self.0.add_edge(parent, child, action);
        child
    }

    fn draw(&self, f: &mut std::fmt::Formatter, index: NodeIndex, prefix: &str) -> std::fmt::Result {
        if index == NodeIndex::new(0) {
            writeln!(f, "ROOT   {}", self.at(index).spot())?;
        }
        let children = self
            .0
            .neighbors_directed(index, petgraph::Outgoing)
            .collect::<Vec<_>>();
        let n = children.len();
        for (i, child) in children.into_iter().rev().enumerate() {
            let last = i == n - 1;
            let stem = if last { "└" } else { "├" };
            let gaps = if last { "    " } else { "│   " };
            let node = self.at(child);
            let edge = node.incoming().expect("non-root has incoming edge");
            writeln!(
                f,
                "{}{}──{} ({}x {:+.3})",
                prefix,
                stem,
                edge,
                node.visits(),
                node.mean(),
            )?;
            self.draw(f, child, &format!("{}{}", prefix, gaps))?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.draw(f, NodeIndex::new(0), "")
    }
}
