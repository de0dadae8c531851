use super::data::Data;
use crate::game::action::Action;
use crate::game::spot::Spot;
use crate::Utility;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction::Incoming;
use petgraph::Direction::Outgoing;

/// A Node is a thin wrapper around a NodeIndex and a &Graph, cheap to
/// Copy; holding the graph reference makes navigation ergonomic while
/// ownership stays with the arena. Parent links are graph edges, so
/// backpropagation walks indices, never owning pointers.
#[derive(Debug, Clone, Copy)]
pub struct Node<'tree> {
    index: NodeIndex,
    graph: &'tree DiGraph<Data, Action>,
}

impl<'tree> From<(NodeIndex, &'tree DiGraph<Data, Action>)> for Node<'tree> {
    fn from((index, graph): (NodeIndex, &'tree DiGraph<Data, Action>)) -> Self {
        Self { index, graph }
    }
}

impl<'tree> Node<'tree> {
    pub fn spawn(&self, index: NodeIndex) -> Node<'tree> {
        Self::from((index, self.graph))
    }
    pub fn index(&self) -> NodeIndex {
        self.index
    }
    pub fn data(&self) -> &'tree Data {
        self.graph
            .node_weight(self.index)
            .expect("valid node index")
    }
    pub fn spot(&self) -> &'tree Spot {
        self.data().spot()
    }
    pub fn visits(&self) -> u32 {
        self.data().visits()
    }
    pub fn mean(&self) -> Utility {
        self.data().mean()
    }

    // navigation

    pub fn incoming(&self) -> Option<&'tree Action> {
        self.graph
            .edges_directed(self.index, Incoming)
            .next()
            .map(|edge| edge.weight())
    }
    pub fn parent(&self) -> Option<Node<'tree>> {
        self.graph
            .neighbors_directed(self.index, Incoming)
            .next()
            .map(|index| self.spawn(index))
    }
    pub fn children(&self) -> Vec<Node<'tree>> {
        self.graph
            .neighbors_directed(self.index, Outgoing)
            .map(|index| self.spawn(index))
            .collect()
    }
    pub fn follow(&self, action: &Action) -> Option<Node<'tree>> {
        self.children()
            .into_iter()
            .find(|child| child.incoming() == Some(action))
    }
    /// Actions taken from the root down to this node.
    pub fn line(&self) -> Vec<Action> {
        match (self.incoming(), self.parent()) {
            (Some(action), Some(parent)) => {
                let mut line = parent.line();
                line.push(*action);
                line
            }
            _ => vec![],
        }
    }
}

impl std::fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "N{}", self.index.index())
    }
}
