pub mod layout;

use std::collections::HashMap;

use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use serde::Deserialize;
use serde::Serialize;

pub use layout::layout;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(
    x: f64,
    y: f64,
  ) -> Self {
    Self { x, y }
  }

  pub fn midpoint(
    &self,
    other: &Point,
  ) -> Point {
    Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
  pub id:      String,
  pub address: String,
  /// Abbreviated address drawn above the node.
  pub label:   String,
  pub x:       f64,
  pub y:       f64,
  pub radius:  f64,
  pub focal:   bool,
}

impl GraphNode {
  pub fn center(&self) -> Point { Point::new(self.x, self.y) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
  /// The focal address sent the funds.
  Outgoing,
  Incoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
  pub id:           String,
  pub source:       String,
  pub target:       String,
  pub direction:    EdgeDirection,
  pub label:        String,
  pub start:        Point,
  pub end:          Point,
  /// Tip first, then the two base corners. Absent for zero-length edges.
  pub arrow:        Option<[Point; 3]>,
  pub label_anchor: Point,
}

/// Renderable description of the transaction graph. The focal node is always first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
  pub side_length: f64,
  pub nodes:       Vec<GraphNode>,
  pub edges:       Vec<GraphEdge>,
}

impl GraphLayout {
  pub fn focal(&self) -> Option<&GraphNode> { self.nodes.iter().find(|node| node.focal) }

  pub fn node(
    &self,
    id: &str,
  ) -> Option<&GraphNode> {
    self.nodes.iter().find(|node| node.id == id)
  }

  pub fn edge(
    &self,
    id: &str,
  ) -> Option<&GraphEdge> {
    self.edges.iter().find(|edge| edge.id == id)
  }

  /// Directed graph view of the layout, keyed by node id.
  pub fn to_graph(&self) -> DiGraph<GraphNode, GraphEdge> {
    let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
    let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

    for node in &self.nodes {
      indices.insert(node.id.as_str(), graph.add_node(node.clone()));
    }
    for edge in &self.edges {
      if let (Some(&from), Some(&to)) = (indices.get(edge.source.as_str()), indices.get(edge.target.as_str())) {
        graph.add_edge(from, to, edge.clone());
      }
    }
    graph
  }
}
