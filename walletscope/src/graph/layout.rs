use std::f64::consts::PI;

use super::EdgeDirection;
use super::GraphEdge;
use super::GraphLayout;
use super::GraphNode;
use super::Point;
use crate::config::LayoutConfig;
use crate::model::Blockchain;
use crate::model::Transaction;
use crate::view::format::abbreviate_address;
use crate::view::format::signed_amount_label;
use crate::view::format::DEFAULT_ABBREVIATION;

/// Radial layout of `transactions` around `focal`.
///
/// The focal node sits at the canvas centre with the maximum radius. Transaction `i` of `n`
/// gets a counterparty node at angle `i / n * 2π` on a ring of radius `side / 2.5`, sized
/// linearly between the configured radii by where its amount falls in the list's amount range.
/// Output depends only on the arguments, including transaction order.
///
/// `config` is expected to be validated (see [`LayoutConfig::validate`]).
pub fn layout(
  focal: &str,
  transactions: &[Transaction],
  blockchain: Blockchain,
  config: &LayoutConfig,
) -> GraphLayout {
  let center = config.center();
  let ring = config.ring_radius();

  let focal_node = GraphNode {
    id:      focal.to_string(),
    address: focal.to_string(),
    label:   abbreviate_address(focal, DEFAULT_ABBREVIATION),
    x:       center,
    y:       center,
    radius:  config.max_node_radius,
    focal:   true,
  };

  let (min_amount, max_amount) = amount_range(transactions);
  let count = transactions.len() as f64;

  let mut nodes = Vec::with_capacity(transactions.len() + 1);
  let mut edges = Vec::with_capacity(transactions.len());

  for (index, tx) in transactions.iter().enumerate() {
    let angle = (index as f64 / count) * 2.0 * PI;
    let counterparty = tx.counterparty(focal);

    let node = GraphNode {
      id:      format!("{}-{}", tx.id, counterparty),
      address: counterparty.to_string(),
      label:   abbreviate_address(counterparty, DEFAULT_ABBREVIATION),
      x:       center + ring * angle.cos(),
      y:       center + ring * angle.sin(),
      radius:  node_radius(tx.amount, min_amount, max_amount, config),
      focal:   false,
    };

    let direction = if tx.is_sent_by(focal) { EdgeDirection::Outgoing } else { EdgeDirection::Incoming };
    let (source, target) = match direction {
      EdgeDirection::Outgoing => (&focal_node, &node),
      EdgeDirection::Incoming => (&node, &focal_node),
    };
    let (start, end, arrow) = edge_geometry(source, target, config);

    edges.push(GraphEdge {
      id: tx.id.clone(),
      source: source.id.clone(),
      target: target.id.clone(),
      direction,
      label: signed_amount_label(tx.amount, direction == EdgeDirection::Outgoing, blockchain),
      start,
      end,
      arrow,
      label_anchor: start.midpoint(&end),
    });
    nodes.push(node);
  }

  nodes.insert(0, focal_node);
  GraphLayout { side_length: config.side_length, nodes, edges }
}

fn amount_range(transactions: &[Transaction]) -> (f64, f64) {
  transactions
    .iter()
    .map(|tx| tx.amount)
    .filter(|amount| amount.is_finite())
    .fold(None, |range: Option<(f64, f64)>, amount| match range {
      Some((min, max)) => Some((min.min(amount), max.max(amount))),
      None => Some((amount, amount)),
    })
    .unwrap_or((0.0, 0.0))
}

/// Linear interpolation between the configured radii. An empty amount range maps to the minimum.
pub fn node_radius(
  amount: f64,
  min_amount: f64,
  max_amount: f64,
  config: &LayoutConfig,
) -> f64 {
  let range = max_amount - min_amount;
  let normalized = if range > 0.0 && amount.is_finite() { ((amount - min_amount) / range).clamp(0.0, 1.0) } else { 0.0 };
  config.min_node_radius + normalized * (config.max_node_radius - config.min_node_radius)
}

/// Line from `source` to `target` trimmed to both node boundaries, plus the arrowhead at the target.
///
/// Coincident centres yield the centres themselves and no arrowhead.
pub fn edge_geometry(
  source: &GraphNode,
  target: &GraphNode,
  config: &LayoutConfig,
) -> (Point, Point, Option<[Point; 3]>) {
  let from = source.center();
  let to = target.center();
  let dx = to.x - from.x;
  let dy = to.y - from.y;
  let length = dx.hypot(dy);

  if length == 0.0 || !length.is_finite() {
    return (from, to, None);
  }

  let (ux, uy) = (dx / length, dy / length);
  let start = Point::new(from.x + ux * source.radius, from.y + uy * source.radius);
  let end = Point::new(to.x - ux * target.radius, to.y - uy * target.radius);

  let base = Point::new(end.x - config.arrow_length * ux, end.y - config.arrow_length * uy);
  let arrow = [
    end,
    Point::new(base.x + config.arrow_width * uy, base.y - config.arrow_width * ux),
    Point::new(base.x - config.arrow_width * uy, base.y + config.arrow_width * ux),
  ];

  (start, end, Some(arrow))
}
