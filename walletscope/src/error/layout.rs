use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
  #[error("[Layout] {name} must be a positive finite number, got {value}")]
  NotPositive { name: &'static str, value: f64 },
  #[error("[Layout] min_node_radius ({min}) is larger than max_node_radius ({max})")]
  RadiusRange { min: f64, max: f64 },
}
