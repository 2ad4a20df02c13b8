use serde::Deserialize;
use serde::Serialize;

use crate::error::LayoutError;

/// Geometry of the transaction graph canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
  pub side_length:     f64,
  pub min_node_radius: f64,
  pub max_node_radius: f64,
  pub arrow_length:    f64,
  pub arrow_width:     f64,
}

impl Default for LayoutConfig {
  fn default() -> Self {
    Self {
      side_length:     600.0,
      min_node_radius: 16.0,
      max_node_radius: 40.0,
      arrow_length:    12.0,
      arrow_width:     6.0,
    }
  }
}

impl LayoutConfig {
  pub fn new(
    side_length: f64,
    min_node_radius: f64,
    max_node_radius: f64,
  ) -> Result<Self, LayoutError> {
    let config = Self { side_length, min_node_radius, max_node_radius, ..Self::default() };
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), LayoutError> {
    for (name, value) in [
      ("side_length", self.side_length),
      ("min_node_radius", self.min_node_radius),
      ("max_node_radius", self.max_node_radius),
      ("arrow_length", self.arrow_length),
      ("arrow_width", self.arrow_width),
    ] {
      if !(value.is_finite() && value > 0.0) {
        return Err(LayoutError::NotPositive { name, value });
      }
    }
    if self.min_node_radius > self.max_node_radius {
      return Err(LayoutError::RadiusRange { min: self.min_node_radius, max: self.max_node_radius });
    }
    Ok(())
  }

  pub fn center(&self) -> f64 { self.side_length / 2.0 }

  /// Radius of the ring the counterparties sit on.
  pub fn ring_radius(&self) -> f64 { self.side_length / 2.5 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_valid() {
    assert!(LayoutConfig::default().validate().is_ok());
    assert_eq!(LayoutConfig::default().ring_radius(), 240.0);
  }

  #[test]
  fn rejects_inverted_radius_range() {
    assert_eq!(LayoutConfig::new(600.0, 50.0, 40.0).unwrap_err(), LayoutError::RadiusRange { min: 50.0, max: 40.0 });
  }

  #[test]
  fn rejects_non_positive_and_nan() {
    assert!(matches!(LayoutConfig::new(0.0, 1.0, 2.0), Err(LayoutError::NotPositive { name: "side_length", .. })));
    assert!(LayoutConfig::new(600.0, f64::NAN, 2.0).is_err());
  }
}
