use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blockchain {
  Eth,
  Bnb,
  Avax,
  Matic,
  Klay,
  Swc,
}

impl Blockchain {
  pub const ALL: [Blockchain; 6] =
    [Blockchain::Eth, Blockchain::Bnb, Blockchain::Avax, Blockchain::Matic, Blockchain::Klay, Blockchain::Swc];

  /// Lower-case symbol as it appears in URLs and cache keys.
  pub fn as_str(&self) -> &'static str {
    match self {
      Blockchain::Eth => "eth",
      Blockchain::Bnb => "bnb",
      Blockchain::Avax => "avax",
      Blockchain::Matic => "matic",
      Blockchain::Klay => "klay",
      Blockchain::Swc => "swc",
    }
  }

  /// Ticker used in amount labels, e.g. `ETH`.
  pub fn ticker(&self) -> &'static str {
    match self {
      Blockchain::Eth => "ETH",
      Blockchain::Bnb => "BNB",
      Blockchain::Avax => "AVAX",
      Blockchain::Matic => "MATIC",
      Blockchain::Klay => "KLAY",
      Blockchain::Swc => "SWC",
    }
  }

  pub fn display_name(&self) -> &'static str {
    match self {
      Blockchain::Eth => "Ethereum",
      Blockchain::Bnb => "Binance",
      Blockchain::Avax => "Avalanche",
      Blockchain::Matic => "Polygon",
      Blockchain::Klay => "Klaytn",
      Blockchain::Swc => "Swincoin",
    }
  }

  /// Network argument of the GraphQL indexer. Swincoin lives in the graph database only.
  pub fn indexer_network(&self) -> Option<&'static str> {
    match self {
      Blockchain::Eth => Some("ethereum"),
      Blockchain::Bnb => Some("bsc"),
      Blockchain::Avax => Some("avalanche"),
      Blockchain::Matic => Some("matic"),
      Blockchain::Klay => Some("klaytn"),
      Blockchain::Swc => None,
    }
  }

  pub fn is_graph_database_chain(&self) -> bool { matches!(self, Blockchain::Swc) }

  /// Fixed USD rate per coin.
  pub fn usd_value(&self) -> f64 {
    match self {
      Blockchain::Eth => 2345.85,
      Blockchain::Bnb => 539.60,
      Blockchain::Avax => 24.48,
      Blockchain::Matic => 0.3733,
      Blockchain::Klay => 0.126990,
      Blockchain::Swc => 35.34,
    }
  }

  /// All supported chains use 20-byte hex addresses with a `0x` prefix.
  pub fn is_valid_address(
    &self,
    address: &str,
  ) -> bool {
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
      Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
      None => false,
    }
  }

  pub fn validate_address(
    &self,
    address: &str,
  ) -> Result<(), RequestError> {
    if self.is_valid_address(address) {
      Ok(())
    } else {
      Err(RequestError::InvalidAddress { blockchain: self.as_str().to_string(), address: address.to_string() })
    }
  }
}

impl fmt::Display for Blockchain {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Blockchain {
  type Err = RequestError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Blockchain::ALL
      .into_iter()
      .find(|chain| chain.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| RequestError::UnknownBlockchain(s.to_string()))
  }
}
