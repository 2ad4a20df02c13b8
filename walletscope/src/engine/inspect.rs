use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use petgraph::dot::Dot;
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::config::load_config;
use crate::error::Result;
use crate::model::Blockchain;
use crate::provider::Providers;
use crate::tracing::setup_tracing;
use crate::view::OverviewPanel;
use crate::view::PageRequest;
use crate::view::WalletView;
use crate::view::transaction_details;

#[derive(Debug, Parser)]
#[command(name = "walletscope", version, about = "Inspect a wallet the way the dashboard shows it")]
pub struct InspectArgs {
  /// Path to the TOML configuration file.
  #[arg(long, default_value = "Config.toml")]
  pub config: PathBuf,

  #[command(subcommand)]
  pub command: InspectCommand,
}

#[derive(Debug, Clone, Args)]
pub struct WalletArgs {
  /// Chain identifier: eth, bnb, avax, matic, klay or swc.
  pub chain:   String,
  pub address: String,
  /// `time` or `amount`.
  #[arg(long)]
  pub sort:    Option<String>,
  #[arg(long)]
  pub page:    Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GraphFormat {
  #[default]
  Json,
  Dot,
}

#[derive(Debug, Clone, Subcommand)]
pub enum InspectCommand {
  /// Balance, counts and activity window.
  Overview {
    #[command(flatten)]
    wallet: WalletArgs,
  },
  /// Laid out transaction graph of one history page.
  Graph {
    #[command(flatten)]
    wallet: WalletArgs,
    #[arg(long, value_enum, default_value_t = GraphFormat::Json)]
    format: GraphFormat,
  },
  /// Every region of the wallet details page.
  Details {
    #[command(flatten)]
    wallet: WalletArgs,
  },
  /// One transaction by hash.
  Transaction { chain: String, hash: String },
}

pub struct Inspector {
  pub config:    Config,
  pub providers: Providers,
}

impl Inspector {
  pub async fn run(args: InspectArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    setup_tracing("walletscope", &config.logging)?;
    info!("inspect::run::config_loaded::{}", args.config.display());

    let providers = Providers::from_config(&config.provider)?;
    let inspector = Inspector { config, providers };

    let output = inspector.execute(args.command).await?;
    println!("{}", output);
    Ok(())
  }

  fn view(
    &self,
    wallet: &WalletArgs,
  ) -> Result<(WalletView, PageRequest)> {
    let blockchain: Blockchain = wallet.chain.parse()?;
    let request = PageRequest::parse(wallet.sort.as_deref(), wallet.page.as_deref())?;
    let view = WalletView::new(
      blockchain,
      wallet.address.clone(),
      self.providers.clone(),
      self.config.dashboard,
      self.config.layout,
    )?;
    Ok((view, request))
  }

  /// Runs one command and renders its output.
  pub async fn execute(
    &self,
    command: InspectCommand,
  ) -> Result<String> {
    match command {
      InspectCommand::Overview { wallet } => {
        let (view, _) = self.view(&wallet)?;
        let overview = view.overview().await?;
        to_json(&OverviewPanel::new(overview, view.blockchain(), chrono::Utc::now()))
      },
      InspectCommand::Graph { wallet, format } => {
        let (view, request) = self.view(&wallet)?;
        let layout = view.graph(&request).await?;
        match format {
          GraphFormat::Json => to_json(&layout),
          GraphFormat::Dot => {
            let graph = layout.to_graph().map(|_, node| node.label.clone(), |_, edge| edge.label.clone());
            Ok(format!("{}", Dot::new(&graph)))
          },
        }
      },
      InspectCommand::Details { wallet } => {
        let (view, request) = self.view(&wallet)?;
        to_json(&view.render(&request).await)
      },
      InspectCommand::Transaction { chain, hash } => {
        let blockchain: Blockchain = chain.parse()?;
        let details = transaction_details(&self.providers, blockchain, &hash).await??;
        to_json(&details)
      },
    }
  }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> { Ok(serde_json::to_string_pretty(value)?) }

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use anyhow::anyhow;
  use chrono::TimeZone;
  use chrono::Utc;

  use super::*;
  use crate::error::RequestError;
  use crate::model::Transaction;
  use crate::model::WalletOverview;
  use crate::provider::MockReportProvider;
  use crate::provider::MockWalletDataProvider;

  const FOCAL: &str = "0x000000000000000000000000000000000000000a";

  fn inspector(data: MockWalletDataProvider) -> Inspector {
    Inspector {
      config:    Config::default(),
      providers: Providers::new(Arc::new(data), Arc::new(MockReportProvider::new())),
    }
  }

  fn wallet(chain: &str) -> WalletArgs {
    WalletArgs { chain: chain.into(), address: FOCAL.into(), sort: None, page: None }
  }

  #[test]
  fn parses_graph_command() {
    let args = InspectArgs::parse_from(["walletscope", "graph", "eth", FOCAL, "--page", "2", "--format", "dot"]);
    match args.command {
      InspectCommand::Graph { wallet, format } => {
        assert_eq!(wallet.page.as_deref(), Some("2"));
        assert_eq!(format, GraphFormat::Dot);
      },
      other => panic!("unexpected command {:?}", other),
    }
    assert_eq!(args.config, PathBuf::from("Config.toml"));
  }

  #[tokio::test]
  async fn overview_prints_panel_json() {
    let mut data = MockWalletDataProvider::new();
    data.expect_fetch_overview().times(1).returning(|_, address| Ok(WalletOverview::new(address, 2.0)));

    let output = inspector(data).execute(InspectCommand::Overview { wallet: wallet("eth") }).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["balance"], 2.0);
    assert_eq!(json["balanceUsd"], 4691.7);
  }

  #[tokio::test]
  async fn graph_renders_as_dot() {
    let mut data = MockWalletDataProvider::new();
    data.expect_fetch_transactions().times(1).returning(|_, _, _| {
      let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
      Ok(vec![Transaction::new("t1", FOCAL, "0x000000000000000000000000000000000000000b", 1.0, at)])
    });

    let command = InspectCommand::Graph { wallet: wallet("eth"), format: GraphFormat::Dot };
    let output = inspector(data).execute(command).await.unwrap();

    assert!(output.starts_with("digraph {"));
    assert!(output.contains("-1.00 ETH"));
  }

  #[tokio::test]
  async fn unknown_chain_fails_before_fetching() {
    let mut data = MockWalletDataProvider::new();
    data.expect_fetch_overview().never();

    let err = inspector(data).execute(InspectCommand::Overview { wallet: wallet("doge") }).await.unwrap_err();
    assert_eq!(err.downcast_ref::<RequestError>(), Some(&RequestError::UnknownBlockchain("doge".into())));
  }

  #[tokio::test]
  async fn provider_failure_surfaces_as_error() {
    let mut data = MockWalletDataProvider::new();
    data.expect_fetch_overview().returning(|_, _| Err(anyhow!("indexer down")));

    assert!(inspector(data).execute(InspectCommand::Overview { wallet: wallet("eth") }).await.is_err());
  }
}
