use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use tracing::error;
use tracing::warn;

use super::WalletDataProvider;
use super::lenient_f64;
use super::lenient_u64;
use crate::config::BitqueryConfig;
use crate::err_with_loc;
use crate::error::ProviderError;
use crate::error::Result;
use crate::model::Blockchain;
use crate::model::MonthlyCount;
use crate::model::MonthlyTransactionCount;
use crate::model::SortOrder;
use crate::model::TopInteractions;
use crate::model::Transaction;
use crate::model::TransactionDetails;
use crate::model::TransactionQuery;
use crate::model::WalletOverview;
use crate::model::interaction::TOP_INTERACTIONS_LIMIT;
use crate::utils::calculate_backoff_with_jitter;
use crate::utils::unix_to_utc;

const PROVIDER: &str = "bitquery";

/// GraphQL indexer client for the EVM chains.
#[derive(Debug, Clone)]
pub struct BitqueryClient {
  http:   Client,
  config: BitqueryConfig,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
  data:   Option<T>,
  #[serde(default)]
  errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
  message: String,
}

#[derive(Debug, Deserialize)]
struct Ethereum<T> {
  ethereum: T,
}

#[derive(Debug, Deserialize)]
struct UnixTime {
  unixtime: i64,
}

#[derive(Debug, Deserialize)]
struct AddressField {
  address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewData {
  #[serde(default)]
  address_stats: Vec<AddressStatsRow>,
  #[serde(default)]
  address:       Vec<AddressRow>,
}

#[derive(Debug, Deserialize)]
struct AddressStatsRow {
  address: AddressStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressStats {
  #[serde(default, deserialize_with = "lenient_f64")]
  balance:           f64,
  #[serde(default, deserialize_with = "lenient_f64")]
  send_amount:       f64,
  #[serde(default, deserialize_with = "lenient_f64")]
  receive_amount:    f64,
  #[serde(default, deserialize_with = "lenient_u64")]
  send_tx_count:     u64,
  #[serde(default, deserialize_with = "lenient_u64")]
  receive_tx_count:  u64,
  first_transfer_at: Option<UnixTime>,
  last_transfer_at:  Option<UnixTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressRow {
  smart_contract: Option<SmartContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SmartContract {
  contract_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionsData {
  #[serde(default)]
  transactions: Vec<TransactionRow>,
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
  sender: AddressField,
  to:     AddressField,
  hash:   String,
  #[serde(deserialize_with = "lenient_f64")]
  amount: f64,
  block:  BlockTime,
}

#[derive(Debug, Deserialize)]
struct BlockTime {
  timestamp: UnixTime,
}

#[derive(Debug, Deserialize)]
struct TransfersData<T> {
  #[serde(default = "Vec::new")]
  transfers: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TransferCount {
  sender:   Option<AddressField>,
  receiver: Option<AddressField>,
  #[serde(deserialize_with = "lenient_u64")]
  count:    u64,
}

#[derive(Debug, Deserialize)]
struct MonthlyRow {
  date:  MonthYear,
  #[serde(deserialize_with = "lenient_u64")]
  count: u64,
}

#[derive(Debug, Deserialize)]
struct MonthYear {
  month: u32,
  year:  i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalsData {
  #[serde(default)]
  address_stats: Vec<TotalsRow>,
}

#[derive(Debug, Deserialize)]
struct TotalsRow {
  address: Totals,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Totals {
  #[serde(default, deserialize_with = "lenient_u64")]
  send_tx_count:    u64,
  #[serde(default, deserialize_with = "lenient_u64")]
  receive_tx_count: u64,
}

#[derive(Debug, Deserialize)]
struct CountData {
  #[serde(default)]
  transactions: Vec<CountRow>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
  #[serde(deserialize_with = "lenient_u64")]
  count: u64,
}

#[derive(Debug, Deserialize)]
struct DetailsData {
  #[serde(default)]
  transactions: Vec<DetailsRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsRow {
  #[serde(deserialize_with = "lenient_u64")]
  index:     u64,
  #[serde(deserialize_with = "lenient_f64")]
  gas:       f64,
  #[serde(deserialize_with = "lenient_f64")]
  gas_value: f64,
  #[serde(deserialize_with = "lenient_f64")]
  gas_price: f64,
  block:     BlockHeight,
}

#[derive(Debug, Deserialize)]
struct BlockHeight {
  #[serde(deserialize_with = "lenient_u64")]
  height: u64,
}

#[derive(Debug, Deserialize)]
struct BlocksData {
  #[serde(default)]
  blocks: Vec<BlockHash>,
}

#[derive(Debug, Deserialize)]
struct BlockHash {
  hash: String,
}

impl BitqueryClient {
  pub fn new(config: BitqueryConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_millis(config.timeout_ms))
      .build()
      .map_err(|e| err_with_loc!(ProviderError::Transport { provider: PROVIDER, message: e.to_string() }))?;
    Ok(Self { http, config })
  }

  fn network(blockchain: Blockchain) -> Result<&'static str> {
    blockchain
      .indexer_network()
      .ok_or_else(|| err_with_loc!(ProviderError::Unsupported(format!("{} on the GraphQL indexer", blockchain))))
  }

  /// Runs `query`, retrying transient failures with exponential backoff.
  async fn query<T: DeserializeOwned>(
    &self,
    operation: &str,
    query: &str,
  ) -> Result<T> {
    let mut attempt = 0;
    loop {
      match self.post_once::<Ethereum<T>>(query).await {
        Ok(data) => {
          debug!("bitquery::{}::ok::attempt::{}", operation, attempt);
          return Ok(data.ethereum);
        },
        Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
          let backoff_delay =
            calculate_backoff_with_jitter(attempt, self.config.base_retry_delay_ms, self.config.max_retry_delay_ms);
          warn!(
            "bitquery::{}::retrying_after_backoff::attempt::{}::delay_ms::{}::error::{}",
            operation,
            attempt + 1,
            backoff_delay.as_millis(),
            e
          );
          tokio::time::sleep(backoff_delay).await;
          attempt += 1;
        },
        Err(e) => {
          error!("bitquery::{}::failed::attempts::{}::error::{}", operation, attempt + 1, e);
          return Err(err_with_loc!(e));
        },
      }
    }
  }

  async fn post_once<T: DeserializeOwned>(
    &self,
    query: &str,
  ) -> std::result::Result<T, ProviderError> {
    let mut request = self.http.post(&self.config.url).json(&json!({ "query": query }));
    if let Some(api_key) = &self.config.api_key {
      request = request.header("X-API-KEY", api_key);
    }

    let response =
      request.send().await.map_err(|e| ProviderError::Transport { provider: PROVIDER, message: e.to_string() })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_else(|_| "<failed to read response text>".to_string());
      return Err(ProviderError::Status { provider: PROVIDER, status: status.as_u16(), body });
    }

    let envelope: GraphqlResponse<T> =
      response.json().await.map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
      return Err(ProviderError::Query {
        provider: PROVIDER,
        messages: errors.into_iter().map(|e| e.message).collect(),
      });
    }

    envelope.data.ok_or_else(|| ProviderError::malformed(PROVIDER, "response carried no data"))
  }
}

fn either_side(address: &str) -> String {
  format!(r#"any: [{{txTo: {{is: "{address}"}}}}, {{txSender: {{is: "{address}"}}}}]"#)
}

fn ordering(sort: SortOrder) -> &'static str {
  match sort {
    SortOrder::Time => r#"desc: "block.timestamp.unixtime""#,
    SortOrder::Amount => r#"desc: "amount""#,
  }
}

fn monthly_series(rows: Vec<MonthlyRow>) -> Vec<MonthlyCount> {
  let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
  for row in rows {
    *months.entry((row.date.year, row.date.month)).or_default() += row.count;
  }
  months.into_iter().map(|((year, month), count)| MonthlyCount { year, month, count }).collect()
}

#[async_trait]
impl WalletDataProvider for BitqueryClient {
  async fn fetch_overview(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<WalletOverview> {
    let network = Self::network(blockchain)?;
    let query = format!(
      r#"{{
  ethereum(network: {network}) {{
    addressStats(address: {{is: "{address}"}}) {{
      address {{
        balance
        sendAmount
        receiveAmount
        sendTxCount
        receiveTxCount
        firstTransferAt {{ unixtime }}
        lastTransferAt {{ unixtime }}
      }}
    }}
    address(address: {{is: "{address}"}}) {{
      smartContract {{ contractType }}
    }}
  }}
}}"#
    );

    let data: OverviewData = self.query("overview", &query).await?;
    let stats = data
      .address_stats
      .into_iter()
      .next()
      .map(|row| row.address)
      .ok_or_else(|| err_with_loc!(ProviderError::malformed(PROVIDER, format!("no addressStats for {address}"))))?;
    let contract_type =
      data.address.into_iter().next().and_then(|row| row.smart_contract).and_then(|contract| contract.contract_type);

    Ok(
      WalletOverview::new(address, stats.balance)
        .with_counts(stats.send_tx_count, stats.receive_tx_count)
        .with_amounts(stats.send_amount, stats.receive_amount)
        .with_activity(
          stats.first_transfer_at.and_then(|t| unix_to_utc(t.unixtime)),
          stats.last_transfer_at.and_then(|t| unix_to_utc(t.unixtime)),
        )
        .with_contract_type(contract_type),
    )
  }

  async fn fetch_transactions(
    &self,
    blockchain: Blockchain,
    address: &str,
    query: &TransactionQuery,
  ) -> Result<Vec<Transaction>> {
    let network = Self::network(blockchain)?;
    let filter = either_side(address);
    let order = ordering(query.sort);
    let graphql = format!(
      r#"{{
  ethereum(network: {network}) {{
    transactions(
      {filter}
      options: {{limit: {limit}, offset: {offset}, {order}}}
    ) {{
      sender {{ address }}
      to {{ address }}
      hash
      amount
      block {{ timestamp {{ unixtime }} }}
    }}
  }}
}}"#,
      limit = query.limit,
      offset = query.offset,
    );

    let data: TransactionsData = self.query("transactions", &graphql).await?;
    data
      .transactions
      .into_iter()
      .map(|row| {
        let timestamp = unix_to_utc(row.block.timestamp.unixtime).ok_or_else(|| {
          err_with_loc!(ProviderError::malformed(PROVIDER, format!("timestamp out of range for {}", row.hash)))
        })?;
        Ok(Transaction::new(row.hash, row.sender.address, row.to.address, row.amount, timestamp))
      })
      .collect()
  }

  async fn fetch_top_interactions(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<TopInteractions> {
    let network = Self::network(blockchain)?;
    let ranked = |side: &str, other: &str| {
      format!(
        r#"{{
  ethereum(network: {network}) {{
    transfers({side}: {{is: "{address}"}}, options: {{limit: {TOP_INTERACTIONS_LIMIT}, desc: "count"}}) {{
      {other} {{ address }}
      count
    }}
  }}
}}"#
      )
    };
    let received_query = ranked("receiver", "sender");
    let sent_query = ranked("sender", "receiver");
    let totals_query = format!(
      r#"{{
  ethereum(network: {network}) {{
    addressStats(address: {{is: "{address}"}}) {{
      address {{ sendTxCount receiveTxCount }}
    }}
  }}
}}"#
    );

    let (received, sent, totals) = futures::try_join!(
      self.query::<TransfersData<TransferCount>>("top_received", &received_query),
      self.query::<TransfersData<TransferCount>>("top_sent", &sent_query),
      self.query::<TotalsData>("transaction_totals", &totals_query),
    )?;

    let totals = totals.address_stats.into_iter().next().map(|row| row.address);
    let received = received
      .transfers
      .into_iter()
      .map(|row| (row.sender.map(|s| s.address).unwrap_or_default(), row.count))
      .collect();
    let sent =
      sent.transfers.into_iter().map(|row| (row.receiver.map(|r| r.address).unwrap_or_default(), row.count)).collect();

    Ok(TopInteractions::from_counts(
      received,
      sent,
      totals.as_ref().map_or(0, |t| t.receive_tx_count),
      totals.as_ref().map_or(0, |t| t.send_tx_count),
    ))
  }

  async fn fetch_monthly_counts(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<MonthlyTransactionCount> {
    let network = Self::network(blockchain)?;
    let by_month = |side: &str| {
      format!(
        r#"{{
  ethereum(network: {network}) {{
    transfers({side}: {{is: "{address}"}}) {{
      date {{ month year }}
      count
    }}
  }}
}}"#
      )
    };
    let received_query = by_month("receiver");
    let sent_query = by_month("sender");

    let (received, sent) = futures::try_join!(
      self.query::<TransfersData<MonthlyRow>>("monthly_received", &received_query),
      self.query::<TransfersData<MonthlyRow>>("monthly_sent", &sent_query),
    )?;

    Ok(MonthlyTransactionCount { received: monthly_series(received.transfers), sent: monthly_series(sent.transfers) })
  }

  async fn fetch_total_transaction_count(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<u64> {
    let network = Self::network(blockchain)?;
    let filter = either_side(address);
    let query = format!(
      r#"{{
  ethereum(network: {network}) {{
    transactions({filter}) {{
      count
    }}
  }}
}}"#
    );

    let data: CountData = self.query("total_transactions", &query).await?;
    Ok(data.transactions.first().map_or(0, |row| row.count))
  }

  async fn fetch_transaction_details(
    &self,
    blockchain: Blockchain,
    hash: &str,
  ) -> Result<TransactionDetails> {
    let network = Self::network(blockchain)?;
    let tx_query = format!(
      r#"{{
  ethereum(network: {network}) {{
    transactions(txHash: {{is: "{hash}"}}) {{
      index
      gas
      gasValue
      gasPrice
      block {{ height }}
    }}
  }}
}}"#
    );

    let data: DetailsData = self.query("transaction_details", &tx_query).await?;
    let tx = data
      .transactions
      .into_iter()
      .next()
      .ok_or_else(|| err_with_loc!(ProviderError::malformed(PROVIDER, format!("no transaction {hash}"))))?;

    let block_query = format!(
      r#"{{
  ethereum(network: {network}) {{
    blocks(height: {{is: {height}}}) {{
      hash
    }}
  }}
}}"#,
      height = tx.block.height,
    );
    let blocks: BlocksData = self.query("block_hash", &block_query).await?;
    let block_hash = blocks.blocks.into_iter().next().map(|b| b.hash).ok_or_else(|| {
      err_with_loc!(ProviderError::malformed(PROVIDER, format!("no block at height {}", tx.block.height)))
    })?;

    Ok(TransactionDetails {
      hash: hash.to_string(),
      transaction_index: tx.index,
      gas_used: tx.gas,
      gas_price: tx.gas_price,
      transaction_fee: tx.gas_value,
      block_number: tx.block.height,
      block_hash,
    })
  }
}
