use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::debug;
use tracing::error;

use super::WalletDataProvider;
use super::lenient_f64;
use super::lenient_u64;
use crate::config::GraphDatabaseConfig;
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
use crate::utils::unix_to_utc;
use crate::utils::wei_to_coin;

const PROVIDER: &str = "graph-database";

const OVERVIEW: &str = "
MATCH (addr:Address {address: $address})
OPTIONAL MATCH (addr)-[:SENT]->(sentTx:Transaction)
OPTIONAL MATCH (receivedTx:Transaction)-[:RECEIVED_BY]->(addr)
OPTIONAL MATCH (meta:Address {addressId: $address})
RETURN
  COUNT(DISTINCT sentTx) AS sentCount,
  COUNT(DISTINCT receivedTx) AS receivedCount,
  SUM(toFloat(sentTx.value)) AS amountSent,
  SUM(toFloat(receivedTx.value)) AS amountReceived,
  MIN(sentTx.block_timestamp) AS firstSent,
  MIN(receivedTx.block_timestamp) AS firstReceived,
  MAX(sentTx.block_timestamp) AS lastSent,
  MAX(receivedTx.block_timestamp) AS lastReceived,
  meta.type AS contractType";

const TOP_RECEIVED: &str = "
MATCH (sender:Address)-[:SENT]->(:Transaction)-[:RECEIVED_BY]->(:Address {address: $address})
RETURN sender.address AS address, COUNT(*) AS count
ORDER BY count DESC
LIMIT $limit";

const TOP_SENT: &str = "
MATCH (:Address {address: $address})-[:SENT]->(:Transaction)-[:RECEIVED_BY]->(receiver:Address)
RETURN receiver.address AS address, COUNT(*) AS count
ORDER BY count DESC
LIMIT $limit";

const DIRECTION_TOTALS: &str = "
MATCH (a:Address {address: $address})
OPTIONAL MATCH (a)-[:SENT]->(s:Transaction)
WITH a, COUNT(DISTINCT s) AS sent
OPTIONAL MATCH (r:Transaction)-[:RECEIVED_BY]->(a)
RETURN sent, COUNT(DISTINCT r) AS received";

const MONTHLY_RECEIVED: &str = "
MATCH (:Address {address: $address})<-[:RECEIVED_BY]-(tx:Transaction)
WHERE tx.block_timestamp IS NOT NULL
WITH date(datetime({epochSeconds: toInteger(tx.block_timestamp)})) AS day
RETURN day.year AS year, day.month AS month, COUNT(*) AS count
ORDER BY year, month";

const MONTHLY_SENT: &str = "
MATCH (:Address {address: $address})-[:SENT]->(tx:Transaction)
WHERE tx.block_timestamp IS NOT NULL
WITH date(datetime({epochSeconds: toInteger(tx.block_timestamp)})) AS day
RETURN day.year AS year, day.month AS month, COUNT(*) AS count
ORDER BY year, month";

const TRANSACTION_DETAILS: &str = "
MATCH (t:Transaction {hash: $hash})
RETURN
  t.transaction_index AS transactionIndex,
  t.gas_used AS gasUsed,
  t.gas_price AS gasPrice,
  t.transaction_fee AS transactionFee,
  t.block_number AS blockNumber,
  t.block_hash AS blockHash
LIMIT 1";

fn transactions_statement(sort: SortOrder) -> String {
  let order = match sort {
    SortOrder::Time => "toInteger(t.block_timestamp) DESC",
    SortOrder::Amount => "toFloat(t.value) DESC",
  };
  format!(
    "
MATCH (sender:Address)-[:SENT]->(t:Transaction)-[:RECEIVED_BY]->(receiver:Address)
WHERE sender.address = $address OR receiver.address = $address
RETURN sender.address AS sender, receiver.address AS receiver, t.hash AS hash, t.value AS value, t.block_timestamp AS timestamp
ORDER BY {order}
SKIP $offset
LIMIT $limit"
  )
}

const TOTAL_TRANSACTIONS: &str = "
MATCH (sender:Address)-[:SENT]->(t:Transaction)-[:RECEIVED_BY]->(receiver:Address)
WHERE sender.address = $address OR receiver.address = $address
RETURN COUNT(DISTINCT t) AS total";

/// Cypher over the Neo4j HTTP transactional endpoint. Serves chains kept in the graph database.
///
/// Values are stored in wei and timestamps in epoch seconds.
#[derive(Debug, Clone)]
pub struct GraphDatabaseClient {
  http:   Client,
  config: GraphDatabaseConfig,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
  #[serde(default)]
  results: Vec<StatementResult>,
  #[serde(default)]
  errors:  Vec<Neo4jError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
  columns: Vec<String>,
  #[serde(default)]
  data:    Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
  row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Neo4jError {
  code:    String,
  message: String,
}

fn optional_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(None),
    Value::Number(n) => Ok(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))),
    Value::String(s) => s.trim().parse::<f64>().map(|f| Some(f as i64)).map_err(serde::de::Error::custom),
    other => Err(serde::de::Error::custom(format!("expected epoch seconds, got {other}"))),
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewRow {
  #[serde(deserialize_with = "lenient_u64")]
  sent_count:      u64,
  #[serde(deserialize_with = "lenient_u64")]
  received_count:  u64,
  #[serde(deserialize_with = "lenient_f64")]
  amount_sent:     f64,
  #[serde(deserialize_with = "lenient_f64")]
  amount_received: f64,
  #[serde(deserialize_with = "optional_seconds")]
  first_sent:      Option<i64>,
  #[serde(deserialize_with = "optional_seconds")]
  first_received:  Option<i64>,
  #[serde(deserialize_with = "optional_seconds")]
  last_sent:       Option<i64>,
  #[serde(deserialize_with = "optional_seconds")]
  last_received:   Option<i64>,
  contract_type:   Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
  sender:    String,
  receiver:  String,
  hash:      String,
  #[serde(deserialize_with = "lenient_f64")]
  value:     f64,
  #[serde(deserialize_with = "optional_seconds")]
  timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
  #[serde(default)]
  address: Option<String>,
  #[serde(deserialize_with = "lenient_u64")]
  count:   u64,
}

#[derive(Debug, Deserialize)]
struct TotalsRow {
  #[serde(deserialize_with = "lenient_u64")]
  sent:     u64,
  #[serde(deserialize_with = "lenient_u64")]
  received: u64,
}

#[derive(Debug, Deserialize)]
struct MonthRow {
  year:  i32,
  month: u32,
  #[serde(deserialize_with = "lenient_u64")]
  count: u64,
}

#[derive(Debug, Deserialize)]
struct TotalRow {
  #[serde(deserialize_with = "lenient_u64")]
  total: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsRow {
  #[serde(default, deserialize_with = "lenient_u64")]
  transaction_index: u64,
  #[serde(default, deserialize_with = "lenient_f64")]
  gas_used:          f64,
  #[serde(default, deserialize_with = "lenient_f64")]
  gas_price:         f64,
  #[serde(default, deserialize_with = "lenient_f64")]
  transaction_fee:   f64,
  #[serde(default, deserialize_with = "lenient_u64")]
  block_number:      u64,
  #[serde(default)]
  block_hash:        Option<String>,
}

impl GraphDatabaseClient {
  pub fn new(config: GraphDatabaseConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_millis(config.timeout_ms))
      .build()
      .map_err(|e| err_with_loc!(ProviderError::Transport { provider: PROVIDER, message: e.to_string() }))?;
    Ok(Self { http, config })
  }

  fn ensure_served(blockchain: Blockchain) -> Result<()> {
    if blockchain.is_graph_database_chain() {
      Ok(())
    } else {
      Err(err_with_loc!(ProviderError::Unsupported(format!("{} in the graph database", blockchain))))
    }
  }

  fn commit_url(&self) -> String {
    format!("{}/db/{}/tx/commit", self.config.url.trim_end_matches('/'), self.config.database)
  }

  /// Runs one statement and decodes every returned row into `T` by column name.
  async fn run<T: DeserializeOwned>(
    &self,
    operation: &str,
    statement: &str,
    parameters: Value,
  ) -> Result<Vec<T>> {
    let body = json!({ "statements": [{ "statement": statement, "parameters": parameters }] });
    let response = self
      .http
      .post(self.commit_url())
      .basic_auth(&self.config.user, Some(&self.config.password))
      .json(&body)
      .send()
      .await
      .map_err(|e| err_with_loc!(ProviderError::Transport { provider: PROVIDER, message: e.to_string() }))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_else(|_| "<failed to read response text>".to_string());
      error!("graph_db::{}::status::{}", operation, status);
      return Err(err_with_loc!(ProviderError::Status { provider: PROVIDER, status: status.as_u16(), body }));
    }

    let commit: CommitResponse =
      response.json().await.map_err(|e| err_with_loc!(ProviderError::malformed(PROVIDER, e.to_string())))?;
    if !commit.errors.is_empty() {
      error!("graph_db::{}::query_errors::{}", operation, commit.errors.len());
      return Err(err_with_loc!(ProviderError::Query {
        provider: PROVIDER,
        messages: commit.errors.into_iter().map(|e| format!("{}: {}", e.code, e.message)).collect(),
      }));
    }

    let result = commit
      .results
      .into_iter()
      .next()
      .ok_or_else(|| err_with_loc!(ProviderError::malformed(PROVIDER, "no statement result")))?;
    debug!("graph_db::{}::rows::{}", operation, result.data.len());

    result
      .data
      .into_iter()
      .map(|data| {
        let record: Map<String, Value> = result.columns.iter().cloned().zip(data.row).collect();
        serde_json::from_value(Value::Object(record))
          .map_err(|e| err_with_loc!(ProviderError::malformed(PROVIDER, format!("{operation}: {e}"))))
      })
      .collect()
  }
}

#[async_trait]
impl WalletDataProvider for GraphDatabaseClient {
  async fn fetch_overview(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<WalletOverview> {
    Self::ensure_served(blockchain)?;
    let rows: Vec<OverviewRow> = self.run("overview", OVERVIEW, json!({ "address": address })).await?;

    // No matching address node means no history.
    let Some(row) = rows.into_iter().next() else {
      return Ok(WalletOverview::new(address, 0.0));
    };

    let first = [row.first_sent, row.first_received].into_iter().flatten().min();
    let last = [row.last_sent, row.last_received].into_iter().flatten().max();
    let amount_sent = wei_to_coin(row.amount_sent);
    let amount_received = wei_to_coin(row.amount_received);

    Ok(
      WalletOverview::new(address, amount_received - amount_sent)
        .with_counts(row.sent_count, row.received_count)
        .with_amounts(amount_sent, amount_received)
        .with_activity(first.and_then(unix_to_utc), last.and_then(unix_to_utc))
        .with_contract_type(row.contract_type),
    )
  }

  async fn fetch_transactions(
    &self,
    blockchain: Blockchain,
    address: &str,
    query: &TransactionQuery,
  ) -> Result<Vec<Transaction>> {
    Self::ensure_served(blockchain)?;
    let statement = transactions_statement(query.sort);
    let rows: Vec<TransactionRow> = self
      .run("transactions", &statement, json!({ "address": address, "offset": query.offset, "limit": query.limit }))
      .await?;

    rows
      .into_iter()
      .map(|row| {
        let timestamp = row.timestamp.and_then(unix_to_utc).ok_or_else(|| {
          err_with_loc!(ProviderError::malformed(PROVIDER, format!("missing timestamp for {}", row.hash)))
        })?;
        Ok(Transaction::new(row.hash, row.sender, row.receiver, wei_to_coin(row.value), timestamp))
      })
      .collect()
  }

  async fn fetch_top_interactions(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<TopInteractions> {
    Self::ensure_served(blockchain)?;
    let params = json!({ "address": address, "limit": TOP_INTERACTIONS_LIMIT });

    let (received, sent, totals) = futures::try_join!(
      self.run::<CountRow>("top_received", TOP_RECEIVED, params.clone()),
      self.run::<CountRow>("top_sent", TOP_SENT, params.clone()),
      self.run::<TotalsRow>("direction_totals", DIRECTION_TOTALS, params),
    )?;

    let pairs = |rows: Vec<CountRow>| -> Vec<(String, u64)> {
      rows.into_iter().map(|row| (row.address.unwrap_or_default(), row.count)).collect()
    };
    let totals = totals.into_iter().next();

    Ok(TopInteractions::from_counts(
      pairs(received),
      pairs(sent),
      totals.as_ref().map_or(0, |t| t.received),
      totals.as_ref().map_or(0, |t| t.sent),
    ))
  }

  async fn fetch_monthly_counts(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<MonthlyTransactionCount> {
    Self::ensure_served(blockchain)?;
    let params = json!({ "address": address });

    let (received, sent) = futures::try_join!(
      self.run::<MonthRow>("monthly_received", MONTHLY_RECEIVED, params.clone()),
      self.run::<MonthRow>("monthly_sent", MONTHLY_SENT, params),
    )?;

    let series = |rows: Vec<MonthRow>| -> Vec<MonthlyCount> {
      rows.into_iter().map(|row| MonthlyCount { year: row.year, month: row.month, count: row.count }).collect()
    };
    Ok(MonthlyTransactionCount { received: series(received), sent: series(sent) })
  }

  async fn fetch_total_transaction_count(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<u64> {
    Self::ensure_served(blockchain)?;
    let rows: Vec<TotalRow> = self.run("total_transactions", TOTAL_TRANSACTIONS, json!({ "address": address })).await?;
    Ok(rows.first().map_or(0, |row| row.total))
  }

  async fn fetch_transaction_details(
    &self,
    blockchain: Blockchain,
    hash: &str,
  ) -> Result<TransactionDetails> {
    Self::ensure_served(blockchain)?;
    let rows: Vec<DetailsRow> = self.run("transaction_details", TRANSACTION_DETAILS, json!({ "hash": hash })).await?;
    let row = rows
      .into_iter()
      .next()
      .ok_or_else(|| err_with_loc!(ProviderError::malformed(PROVIDER, format!("no transaction {hash}"))))?;

    Ok(TransactionDetails {
      hash:              hash.to_string(),
      transaction_index: row.transaction_index,
      gas_used:          row.gas_used,
      gas_price:         row.gas_price,
      transaction_fee:   wei_to_coin(row.transaction_fee),
      block_number:      row.block_number,
      block_hash:        row.block_hash.unwrap_or_default(),
    })
  }
}
