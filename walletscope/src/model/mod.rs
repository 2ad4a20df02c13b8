pub mod blockchain;
pub mod interaction;
pub mod monthly;
pub mod query;
pub mod report;
pub mod transaction;
pub mod wallet;

pub use blockchain::Blockchain;
pub use interaction::Interaction;
pub use interaction::TopInteractions;
pub use monthly::MonthlyBucket;
pub use monthly::MonthlyCount;
pub use monthly::MonthlyTransactionCount;
pub use query::SortOrder;
pub use query::TransactionQuery;
pub use report::ReportSummary;
pub use report::WalletReport;
pub use transaction::Transaction;
pub use transaction::TransactionDetails;
pub use wallet::WalletOverview;

/// Hex addresses compare without regard to checksum casing.
pub fn same_address(
  a: &str,
  b: &str,
) -> bool {
  a.eq_ignore_ascii_case(b)
}
