pub mod wallet_use_cases;

pub use wallet_use_cases::PageParams;
pub use wallet_use_cases::QueryError;
pub use wallet_use_cases::TransactionParams;
pub use wallet_use_cases::WalletQueryUseCase;
