#![warn(clippy::uninlined_format_args)]

pub mod balance_service;
pub mod error;
pub mod ports;
pub mod settlement_processor;

pub use balance_service::BalanceService;
pub use error::{FailureKind, SettlementError, StoreError};
pub use ports::LedgerStore;
pub use settlement_processor::{SettlementProcessor, SettlementReceipt};
