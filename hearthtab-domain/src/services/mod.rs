pub mod balance_calculator;
pub mod settlement_allocation;

pub use balance_calculator::BalanceCalculator;
pub use settlement_allocation::SettlementAllocationPolicy;
