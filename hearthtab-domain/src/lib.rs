#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Balance, CurrencyContext, Expense, ExpenseId, ExpenseSplit, HouseholdId, Member, Money,
    NewPaymentNote, PaymentNote, PaymentNoteId, SplitId, SplitType, UserId,
};
pub use services::{BalanceCalculator, SettlementAllocationPolicy};
