use async_trait::async_trait;
use hearthtab_domain::{ExpenseSplit, HouseholdId, Member, NewPaymentNote, PaymentNote, SplitId};

use crate::error::StoreError;

/// Persistence port for the balance/settlement core.
///
/// Backed by a hosted relational store in production; reads are simple
/// filtered queries, writes are row updates plus an insert-only note table.
/// Split updates are per-row last-write-wins — the store offers no
/// cross-table transaction, which is why the processor carries a
/// compensating action for the two-step settlement write.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Unsettled splits for the household, each carrying its embedded
    /// expense where the join resolved (`None` models a null join row).
    async fn unsettled_splits(
        &self,
        household: HouseholdId,
    ) -> Result<Vec<ExpenseSplit>, StoreError>;

    async fn household_members(&self, household: HouseholdId)
    -> Result<Vec<Member>, StoreError>;

    async fn mark_splits_settled(&self, split_ids: &[SplitId]) -> Result<(), StoreError>;

    /// Compensation path: flips the settled flag back after a failed
    /// payment-note insert.
    async fn mark_splits_unsettled(&self, split_ids: &[SplitId]) -> Result<(), StoreError>;

    async fn insert_payment_note(&self, note: NewPaymentNote)
    -> Result<PaymentNote, StoreError>;
}
