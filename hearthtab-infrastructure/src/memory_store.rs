use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use hearthtab_application::{LedgerStore, StoreError};
use hearthtab_domain::{
    Expense, ExpenseSplit, HouseholdId, Member, Money, NewPaymentNote, PaymentNote, PaymentNoteId,
    SplitId, UserId,
};

struct StoredSplit {
    /// Insertion sequence; read queries return rows oldest-first, which is
    /// the order the settlement allocation policy relies on.
    seq: u64,
    split: ExpenseSplit,
}

/// In-memory [`LedgerStore`] adapter.
///
/// Mirrors the hosted store's semantics: per-row last-write-wins updates,
/// no cross-table transaction. `fail_next_note_insert` lets integration
/// tests exercise the processor's compensation path.
#[derive(Default)]
pub struct MemoryLedgerStore {
    splits: DashMap<SplitId, StoredSplit>,
    members: DashMap<HouseholdId, Vec<Member>>,
    notes: DashMap<PaymentNoteId, PaymentNote>,
    seq: AtomicU64,
    fail_next_note_insert: AtomicBool,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an expense and its splits; returns the split ids in insertion
    /// order. The payer's own share, if present, is stored like any other
    /// row — the calculator is responsible for ignoring it.
    pub fn insert_expense_with_splits(
        &self,
        expense: Expense,
        shares: Vec<(UserId, Money)>,
    ) -> Vec<SplitId> {
        let mut ids = Vec::with_capacity(shares.len());
        for (debtor, amount_owed) in shares {
            let split = ExpenseSplit {
                id: SplitId::generate(),
                expense_id: expense.id,
                user_id: debtor,
                amount_owed,
                is_settled: false,
                expense: Some(expense.clone()),
            };
            ids.push(split.id);
            self.insert_split_row(split);
        }
        ids
    }

    /// Raw row insert, for seeding odd shapes (e.g. a split whose expense
    /// join came back null).
    pub fn insert_split_row(&self, split: ExpenseSplit) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.splits.insert(split.id, StoredSplit { seq, split });
    }

    pub fn upsert_members(&self, household: HouseholdId, members: Vec<Member>) {
        self.members.insert(household, members);
    }

    /// All payment notes, oldest first.
    pub fn payment_notes(&self) -> Vec<PaymentNote> {
        let mut notes: Vec<PaymentNote> = self
            .notes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        notes.sort_by_key(|note| note.created_at);
        notes
    }

    pub fn split(&self, id: SplitId) -> Option<ExpenseSplit> {
        self.splits.get(&id).map(|entry| entry.split.clone())
    }

    /// Makes the next `insert_payment_note` call fail once.
    pub fn fail_next_note_insert(&self) {
        self.fail_next_note_insert.store(true, Ordering::SeqCst);
    }

    fn set_settled(&self, split_ids: &[SplitId], settled: bool) -> Result<(), StoreError> {
        for id in split_ids {
            if !self.splits.contains_key(id) {
                return Err(StoreError::Rejected {
                    detail: format!("unknown split id {id}"),
                });
            }
        }
        // Row flips are independent updates; a concurrent writer touching
        // the same rows wins or loses per row, exactly like the hosted
        // store.
        for id in split_ids {
            if let Some(mut entry) = self.splits.get_mut(id) {
                entry.split.is_settled = settled;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn unsettled_splits(
        &self,
        household: HouseholdId,
    ) -> Result<Vec<ExpenseSplit>, StoreError> {
        let mut rows: Vec<(u64, ExpenseSplit)> = self
            .splits
            .iter()
            .filter(|entry| {
                let split = &entry.split;
                !split.is_settled
                    && split
                        .expense
                        .as_ref()
                        .is_none_or(|expense| expense.household_id == household)
            })
            .map(|entry| (entry.seq, entry.split.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, split)| split).collect())
    }

    async fn household_members(
        &self,
        household: HouseholdId,
    ) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .members
            .get(&household)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn mark_splits_settled(&self, split_ids: &[SplitId]) -> Result<(), StoreError> {
        self.set_settled(split_ids, true)
    }

    async fn mark_splits_unsettled(&self, split_ids: &[SplitId]) -> Result<(), StoreError> {
        self.set_settled(split_ids, false)
    }

    async fn insert_payment_note(
        &self,
        note: NewPaymentNote,
    ) -> Result<PaymentNote, StoreError> {
        if self.fail_next_note_insert.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                detail: "injected note insert failure".to_string(),
            });
        }
        if !note.amount.is_positive() {
            return Err(StoreError::Rejected {
                detail: format!("non-positive payment amount {}", note.amount),
            });
        }

        let persisted = PaymentNote {
            id: PaymentNoteId::generate(),
            from_user_id: note.from_user_id,
            to_user_id: note.to_user_id,
            amount: note.amount,
            note: note.note,
            created_at: Utc::now(),
        };
        tracing::debug!(note_id = %persisted.id, amount = %persisted.amount, "Inserted payment note");
        self.notes.insert(persisted.id, persisted.clone());
        Ok(persisted)
    }
}
