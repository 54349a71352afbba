use hearthtab_domain::{
    Balance, Money, NewPaymentNote, PaymentNote, SettlementAllocationPolicy, SplitId, UserId,
};

use crate::{error::SettlementError, ports::LedgerStore};

/// Outcome of a recorded settlement.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementReceipt {
    pub note: PaymentNote,
    pub settled_split_ids: Vec<SplitId>,
}

/// Settlement workflow over a [`LedgerStore`].
///
/// Validates a proposed payment against a computed balance, flips the
/// covered splits, and records the payment note. Within one invocation the
/// split update happens-before the note insert; concurrent invocations are
/// serialized only by the store's own row-level semantics.
#[derive(Clone, Copy)]
pub struct SettlementProcessor<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> SettlementProcessor<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    /// Records a payment of `amount` from the balance's debtor to its
    /// creditor.
    ///
    /// Validation happens before any I/O: `amount` must lie in
    /// `(0, balance.amount]`, the balance must carry unsettled splits, and
    /// `acting_user` must be one of the two participants.
    ///
    /// Split closure follows [`SettlementAllocationPolicy`]: the full
    /// amount closes every related split; a partial payment closes an
    /// oldest-first prefix and may close nothing at all while the note is
    /// still recorded.
    ///
    /// If the note insert fails after splits were flipped, the flip is
    /// compensated (`mark_splits_unsettled`) so no settled split is left
    /// behind without a payment record.
    pub async fn settle_payment(
        &self,
        acting_user: UserId,
        balance: &Balance,
        amount: Money,
        note: Option<String>,
    ) -> Result<SettlementReceipt, SettlementError> {
        if !amount.is_positive() || amount > balance.amount {
            return Err(SettlementError::InvalidAmount {
                amount,
                outstanding: balance.amount,
            });
        }
        if balance.related_splits.is_empty() {
            return Err(SettlementError::NoUnsettledSplits);
        }
        if acting_user != balance.from_user.id && acting_user != balance.to_user.id {
            return Err(SettlementError::InvalidActor { actor: acting_user });
        }

        let settled_split_ids = SettlementAllocationPolicy::allocate(balance, amount);
        if !settled_split_ids.is_empty() {
            self.store
                .mark_splits_settled(&settled_split_ids)
                .await
                .map_err(SettlementError::Store)?;
        }

        let payload = NewPaymentNote {
            from_user_id: balance.from_user.id,
            to_user_id: balance.to_user.id,
            amount,
            note,
        };

        match self.store.insert_payment_note(payload).await {
            Ok(note) => {
                tracing::info!(
                    from_user = %note.from_user_id,
                    to_user = %note.to_user_id,
                    amount = %note.amount,
                    settled_splits = settled_split_ids.len(),
                    "Recorded settlement payment"
                );
                Ok(SettlementReceipt {
                    note,
                    settled_split_ids,
                })
            }
            Err(err) => {
                self.compensate_split_flip(&settled_split_ids).await;
                Err(SettlementError::Store(err))
            }
        }
    }

    async fn compensate_split_flip(&self, settled_split_ids: &[SplitId]) {
        if settled_split_ids.is_empty() {
            return;
        }
        if let Err(revert_err) = self.store.mark_splits_unsettled(settled_split_ids).await {
            // Nothing left to do in-process; the splits stay flagged settled
            // with no matching payment note until reconciled out of band.
            tracing::error!(
                error = %revert_err,
                split_count = settled_split_ids.len(),
                "Failed to revert split settlement after note insert failure"
            );
        } else {
            tracing::warn!(
                split_count = settled_split_ids.len(),
                "Reverted split settlement after note insert failure"
            );
        }
    }
}
