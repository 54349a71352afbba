use crate::model::{Balance, Money, SplitId};

/// Split-selection policy for recording a payment against a balance.
///
/// Splits are only ever closed whole; a payment that cannot fully cover the
/// next split in line leaves it (and everything after it) open, and the
/// remainder lives solely in the payment note.
pub struct SettlementAllocationPolicy;

impl SettlementAllocationPolicy {
    /// Returns the ids of the related splits to mark settled for `amount`.
    ///
    /// Paying the full outstanding balance closes every related split.
    /// A partial payment walks the splits in the order they were listed
    /// (oldest first) and closes a sequential prefix: the walk stops at the
    /// first split the cumulative payment cannot cover.
    pub fn allocate(balance: &Balance, amount: Money) -> Vec<SplitId> {
        if amount == balance.amount {
            return balance
                .related_splits
                .iter()
                .map(|split| split.id)
                .collect();
        }

        let mut settled = Vec::new();
        let mut cumulative = Money::ZERO;
        for split in &balance.related_splits {
            if cumulative + split.amount_owed > amount {
                break;
            }
            cumulative += split.amount_owed;
            settled.push(split.id);
        }
        settled
    }
}
