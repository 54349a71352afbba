use fxhash::FxHashMap;
use indexmap::IndexMap;

use crate::model::{Balance, CurrencyContext, ExpenseSplit, Member, Money, UserId};

/// Balance derivation service.
///
/// Reduces a set of expense splits to net pairwise debts between household
/// members. Pure: no I/O, no hidden state, identical output for identical
/// input.
pub struct BalanceCalculator {
    context: CurrencyContext,
}

struct PairLedger {
    /// Signed net relative to the canonical pair order: positive means the
    /// first member of the key owes the second.
    net: Money,
    splits: Vec<ExpenseSplit>,
}

impl BalanceCalculator {
    pub fn new(context: CurrencyContext) -> Self {
        Self { context }
    }

    /// Reduces `splits` to at most one directed balance per unordered user
    /// pair.
    ///
    /// Settled splits and self-paid splits (debtor == payer) never
    /// contribute. A split whose embedded expense failed to join is skipped
    /// rather than aborting the whole calculation. Net positions below one
    /// atomic currency unit are suppressed. Emitted members are resolved
    /// from `members`, falling back to [`Member::stub`] for unknown ids.
    pub fn calculate(&self, splits: &[ExpenseSplit], members: &[Member]) -> Vec<Balance> {
        let mut pairs: IndexMap<(UserId, UserId), PairLedger> = IndexMap::new();

        for split in splits {
            if split.is_settled {
                continue;
            }
            let Some(expense) = &split.expense else {
                tracing::warn!(
                    split_id = %split.id,
                    expense_id = %split.expense_id,
                    "Skipping split with missing embedded expense"
                );
                continue;
            };

            let debtor = split.user_id;
            let payer = expense.paid_by;
            if debtor == payer {
                continue;
            }

            let key = pair_key(debtor, payer);
            let ledger = pairs.entry(key).or_insert_with(|| PairLedger {
                net: Money::ZERO,
                splits: Vec::new(),
            });
            if debtor == key.0 {
                ledger.net += split.amount_owed;
            } else {
                ledger.net -= split.amount_owed;
            }
            ledger.splits.push(split.clone());
        }

        let roster: FxHashMap<UserId, &Member> =
            members.iter().map(|member| (member.id, member)).collect();
        let minimum_unit = self.context.minimum_unit();

        let mut balances = Vec::with_capacity(pairs.len());
        for ((first, second), ledger) in pairs {
            if ledger.net.abs() < minimum_unit {
                continue;
            }
            let (from, to) = if ledger.net.is_positive() {
                (first, second)
            } else {
                (second, first)
            };

            balances.push(Balance {
                from_user: resolve_member(&roster, from),
                to_user: resolve_member(&roster, to),
                amount: ledger.net.abs(),
                related_splits: ledger.splits,
                payment_link: None,
            });
        }

        balances
    }
}

impl Default for BalanceCalculator {
    fn default() -> Self {
        Self::new(CurrencyContext::default())
    }
}

fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn resolve_member(roster: &FxHashMap<UserId, &Member>, id: UserId) -> Member {
    roster
        .get(&id)
        .map(|member| (*member).clone())
        .unwrap_or_else(|| Member::stub(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expense, ExpenseId, HouseholdId, SplitId, SplitType};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    fn uid(n: u128) -> UserId {
        UserId(Uuid::from_u128(n))
    }

    fn member(n: u128, name: &str) -> Member {
        Member {
            id: uid(n),
            display_name: Some(name.to_string()),
        }
    }

    fn expense(payer: UserId, total: Money) -> Expense {
        Expense {
            id: ExpenseId::generate(),
            description: "groceries".to_string(),
            amount: total,
            paid_by: payer,
            household_id: HouseholdId(Uuid::from_u128(99)),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
            category: None,
            split_type: SplitType::Equal,
        }
    }

    fn split(debtor: UserId, payer: UserId, owed: Money) -> ExpenseSplit {
        let expense = expense(payer, owed + owed);
        ExpenseSplit {
            id: SplitId::generate(),
            expense_id: expense.id,
            user_id: debtor,
            amount_owed: owed,
            is_settled: false,
            expense: Some(expense),
        }
    }

    #[fixture]
    fn calculator() -> BalanceCalculator {
        BalanceCalculator::default()
    }

    #[rstest]
    fn single_split_yields_one_balance(calculator: BalanceCalculator) {
        let members = vec![member(1, "ana"), member(2, "bo")];
        let splits = vec![split(uid(2), uid(1), Money::new(5000, 2))];

        let balances = calculator.calculate(&splits, &members);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].from_user.id, uid(2));
        assert_eq!(balances[0].to_user.id, uid(1));
        assert_eq!(balances[0].amount, Money::new(5000, 2));
        assert_eq!(balances[0].related_splits.len(), 1);
    }

    #[rstest]
    fn reciprocal_debts_net_to_single_direction(calculator: BalanceCalculator) {
        let members = vec![member(1, "ana"), member(2, "bo")];
        let splits = vec![
            split(uid(2), uid(1), Money::new(5000, 2)),
            split(uid(1), uid(2), Money::new(3000, 2)),
        ];

        let balances = calculator.calculate(&splits, &members);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].from_user.id, uid(2));
        assert_eq!(balances[0].to_user.id, uid(1));
        assert_eq!(balances[0].amount, Money::new(2000, 2));
        // Both directions contributed to the netted figure.
        assert_eq!(balances[0].related_splits.len(), 2);
    }

    #[rstest]
    #[case::self_paid(split(uid(1), uid(1), Money::new(10000, 2)))]
    #[case::settled(ExpenseSplit {
        is_settled: true,
        ..split(uid(2), uid(1), Money::new(5000, 2))
    })]
    #[case::missing_expense(ExpenseSplit {
        expense: None,
        ..split(uid(2), uid(1), Money::new(5000, 2))
    })]
    fn non_contributing_splits_yield_empty_result(
        calculator: BalanceCalculator,
        #[case] split: ExpenseSplit,
    ) {
        let members = vec![member(1, "ana"), member(2, "bo")];
        assert!(calculator.calculate(&[split], &members).is_empty());
    }

    #[rstest]
    fn empty_input_yields_empty_output(calculator: BalanceCalculator) {
        assert!(calculator.calculate(&[], &[]).is_empty());
    }

    #[rstest]
    fn sub_cent_net_is_suppressed(calculator: BalanceCalculator) {
        let splits = vec![split(uid(2), uid(1), Money::new(5, 3))];
        assert!(calculator.calculate(&splits, &[]).is_empty());
    }

    #[rstest]
    fn exact_minimum_unit_is_emitted(calculator: BalanceCalculator) {
        let splits = vec![split(uid(2), uid(1), Money::new(1, 2))];
        let balances = calculator.calculate(&splits, &[]);
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].amount, Money::new(1, 2));
    }

    #[rstest]
    fn malformed_split_does_not_poison_the_rest(calculator: BalanceCalculator) {
        let splits = vec![
            ExpenseSplit {
                expense: None,
                ..split(uid(3), uid(1), Money::new(9900, 2))
            },
            split(uid(2), uid(1), Money::new(5000, 2)),
        ];

        let balances = calculator.calculate(&splits, &[]);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].from_user.id, uid(2));
    }

    #[rstest]
    fn unknown_member_resolves_to_stub(calculator: BalanceCalculator) {
        let members = vec![member(1, "ana")];
        let splits = vec![split(uid(2), uid(1), Money::new(5000, 2))];

        let balances = calculator.calculate(&splits, &members);

        assert_eq!(balances[0].from_user, Member::stub(uid(2)));
        assert_eq!(balances[0].to_user.display_name.as_deref(), Some("ana"));
    }

    #[rstest]
    fn each_unordered_pair_appears_at_most_once(calculator: BalanceCalculator) {
        let splits = vec![
            split(uid(2), uid(1), Money::new(4000, 2)),
            split(uid(1), uid(2), Money::new(1000, 2)),
            split(uid(3), uid(1), Money::new(2500, 2)),
            split(uid(2), uid(1), Money::new(500, 2)),
        ];

        let balances = calculator.calculate(&splits, &[]);

        let mut pairs: Vec<(UserId, UserId)> = balances
            .iter()
            .map(|balance| pair_key(balance.from_user.id, balance.to_user.id))
            .collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), balances.len());
        assert_eq!(balances.len(), 2);
    }

    #[rstest]
    fn calculation_is_idempotent(calculator: BalanceCalculator) {
        let members = vec![member(1, "ana"), member(2, "bo"), member(3, "kim")];
        let splits = vec![
            split(uid(2), uid(1), Money::new(5000, 2)),
            split(uid(3), uid(2), Money::new(1234, 2)),
            split(uid(1), uid(3), Money::new(800, 2)),
        ];

        let first = calculator.calculate(&splits, &members);
        let second = calculator.calculate(&splits, &members);
        assert_eq!(first, second);
    }
}
