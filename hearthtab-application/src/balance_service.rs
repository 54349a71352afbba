use hearthtab_domain::{Balance, BalanceCalculator, CurrencyContext, HouseholdId, UserId};

use crate::{error::StoreError, ports::LedgerStore};

/// Read path for current balances.
///
/// "Refresh" is simply re-running the calculator against freshly fetched
/// splits; there is no cached state to invalidate here.
pub struct BalanceService<'a> {
    store: &'a dyn LedgerStore,
    calculator: BalanceCalculator,
}

impl<'a> BalanceService<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self::with_context(store, CurrencyContext::default())
    }

    pub fn with_context(store: &'a dyn LedgerStore, context: CurrencyContext) -> Self {
        Self {
            store,
            calculator: BalanceCalculator::new(context),
        }
    }

    /// All outstanding balances within the household.
    pub async fn current_balances(
        &self,
        household: HouseholdId,
    ) -> Result<Vec<Balance>, StoreError> {
        let splits = self.store.unsettled_splits(household).await?;
        let members = self.store.household_members(household).await?;
        let balances = self.calculator.calculate(&splits, &members);
        tracing::debug!(
            %household,
            split_count = splits.len(),
            balance_count = balances.len(),
            "Recomputed household balances"
        );
        Ok(balances)
    }

    /// Balances the acting user participates in, debtor or creditor side.
    pub async fn balances_for_user(
        &self,
        acting_user: UserId,
        household: HouseholdId,
    ) -> Result<Vec<Balance>, StoreError> {
        let balances = self.current_balances(household).await?;
        Ok(balances
            .into_iter()
            .filter(|balance| {
                balance.from_user.id == acting_user || balance.to_user.id == acting_user
            })
            .collect())
    }
}
