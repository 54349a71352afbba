use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exact decimal currency amount.
///
/// Amounts coming out of the hosted store are decimal columns; keeping them
/// in `Decimal` avoids binary-float drift, so the one-cent suppression in
/// [`CurrencyContext`] is a policy value rather than an epsilon workaround.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Builds an amount from an integer mantissa and a decimal scale,
    /// e.g. `Money::new(1050, 2)` is 10.50.
    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, value| acc + value)
    }
}

/// Currency configuration for balance derivation.
///
/// `scale` is the number of decimal places of the atomic unit (2 for USD
/// cents). Net positions whose magnitude falls strictly below one atomic
/// unit are treated as settled noise and suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrencyContext {
    pub scale: u32,
}

impl CurrencyContext {
    pub fn minimum_unit(self) -> Money {
        Money::new(1, self.scale)
    }
}

impl Default for CurrencyContext {
    fn default() -> Self {
        Self { scale: 2 }
    }
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(HouseholdId);
id_newtype!(ExpenseId);
id_newtype!(SplitId);
id_newtype!(PaymentNoteId);

/// Household member as known to the roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub display_name: Option<String>,
}

impl Member {
    /// Minimal fallback record for a user id missing from the roster.
    pub fn stub(id: UserId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Custom,
}

/// A shared cost event. Read-only from this core's perspective.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Money,
    pub paid_by: UserId,
    pub household_id: HouseholdId,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub split_type: SplitType,
}

/// One user's owed portion of a shared expense.
///
/// `expense` is the embedded join row; the hosted store can return it as
/// null, so downstream code must handle the missing case explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub id: SplitId,
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    pub amount_owed: Money,
    pub is_settled: bool,
    pub expense: Option<Expense>,
}

/// Derived net debt from one user to another. Never persisted; owned by
/// the calculation call that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Balance {
    pub from_user: Member,
    pub to_user: Member,
    pub amount: Money,
    /// Contributing splits, in the order they were supplied.
    pub related_splits: Vec<ExpenseSplit>,
    pub payment_link: Option<String>,
}

/// Persisted record of a completed settlement. Created once, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentNote {
    pub id: PaymentNoteId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount: Money,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a payment note; the store assigns id and timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewPaymentNote {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount: Money,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::cents(Money::new(1050, 2), "\"10.50\"")]
    #[case::negative(Money::new(-5, 2), "\"-0.05\"")]
    #[case::sub_cent(Money::new(5, 3), "\"0.005\"")]
    fn money_serializes_as_a_bare_decimal_string(#[case] amount: Money, #[case] json: &str) {
        // The hosted store's decimal columns arrive as JSON strings; the
        // newtype must not add a wrapping object.
        assert_eq!(serde_json::to_string(&amount).expect("serialize"), json);
        let parsed: Money = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed, amount);
    }

    #[rstest]
    fn ids_serialize_as_bare_uuid_strings() {
        let id = UserId(Uuid::from_u128(42));
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id.0));
    }

    #[rstest]
    #[case::half_cent(Money::new(5, 3), 2, true)]
    #[case::exact_cent(Money::new(1, 2), 2, false)]
    #[case::over_a_cent(Money::new(15, 3), 2, false)]
    fn minimum_unit_orders_against_amounts(
        #[case] amount: Money,
        #[case] scale: u32,
        #[case] below: bool,
    ) {
        let unit = CurrencyContext { scale }.minimum_unit();
        assert_eq!(amount.abs() < unit, below);
    }
}
