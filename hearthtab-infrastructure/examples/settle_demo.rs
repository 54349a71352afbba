//! Seeds a two-person household, prints the outstanding balances, records
//! a settlement, and prints the refreshed view.

use hearthtab_application::{BalanceService, SettlementProcessor};
use hearthtab_domain::{Balance, Expense, ExpenseId, HouseholdId, Member, Money, SplitType, UserId};
use hearthtab_infrastructure::MemoryLedgerStore;
use uuid::Uuid;

fn print_balances(label: &str, balances: &[Balance]) {
    println!("{label}:");
    if balances.is_empty() {
        println!("  (all settled)");
    }
    for balance in balances {
        let from = balance.from_user.display_name.as_deref().unwrap_or("?");
        let to = balance.to_user.display_name.as_deref().unwrap_or("?");
        println!(
            "  {from} owes {to} {} ({} splits)",
            balance.amount,
            balance.related_splits.len()
        );
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let household = HouseholdId(Uuid::new_v4());
    let ana = UserId(Uuid::new_v4());
    let bo = UserId(Uuid::new_v4());

    let store = MemoryLedgerStore::new();
    store.upsert_members(
        household,
        vec![
            Member {
                id: ana,
                display_name: Some("ana".to_string()),
            },
            Member {
                id: bo,
                display_name: Some("bo".to_string()),
            },
        ],
    );

    store.insert_expense_with_splits(
        Expense {
            id: ExpenseId::generate(),
            description: "weekly groceries".to_string(),
            amount: Money::new(10000, 2),
            paid_by: ana,
            household_id: household,
            date: chrono::NaiveDate::from_ymd_opt(2025, 6, 7).expect("valid date"),
            category: Some("food".to_string()),
            split_type: SplitType::Equal,
        },
        vec![(bo, Money::new(5000, 2))],
    );
    store.insert_expense_with_splits(
        Expense {
            id: ExpenseId::generate(),
            description: "movie night".to_string(),
            amount: Money::new(3000, 2),
            paid_by: bo,
            household_id: household,
            date: chrono::NaiveDate::from_ymd_opt(2025, 6, 8).expect("valid date"),
            category: Some("fun".to_string()),
            split_type: SplitType::Equal,
        },
        vec![(ana, Money::new(1500, 2))],
    );

    let service = BalanceService::new(&store);
    let balances = service
        .current_balances(household)
        .await
        .expect("balance fetch");
    print_balances("Before settlement", &balances);

    let processor = SettlementProcessor::new(&store);
    let receipt = processor
        .settle_payment(
            bo,
            &balances[0],
            balances[0].amount,
            Some("squared up after movie night".to_string()),
        )
        .await
        .expect("settlement");
    println!(
        "Recorded payment note {} for {}",
        receipt.note.id, receipt.note.amount
    );

    let refreshed = service
        .current_balances(household)
        .await
        .expect("balance refresh");
    print_balances("After settlement", &refreshed);
}
