//! Folding of ledger records into per-member balances and aggregate statistics.
//!
//! Every function here is pure and synchronous: balances are recomputed from the
//! records handed in on every call and never cached.

use crate::core::models::{payment::Payment, transaction::Transaction};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Absolute tolerance used when checking that balances net to zero.
pub const BALANCE_EPSILON: f64 = 1e-6;

pub type AmountByMember = BTreeMap<Uuid, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerBalances {
    pub total_expenses: f64,
    pub user_expenses: AmountByMember,
    pub user_balances: AmountByMember,
}

impl LedgerBalances {
    pub fn net_total(&self) -> f64 {
        self.user_balances.values().sum()
    }

    pub fn is_conserved(&self) -> bool {
        self.net_total().abs() <= BALANCE_EPSILON
    }

    pub fn balance_of(&self, member: &Uuid) -> f64 {
        self.user_balances.get(member).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub total: f64,
    pub count: usize,
    pub max_amount: f64,
    pub avg_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSummary {
    pub balances: LedgerBalances,
    pub transaction_count: usize,
    pub average_transaction: f64,
    pub largest_transaction: f64,
    pub active_users: usize,
    pub daily_trends: Vec<DailyTrend>,
}

/// Applies one split to `balances`.
///
/// The payer is credited the full amount and every listed member, the payer
/// included when listed, is debited `amount / members`. A split among nobody is
/// skipped.
fn apply_split(balances: &mut AmountByMember, transaction: &Transaction) {
    let count = transaction.members.len();
    if count == 0 {
        return;
    }
    let share = transaction.amount / count as f64;
    for member in &transaction.members {
        *balances.entry(*member).or_insert(0.0) -= share;
    }
    *balances.entry(transaction.payer_id).or_insert(0.0) += transaction.amount;
}

/// Computes totals, per-payer expenses and net balances over active
/// transactions. Soft-deleted records are ignored.
pub fn compute_balances<'a, I>(transactions: I) -> LedgerBalances
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut result = LedgerBalances::default();
    for transaction in transactions.into_iter().filter(|t| t.is_active()) {
        result.total_expenses += transaction.amount;
        *result.user_expenses.entry(transaction.payer_id).or_insert(0.0) += transaction.amount;
        apply_split(&mut result.user_balances, transaction);
    }
    result
}

/// Full statistics for the summary view.
pub fn summarize(transactions: &[Transaction]) -> LedgerSummary {
    let active: Vec<&Transaction> = transactions.iter().filter(|t| t.is_active()).collect();
    let balances = compute_balances(active.iter().copied());

    let mut daily: BTreeMap<NaiveDate, DailyTrend> = BTreeMap::new();
    let mut largest = 0.0_f64;
    for transaction in &active {
        largest = largest.max(transaction.amount);
        let date = transaction.created_at.date_naive();
        let trend = daily.entry(date).or_insert(DailyTrend {
            date,
            total: 0.0,
            count: 0,
            max_amount: 0.0,
            avg_amount: 0.0,
        });
        trend.count += 1;
        trend.total += transaction.amount;
        trend.max_amount = trend.max_amount.max(transaction.amount);
    }

    let daily_trends = daily
        .into_values()
        .map(|mut trend| {
            trend.avg_amount = trend.total / trend.count as f64;
            trend
        })
        .collect();

    let transaction_count = active.len();
    let average_transaction = if transaction_count > 0 {
        balances.total_expenses / transaction_count as f64
    } else {
        0.0
    };

    LedgerSummary {
        active_users: balances.user_expenses.len(),
        balances,
        transaction_count,
        average_transaction,
        largest_transaction: largest,
        daily_trends,
    }
}

/// Payments settle debt: the payer's position rises by the amount and the
/// receiver's falls by the same amount.
pub fn compute_payment_balances<'a, I>(payments: I) -> LedgerBalances
where
    I: IntoIterator<Item = &'a Payment>,
{
    let mut result = LedgerBalances::default();
    for payment in payments.into_iter().filter(|p| p.is_active()) {
        result.total_expenses += payment.amount;
        *result.user_expenses.entry(payment.payer_id).or_insert(0.0) += payment.amount;
        *result.user_balances.entry(payment.payer_id).or_insert(0.0) += payment.amount;
        *result.user_balances.entry(payment.receiver_id).or_insert(0.0) -= payment.amount;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::lifecycle::Lifecycle;
    use crate::core::models::transaction::TransactionDraft;
    use chrono::{TimeZone, Utc};

    fn tx(payer: Uuid, amount: f64, members: &[Uuid]) -> Transaction {
        Transaction::create(TransactionDraft {
            payer_id: payer,
            amount,
            members: members.to_vec(),
            remark: String::new(),
        })
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= BALANCE_EPSILON
    }

    #[test]
    fn payer_inside_member_set_nets_amount_minus_share() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let balances = compute_balances(&[tx(a, 90.0, &[a, b, c])]);

        assert!(close(balances.balance_of(&a), 60.0));
        assert!(close(balances.balance_of(&b), -30.0));
        assert!(close(balances.balance_of(&c), -30.0));
        assert!(close(balances.total_expenses, 90.0));
        assert!(close(balances.user_expenses[&a], 90.0));
        assert!(balances.is_conserved());
    }

    #[test]
    fn payer_outside_member_set_is_credited_full_amount() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let balances = compute_balances(&[tx(a, 50.0, &[b, c])]);

        assert!(close(balances.balance_of(&a), 50.0));
        assert!(close(balances.balance_of(&b), -25.0));
        assert!(close(balances.balance_of(&c), -25.0));
        assert!(balances.is_conserved());
    }

    #[test]
    fn sole_member_payer_is_a_no_op() {
        let a = Uuid::new_v4();
        let balances = compute_balances(&[tx(a, 42.5, &[a])]);
        assert!(close(balances.balance_of(&a), 0.0));
        assert!(close(balances.total_expenses, 42.5));
    }

    #[test]
    fn empty_member_set_is_skipped() {
        let a = Uuid::new_v4();
        let balances = compute_balances(&[tx(a, 10.0, &[])]);
        assert!(balances.user_balances.is_empty());
        assert!(close(balances.total_expenses, 10.0));
        assert!(close(balances.user_expenses[&a], 10.0));
    }

    #[test]
    fn empty_ledger_yields_zeroed_aggregates() {
        let balances = compute_balances(std::iter::empty::<&Transaction>());
        assert_eq!(balances, LedgerBalances::default());

        let summary = summarize(&[]);
        assert_eq!(summary.transaction_count, 0);
        assert_eq!(summary.average_transaction, 0.0);
        assert!(summary.daily_trends.is_empty());
    }

    #[test]
    fn uneven_splits_still_conserve() {
        let members: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let ledger: Vec<Transaction> = (1..40)
            .map(|i| {
                let payer = members[i % members.len()];
                let split = &members[..(i % members.len()) + 1];
                tx(payer, 100.0 / 3.0 * i as f64, split)
            })
            .collect();

        let balances = compute_balances(&ledger);
        assert!(balances.is_conserved(), "net total {}", balances.net_total());
    }

    #[test]
    fn soft_deleted_transactions_are_ignored() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut deleted = tx(a, 100.0, &[a, b]);
        deleted.lifecycle = Lifecycle::SoftDeleted { deleted_at: Utc::now() };
        let kept = tx(b, 20.0, &[a, b]);

        let balances = compute_balances(&[deleted, kept]);
        assert!(close(balances.total_expenses, 20.0));
        assert!(close(balances.balance_of(&a), -10.0));
        assert!(close(balances.balance_of(&b), 10.0));
    }

    #[test]
    fn summary_groups_by_day_in_order() {
        let a = Uuid::new_v4();
        let mut first = tx(a, 10.0, &[a]);
        first.created_at = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        let mut second = tx(a, 30.0, &[a]);
        second.created_at = Utc.with_ymd_and_hms(2024, 3, 2, 18, 0, 0).unwrap();
        let mut third = tx(a, 5.0, &[a]);
        third.created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let summary = summarize(&[first, second, third]);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.active_users, 1);
        assert!(close(summary.largest_transaction, 30.0));
        assert!(close(summary.average_transaction, 15.0));
        assert_eq!(summary.daily_trends.len(), 2);
        assert_eq!(summary.daily_trends[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let busy = &summary.daily_trends[1];
        assert_eq!(busy.count, 2);
        assert!(close(busy.total, 40.0));
        assert!(close(busy.max_amount, 30.0));
        assert!(close(busy.avg_amount, 20.0));
    }

    #[test]
    fn payments_move_amount_from_receiver_to_payer() {
        use crate::core::models::payment::PaymentDraft;
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let payment = Payment::create(PaymentDraft {
            payer_id: a,
            receiver_id: b,
            amount: 25.0,
            remark: "rent".to_string(),
        });
        let balances = compute_payment_balances(&[payment]);
        assert!(close(balances.balance_of(&a), 25.0));
        assert!(close(balances.balance_of(&b), -25.0));
        assert!(balances.is_conserved());
    }
}
