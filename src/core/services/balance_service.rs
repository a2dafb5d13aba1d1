use crate::ledger::{CalculatedTransaction, Transaction};

pub struct BalanceService;

impl BalanceService {
    /// Annotates each row with running balances in ledger order.
    ///
    /// The estimated balance accumulates planned figures only. The actual balance
    /// accumulates effective figures, so a row without recorded actuals still moves
    /// it by its plan. Sums saturate at the `i64` bounds. `current_year` resolves
    /// yearless `D/M` dates.
    pub fn calculate(
        transactions: &[Transaction],
        current_year: i32,
    ) -> Vec<CalculatedTransaction> {
        let mut est_balance = 0_i64;
        let mut act_balance = 0_i64;
        transactions
            .iter()
            .map(|txn| {
                est_balance = est_balance
                    .saturating_add(txn.plan_income)
                    .saturating_sub(txn.plan_expense);
                act_balance = act_balance
                    .saturating_add(txn.effective_income())
                    .saturating_sub(txn.effective_expense());
                CalculatedTransaction {
                    transaction: txn.clone(),
                    est_balance,
                    act_balance,
                    difference: act_balance.saturating_sub(est_balance),
                    timestamp: txn.timestamp(current_year),
                }
            })
            .collect()
    }
}
