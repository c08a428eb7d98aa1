use std::collections::HashMap;

use super::{Amount, BalanceWindow, Entry};

/// Compute the net balance of every participant with at least one entry in the window.
/// Participants without entries in the window are absent from the map.
pub fn compute_balances(entries: &[Entry], window: &BalanceWindow) -> HashMap<String, Amount> {
    let mut balances: HashMap<String, Amount> = HashMap::new();

    for entry in entries.iter().filter(|e| window.contains(&e.recorded_at)) {
        let balance = balances.entry(entry.name.clone()).or_insert(0);
        *balance = balance.saturating_add(entry.amount);
    }

    balances
}

/// Sum of all amounts in the window. Zero when the window is empty.
pub fn compute_total(entries: &[Entry], window: &BalanceWindow) -> Amount {
    entries
        .iter()
        .filter(|e| window.contains(&e.recorded_at))
        .fold(0, |total: Amount, e| total.saturating_add(e.amount))
}

/// Balances ordered by participant name, for display.
pub fn sorted_balances(balances: HashMap<String, Amount>) -> Vec<(String, Amount)> {
    let mut sorted: Vec<(String, Amount)> = balances.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}
