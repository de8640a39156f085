//! Transfer planning over a set of net balances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::MoneyCents;

/// One peer-to-peer payment that reduces outstanding balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: MoneyCents,
}

/// Plans the transfers that zero a balance map.
///
/// Greedy two-pointer over the balances sorted descending by amount: the
/// largest creditor is repeatedly matched with the largest-magnitude debtor
/// for `min(credit, |debt|)`, advancing whichever side reaches zero. Equal
/// magnitudes keep ascending member-id order (the sort is stable over the
/// id-ordered input), so the plan is deterministic.
///
/// Already-settled input (all zeros) produces an empty plan. The plan length
/// is at most `non-zero members - 1`: every transfer zeroes at least one
/// side, and the last one zeroes both.
#[must_use]
pub fn plan(balances: &BTreeMap<String, MoneyCents>) -> Vec<Transfer> {
    // BTreeMap iteration is id-ascending; the stable sort preserves that
    // order between equal amounts.
    let mut entries: Vec<(&str, MoneyCents)> = balances
        .iter()
        .map(|(member, amount)| (member.as_str(), *amount))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    if entries.is_empty() {
        return transfers;
    }

    let mut i = 0;
    let mut j = entries.len() - 1;

    while i < j {
        let credit = entries[i].1;
        let debt = entries[j].1;

        if !credit.is_positive() {
            i += 1;
            continue;
        }
        if !debt.is_negative() {
            j -= 1;
            continue;
        }

        let amount = credit.min(debt.abs());
        if amount.is_positive() {
            transfers.push(Transfer {
                from: entries[j].0.to_string(),
                to: entries[i].0.to_string(),
                amount,
            });
            entries[i].1 -= amount;
            entries[j].1 += amount;
        }

        if entries[i].1.is_zero() {
            i += 1;
        }
        if entries[j].1.is_zero() {
            j -= 1;
        }
    }

    transfers
}
