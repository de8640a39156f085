//! Net balances over a collection of expenses.

use std::collections::BTreeMap;

use crate::{Expense, MoneyCents, ResultEngine, split};

/// Folds expenses into a net balance per member.
///
/// Every roster member starts at zero; each expense credits its payer the
/// full amount and debits every beneficiary its cost share. Members that
/// appear in an expense but left the roster (an ex-member's old records) are
/// added on the fly, matching how the store keeps their ids around.
///
/// `settlement`-category expenses are not special-cased: a recorded payment
/// credits the debtor-turned-payer and debits the creditor-turned-
/// beneficiary through the same fold, which is exactly what re-zeroes the
/// pair after money changes hands.
///
/// The output always sums to zero: each expense adds `amount` once on the
/// payer side and subtracts shares summing to `amount` on the other, and
/// integer cents leave no drift for a tolerance to absorb.
pub fn aggregate<'a, R>(roster: R, expenses: &[Expense]) -> ResultEngine<BTreeMap<String, MoneyCents>>
where
    R: IntoIterator<Item = &'a str>,
{
    let mut balances: BTreeMap<String, MoneyCents> = roster
        .into_iter()
        .map(|member| (member.to_string(), MoneyCents::ZERO))
        .collect();

    for expense in expenses {
        let shares = split::resolve(expense)?;

        *balances.entry(shares.payer_id).or_insert(MoneyCents::ZERO) += shares.paid;
        for (member, share) in shares.shares {
            *balances.entry(member).or_insert(MoneyCents::ZERO) -= share;
        }
    }

    Ok(balances)
}
