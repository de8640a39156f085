//! Cost-share resolution for a single expense.

use std::collections::BTreeMap;

use crate::{Expense, MoneyCents, ResultEngine, Split};

/// Per-member consumption of one expense, plus the payer's credit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostShares {
    pub payer_id: String,
    /// The full expense amount, credited to the payer.
    pub paid: MoneyCents,
    /// Member id → amount consumed. Sums exactly to `paid`.
    pub shares: BTreeMap<String, MoneyCents>,
}

/// Resolves an expense into cost shares.
///
/// Pure: no side effects, deterministic for a given expense. Equal splits
/// divide with [`MoneyCents::split_even`] over the beneficiary set in
/// ascending member-id order, so remainder cents always land on the same
/// members. Custom splits are re-validated against the amount even though
/// ingestion already checked them; a record that drifted out of shape fails
/// here instead of corrupting balances.
pub fn resolve(expense: &Expense) -> ResultEngine<CostShares> {
    expense.split.validate(expense.amount)?;

    let shares = match &expense.split {
        Split::Equal { among } => {
            // `among` is normalized sorted + deduplicated, which fixes the
            // remainder distribution order.
            let parts = expense.amount.split_even(among.len())?;
            among.iter().cloned().zip(parts).collect()
        }
        Split::Custom { amounts } => amounts.clone(),
    };

    Ok(CostShares {
        payer_id: expense.payer_id.clone(),
        paid: expense.amount,
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, EngineError, SplitMode};
    use chrono::Utc;

    fn expense(amount: i64, split: Split) -> Expense {
        Expense::new(
            "hh1".to_string(),
            "Groceries".to_string(),
            MoneyCents::new(amount),
            Category::Groceries,
            Utc::now(),
            "m1".to_string(),
            split,
        )
        .unwrap()
    }

    #[test]
    fn equal_split_shares_sum_to_amount() {
        let split = Split::from_record(
            SplitMode::Equal,
            vec!["m1".into(), "m2".into(), "m3".into()],
            BTreeMap::new(),
        )
        .unwrap();
        let shares = resolve(&expense(1000, split)).unwrap();

        let total: MoneyCents = shares.shares.values().copied().sum();
        assert_eq!(total, MoneyCents::new(1000));
        // Remainder cent goes to the first member in id order.
        assert_eq!(shares.shares["m1"], MoneyCents::new(334));
        assert_eq!(shares.shares["m2"], MoneyCents::new(333));
        assert_eq!(shares.shares["m3"], MoneyCents::new(333));
    }

    #[test]
    fn custom_split_passes_shares_through() {
        let split = Split::from_record(
            SplitMode::Custom,
            vec![],
            [("m1".to_string(), 2000), ("m2".to_string(), 8000)]
                .into_iter()
                .collect(),
        )
        .unwrap();
        let shares = resolve(&expense(10_000, split)).unwrap();
        assert_eq!(shares.shares["m1"], MoneyCents::new(2000));
        assert_eq!(shares.shares["m2"], MoneyCents::new(8000));
    }

    #[test]
    fn empty_equal_split_cannot_reach_resolution() {
        // `Expense::new` already rejects it at the boundary.
        let split = Split::from_record(SplitMode::Equal, vec![], BTreeMap::new()).unwrap();
        let result = Expense::new(
            "hh1".to_string(),
            "Nothing".to_string(),
            MoneyCents::new(100),
            Category::Other("misc".to_string()),
            Utc::now(),
            "m1".to_string(),
            split,
        );
        assert!(matches!(result, Err(EngineError::InvalidSplit(_))));
    }
}
