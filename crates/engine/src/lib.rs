//! Household ledger & inventory engine.
//!
//! The engine owns the two genuinely algorithmic parts of the product:
//!
//! - **Expense settlement**: [`split`] resolves one expense into per-member
//!   cost shares, [`balance`] folds a month of expenses into net balances,
//!   and [`settlement`] turns balances into a minimal transfer plan. All
//!   three are pure functions over snapshots; they take no locks and are safe
//!   to recompute on every read.
//! - **Inventory depletion**: the sweeper walks due-but-unprocessed planned
//!   slots and applies their stock decrements exactly once, inside one DB
//!   transaction per slot, safe under any number of concurrent sweepers.
//!
//! Everything else ([`Engine`] ops) is the storage plumbing around them:
//! households, members, expense records, meal stock and the planner calendar.
//!
//! All money is integer cents ([`MoneyCents`]) and all stock is integer
//! hundredths of a portion ([`Portions`]); there is no floating point and no
//! epsilon comparison anywhere in the crate.

pub use commands::{ExpenseCmd, MealCmd, SlotCmd};
pub use error::EngineError;
pub use expenses::{Category, Expense, Split, SplitMode};
pub use meals::{Meal, MealKind};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, SpendingSummary, SweepReport};
pub use period::Period;
pub use portions::Portions;
pub use settlement::Transfer;
pub use slots::{Assignment, PlannedSlot, ServiceKind, SlotState, slot_key};
pub use split::CostShares;

pub mod balance;
mod commands;
mod error;
pub mod expenses;
pub mod households;
pub mod meals;
pub mod members;
mod money;
mod ops;
mod period;
mod portions;
pub mod settlement;
pub mod slots;
pub mod split;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
