mod engine;
mod solver;
mod types;

pub use engine::{MortgageEngine, monthly_payment};
pub use solver::{BudgetSolveConfig, BudgetSolveIteration, BudgetSolveResult, solve_budget};
pub use types::{LoanTerm, PRICE_CAP, Quote, RATE_CAP, clamp_amount, clamp_rate};
