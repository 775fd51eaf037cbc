use super::engine::monthly_payment;
use super::types::{LoanTerm, PRICE_CAP, RATE_CAP};

/// Affordability search: the largest property price whose monthly payment
/// stays within a target, for a fixed deposit, term, and rate.
#[derive(Debug, Clone, Copy)]
pub struct BudgetSolveConfig {
    pub target_monthly_payment: u64,
    pub deposit: f64,
    pub loan_term: LoanTerm,
    pub interest_rate: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct BudgetSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_price: f64,
    pub candidate_payment: u64,
}

#[derive(Debug, Clone)]
pub struct BudgetSolveResult {
    pub target_monthly_payment: u64,
    pub deposit: f64,
    pub loan_term: LoanTerm,
    pub interest_rate: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub max_affordable_price: f64,
    pub achieved_monthly_payment: u64,
    pub iterations: Vec<BudgetSolveIteration>,
    pub converged: bool,
    pub message: String,
}

/// Bisection over the price range. The floored payment is monotone
/// non-decreasing in the price, and at `price == deposit` it is zero, so the
/// target is always reachable from below; the search narrows the affordable
/// boundary until the bracket fits inside the tolerance.
pub fn solve_budget(config: BudgetSolveConfig) -> Result<BudgetSolveResult, String> {
    validate_config(config)?;

    let payment_at = |price: f64| {
        if config.deposit >= price {
            0
        } else {
            monthly_payment(price - config.deposit, config.interest_rate, config.loan_term)
        }
    };

    if payment_at(PRICE_CAP) <= config.target_monthly_payment {
        return Ok(build_result(
            config,
            PRICE_CAP,
            payment_at(PRICE_CAP),
            Vec::new(),
            true,
            "The full price cap is affordable at this target payment.",
        ));
    }

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut lo = config.deposit;
    let mut hi = PRICE_CAP;
    let mut converged = false;
    let mut it = 0;
    while it < config.max_iterations {
        it += 1;
        let mid = (lo + hi) * 0.5;
        let payment = payment_at(mid);
        iterations.push(BudgetSolveIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_price: mid,
            candidate_payment: payment,
        });

        if payment <= config.target_monthly_payment {
            lo = mid;
        } else {
            hi = mid;
        }

        if (hi - lo).abs() <= config.tolerance {
            converged = true;
            break;
        }
    }

    let achieved = payment_at(lo);
    let message = if converged {
        "Solved maximum affordable property price."
    } else {
        "Reached max iterations before tolerance was met; returning best estimate."
    };
    Ok(build_result(config, lo, achieved, iterations, converged, message))
}

fn build_result(
    config: BudgetSolveConfig,
    max_affordable_price: f64,
    achieved_monthly_payment: u64,
    iterations: Vec<BudgetSolveIteration>,
    converged: bool,
    message: &str,
) -> BudgetSolveResult {
    BudgetSolveResult {
        target_monthly_payment: config.target_monthly_payment,
        deposit: config.deposit,
        loan_term: config.loan_term,
        interest_rate: config.interest_rate,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        max_affordable_price,
        achieved_monthly_payment,
        iterations,
        converged,
        message: message.to_string(),
    }
}

fn validate_config(config: BudgetSolveConfig) -> Result<(), String> {
    if !config.deposit.is_finite() || config.deposit < 0.0 || config.deposit > PRICE_CAP {
        return Err(format!("deposit must be between 0 and {PRICE_CAP}"));
    }
    if !config.interest_rate.is_finite()
        || config.interest_rate < 0.0
        || config.interest_rate > RATE_CAP
    {
        return Err(format!("interest_rate must be between 0 and {RATE_CAP}"));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}
