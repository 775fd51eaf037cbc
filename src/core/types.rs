use serde::Serialize;

/// Upper bound on the property price; anything above it clamps down.
pub const PRICE_CAP: f64 = 1_000_000.0;

/// Upper bound on the annual interest rate, as a fraction (10%).
pub const RATE_CAP: f64 = 0.1;

/// The five loan terms on offer, 35 down to 15 years in steps of five.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LoanTerm {
    Years35,
    Years30,
    Years25,
    Years20,
    Years15,
}

impl LoanTerm {
    pub const ALL: [LoanTerm; 5] = [
        LoanTerm::Years35,
        LoanTerm::Years30,
        LoanTerm::Years25,
        LoanTerm::Years20,
        LoanTerm::Years15,
    ];

    pub fn from_years(years: u32) -> Option<LoanTerm> {
        match years {
            35 => Some(LoanTerm::Years35),
            30 => Some(LoanTerm::Years30),
            25 => Some(LoanTerm::Years25),
            20 => Some(LoanTerm::Years20),
            15 => Some(LoanTerm::Years15),
            _ => None,
        }
    }

    pub fn years(self) -> u32 {
        match self {
            LoanTerm::Years35 => 35,
            LoanTerm::Years30 => 30,
            LoanTerm::Years25 => 25,
            LoanTerm::Years20 => 20,
            LoanTerm::Years15 => 15,
        }
    }

    pub fn months(self) -> u32 {
        self.years() * 12
    }
}

impl Default for LoanTerm {
    fn default() -> Self {
        LoanTerm::Years35
    }
}

/// Normalize a currency amount into `[0, PRICE_CAP]`. NaN becomes zero and
/// infinities clamp to the nearest bound, so any `f64` yields a valid amount.
pub fn clamp_amount(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, PRICE_CAP)
}

/// Normalize an annual rate fraction into `[0, RATE_CAP]`, with the same
/// NaN-to-zero policy as `clamp_amount`.
pub fn clamp_rate(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, RATE_CAP)
}

/// Snapshot of the engine state plus its derived figures, as handed to the
/// presentation layer. Amounts are plain numbers; formatting is the caller's.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub property_price: f64,
    pub deposit: f64,
    pub deposit_percentage: u32,
    pub loan_term_years: u32,
    pub interest_rate: f64,
    pub principal: f64,
    pub monthly_payment: u64,
}
