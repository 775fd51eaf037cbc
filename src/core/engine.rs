use super::types::{LoanTerm, Quote, clamp_amount, clamp_rate};

/// The four mortgage inputs plus the cached monthly payment derived from
/// them.
///
/// Every setter normalizes its input, repairs the cross-field invariants
/// (deposit never exceeds the property price), and recomputes the payment
/// before returning, so the state is always internally consistent between
/// calls. Nothing here can fail: out-of-range values clamp rather than
/// error.
#[derive(Debug, Clone)]
pub struct MortgageEngine {
    property_price: f64,
    deposit: f64,
    loan_term: LoanTerm,
    interest_rate: f64,
    monthly_payment: u64,
}

impl Default for MortgageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MortgageEngine {
    /// Everything starts at zero, on the longest term.
    pub fn new() -> Self {
        Self {
            property_price: 0.0,
            deposit: 0.0,
            loan_term: LoanTerm::default(),
            interest_rate: 0.0,
            monthly_payment: 0,
        }
    }

    pub fn set_property_price(&mut self, price: f64) {
        self.property_price = clamp_amount(price);
        if self.deposit > self.property_price {
            self.deposit = self.property_price;
        }
        self.recompute();
    }

    pub fn set_deposit(&mut self, deposit: f64) {
        self.deposit = clamp_amount(deposit).min(self.property_price);
        self.recompute();
    }

    pub fn set_loan_term(&mut self, term: LoanTerm) {
        self.loan_term = term;
        self.recompute();
    }

    /// `rate` is the annual rate as a fraction, e.g. 0.045 for 4.5%.
    pub fn set_interest_rate(&mut self, rate: f64) {
        self.interest_rate = clamp_rate(rate);
        self.recompute();
    }

    pub fn property_price(&self) -> f64 {
        self.property_price
    }

    pub fn deposit(&self) -> f64 {
        self.deposit
    }

    pub fn loan_term(&self) -> LoanTerm {
        self.loan_term
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn monthly_payment(&self) -> u64 {
        self.monthly_payment
    }

    pub fn principal(&self) -> f64 {
        (self.property_price - self.deposit).max(0.0)
    }

    /// Deposit as a whole percentage of the property price, zero when the
    /// price itself is zero.
    pub fn deposit_percentage(&self) -> u32 {
        if self.property_price <= 0.0 {
            return 0;
        }
        (self.deposit / self.property_price * 100.0).floor() as u32
    }

    pub fn quote(&self) -> Quote {
        Quote {
            property_price: self.property_price,
            deposit: self.deposit,
            deposit_percentage: self.deposit_percentage(),
            loan_term_years: self.loan_term.years(),
            interest_rate: self.interest_rate,
            principal: self.principal(),
            monthly_payment: self.monthly_payment,
        }
    }

    fn recompute(&mut self) {
        self.monthly_payment = if self.deposit >= self.property_price {
            0
        } else {
            monthly_payment(
                self.property_price - self.deposit,
                self.interest_rate,
                self.loan_term,
            )
        };
    }
}

/// Level monthly payment that fully amortizes `principal` over the term at
/// the given annual rate, floored to whole currency units. A zero rate falls
/// back to straight-line division, which is the limit of the annuity formula
/// and avoids its zero denominator.
pub fn monthly_payment(principal: f64, annual_rate: f64, term: LoanTerm) -> u64 {
    if principal <= 0.0 {
        return 0;
    }
    let monthly_rate = annual_rate / 12.0;
    let total_payments = term.months();
    let payment = if monthly_rate > 0.0 {
        let growth = (1.0 + monthly_rate).powi(total_payments as i32);
        principal * (monthly_rate * growth) / (growth - 1.0)
    } else {
        principal / f64::from(total_payments)
    };
    payment.floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PRICE_CAP, RATE_CAP};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn engine_with(price: f64, deposit: f64, years: u32, rate: f64) -> MortgageEngine {
        let mut engine = MortgageEngine::new();
        engine.set_property_price(price);
        engine.set_deposit(deposit);
        engine.set_loan_term(LoanTerm::from_years(years).expect("offered term"));
        engine.set_interest_rate(rate);
        engine
    }

    #[test]
    fn new_engine_is_all_zero_on_the_longest_term() {
        let engine = MortgageEngine::new();
        assert_eq!(engine.property_price(), 0.0);
        assert_eq!(engine.deposit(), 0.0);
        assert_eq!(engine.loan_term(), LoanTerm::Years35);
        assert_eq!(engine.interest_rate(), 0.0);
        assert_eq!(engine.monthly_payment(), 0);
        assert_eq!(engine.deposit_percentage(), 0);
    }

    #[test]
    fn annuity_payment_matches_reference_case() {
        // 240k principal over 25 years at 5%: the classic annuity result.
        let engine = engine_with(300_000.0, 60_000.0, 25, 0.05);
        assert_eq!(engine.principal(), 240_000.0);
        assert_eq!(engine.monthly_payment(), 1402);
    }

    #[test]
    fn zero_rate_divides_principal_across_the_payments() {
        let engine = engine_with(100_000.0, 0.0, 20, 0.0);
        assert_eq!(engine.monthly_payment(), 416);
    }

    #[test]
    fn thirty_year_term_at_four_percent_matches_reference_case() {
        let engine = engine_with(500_000.0, 100_000.0, 30, 0.04);
        assert_eq!(engine.monthly_payment(), 1909);
    }

    #[test]
    fn payment_is_zero_when_deposit_covers_the_price() {
        let mut engine = engine_with(200_000.0, 200_000.0, 25, 0.05);
        assert_eq!(engine.monthly_payment(), 0);

        engine.set_deposit(300_000.0);
        assert_eq!(engine.deposit(), 200_000.0);
        assert_eq!(engine.monthly_payment(), 0);
    }

    #[test]
    fn property_price_clamps_to_the_cap() {
        let mut engine = MortgageEngine::new();
        engine.set_property_price(1_500_000.0);
        assert_eq!(engine.property_price(), PRICE_CAP);
    }

    #[test]
    fn negative_inputs_clamp_to_zero() {
        let mut engine = engine_with(250_000.0, 50_000.0, 25, 0.05);
        engine.set_deposit(-10.0);
        assert_eq!(engine.deposit(), 0.0);
        engine.set_property_price(-1.0);
        assert_eq!(engine.property_price(), 0.0);
        engine.set_interest_rate(-0.02);
        assert_eq!(engine.interest_rate(), 0.0);
    }

    #[test]
    fn non_finite_inputs_normalize_instead_of_poisoning_state() {
        let mut engine = engine_with(250_000.0, 50_000.0, 25, 0.05);
        engine.set_property_price(f64::NAN);
        assert_eq!(engine.property_price(), 0.0);
        assert_eq!(engine.deposit(), 0.0);
        assert_eq!(engine.monthly_payment(), 0);

        engine.set_property_price(f64::INFINITY);
        assert_eq!(engine.property_price(), PRICE_CAP);
        engine.set_interest_rate(f64::INFINITY);
        assert_eq!(engine.interest_rate(), RATE_CAP);
    }

    #[test]
    fn shrinking_the_price_pulls_the_deposit_down() {
        let mut engine = engine_with(300_000.0, 150_000.0, 25, 0.05);
        engine.set_property_price(100_000.0);
        assert_eq!(engine.deposit(), 100_000.0);
        assert_eq!(engine.monthly_payment(), 0);
    }

    #[test]
    fn deposit_clamps_to_the_current_price() {
        let mut engine = engine_with(200_000.0, 0.0, 25, 0.05);
        engine.set_deposit(250_000.0);
        assert_eq!(engine.deposit(), 200_000.0);
    }

    #[test]
    fn interest_rate_clamps_to_ten_percent() {
        let mut engine = engine_with(200_000.0, 0.0, 25, 0.25);
        assert_eq!(engine.interest_rate(), RATE_CAP);
    }

    #[test]
    fn deposit_percentage_is_floored() {
        assert_eq!(engine_with(200_000.0, 50_000.0, 25, 0.0).deposit_percentage(), 25);
        assert_eq!(engine_with(300_000.0, 100_000.0, 25, 0.0).deposit_percentage(), 33);
        assert_eq!(engine_with(0.0, 50_000.0, 25, 0.0).deposit_percentage(), 0);
        assert_eq!(engine_with(200_000.0, 200_000.0, 25, 0.0).deposit_percentage(), 100);
    }

    #[test]
    fn shorter_terms_cost_more_per_month() {
        let mut previous = 0;
        for years in [35, 30, 25, 20, 15] {
            let payment = engine_with(300_000.0, 0.0, years, 0.05).monthly_payment();
            assert!(payment > previous, "term {years} should cost more per month");
            previous = payment;
        }
    }

    #[test]
    fn setters_are_idempotent_on_already_clamped_values() {
        let mut engine = engine_with(300_000.0, 60_000.0, 25, 0.05);
        let before = engine.quote();

        engine.set_property_price(engine.property_price());
        engine.set_deposit(engine.deposit());
        engine.set_loan_term(engine.loan_term());
        engine.set_interest_rate(engine.interest_rate());

        let after = engine.quote();
        assert_eq!(before.property_price, after.property_price);
        assert_eq!(before.deposit, after.deposit);
        assert_eq!(before.loan_term_years, after.loan_term_years);
        assert_eq!(before.interest_rate, after.interest_rate);
        assert_eq!(before.monthly_payment, after.monthly_payment);
    }

    #[test]
    fn tiny_principal_floors_to_a_zero_payment() {
        let engine = engine_with(100.0, 0.0, 35, 0.0);
        assert_eq!(engine.monthly_payment(), 0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_invariants_hold_after_any_setter_sequence(
            price_a in 0u32..2_000_000,
            deposit_a in 0u32..2_000_000,
            price_b in 0u32..2_000_000,
            deposit_b in 0u32..2_000_000,
            years_index in 0usize..5,
            rate_bp in 0u32..2_000
        ) {
            let mut engine = MortgageEngine::new();
            engine.set_property_price(price_a as f64);
            engine.set_deposit(deposit_a as f64);
            engine.set_loan_term(LoanTerm::ALL[years_index]);
            engine.set_interest_rate(rate_bp as f64 / 10_000.0);
            engine.set_property_price(price_b as f64);
            engine.set_deposit(deposit_b as f64);

            prop_assert!(engine.deposit() >= 0.0);
            prop_assert!(engine.deposit() <= engine.property_price());
            prop_assert!(engine.property_price() <= PRICE_CAP);
            prop_assert!(engine.interest_rate() <= RATE_CAP);
            prop_assert!(engine.deposit_percentage() <= 100);
            if engine.deposit() >= engine.property_price() {
                prop_assert_eq!(engine.monthly_payment(), 0);
            }
        }

        #[test]
        fn prop_payment_is_monotone_in_price_and_deposit(
            price in 1u32..1_000_000,
            price_bump in 1u32..500_000,
            deposit in 0u32..1_000_000,
            deposit_bump in 1u32..500_000,
            years_index in 0usize..5,
            rate_bp in 0u32..1_000
        ) {
            let term = LoanTerm::ALL[years_index];
            let rate = rate_bp as f64 / 10_000.0;

            let base = engine_payment(price as f64, deposit as f64, term, rate);
            let pricier = engine_payment((price + price_bump) as f64, deposit as f64, term, rate);
            prop_assert!(pricier >= base);

            let bigger_deposit =
                engine_payment(price as f64, (deposit + deposit_bump) as f64, term, rate);
            prop_assert!(bigger_deposit <= base);
        }

        #[test]
        fn prop_positive_rate_never_beats_straight_line(
            principal in 1u32..1_000_000,
            years_index in 0usize..5,
            rate_bp in 1u32..1_000
        ) {
            let term = LoanTerm::ALL[years_index];
            let with_interest = monthly_payment(principal as f64, rate_bp as f64 / 10_000.0, term);
            let interest_free = monthly_payment(principal as f64, 0.0, term);
            prop_assert!(with_interest >= interest_free);
        }

        #[test]
        fn prop_zero_rate_is_straight_line_division(
            principal in 1u32..1_000_000,
            years_index in 0usize..5
        ) {
            let term = LoanTerm::ALL[years_index];
            let expected = (principal as f64 / f64::from(term.months())).floor() as u64;
            prop_assert_eq!(monthly_payment(principal as f64, 0.0, term), expected);
        }
    }

    fn engine_payment(price: f64, deposit: f64, term: LoanTerm, rate: f64) -> u64 {
        let mut engine = MortgageEngine::new();
        engine.set_property_price(price);
        engine.set_deposit(deposit);
        engine.set_loan_term(term);
        engine.set_interest_rate(rate);
        engine.monthly_payment()
    }
}
