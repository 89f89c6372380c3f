use rust_decimal::{Decimal, RoundingStrategy};

const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

///
/// subtotal = unit_price * seats, tax = subtotal * tax_rate,
/// every amount rounded half-up to two decimals before the next step
///
pub fn compute_totals(unit_price: Decimal, seats: u32, tax_rate: Decimal) -> Totals {
    let unit_price = round_money(unit_price);
    let subtotal = round_money(unit_price * Decimal::from(seats));
    let tax = round_money(subtotal * tax_rate);
    let total = round_money(subtotal + tax);

    Totals {
        unit_price,
        subtotal,
        tax,
        total,
    }
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod test {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn compute_totals_two_seats() {
        let totals = compute_totals(dec!(25.00), 2, dec!(0.12));

        assert_eq!(totals.unit_price, dec!(25.00));
        assert_eq!(totals.subtotal, dec!(50.00));
        assert_eq!(totals.tax, dec!(6.00));
        assert_eq!(totals.total, dec!(56.00));
    }

    #[test]
    fn compute_totals_rounds_tax_half_up() {
        // 10.25 * 3 = 30.75, tax = 3.69
        let totals = compute_totals(dec!(10.25), 3, dec!(0.12));

        assert_eq!(totals.subtotal, dec!(30.75));
        assert_eq!(totals.tax, dec!(3.69));
        assert_eq!(totals.total, dec!(34.44));
    }

    #[test]
    fn compute_totals_midpoint_rounds_away_from_zero() {
        // 0.125 at the midpoint rounds to 0.13, not 0.12
        let totals = compute_totals(dec!(1.25), 1, dec!(0.10));

        assert_eq!(totals.tax, dec!(0.13));
        assert_eq!(totals.total, dec!(1.38));
    }

    #[test]
    fn compute_totals_normalizes_unit_price_scale() {
        let totals = compute_totals(dec!(19.999), 1, dec!(0.12));

        assert_eq!(totals.unit_price, dec!(20.00));
        assert_eq!(totals.subtotal, dec!(20.00));
    }

    #[test]
    fn compute_totals_zero_tax_rate() {
        let totals = compute_totals(dec!(15.50), 4, dec!(0));

        assert_eq!(totals.subtotal, dec!(62.00));
        assert_eq!(totals.tax, dec!(0.00));
        assert_eq!(totals.total, dec!(62.00));
    }
}
