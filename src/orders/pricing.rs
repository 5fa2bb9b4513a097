use rust_decimal::Decimal;

/// Service for calculating order line subtotals and totals
pub struct PriceCalculator;

impl PriceCalculator {
    /// Calculate the subtotal for one order line
    ///
    /// # Arguments
    /// * `quantity` - Number of units ordered
    /// * `unit_price` - Catalog price per unit at time of order
    ///
    /// # Returns
    /// Subtotal as Decimal (quantity * unit_price)
    pub fn line_subtotal(quantity: i32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    /// Calculate the total for an order
    ///
    /// # Arguments
    /// * `subtotals` - Slice of subtotals for all order lines
    ///
    /// # Returns
    /// Total as Decimal (sum of all subtotals)
    pub fn order_total(subtotals: &[Decimal]) -> Decimal {
        subtotals.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_subtotal_basic() {
        let subtotal = PriceCalculator::line_subtotal(2, dec!(4.50));
        assert_eq!(subtotal, dec!(9.00));
    }

    #[test]
    fn test_line_subtotal_single_unit() {
        let subtotal = PriceCalculator::line_subtotal(1, dec!(12.75));
        assert_eq!(subtotal, dec!(12.75));
    }

    #[test]
    fn test_order_total_multiple_lines() {
        let subtotals = vec![dec!(10.00), dec!(5.50), dec!(3.25)];
        assert_eq!(PriceCalculator::order_total(&subtotals), dec!(18.75));
    }

    #[test]
    fn test_order_total_empty() {
        let subtotals: Vec<Decimal> = vec![];
        assert_eq!(PriceCalculator::order_total(&subtotals), dec!(0.00));
    }

    #[test]
    fn test_decimal_precision() {
        let subtotal = PriceCalculator::line_subtotal(3, dec!(4.33));
        assert_eq!(subtotal, dec!(12.99));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Subtotal equals quantity times unit price for all valid inputs
    #[test]
    fn prop_line_subtotal_invariant() {
        proptest!(|(
            quantity in 1i32..=99,
            price_cents in 1u32..=100_000u32
        )| {
            let price = Decimal::from(price_cents) / Decimal::from(100);
            let subtotal = PriceCalculator::line_subtotal(quantity, price);
            prop_assert_eq!(subtotal, Decimal::from(quantity) * price);
        });
    }

    /// Total equals the sum of subtotals for all valid inputs
    #[test]
    fn prop_order_total_invariant() {
        proptest!(|(
            subtotals_cents in prop::collection::vec(1u32..=100_000u32, 1..=20)
        )| {
            let subtotals: Vec<Decimal> = subtotals_cents
                .iter()
                .map(|cents| Decimal::from(*cents) / Decimal::from(100))
                .collect();
            let total = PriceCalculator::order_total(&subtotals);
            let expected: Decimal = subtotals.iter().sum();
            prop_assert_eq!(total, expected);
        });
    }
}
