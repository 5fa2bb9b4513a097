// Stock ledger
//
// Guards product stock against concurrent reservation. Every reservation
// runs inside the caller's transaction: the product row is locked with
// FOR UPDATE, the remaining quantity is checked, and the decrement happens
// on the same connection. A conflict leaves state untouched and the caller
// rolls the whole transaction back, releasing every lock and prior
// decrement made in the same call.

use sqlx::{Postgres, Transaction};

/// Outcome of a reservation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Quantity decremented (or product not stock-tracked)
    Reserved,
    /// Not enough stock; nothing was mutated. Surfaced to the caller as a
    /// distinct outcome, never retried automatically.
    Conflict { product_id: i32, available: i32 },
}

/// Decision on a single stock debit
///
/// Pure half of the ledger: given the currently tracked quantity, decide
/// whether the debit may proceed. NULL quantity means the product is not
/// stock-tracked and always passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Debit {
    NotTracked,
    Allowed { remaining: i32 },
    Short { available: i32 },
}

pub(crate) fn debit(current: Option<i32>, quantity: i32) -> Debit {
    match current {
        None => Debit::NotTracked,
        Some(available) if available >= quantity => Debit::Allowed {
            remaining: available - quantity,
        },
        Some(available) => Debit::Short { available },
    }
}

/// Stock ledger
///
/// `tracking` mirrors the deployment flag: when the catalog provider is the
/// authoritative stock source, tracking is disabled and `reserve` succeeds
/// without taking a row lock.
#[derive(Clone, Copy)]
pub struct StockLedger {
    tracking: bool,
}

impl StockLedger {
    pub fn new(tracking: bool) -> Self {
        Self { tracking }
    }

    /// Reserve `quantity` units of a product inside the caller's transaction.
    ///
    /// Locks the product row for the remainder of the transaction. On
    /// conflict nothing is mutated; the caller must roll back.
    pub async fn reserve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: i32,
        quantity: i32,
    ) -> Result<ReserveOutcome, sqlx::Error> {
        if !self.tracking {
            return Ok(ReserveOutcome::Reserved);
        }

        let current: Option<i32> =
            sqlx::query_scalar("SELECT stock_qty FROM products WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_one(&mut **tx)
                .await?;

        match debit(current, quantity) {
            Debit::NotTracked => Ok(ReserveOutcome::Reserved),
            Debit::Allowed { remaining } => {
                sqlx::query("UPDATE products SET stock_qty = $1 WHERE id = $2")
                    .bind(remaining)
                    .bind(product_id)
                    .execute(&mut **tx)
                    .await?;

                tracing::debug!(
                    "Reserved {} of product {}, {} remaining",
                    quantity,
                    product_id,
                    remaining
                );
                Ok(ReserveOutcome::Reserved)
            }
            Debit::Short { available } => {
                tracing::debug!(
                    "Stock conflict on product {}: requested {}, available {}",
                    product_id,
                    quantity,
                    available
                );
                Ok(ReserveOutcome::Conflict {
                    product_id,
                    available,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untracked_product_always_passes() {
        assert_eq!(debit(None, 1), Debit::NotTracked);
        assert_eq!(debit(None, 999), Debit::NotTracked);
    }

    #[test]
    fn test_exact_stock_is_allowed() {
        assert_eq!(debit(Some(3), 3), Debit::Allowed { remaining: 0 });
    }

    #[test]
    fn test_short_stock_conflicts_without_mutation() {
        assert_eq!(debit(Some(2), 3), Debit::Short { available: 2 });
        assert_eq!(debit(Some(0), 1), Debit::Short { available: 0 });
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// No sequence of debits ever drives tracked stock below zero: every
    /// allowed debit leaves a non-negative remainder, and a short debit
    /// leaves the quantity untouched.
    #[test]
    fn prop_stock_never_goes_negative() {
        proptest!(|(
            start in 0i32..=50,
            requests in prop::collection::vec(1i32..=10, 1..=30)
        )| {
            let mut stock = start;
            for qty in requests {
                match debit(Some(stock), qty) {
                    Debit::Allowed { remaining } => {
                        prop_assert!(remaining >= 0);
                        prop_assert_eq!(remaining, stock - qty);
                        stock = remaining;
                    }
                    Debit::Short { available } => {
                        prop_assert_eq!(available, stock);
                        prop_assert!(stock < qty);
                    }
                    Debit::NotTracked => unreachable!(),
                }
            }
        });
    }

    /// The sum of successful debits never exceeds the starting stock.
    #[test]
    fn prop_successful_debits_bounded_by_start() {
        proptest!(|(
            start in 0i32..=100,
            requests in prop::collection::vec(1i32..=10, 1..=50)
        )| {
            let mut stock = start;
            let mut granted = 0i32;
            for qty in requests {
                if let Debit::Allowed { remaining } = debit(Some(stock), qty) {
                    granted += qty;
                    stock = remaining;
                }
            }
            prop_assert!(granted <= start);
        });
    }
}
