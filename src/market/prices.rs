//! Purchase/sale price series and the congestion-pricing update rule.

/// A purchase/sale price pair over the simulation horizon.
///
/// Immutable per iteration; the loop derives a fresh series each round
/// instead of mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    /// Purchase price per slot.
    pub purchase: Vec<f64>,
    /// Sale price per slot.
    pub sale: Vec<f64>,
}

impl PriceSeries {
    /// Builds a series from explicit purchase and sale vectors.
    ///
    /// # Panics
    ///
    /// Panics if the vectors differ in length.
    pub fn from_parts(purchase: Vec<f64>, sale: Vec<f64>) -> Self {
        assert_eq!(purchase.len(), sale.len(), "purchase/sale length mismatch");
        Self { purchase, sale }
    }

    /// Builds a uniform series with one purchase and one sale value.
    pub fn uniform(horizon: usize, purchase: f64, sale: f64) -> Self {
        Self {
            purchase: vec![purchase; horizon],
            sale: vec![sale; horizon],
        }
    }

    /// Number of slots covered by the series.
    pub fn horizon(&self) -> usize {
        self.purchase.len()
    }

    /// Derives the next round's prices from the aggregate load.
    ///
    /// Congestion pricing: `price[t] = base + k * load[t]` for both the
    /// purchase and sale series, so congested slots cost more next round.
    pub fn congestion_update(
        base_purchase: f64,
        base_sale: f64,
        k: f64,
        aggregate_load: &[f64],
    ) -> Self {
        let purchase = aggregate_load.iter().map(|l| base_purchase + k * l).collect();
        let sale = aggregate_load.iter().map(|l| base_sale + k * l).collect();
        Self { purchase, sale }
    }

    /// Convergence predicate: every slot satisfies
    /// `|Δpurchase| + |Δsale| <= epsilon`.
    ///
    /// Symmetric and deterministic. Trivially true for a zero horizon.
    ///
    /// # Panics
    ///
    /// Panics if the two series differ in horizon; the loop only ever
    /// compares series of the same run.
    pub fn within_tolerance(&self, other: &Self, epsilon: f64) -> bool {
        assert_eq!(self.horizon(), other.horizon(), "price horizon mismatch");
        self.purchase
            .iter()
            .zip(&other.purchase)
            .zip(self.sale.iter().zip(&other.sale))
            .all(|((p_new, p_old), (s_new, s_old))| {
                (p_new - p_old).abs() + (s_new - s_old).abs() <= epsilon
            })
    }
}
