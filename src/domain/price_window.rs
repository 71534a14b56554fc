//! Rolling close-price window and the moving-average band built on it.

use crate::domain::ohlcv::OhlcvBar;

/// Most recent close prices, oldest first. May hold fewer than the strategy's
/// window on early bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceWindow {
    closes: Vec<f64>,
}

impl PriceWindow {
    pub fn new(closes: Vec<f64>) -> Self {
        Self { closes }
    }

    pub fn from_bars(bars: &[OhlcvBar]) -> Self {
        Self::new(bars.iter().map(|b| b.close).collect())
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Mean of the last `period` closes, or `None` when fewer are available.
    pub fn sma(&self, period: usize) -> Option<f64> {
        if period == 0 || self.closes.len() < period {
            return None;
        }
        let tail = &self.closes[self.closes.len() - period..];
        Some(tail.iter().sum::<f64>() / period as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub sma: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    pub fn new(sma: f64, buy_threshold: f64, sell_threshold: f64) -> Self {
        Band {
            sma,
            lower: sma * buy_threshold,
            upper: sma * sell_threshold,
        }
    }

    pub fn is_below(&self, price: f64) -> bool {
        price < self.lower
    }

    pub fn is_above(&self, price: f64) -> bool {
        price > self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_of_full_window() {
        let w = PriceWindow::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(w.sma(5).unwrap(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn sma_uses_most_recent_closes() {
        let w = PriceWindow::new(vec![100.0, 1.0, 2.0, 3.0]);
        assert_relative_eq!(w.sma(3).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn sma_insufficient_history() {
        let w = PriceWindow::new(vec![1.0, 2.0, 3.0]);
        assert!(w.sma(5).is_none());
        assert!(w.sma(0).is_none());
    }

    #[test]
    fn empty_window() {
        let w = PriceWindow::default();
        assert!(w.is_empty());
        assert_eq!(w.len(), 0);
        assert!(w.sma(1).is_none());
    }

    #[test]
    fn band_edges() {
        let band = Band::new(100.0, 0.9, 1.2);
        assert_relative_eq!(band.lower, 90.0, epsilon = 1e-9);
        assert_relative_eq!(band.upper, 120.0, epsilon = 1e-9);
        assert!(band.is_below(85.0));
        assert!(!band.is_below(band.lower));
        assert!(band.is_above(130.0));
        assert!(!band.is_above(band.upper));
    }
}
