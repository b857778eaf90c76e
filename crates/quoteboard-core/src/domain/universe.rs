use serde::Serialize;

use crate::{ProviderId, Symbol};

/// Static reference values used to generate placeholder data for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub price: f64,
    pub change: f64,
    pub rsi: f64,
}

impl Baseline {
    pub const fn new(price: f64, change: f64, rsi: f64) -> Self {
        Self { price, change, rsi }
    }

    pub fn previous_close(&self) -> f64 {
        (self.price - self.change).max(0.0)
    }
}

/// One board entry: display metadata, provider tickers and a synthetic baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub symbol: Symbol,
    pub display_name: String,
    pub alphavantage_ticker: String,
    pub yahoo_ticker: String,
    pub baseline: Baseline,
}

impl Listing {
    pub fn new(
        symbol: Symbol,
        display_name: impl Into<String>,
        alphavantage_ticker: impl Into<String>,
        yahoo_ticker: impl Into<String>,
        baseline: Baseline,
    ) -> Self {
        Self {
            symbol,
            display_name: display_name.into(),
            alphavantage_ticker: alphavantage_ticker.into(),
            yahoo_ticker: yahoo_ticker.into(),
            baseline,
        }
    }

    pub fn ticker_for(&self, provider: ProviderId) -> &str {
        match provider {
            ProviderId::Alphavantage => &self.alphavantage_ticker,
            ProviderId::Yahoo => &self.yahoo_ticker,
        }
    }
}

/// Fixed set of symbols the board knows how to fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolUniverse {
    listings: Vec<Listing>,
    default_index: usize,
}

impl SymbolUniverse {
    /// Build a universe. The first listing doubles as the default entry whose
    /// baseline backs placeholder data for unknown symbols. Returns `None` when
    /// `listings` is empty.
    pub fn new(listings: Vec<Listing>) -> Option<Self> {
        if listings.is_empty() {
            return None;
        }
        Some(Self {
            listings,
            default_index: 0,
        })
    }

    /// The five NSE instruments shown on the reference board.
    pub fn nse_default() -> Self {
        let entries = [
            ("TATASTEEL", "Tata Steel Limited", "TATASTEEL.NS", Baseline::new(118.45, 2.35, 65.2)),
            ("TATAMOTORS", "Tata Motors Limited", "TATAMOTORS.NS", Baseline::new(924.80, -15.60, 42.8)),
            ("NIFTY50", "Nifty 50 Index", "^NSEI", Baseline::new(24587.20, 145.30, 58.4)),
            ("INDIAVIX", "India VIX", "^INDIAVIX", Baseline::new(13.45, -0.87, 35.6)),
            ("HDFCBANK", "HDFC Bank Limited", "HDFCBANK.NS", Baseline::new(1687.90, 23.45, 52.1)),
        ];

        let listings = entries
            .into_iter()
            .map(|(symbol, name, yahoo, baseline)| {
                Listing::new(
                    Symbol::parse(symbol).expect("built-in symbols are valid"),
                    name,
                    format!("{symbol}.BSE"),
                    yahoo,
                    baseline,
                )
            })
            .collect();

        Self {
            listings,
            default_index: 0,
        }
    }

    /// Look a raw symbol up; `None` for anything outside the universe.
    pub fn resolve(&self, raw: &str) -> Option<&Listing> {
        let symbol = Symbol::parse(raw).ok()?;
        self.listings.iter().find(|listing| listing.symbol == symbol)
    }

    pub fn default_listing(&self) -> &Listing {
        &self.listings[self.default_index]
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.listings
            .iter()
            .map(|listing| listing.symbol.clone())
            .collect()
    }
}

impl Default for SymbolUniverse {
    fn default() -> Self {
        Self::nse_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nse_default_lists_five_symbols_with_tata_steel_as_default() {
        let universe = SymbolUniverse::nse_default();
        assert_eq!(universe.listings().len(), 5);
        assert_eq!(universe.default_listing().symbol.as_str(), "TATASTEEL");
    }

    #[test]
    fn resolves_case_insensitively_and_maps_tickers() {
        let universe = SymbolUniverse::nse_default();
        let listing = universe.resolve("nifty50").expect("known symbol");

        assert_eq!(listing.ticker_for(ProviderId::Alphavantage), "NIFTY50.BSE");
        assert_eq!(listing.ticker_for(ProviderId::Yahoo), "^NSEI");
        assert!(universe.resolve("AAPL").is_none());
        assert!(universe.resolve("$$$").is_none());
    }

    #[test]
    fn baseline_previous_close_backs_out_the_change() {
        let baseline = Baseline::new(118.45, 2.35, 65.2);
        assert!((baseline.previous_close() - 116.10).abs() < 1e-9);
    }

    #[test]
    fn empty_universe_is_rejected() {
        assert!(SymbolUniverse::new(Vec::new()).is_none());
    }
}
