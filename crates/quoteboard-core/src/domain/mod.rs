//! # Domain Models
//!
//! Canonical types shared by every provider adapter and by the service.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Quote`] | Last price, derived change, optional RSI |
//! | [`ChartPoint`] | One OHLCV sample of an intraday chart |
//! | [`Granularity`] | Upstream series bucket (1m .. 60m) |
//! | [`SymbolUniverse`] | The fixed board symbols and their provider tickers |
//! | [`Symbol`] | Validated board symbol |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Constructors validate their invariants and return [`crate::ValidationError`]
//! on violation, so a `Quote` or `ChartPoint` that exists is always well formed.

mod granularity;
mod models;
mod symbol;
mod timestamp;
mod universe;

pub use granularity::Granularity;
pub use models::{validate_rsi, ChartPoint, Quote};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
pub use universe::{Baseline, Listing, SymbolUniverse};
