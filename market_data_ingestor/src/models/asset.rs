#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetClass {
    UsEquity,
    /// Market indices such as `^GSPC`. Not every provider can serve these.
    Index,
}

impl AssetClass {
    /// Guesses the asset class from a ticker. Yahoo-style index tickers start
    /// with a caret.
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.starts_with('^') {
            AssetClass::Index
        } else {
            AssetClass::UsEquity
        }
    }
}
