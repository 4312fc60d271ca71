/// Tunable parts of the content-shaping rules embedded in every prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPolicy {
    pub max_symbols: usize,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self { max_symbols: 5 }
    }
}

impl ContentPolicy {
    pub fn with_max_symbols(mut self, max_symbols: usize) -> Self {
        self.max_symbols = max_symbols;
        self
    }
}
