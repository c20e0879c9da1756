//! Configuration for Python emission.

/// Configuration for Python emission.
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) common_module: String,
    pub(crate) runtime_module: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            common_module: "common".to_string(),
            runtime_module: "runtime".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module `lexical.py`/`syntactic.py` import `Condition` from.
    pub fn common_module(mut self, value: impl Into<String>) -> Self {
        self.common_module = value.into();
        self
    }

    /// Sets the module `TagDef`/`NontermDef` are imported from.
    pub fn runtime_module(mut self, value: impl Into<String>) -> Self {
        self.runtime_module = value.into();
        self
    }
}
