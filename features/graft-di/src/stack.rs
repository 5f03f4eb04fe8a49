use std::fmt;

use crate::types::ContractKey;

/// Contracts currently under construction within one top-level resolution
#[derive(Debug, Default, Clone)]
pub struct ResolutionStack {
    keys: Vec<ContractKey>,
}
impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: ContractKey) {
        self.keys.push(key);
    }

    pub fn pop(&mut self) -> Option<ContractKey> {
        self.keys.pop()
    }

    pub fn contains(&self, key: &ContractKey) -> bool {
        self.keys.contains(key)
    }

    pub fn depth(&self) -> usize {
        self.keys.len()
    }
}
impl fmt::Display for ResolutionStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<_> = self.keys.iter().map(ToString::to_string).collect();
        f.write_str(&chain.join(" -> "))
    }
}
