//! WebSocket message types.

use serde::{Deserialize, Serialize};

/// Server → client push carrying the running swap total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalMessage {
    /// Number of swaps currently indexed.
    pub total: usize,
}

impl TotalMessage {
    /// Serializes to the JSON text frame payload.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"total\":{}}}", self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_bare_total() {
        assert_eq!(TotalMessage { total: 7 }.to_json(), r#"{"total":7}"#);
    }
}
