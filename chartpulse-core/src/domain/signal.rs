//! Discrete position signal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-bar breakout signal: short/flat/long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// Close broke below the prior bar's support.
    Sell,
    #[default]
    Hold,
    /// Close broke above the prior bar's resistance.
    Buy,
}

impl Signal {
    /// Position value: −1, 0 or +1.
    pub fn position(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.position())
    }

    pub fn is_active(self) -> bool {
        self != Signal::Hold
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
            Signal::Buy => "BUY",
        };
        f.write_str(s)
    }
}
