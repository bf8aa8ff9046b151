//! # Outlet identifiers.
//!
//! The dispenser has a small fixed set of physical outlets, each driven by its
//! own motor on the actuator board. Outlets are known at startup and never
//! added or removed at runtime; [`Outlet::ALL`] is the canonical ascending
//! order used everywhere a deterministic iteration order matters (due-alarm
//! firing, `/get_alarms` listings).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One physical dispensing position.
///
/// The wire name (`"M1"`, `"M2"`, `"M3"`) doubles as the motor identifier in
/// outbound command frames, so `Display`/`FromStr` round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outlet {
    M1,
    M2,
    M3,
}

impl Outlet {
    /// All outlets in ascending identifier order.
    pub const ALL: [Outlet; 3] = [Outlet::M1, Outlet::M2, Outlet::M3];

    /// Wire identifier for this outlet.
    pub fn as_str(self) -> &'static str {
        match self {
            Outlet::M1 => "M1",
            Outlet::M2 => "M2",
            Outlet::M3 => "M3",
        }
    }
}

impl fmt::Display for Outlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outlet {
    type Err = Error;

    /// Parses a wire identifier; anything outside the fixed set fails with
    /// [`Error::InvalidOutlet`] before any state is touched.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M1" => Ok(Outlet::M1),
            "M2" => Ok(Outlet::M2),
            "M3" => Ok(Outlet::M3),
            other => Err(Error::InvalidOutlet(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_outlets() {
        assert_eq!("M1".parse::<Outlet>().unwrap(), Outlet::M1);
        assert_eq!("M2".parse::<Outlet>().unwrap(), Outlet::M2);
        assert_eq!("M3".parse::<Outlet>().unwrap(), Outlet::M3);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for bad in ["M9", "m1", "", "M", "M12"] {
            let err = bad.parse::<Outlet>().unwrap_err();
            assert!(
                matches!(err, Error::InvalidOutlet(_)),
                "{bad:?} should be InvalidOutlet, got {err:?}"
            );
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for outlet in Outlet::ALL {
            assert_eq!(outlet.to_string().parse::<Outlet>().unwrap(), outlet);
        }
    }

    #[test]
    fn test_all_is_ascending() {
        let mut sorted = Outlet::ALL;
        sorted.sort();
        assert_eq!(sorted, Outlet::ALL);
    }
}
