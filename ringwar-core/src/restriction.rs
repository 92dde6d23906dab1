//! Movement restrictions

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// How far and along which lines a unit may travel in one move
///
/// `max_hops == 0` means unbounded distance and requires at least one of the
/// line constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Restriction {
    pub max_hops: u32,
    pub same_ring_only: bool,
    pub same_radial_only: bool,
}

/// Generation strategy selected by a restriction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regime {
    /// Directly adjacent pairs
    Adjacent,
    /// Any distance along rings and/or radial chains
    Lines { ring: bool, radial: bool },
    /// Free walks of the given hop count
    Walk(u32),
}

impl Default for Restriction {
    fn default() -> Self {
        Self::hops(1)
    }
}

impl Restriction {
    /// Free movement up to `max_hops` steps
    pub const fn hops(max_hops: u32) -> Self {
        Self {
            max_hops,
            same_ring_only: false,
            same_radial_only: false,
        }
    }

    /// Unbounded movement along rings and/or radial chains
    pub const fn lines(ring: bool, radial: bool) -> Self {
        Self {
            max_hops: 0,
            same_ring_only: ring,
            same_radial_only: radial,
        }
    }

    pub fn regime(&self) -> Result<Regime> {
        let constrained = self.same_ring_only || self.same_radial_only;
        match (self.max_hops, constrained) {
            (0, true) => Ok(Regime::Lines {
                ring: self.same_ring_only,
                radial: self.same_radial_only,
            }),
            (1, false) => Ok(Regime::Adjacent),
            (n, false) if n >= 2 => Ok(Regime::Walk(n)),
            _ => Err(EngineError::InvalidRestriction(*self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_value_equality() {
        let mut set = FxHashSet::default();
        set.insert(Restriction::hops(3));
        set.insert(Restriction::hops(3));
        set.insert(Restriction::lines(true, true));
        assert_eq!(set.len(), 2);
        assert_eq!(Restriction::default(), Restriction::hops(1));
    }

    #[test]
    fn test_regimes() {
        assert_eq!(Restriction::hops(1).regime().unwrap(), Regime::Adjacent);
        assert_eq!(Restriction::hops(3).regime().unwrap(), Regime::Walk(3));
        assert_eq!(
            Restriction::lines(false, true).regime().unwrap(),
            Regime::Lines { ring: false, radial: true }
        );
    }

    #[test]
    fn test_invalid_combinations_fail_fast() {
        assert!(Restriction::hops(0).regime().is_err());
        let mixed = Restriction {
            max_hops: 2,
            same_ring_only: true,
            same_radial_only: false,
        };
        assert!(matches!(mixed.regime(), Err(EngineError::InvalidRestriction(r)) if r == mixed));
    }
}
