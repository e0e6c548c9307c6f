use std::fmt;

use gap_core::{ErrorInfo, GapError};
use serde::{Deserialize, Serialize};

/// Single capability an algorithm can declare in its manifest.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Recovers incrementally as rows arrive.
    Streaming = 1 << 0,
    /// Recovers values outside the first column.
    Multicolumn = 1 << 1,
    /// Recovers rows that are missing in every column.
    Blackout = 1 << 2,
    /// Appears in generated plots.
    Plottable = 1 << 3,
    /// Copes with gaps scattered at random positions.
    Mcar = 1 << 4,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 5] = [
        Capability::Streaming,
        Capability::Multicolumn,
        Capability::Blackout,
        Capability::Plottable,
        Capability::Mcar,
    ];

    /// Bit of the capability in a [`Capabilities`] mask.
    pub fn flag(self) -> u32 {
        self as u32
    }

    /// Manifest spelling of the capability.
    pub fn name(self) -> &'static str {
        match self {
            Capability::Streaming => "streaming",
            Capability::Multicolumn => "multicolumn",
            Capability::Blackout => "blackout",
            Capability::Plottable => "plottable",
            Capability::Mcar => "mcar",
        }
    }

    /// Parses the manifest spelling.
    pub fn parse(name: &str) -> Result<Self, GapError> {
        Self::ALL
            .into_iter()
            .find(|cap| cap.name() == name)
            .ok_or_else(|| {
                GapError::Config(
                    ErrorInfo::new(
                        "gap_algo.unknown_capability",
                        format!("unknown capability {name}"),
                    )
                    .with_hint("expected one of streaming, multicolumn, blackout, plottable, mcar"),
                )
            })
    }
}

/// Bitset of [`Capability`] flags.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities(u32);

impl Capabilities {
    /// Empty set.
    pub const NONE: Capabilities = Capabilities(0);

    /// Wraps a raw mask.
    pub fn from_mask(mask: u32) -> Self {
        Self(mask)
    }

    /// Raw mask.
    pub fn mask(self) -> u32 {
        self.0
    }

    /// Adds `capability` to the set.
    pub fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.flag())
    }

    /// Whether `capability` is in the set.
    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.flag() != 0
    }

    /// Declared capabilities, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.contains(*cap))
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter()
            .map(Capability::flag)
            .fold(Capabilities::NONE, |mask, flag| Capabilities(mask.0 | flag))
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Capability::name).collect();
        if names.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", names.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_folds_flags() {
        let caps: Capabilities = [Capability::Streaming, Capability::Blackout]
            .into_iter()
            .collect();
        assert_eq!(caps.mask(), 0b101);
        assert!(caps.contains(Capability::Streaming));
        assert!(!caps.contains(Capability::Multicolumn));
        assert_eq!(caps.to_string(), "streaming,blackout");
    }

    #[test]
    fn every_capability_parses_back() {
        for cap in Capability::ALL {
            assert_eq!(Capability::parse(cap.name()).expect("known"), cap);
        }
        let caps: Capabilities = Capability::ALL.into_iter().collect();
        assert_eq!(caps.mask(), 0b1_1111);
        assert!(caps.to_string().ends_with(",mcar"));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = Capability::parse("gpu").expect_err("unknown");
        assert_eq!(err.info().code, "gap_algo.unknown_capability");
        assert_eq!(Capability::parse("plottable").expect("known"), Capability::Plottable);
    }
}
