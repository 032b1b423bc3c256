//! Payload quality tiers
//!
//! Every animation payload belongs to exactly one tier, ordered by how much
//! real geometry it carries:
//! - RealPose: recorded per-frame landmarks
//! - LinguisticApprox: trajectory derived from linguistic properties
//! - Fingerspelling: one letter per sub-interval
//! - Basic: coarse movement at a coarse location
//! - Error: nothing renderable

use std::fmt;

/// Quality tier of an animation payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    RealPose,
    LinguisticApprox,
    Fingerspelling,
    Basic,
    Error,
}

impl Tier {
    /// All tiers from richest to poorest
    pub fn all() -> &'static [Tier] {
        &[
            Tier::RealPose,
            Tier::LinguisticApprox,
            Tier::Fingerspelling,
            Tier::Basic,
            Tier::Error,
        ]
    }

    /// Parse from the wire tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "real_pose" => Some(Tier::RealPose),
            "linguistic_approx" => Some(Tier::LinguisticApprox),
            "fingerspelling" => Some(Tier::Fingerspelling),
            "basic" => Some(Tier::Basic),
            "error" => Some(Tier::Error),
            _ => None,
        }
    }

    /// Wire tag
    pub fn tag(self) -> &'static str {
        match self {
            Tier::RealPose => "real_pose",
            Tier::LinguisticApprox => "linguistic_approx",
            Tier::Fingerspelling => "fingerspelling",
            Tier::Basic => "basic",
            Tier::Error => "error",
        }
    }

    /// Short label drawn in the quality badge
    pub fn badge(self) -> &'static str {
        match self {
            Tier::RealPose => "REAL",
            Tier::LinguisticApprox => "APPROX",
            Tier::Fingerspelling => "SPELL",
            Tier::Basic => "BASIC",
            Tier::Error => "ERROR",
        }
    }

    /// Quality rank (lower = richer data)
    pub fn rank(self) -> u8 {
        match self {
            Tier::RealPose => 0,
            Tier::LinguisticApprox => 1,
            Tier::Fingerspelling => 2,
            Tier::Basic => 3,
            Tier::Error => 4,
        }
    }

    /// Does this tier synthesize geometry instead of replaying it?
    pub fn is_synthetic(self) -> bool {
        matches!(self, Tier::LinguisticApprox | Tier::Basic)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
