//! Region codes and the pairwise network-cost matrix.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Cost at or above which two regions cannot share a lobby.
pub const UNPLAYABLE_COST: u8 = 5;

/// Indexed `[host][member]`, rows and columns in [`Region::ALL`] order.
const COST_MATRIX: [[u8; 6]; 6] = [
    // NA EU ASIA OCE SA AF
    [0, 1, 2, 3, 1, 3], // NA
    [1, 0, 2, 4, 3, 1], // EU
    [2, 2, 0, 2, 5, 4], // ASIA
    [3, 4, 2, 0, 4, 5], // OCE
    [1, 3, 5, 4, 0, 4], // SA
    [3, 1, 4, 5, 4, 0], // AF
];

/// Coarse player region used for host selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Na,
    Eu,
    Asia,
    Oce,
    Sa,
    Af,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Na,
        Region::Eu,
        Region::Asia,
        Region::Oce,
        Region::Sa,
        Region::Af,
    ];

    /// Network cost of `self` hosting a member from `member`, in `0..=5`.
    pub fn cost_to(self, member: Region) -> u8 {
        COST_MATRIX[self as usize][member as usize]
    }

    /// Whether `self` can host a member from `member` at all.
    pub fn can_host(self, member: Region) -> bool {
        self.cost_to(member) < UNPLAYABLE_COST
    }

    pub fn code(self) -> &'static str {
        match self {
            Region::Na => "NA",
            Region::Eu => "EU",
            Region::Asia => "ASIA",
            Region::Oce => "OCE",
            Region::Sa => "SA",
            Region::Af => "AF",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region code {0:?}, expected one of NA, EU, ASIA, OCE, SA, AF")]
pub struct InvalidRegion(pub String);

impl FromStr for Region {
    type Err = InvalidRegion;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Region::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| InvalidRegion(s.to_owned()))
    }
}
