//! Phase tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical state a record (or a built segment) describes.
///
/// `NoData` is the sentinel used for sub-ranges no record covers. It is part
/// of the closed variant on purpose: every consumer that matches on a phase
/// has to say what happens in a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "solid", alias = "s", alias = "cr")]
    Solid,
    #[serde(rename = "liquid", alias = "l", alias = "liq")]
    Liquid,
    #[serde(rename = "gas", alias = "g")]
    Gas,
    #[serde(rename = "ionic", alias = "aq", alias = "ion")]
    Ionic,
    #[serde(rename = "other")]
    Other,
    #[serde(rename = "no_data")]
    NoData,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Solid,
        Phase::Liquid,
        Phase::Gas,
        Phase::Ionic,
        Phase::Other,
        Phase::NoData,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Phase::Solid => "s",
            Phase::Liquid => "l",
            Phase::Gas => "g",
            Phase::Ionic => "aq",
            Phase::Other => "other",
            Phase::NoData => "no-data",
        }
    }

    /// Position in the condensed-to-vapor sequence (solid < liquid < gas).
    ///
    /// `None` for tags that do not take part in that sequence.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Phase::Solid => Some(0),
            Phase::Liquid => Some(1),
            Phase::Gas => Some(2),
            Phase::Ionic | Phase::Other | Phase::NoData => None,
        }
    }

    pub fn has_data(&self) -> bool {
        !matches!(self, Phase::NoData)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Solid => "solid",
            Phase::Liquid => "liquid",
            Phase::Gas => "gas",
            Phase::Ionic => "ionic",
            Phase::Other => "other",
            Phase::NoData => "no-data",
        };
        f.write_str(name)
    }
}
