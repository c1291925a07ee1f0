//! Turntable and scene types

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    A,
    B,
}

impl Side {
    /// The other side of the record
    pub fn flipped(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Side::A),
            "B" | "b" => Ok(Side::B),
            other => Err(CoreError::invalid_input(format!("unknown side: {other}"))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Turntable speed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rpm {
    /// 33⅓ RPM, normal speed
    #[default]
    #[serde(rename = "33")]
    ThirtyThree,

    /// 45 RPM, played faster
    #[serde(rename = "45")]
    FortyFive,
}

impl Rpm {
    /// Playback rate factor used for 45 RPM unless configured otherwise
    pub const FORTY_FIVE_RATE: f64 = 1.35;

    /// Nominal speed as shown on the deck
    pub fn value(self) -> u8 {
        match self {
            Rpm::ThirtyThree => 33,
            Rpm::FortyFive => 45,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Rpm::ThirtyThree => Rpm::FortyFive,
            Rpm::FortyFive => Rpm::ThirtyThree,
        }
    }

    /// Playback rate factor, given the factor configured for 45 RPM
    pub fn rate(self, forty_five_rate: f64) -> f64 {
        match self {
            Rpm::ThirtyThree => 1.0,
            Rpm::FortyFive => forty_five_rate,
        }
    }
}

impl TryFrom<u8> for Rpm {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            33 => Ok(Rpm::ThirtyThree),
            45 => Ok(Rpm::FortyFive),
            other => Err(CoreError::invalid_input(format!("unsupported speed: {other} RPM"))),
        }
    }
}

/// Which screen of the store the customer is on
///
/// The flow is strictly forward (`GenreSelect` → `CrateBrowse` → `Turntable`);
/// the only way back is a full reset to `GenreSelect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scene {
    #[default]
    GenreSelect,
    CrateBrowse,
    Turntable,
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scene::GenreSelect => f.write_str("genre-select"),
            Scene::CrateBrowse => f.write_str("crate-browse"),
            Scene::Turntable => f.write_str("turntable"),
        }
    }
}

impl FromStr for Scene {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genre-select" => Ok(Scene::GenreSelect),
            "crate-browse" => Ok(Scene::CrateBrowse),
            "turntable" => Ok(Scene::Turntable),
            other => Err(CoreError::invalid_input(format!("unknown scene: {other}"))),
        }
    }
}
