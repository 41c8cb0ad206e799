//! Beacon proximity buckets.

/// Coarse distance bucket reported by beacon ranging.
///
/// Raw values follow the platform ranging API: unknown is `0`, then
/// immediate, near and far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Proximity {
    /// The platform could not estimate a distance.
    #[default]
    Unknown = 0,
    /// Within roughly half a meter.
    Immediate = 1,
    /// Within a few meters.
    Near = 2,
    /// Further away, but the signal is still received.
    Far = 3,
}

impl Proximity {
    /// Create from raw byte value.
    pub fn from_raw(value: u8) -> Self {
        match value {
            1 => Self::Immediate,
            2 => Self::Near,
            3 => Self::Far,
            _ => Self::Unknown,
        }
    }

    /// Convert to raw byte value.
    pub fn to_raw(&self) -> u8 {
        *self as u8
    }

    /// Sort key for ranked match lists; lower is closer.
    ///
    /// `Unknown` ranks after `Far` so that an unplaced beacon never
    /// outranks one with a real reading.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Immediate => 0,
            Self::Near => 1,
            Self::Far => 2,
            Self::Unknown => 3,
        }
    }

    /// Check if the platform produced a distance estimate.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Proximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Immediate => write!(f, "immediate"),
            Self::Near => write!(f, "near"),
            Self::Far => write!(f, "far"),
        }
    }
}
