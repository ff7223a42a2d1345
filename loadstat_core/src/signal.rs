//! Scale signal published after each sampling window.

use std::fmt;

/// Request to the external frequency governor.
///
/// The discriminants are the values the control surface reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ScaleSignal {
    /// Load inside the configured band; keep the current cadence.
    #[default]
    Normal = 0,
    /// Load above the scale-up threshold, or the host is congested.
    ScaleUp = 1,
    /// Load below the scale-down threshold, idle, or shutting down.
    ScaleDown = 2,
}

impl ScaleSignal {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Normal),
            1 => Some(Self::ScaleUp),
            2 => Some(Self::ScaleDown),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::ScaleUp => "scale_up",
            Self::ScaleDown => "scale_down",
        }
    }
}

impl fmt::Display for ScaleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_control_surface() {
        assert_eq!(ScaleSignal::Normal.as_u8(), 0);
        assert_eq!(ScaleSignal::ScaleUp.as_u8(), 1);
        assert_eq!(ScaleSignal::ScaleDown.as_u8(), 2);
        for v in 0..=2u8 {
            assert_eq!(ScaleSignal::from_u8(v).map(ScaleSignal::as_u8), Some(v));
        }
        assert_eq!(ScaleSignal::from_u8(3), None);
    }
}
