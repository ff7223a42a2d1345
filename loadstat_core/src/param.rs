//! Named parameters exposed through the host's control surface.
//!
//! Each parameter reads as an unsigned integer. Writable parameters accept
//! values in `[0, max]`; anything else is rejected and the stored value is
//! left untouched.

use std::fmt;
use std::str::FromStr;

use crate::config::StatConfig;
use crate::error::{Result, StatError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    FreqRequest,
    Load,
    IsPrimary,
    LoadScaleUpThre,
    LoadScaleDownThre,
    LoadWarnThre,
    DelayMs,
    Debug,
    IsEnabled,
}

impl Param {
    pub const ALL: [Param; 9] = [
        Param::FreqRequest,
        Param::Load,
        Param::IsPrimary,
        Param::LoadScaleUpThre,
        Param::LoadScaleDownThre,
        Param::LoadWarnThre,
        Param::DelayMs,
        Param::Debug,
        Param::IsEnabled,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Param::FreqRequest => "freq_request",
            Param::Load => "load",
            Param::IsPrimary => "is_primary",
            Param::LoadScaleUpThre => "load_scale_up_thre",
            Param::LoadScaleDownThre => "load_scale_down_thre",
            Param::LoadWarnThre => "load_warn_thre",
            Param::DelayMs => "delay_ms",
            Param::Debug => "debug",
            Param::IsEnabled => "is_enabled",
        }
    }

    pub const fn is_writable(self) -> bool {
        !matches!(self, Param::FreqRequest | Param::Load | Param::IsPrimary)
    }

    /// Largest value the parameter can hold.
    pub const fn max(self) -> u32 {
        match self {
            Param::FreqRequest => 2,
            Param::Load => u32::MAX,
            Param::IsPrimary | Param::Debug | Param::IsEnabled => 1,
            Param::LoadScaleUpThre | Param::LoadScaleDownThre | Param::LoadWarnThre => 100,
            Param::DelayMs => 1000,
        }
    }

    /// Parse decimal text the way the control files accept it: surrounding
    /// whitespace (including a trailing newline) is ignored.
    pub fn parse_value(self, input: &str) -> Result<u64> {
        input
            .trim()
            .parse::<u64>()
            .map_err(|_| StatError::InvalidValue {
                param: self,
                input: input.to_string(),
            })
    }

    /// Range-check `value` and store it into `cfg`.
    pub(crate) fn store(self, cfg: &StatConfig, value: u64) -> Result<()> {
        if !self.is_writable() {
            return Err(StatError::ReadOnly(self));
        }
        let max = self.max();
        if value > u64::from(max) {
            return Err(StatError::OutOfRange {
                param: self,
                value,
                max,
            });
        }
        let v = u32::try_from(value).unwrap_or(max);
        match self {
            Param::LoadScaleUpThre => cfg.set_scale_up(v),
            Param::LoadScaleDownThre => cfg.set_scale_down(v),
            Param::LoadWarnThre => cfg.set_warn(v),
            Param::DelayMs => cfg.set_delay_ms(v),
            Param::Debug => cfg.set_debug(v != 0),
            Param::IsEnabled => cfg.set_enabled(v != 0),
            Param::FreqRequest | Param::Load | Param::IsPrimary => {
                return Err(StatError::ReadOnly(self));
            }
        }
        Ok(())
    }

    /// Read a knob that lives in `cfg`; `None` for the engine outputs.
    pub(crate) fn load_knob(self, cfg: &StatConfig) -> Option<u32> {
        match self {
            Param::IsPrimary => Some(u32::from(cfg.primary())),
            Param::LoadScaleUpThre => Some(cfg.scale_up()),
            Param::LoadScaleDownThre => Some(cfg.scale_down()),
            Param::LoadWarnThre => Some(cfg.warn()),
            Param::DelayMs => Some(cfg.delay_ms()),
            Param::Debug => Some(u32::from(cfg.debug())),
            Param::IsEnabled => Some(u32::from(cfg.enabled())),
            Param::FreqRequest | Param::Load => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Param::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| StatError::UnknownParam(s.to_string()))
    }
}
