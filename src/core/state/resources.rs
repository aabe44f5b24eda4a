// src/core/state/resources.rs

//! State definitions for host resource pressure and the throttle advisory.

use crate::config::ResourceConfig;
use serde::Serialize;

/// An integer 0..3 summarizing host pressure, computed from the larger of the
/// CPU and RAM percentages against the three configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum ThrottleLevel {
    #[default]
    None = 0,
    Light = 1,
    Medium = 2,
    Heavy = 3,
}

impl ThrottleLevel {
    /// Classifies a usage maximum into a throttle level. Thresholds are
    /// inclusive lower bounds: usage exactly at T3 is level 3.
    pub fn classify(max_usage: f64, limits: &ResourceConfig) -> Self {
        if max_usage >= limits.throttle_threshold_3 {
            Self::Heavy
        } else if max_usage >= limits.throttle_threshold_2 {
            Self::Medium
        } else if max_usage >= limits.throttle_threshold_1 {
            Self::Light
        } else {
            Self::None
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The advisory behavior consumers are expected to apply at this level.
    pub fn advisory(self) -> ThrottleAdvisory {
        match self {
            Self::None => ThrottleAdvisory {
                sleep_multiplier: 1.0,
                batch_divisor: 1,
                pause_non_critical: false,
            },
            Self::Light => ThrottleAdvisory {
                sleep_multiplier: 1.5,
                batch_divisor: 1,
                pause_non_critical: false,
            },
            Self::Medium => ThrottleAdvisory {
                sleep_multiplier: 2.0,
                batch_divisor: 2,
                pause_non_critical: false,
            },
            Self::Heavy => ThrottleAdvisory {
                sleep_multiplier: 4.0,
                batch_divisor: 4,
                pause_non_critical: true,
            },
        }
    }
}

/// Published advisory parameters for a throttle level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThrottleAdvisory {
    pub sleep_multiplier: f64,
    pub batch_divisor: u32,
    pub pause_non_critical: bool,
}

/// One governor sample: the resource-governor-owned section of shared state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub throttle_level: ThrottleLevel,
    pub resource_ok: bool,
    /// Unix seconds of the last forced memory reclaim, if any.
    pub last_reclaim_time: Option<u64>,
}

impl ResourceSample {
    /// Builds a sample from raw percentages, deriving the level and the
    /// ceiling check from the configured limits.
    pub fn from_usage(cpu: f64, ram: f64, limits: &ResourceConfig) -> Self {
        Self {
            cpu_percent: cpu,
            ram_percent: ram,
            throttle_level: ThrottleLevel::classify(cpu.max(ram), limits),
            resource_ok: cpu <= limits.max_cpu_percent && ram <= limits.max_ram_percent,
            last_reclaim_time: None,
        }
    }
}
