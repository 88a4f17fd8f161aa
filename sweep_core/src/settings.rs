//! Simulation settings and the typed global-setting table.
//!
//! Settings are an explicit value object threaded through generation. A
//! swept setting is applied with [`SimulationSettings::with_override`],
//! which restores the previous value once the job completes.

use crate::error::SweepError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Value returned by [`SimulationSettings::get_by_key`] for unknown keys.
pub const UNKNOWN_SETTING: f64 = -1.0;

/// Engine-wide settings a series may sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Interval between fake messages (ms)
    pub fake_message_interval: f64,
    
    /// PCN detection distance threshold
    pub pcn_distance_threshold: f64,
    
    /// PCN forward threshold
    pub pcn_forward_threshold: f64,
    
    /// EVA forward threshold
    pub eva_forward_threshold: f64,
    
    /// RHCN detection threshold
    pub rhcn_threshold: f64,
    
    /// EEBL detection threshold
    pub eebl_threshold: f64,
    
    /// EVA beacon time factor
    pub eva_beacon_time_factor: f64,
    
    /// EVA beacon factor
    pub eva_beacon_factor: f64,
    
    /// Number of beacons kept in the log
    pub logged_beacons_amount: f64,
    
    /// Spam detection time window (ms)
    pub spam_time_threshold: f64,
    
    /// Messages within the window that count as spam
    pub spam_message_amount_threshold: f64,
    
    /// EVA message delay (ms)
    pub eva_message_delay: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            fake_message_interval: 1000.0,
            pcn_distance_threshold: 200.0,
            pcn_forward_threshold: 3.0,
            eva_forward_threshold: 3.0,
            rhcn_threshold: 3.0,
            eebl_threshold: 3.0,
            eva_beacon_time_factor: 3.0,
            eva_beacon_factor: 3.0,
            logged_beacons_amount: 300.0,
            spam_time_threshold: 240_000.0,
            spam_message_amount_threshold: 100.0,
            eva_message_delay: 10.0,
        }
    }
}

/// A named simulation setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalSetting {
    FakeMessageInterval,
    PcnDistanceThreshold,
    PcnForwardThreshold,
    EvaForwardThreshold,
    RhcnThreshold,
    EeblThreshold,
    EvaBeaconTimeFactor,
    EvaBeaconFactor,
    LoggedBeaconsAmount,
    SpamTimeThreshold,
    SpamMessageAmountThreshold,
    EvaMessageDelay,
}

impl GlobalSetting {
    /// Every setting, in display order.
    pub const ALL: [GlobalSetting; 12] = [
        GlobalSetting::FakeMessageInterval,
        GlobalSetting::PcnDistanceThreshold,
        GlobalSetting::PcnForwardThreshold,
        GlobalSetting::EvaForwardThreshold,
        GlobalSetting::RhcnThreshold,
        GlobalSetting::EeblThreshold,
        GlobalSetting::EvaBeaconTimeFactor,
        GlobalSetting::EvaBeaconFactor,
        GlobalSetting::LoggedBeaconsAmount,
        GlobalSetting::SpamTimeThreshold,
        GlobalSetting::SpamMessageAmountThreshold,
        GlobalSetting::EvaMessageDelay,
    ];
    
    /// Returns the human-readable key.
    pub fn key(&self) -> &'static str {
        match self {
            GlobalSetting::FakeMessageInterval => "fake message interval",
            GlobalSetting::PcnDistanceThreshold => "pcn distance threshold",
            GlobalSetting::PcnForwardThreshold => "pcn forward threshold",
            GlobalSetting::EvaForwardThreshold => "eva forward threshold",
            GlobalSetting::RhcnThreshold => "rhcn threshold",
            GlobalSetting::EeblThreshold => "eebl threshold",
            GlobalSetting::EvaBeaconTimeFactor => "eva beacon time factor",
            GlobalSetting::EvaBeaconFactor => "eva beacon factor",
            GlobalSetting::LoggedBeaconsAmount => "logged beacons amount",
            GlobalSetting::SpamTimeThreshold => "spam time threshold",
            GlobalSetting::SpamMessageAmountThreshold => "spam message amount threshold",
            GlobalSetting::EvaMessageDelay => "eva message delay",
        }
    }
    
    /// Reads this setting from a settings object.
    pub fn get(&self, settings: &SimulationSettings) -> f64 {
        match self {
            GlobalSetting::FakeMessageInterval => settings.fake_message_interval,
            GlobalSetting::PcnDistanceThreshold => settings.pcn_distance_threshold,
            GlobalSetting::PcnForwardThreshold => settings.pcn_forward_threshold,
            GlobalSetting::EvaForwardThreshold => settings.eva_forward_threshold,
            GlobalSetting::RhcnThreshold => settings.rhcn_threshold,
            GlobalSetting::EeblThreshold => settings.eebl_threshold,
            GlobalSetting::EvaBeaconTimeFactor => settings.eva_beacon_time_factor,
            GlobalSetting::EvaBeaconFactor => settings.eva_beacon_factor,
            GlobalSetting::LoggedBeaconsAmount => settings.logged_beacons_amount,
            GlobalSetting::SpamTimeThreshold => settings.spam_time_threshold,
            GlobalSetting::SpamMessageAmountThreshold => settings.spam_message_amount_threshold,
            GlobalSetting::EvaMessageDelay => settings.eva_message_delay,
        }
    }
    
    /// Writes this setting into a settings object.
    pub fn set(&self, settings: &mut SimulationSettings, value: f64) {
        let slot = match self {
            GlobalSetting::FakeMessageInterval => &mut settings.fake_message_interval,
            GlobalSetting::PcnDistanceThreshold => &mut settings.pcn_distance_threshold,
            GlobalSetting::PcnForwardThreshold => &mut settings.pcn_forward_threshold,
            GlobalSetting::EvaForwardThreshold => &mut settings.eva_forward_threshold,
            GlobalSetting::RhcnThreshold => &mut settings.rhcn_threshold,
            GlobalSetting::EeblThreshold => &mut settings.eebl_threshold,
            GlobalSetting::EvaBeaconTimeFactor => &mut settings.eva_beacon_time_factor,
            GlobalSetting::EvaBeaconFactor => &mut settings.eva_beacon_factor,
            GlobalSetting::LoggedBeaconsAmount => &mut settings.logged_beacons_amount,
            GlobalSetting::SpamTimeThreshold => &mut settings.spam_time_threshold,
            GlobalSetting::SpamMessageAmountThreshold => {
                &mut settings.spam_message_amount_threshold
            }
            GlobalSetting::EvaMessageDelay => &mut settings.eva_message_delay,
        };
        *slot = value;
    }
}

impl std::fmt::Display for GlobalSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for GlobalSetting {
    type Err = SweepError;
    
    /// Accepts the display key in any case, with or without separators
    /// (`"fake message interval"`, `"FakeMessageInterval"`, `"fake_message_interval"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        GlobalSetting::ALL
            .iter()
            .copied()
            .find(|setting| normalize_key(setting.key()) == wanted)
            .ok_or_else(|| SweepError::UnknownSetting(s.to_string()))
    }
}

/// Lowercases and drops whitespace, `_` and `-`.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl SimulationSettings {
    /// String-keyed read; returns [`UNKNOWN_SETTING`] for unrecognized keys.
    pub fn get_by_key(&self, key: &str) -> f64 {
        match key.parse::<GlobalSetting>() {
            Ok(setting) => setting.get(self),
            Err(_) => {
                debug!("get on unknown setting key '{}'", key);
                UNKNOWN_SETTING
            }
        }
    }
    
    /// String-keyed write; unrecognized keys are ignored.
    pub fn set_by_key(&mut self, key: &str, value: f64) {
        match key.parse::<GlobalSetting>() {
            Ok(setting) => setting.set(self, value),
            Err(_) => debug!("set on unknown setting key '{}' ignored", key),
        }
    }
    
    /// Applies `value` to `setting`, runs `f`, then restores the old value.
    ///
    /// The old value is restored whether `f` succeeds or fails.
    pub fn with_override<T, E>(
        &mut self,
        setting: GlobalSetting,
        value: f64,
        f: impl FnOnce(&SimulationSettings) -> Result<T, E>,
    ) -> Result<T, E> {
        let old = setting.get(self);
        setting.set(self, value);
        let result = f(self);
        setting.set(self, old);
        result
    }
    
    /// Snapshot keyed by setting name, for scenario artifacts.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        GlobalSetting::ALL
            .iter()
            .map(|s| (s.key().to_string(), s.get(self)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_parse_setting_keys() {
        assert_eq!(
            "fake message interval".parse::<GlobalSetting>().unwrap(),
            GlobalSetting::FakeMessageInterval
        );
        assert_eq!(
            "EEBL_Threshold".parse::<GlobalSetting>().unwrap(),
            GlobalSetting::EeblThreshold
        );
        assert!("warp factor".parse::<GlobalSetting>().is_err());
    }
    
    #[test]
    fn test_every_key_round_trips() {
        for setting in GlobalSetting::ALL {
            assert_eq!(setting.key().parse::<GlobalSetting>().unwrap(), setting);
        }
    }
    
    #[test]
    fn test_get_set_by_key() {
        let mut settings = SimulationSettings::default();
        settings.set_by_key("rhcn threshold", 7.0);
        assert_eq!(settings.rhcn_threshold, 7.0);
        assert_eq!(settings.get_by_key("rhcn threshold"), 7.0);
    }
    
    #[test]
    fn test_unknown_key_sentinel() {
        let mut settings = SimulationSettings::default();
        let before = settings.clone();
        
        assert_eq!(settings.get_by_key("no such thing"), UNKNOWN_SETTING);
        settings.set_by_key("no such thing", 42.0);
        assert_eq!(settings, before);
    }
    
    #[test]
    fn test_override_restores_on_success() {
        let mut settings = SimulationSettings::default();
        let seen: Result<f64, ()> = settings.with_override(
            GlobalSetting::FakeMessageInterval,
            1500.0,
            |s| Ok(s.fake_message_interval),
        );
        
        assert_eq!(seen.unwrap(), 1500.0);
        assert_eq!(settings.fake_message_interval, 1000.0);
    }
    
    #[test]
    fn test_override_restores_on_error() {
        let mut settings = SimulationSettings::default();
        let result: Result<(), &str> =
            settings.with_override(GlobalSetting::SpamTimeThreshold, 1.0, |_| Err("boom"));
        
        assert!(result.is_err());
        assert_eq!(settings, SimulationSettings::default());
    }
    
    #[test]
    fn test_snapshot_has_all_settings() {
        let map = SimulationSettings::default().to_map();
        assert_eq!(map.len(), GlobalSetting::ALL.len());
        assert_eq!(map["eva message delay"], 10.0);
    }
}
