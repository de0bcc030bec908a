/*
    Apollo MCC, mission control sequencing and real-time computation
    Copyright (C) 2024 the Apollo MCC contributors

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{duration_from_str, duration_to_str, ConfigError, ConfigRepr};
use crate::cosmic::MOON_RADIUS_M;
use crate::time::Duration;
use crate::utils::hhmmss;
use serde_derive::{Deserialize, Serialize};

/// Landing site used by the descent planning and the landing site REFSMMAT.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandingSite {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub radius_m: f64,
    /// Approach azimuth, used for the landing site REFSMMAT
    pub azimuth_deg: f64,
}

impl Default for LandingSite {
    /// Landing site 2 as flown on a lunar-orbit rehearsal
    fn default() -> Self {
        Self {
            latitude_deg: 0.718,
            longitude_deg: 23.647,
            radius_m: MOON_RADIUS_M - 1_482.0,
            azimuth_deg: -91.0,
        }
    }
}

/// Configuration of a mission. Every field has a default so a partial YAML document is valid.
///
/// Durations are written as hifitime strings, e.g. `nominal_loi: 75 h 49 min 40.2 s`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub name: String,
    /// Display each PAD as soon as it is handed to the crew
    pub pad_auto_show: bool,
    /// Nominal LOI time, used until a midcourse correction computes a better one
    #[serde(serialize_with = "duration_to_str", deserialize_with = "duration_from_str")]
    pub nominal_loi: Duration,
    /// TEI time assumed by the transearth midcourse corrections if TEI was never computed
    #[serde(serialize_with = "duration_to_str", deserialize_with = "duration_from_str")]
    pub nominal_tei: Duration,
    /// Entry interface time assumed if no return trajectory was ever computed
    #[serde(serialize_with = "duration_to_str", deserialize_with = "duration_from_str")]
    pub nominal_ei: Duration,
    pub landing_site: LandingSite,
    /// Touchdown time used for the landing site REFSMMAT until the descent is planned
    #[serde(serialize_with = "duration_to_str", deserialize_with = "duration_from_str")]
    pub nominal_landing: Duration,
    /// Target splash longitude of the TLI+90 minutes abort
    pub tli_abort_longitude_deg: f64,
    /// Target splash longitude of all other returns (mid-Pacific)
    pub entry_longitude_deg: f64,
    /// Name of the recovery area printed on the entry PADs
    pub recovery_area: String,
    /// Maximum entry speed of the nominal TEI solutions, ft/s
    pub tei_max_entry_speed_fps: f64,
    /// Maximum entry speed of the PC+2 abort, ft/s
    pub pc2_max_entry_speed_fps: f64,
    /// Maximum entry speed of all other return solutions, ft/s
    pub default_max_entry_speed_fps: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            name: "F".to_string(),
            pad_auto_show: true,
            nominal_loi: hhmmss(75, 49, 40.2),
            nominal_tei: hhmmss(137, 20, 0.0),
            nominal_ei: hhmmss(191, 50, 0.0),
            landing_site: LandingSite::default(),
            nominal_landing: hhmmss(100, 46, 0.0),
            tli_abort_longitude_deg: -25.0,
            entry_longitude_deg: -165.0,
            recovery_area: "MIDPAC".to_string(),
            tei_max_entry_speed_fps: 36_500.0,
            pc2_max_entry_speed_fps: 37_500.0,
            default_max_entry_speed_fps: 36_323.0,
        }
    }
}

impl MissionConfig {
    /// Checks the ranges of the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let site = &self.landing_site;
        if !(-90.0..=90.0).contains(&site.latitude_deg) {
            return Err(ConfigError::InvalidConfig(format!(
                "landing site latitude {} deg out of range",
                site.latitude_deg
            )));
        }
        if !(-180.0..=180.0).contains(&site.longitude_deg) {
            return Err(ConfigError::InvalidConfig(format!(
                "landing site longitude {} deg out of range",
                site.longitude_deg
            )));
        }
        if site.radius_m <= 0.0 {
            return Err(ConfigError::InvalidConfig(
                "landing site radius must be positive".to_string(),
            ));
        }
        if self.nominal_ei <= self.nominal_tei {
            return Err(ConfigError::InvalidConfig(format!(
                "nominal EI ({}) must come after nominal TEI ({})",
                self.nominal_ei, self.nominal_tei
            )));
        }
        for speed in [
            self.tei_max_entry_speed_fps,
            self.pc2_max_entry_speed_fps,
            self.default_max_entry_speed_fps,
        ] {
            if speed <= 0.0 {
                return Err(ConfigError::InvalidConfig(format!(
                    "maximum entry speed {speed} ft/s must be positive"
                )));
            }
        }
        Ok(())
    }
}

impl ConfigRepr for MissionConfig {}

#[cfg(test)]
mod ut_mission_cfg {
    use super::*;
    use crate::time::Unit;

    #[test]
    fn partial_yaml_uses_defaults() {
        let cfg = MissionConfig::loads(
            r#"
name: F-rehearsal
nominal_loi: 76 h
pad_auto_show: false
landing_site:
  latitude_deg: 1.0
  longitude_deg: 23.0
  radius_m: 1736000.0
  azimuth_deg: -90.0
"#,
        )
        .unwrap();

        assert_eq!(cfg.name, "F-rehearsal");
        assert_eq!(cfg.nominal_loi, 76 * Unit::Hour);
        assert!(!cfg.pad_auto_show);
        assert_eq!(cfg.entry_longitude_deg, -165.0);
        assert_eq!(cfg.recovery_area, "MIDPAC");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn many_missions() {
        let cfgs = MissionConfig::loads_many(
            r#"
- name: F
- name: G
  nominal_ei: 195 h
"#,
        )
        .unwrap();
        assert_eq!(cfgs.len(), 2);
        assert_eq!(cfgs[1].nominal_ei, 195 * Unit::Hour);
    }

    #[test]
    fn invalid() {
        let mut cfg = MissionConfig::default();
        cfg.landing_site.latitude_deg = 91.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidConfig(_))
        ));

        let mut cfg = MissionConfig::default();
        cfg.nominal_ei = cfg.nominal_tei;
        assert!(cfg.validate().is_err());

        assert!(matches!(
            MissionConfig::loads("nominal_loi: [1, 2]"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
