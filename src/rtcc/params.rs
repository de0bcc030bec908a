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

use crate::cosmic::StateVector;
use crate::io::duration_parts;
use crate::linalg::{Matrix3, Vector3};
use crate::time::Duration;
use serde_derive::{Deserialize, Serialize};

/// Mission epochs which the sequencer triggers can be anchored to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionEpoch {
    Tli,
    Loi,
    Doi,
    Sep,
    Tei,
    Ei,
    Pdi,
    LunarLiftoff,
    Phasing,
    Insertion,
    Csi,
    Tpi,
    /// Ignition time of the last maneuver computed
    TimeOfIgnition,
    TigStore1,
}

/// Persistent store of the mission parameters shared by all calculations.
///
/// Epochs start at zero, which means "not computed yet". They are overwritten each time a more precise
/// solution of the same event is computed, and never cleared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalcParams {
    #[serde(with = "duration_parts")]
    pub tli: Duration,
    #[serde(with = "duration_parts")]
    pub loi: Duration,
    #[serde(with = "duration_parts")]
    pub doi: Duration,
    #[serde(with = "duration_parts")]
    pub sep: Duration,
    #[serde(with = "duration_parts")]
    pub tei: Duration,
    #[serde(with = "duration_parts")]
    pub ei: Duration,
    #[serde(with = "duration_parts")]
    pub pdi: Duration,
    #[serde(with = "duration_parts")]
    pub lunar_liftoff: Duration,
    #[serde(with = "duration_parts")]
    pub phasing: Duration,
    #[serde(with = "duration_parts")]
    pub insertion: Duration,
    #[serde(with = "duration_parts")]
    pub csi: Duration,
    #[serde(with = "duration_parts")]
    pub tpi: Duration,
    #[serde(with = "duration_parts")]
    pub loi2: Duration,
    #[serde(with = "duration_parts")]
    pub touchdown: Duration,
    #[serde(with = "duration_parts")]
    pub tig_store1: Duration,
    /// Cached post-burn state vector of the last transearth correction
    pub sv_store1: Option<StateVector>,
    /// REFSMMAT of the CSM platform at liftoff
    pub stored_refsmmat_csm: Option<Matrix3<f64>>,
    /// Ignition time of the last maneuver computed
    #[serde(with = "duration_parts")]
    pub time_of_ignition: Duration,
    /// LVLH delta-V of the last maneuver computed, m/s
    pub delta_v_lvlh_m_s: Vector3<f64>,
    pub splash_latitude_deg: f64,
    pub splash_longitude_deg: f64,
    pub launch_azimuth_deg: f64,
    /// Chosen TLI opportunity, zero until TLI is planned
    pub tli_opportunity: u8,
}

impl Default for CalcParams {
    fn default() -> Self {
        Self {
            tli: Duration::ZERO,
            loi: Duration::ZERO,
            doi: Duration::ZERO,
            sep: Duration::ZERO,
            tei: Duration::ZERO,
            ei: Duration::ZERO,
            pdi: Duration::ZERO,
            lunar_liftoff: Duration::ZERO,
            phasing: Duration::ZERO,
            insertion: Duration::ZERO,
            csi: Duration::ZERO,
            tpi: Duration::ZERO,
            loi2: Duration::ZERO,
            touchdown: Duration::ZERO,
            tig_store1: Duration::ZERO,
            sv_store1: None,
            stored_refsmmat_csm: None,
            time_of_ignition: Duration::ZERO,
            delta_v_lvlh_m_s: Vector3::zeros(),
            splash_latitude_deg: 0.0,
            splash_longitude_deg: 0.0,
            launch_azimuth_deg: 0.0,
            tli_opportunity: 0,
        }
    }
}

impl CalcParams {
    /// Returns the current value of a mission epoch
    pub fn epoch(&self, epoch: MissionEpoch) -> Duration {
        match epoch {
            MissionEpoch::Tli => self.tli,
            MissionEpoch::Loi => self.loi,
            MissionEpoch::Doi => self.doi,
            MissionEpoch::Sep => self.sep,
            MissionEpoch::Tei => self.tei,
            MissionEpoch::Ei => self.ei,
            MissionEpoch::Pdi => self.pdi,
            MissionEpoch::LunarLiftoff => self.lunar_liftoff,
            MissionEpoch::Phasing => self.phasing,
            MissionEpoch::Insertion => self.insertion,
            MissionEpoch::Csi => self.csi,
            MissionEpoch::Tpi => self.tpi,
            MissionEpoch::TimeOfIgnition => self.time_of_ignition,
            MissionEpoch::TigStore1 => self.tig_store1,
        }
    }

    /// Returns whether the provided epoch was ever computed
    pub fn is_set(&self, epoch: MissionEpoch) -> bool {
        self.epoch(epoch) != Duration::ZERO
    }

    /// Records the last maneuver computed, read by the next recipe which needs to execute it first
    pub fn store_maneuver(&mut self, tig: Duration, dv_lvlh_m_s: Vector3<f64>) {
        self.time_of_ignition = tig;
        self.delta_v_lvlh_m_s = dv_lvlh_m_s;
    }

    /// Records a return trajectory: TEI, EI and splash point
    pub fn store_return(&mut self, tei: Duration, ei: Duration, lat_deg: f64, lng_deg: f64) {
        self.tei = tei;
        self.ei = ei;
        self.splash_latitude_deg = lat_deg;
        self.splash_longitude_deg = lng_deg;
    }
}

#[cfg(test)]
mod ut_params {
    use super::*;
    use crate::utils::hhmmss;

    #[test]
    fn sentinel_and_overwrite() {
        let mut params = CalcParams::default();
        assert!(!params.is_set(MissionEpoch::Loi));

        params.loi = hhmmss(75, 49, 40.2);
        assert!(params.is_set(MissionEpoch::Loi));
        params.loi = hhmmss(75, 50, 2.0);
        assert_eq!(params.epoch(MissionEpoch::Loi), hhmmss(75, 50, 2.0));

        params.store_return(hhmmss(137, 20, 0.0), hhmmss(191, 50, 0.0), -15.0, -165.0);
        assert_eq!(params.epoch(MissionEpoch::Tei), hhmmss(137, 20, 0.0));
        assert_eq!(params.epoch(MissionEpoch::Ei), hhmmss(191, 50, 0.0));
    }
}
