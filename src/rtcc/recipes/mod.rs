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

use super::{CalcParams, EngineSnafu, ManeuverPad, ManeuverPlanTable, RtccError, Uplink, UplinkSegment};
use crate::cosmic::StateVector;
use crate::engine::{AstroEngine, LoiCandidate, LoiTargets, ManeuverPadOpts, PoweredFlight, Thruster};
use crate::io::MissionConfig;
use crate::linalg::{Matrix3, Vector3};
use crate::time::{Duration, Unit};
use crate::utils::{between_pm_180, kg_to_lbs, m_s_to_fps, m_to_nm, vec_fps, NM2M};
use crate::vehicle::{Computer, Vehicle, VehicleService};
use snafu::ResultExt;

pub(crate) mod descent;
pub(crate) mod generic;
pub(crate) mod launch;
pub(crate) mod lunar_orbit;
pub(crate) mod rendezvous;
pub(crate) mod transearth;
pub(crate) mod translunar;

/// SPS thrust in Newtons, used to pick between the SPS and the RCS for small corrections
const SPS_THRUST_N: f64 = 91_188.544;
/// Shortest SPS burn the crew will fly
const SPS_MIN_BURN_S: f64 = 0.5;

/// Copy of the mission state a recipe works on. It is only committed back if the recipe completes.
pub(crate) struct Workspace<'a> {
    pub engine: &'a dyn AstroEngine,
    pub params: CalcParams,
    pub mpt: ManeuverPlanTable,
    pub vehicle: &'a dyn VehicleService,
    pub config: &'a MissionConfig,
}

impl<'a> Workspace<'a> {
    pub fn get(&self) -> Duration {
        self.vehicle.get()
    }

    pub fn csm_sv(&self) -> StateVector {
        self.vehicle.state_vector(Vehicle::Csm)
    }

    pub fn lm_sv(&self) -> StateVector {
        self.vehicle.state_vector(Vehicle::Lm)
    }

    /// REFSMMAT onboard the provided computer, or the liftoff REFSMMAT if the platform is not aligned
    pub fn refsmmat(&self, computer: Computer) -> Matrix3<f64> {
        match self.vehicle.onboard_refsmmat(computer) {
            Some(matrix) => matrix,
            None => self
                .params
                .stored_refsmmat_csm
                .unwrap_or_else(Matrix3::identity),
        }
    }

    /// Converts an impulsive inertial delta-V to a finite burn
    pub fn burn(
        &self,
        sv: &StateVector,
        tig: Duration,
        dv_inertial_m_s: &Vector3<f64>,
        thruster: Thruster,
    ) -> Result<PoweredFlight, RtccError> {
        self.engine
            .powered_flight(sv, tig, dv_inertial_m_s, thruster)
            .context(EngineSnafu)
    }

    /// Fills a maneuver PAD in crew units from the engine PAD data
    #[allow(clippy::too_many_arguments)]
    pub fn maneuver_pad(
        &self,
        purpose: &str,
        sv: &StateVector,
        tig: Duration,
        dv_lvlh_m_s: Vector3<f64>,
        thruster: Thruster,
        refsmmat: &Matrix3<f64>,
        heads_up: bool,
    ) -> Result<ManeuverPad, RtccError> {
        let opts = ManeuverPadOpts::builder()
            .sv(*sv)
            .tig(tig)
            .dv_lvlh_m_s(dv_lvlh_m_s)
            .thruster(thruster)
            .refsmmat(*refsmmat)
            .heads_up(heads_up)
            .build();
        let data = self.engine.maneuver_pad(&opts).context(EngineSnafu)?;

        Ok(ManeuverPad {
            purpose: purpose.to_string(),
            thruster,
            tig,
            dv_lvlh_fps: vec_fps(&dv_lvlh_m_s),
            att_deg: data.att_deg,
            burn_time: data.burn_time,
            dvc_fps: m_s_to_fps(data.dvc_m_s),
            dvt_fps: m_s_to_fps(data.dvt_m_s),
            ha_nm: m_to_nm(data.ha_m),
            hp_nm: m_to_nm(data.hp_m),
            weight_lbs: kg_to_lbs(data.weight_kg),
            heads_up,
            remarks: String::new(),
            entry: None,
        })
    }

    pub fn sv_segment(&self, vehicle: Vehicle) -> UplinkSegment {
        UplinkSegment::StateVector {
            slot: vehicle,
            sv: self.vehicle.state_vector(vehicle),
        }
    }

    /// CMC uplink of the CSM state vector followed by V66
    pub fn csm_sv_v66(&self, description: &str) -> Uplink {
        Uplink::new(Computer::Cmc, description)
            .with(self.sv_segment(Vehicle::Csm))
            .with(UplinkSegment::V66)
    }
}

/// Whether a delta-V is worth flying: strictly greater than the threshold in ft/s
pub(crate) fn exceeds(dv_m_s: &Vector3<f64>, threshold_fps: f64) -> bool {
    m_s_to_fps(dv_m_s.norm()) > threshold_fps
}

/// Small corrections are flown on the RCS when the SPS burn would be too short
pub(crate) fn sps_or_rcs(mass_kg: f64, dv_m_s: f64) -> Thruster {
    if dv_m_s * mass_kg / SPS_THRUST_N > SPS_MIN_BURN_S {
        Thruster::Sps
    } else {
        Thruster::RcsPlus4
    }
}

/// Whether the burn attitude can be reached without gimbal lock on the current platform
pub(crate) fn refsmmat_reachable(att_deg: &Vector3<f64>) -> bool {
    att_deg.z.to_radians().cos() > 0.5
}

/// Picks the LOI solution with the lower LOI-1 delta-V, the first one on ties.
pub(crate) fn choose_loi(targets: &LoiTargets) -> &LoiCandidate {
    let [first, second] = &targets.candidates;
    if second.dv_loi1_m_s < first.dv_loi1_m_s {
        second
    } else {
        first
    }
}

/// LOI execution criteria: the midcourse correction is scrubbed only if all of pericynthion height, node height and
/// apsidal rotation are in their bands.
pub(crate) fn loi_should_scrub(targets: &LoiTargets) -> bool {
    let loi = choose_loi(targets);
    let h_pc_nm = targets.h_pc_m / NM2M;
    let h_node_nm = loi.h_node_m / NM2M;
    let rotation = between_pm_180(loi.f_nd_e_deg - loi.f_nd_h_deg);
    debug!(
        "LOI criteria: h_pc = {h_pc_nm:.1} NM, h_node = {h_node_nm:.1} NM, apsidal rotation = {rotation:.1} deg"
    );
    h_pc_nm > 50.0 && h_pc_nm < 70.0 && h_node_nm > 50.0 && h_node_nm < 75.0 && rotation.abs() < 45.0
}

/// Rounds a GET to the nearest multiple of `step`
pub(crate) fn round_to(get: Duration, step: Duration) -> Duration {
    (get.to_seconds() / step.to_seconds()).round() * step.to_seconds() * Unit::Second
}

/// Truncates a GET to a multiple of `step`
pub(crate) fn floor_to(get: Duration, step: Duration) -> Duration {
    (get.to_seconds() / step.to_seconds()).floor() * step.to_seconds() * Unit::Second
}

#[cfg(test)]
mod ut_recipes {
    use super::*;
    use crate::utils::{fps_to_m_s, hhmmss};

    fn candidate(dv_loi1_fps: f64, h_node_nm: f64, f_nd_h_deg: f64, f_nd_e_deg: f64) -> LoiCandidate {
        LoiCandidate {
            tig: hhmmss(75, 49, 40.0),
            dv_inertial_m_s: Vector3::new(fps_to_m_s(-dv_loi1_fps), 0.0, 0.0),
            dv_loi1_m_s: fps_to_m_s(dv_loi1_fps),
            h_node_m: h_node_nm * NM2M,
            f_nd_h_deg,
            f_nd_e_deg,
        }
    }

    #[test]
    fn strict_thresholds() {
        let at = Vector3::new(fps_to_m_s(50.0), 0.0, 0.0);
        assert!(!exceeds(&at, 50.0));
        assert!(exceeds(&(at * 1.001), 50.0));
        assert!(!exceeds(&Vector3::new(fps_to_m_s(24.9), 0.0, 0.0), 25.0));
        assert!(exceeds(&Vector3::new(0.0, fps_to_m_s(25.1), 0.0), 25.0));
    }

    #[test]
    fn lower_loi_dv_wins() {
        let targets = LoiTargets {
            h_pc_m: 60.0 * NM2M,
            candidates: [candidate(3000.0, 60.0, 0.0, 0.0), candidate(2950.0, 62.0, 0.0, 0.0)],
        };
        assert_eq!(choose_loi(&targets).dv_loi1_m_s, fps_to_m_s(2950.0));

        let tied = LoiTargets {
            h_pc_m: 60.0 * NM2M,
            candidates: [candidate(2950.0, 60.0, 0.0, 0.0), candidate(2950.0, 62.0, 0.0, 0.0)],
        };
        assert_eq!(choose_loi(&tied).h_node_m, 60.0 * NM2M);
    }

    #[test]
    fn loi_criteria_are_a_conjunction() {
        let nominal = LoiTargets {
            h_pc_m: 60.0 * NM2M,
            candidates: [candidate(2950.0, 60.0, 10.0, 20.0), candidate(3000.0, 60.0, 0.0, 0.0)],
        };
        assert!(loi_should_scrub(&nominal));

        let mut low = nominal;
        low.h_pc_m = 49.0 * NM2M;
        assert!(!loi_should_scrub(&low));

        // 350 and 10 degrees are 20 degrees apart once wrapped
        let wrapped = LoiTargets {
            h_pc_m: 60.0 * NM2M,
            candidates: [candidate(2950.0, 60.0, 350.0, 10.0), candidate(3000.0, 60.0, 0.0, 0.0)],
        };
        assert!(loi_should_scrub(&wrapped));

        let rotated = LoiTargets {
            h_pc_m: 60.0 * NM2M,
            candidates: [candidate(2950.0, 60.0, 0.0, 50.0), candidate(3000.0, 60.0, 0.0, 0.0)],
        };
        assert!(!loi_should_scrub(&rotated));
    }

    #[test]
    fn thruster_selection() {
        assert_eq!(sps_or_rcs(28_000.0, 0.5), Thruster::RcsPlus4);
        assert_eq!(sps_or_rcs(28_000.0, 10.0), Thruster::Sps);
    }

    #[test]
    fn rounding() {
        assert_eq!(
            round_to(hhmmss(2, 44, 0.0), 30 * Unit::Minute),
            hhmmss(2, 30, 0.0)
        );
        assert_eq!(
            round_to(hhmmss(2, 46, 0.0), 30 * Unit::Minute),
            hhmmss(3, 0, 0.0)
        );
        assert_eq!(floor_to(hhmmss(98, 10, 59.9), Unit::Minute * 1), hhmmss(98, 10, 0.0));
    }
}
