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

use crate::cosmic::{AstroError, StateVector};
use crate::linalg::{Matrix3, Vector3};
use crate::time::Duration;
use crate::vehicle::VehicleMasses;
use snafu::prelude::*;

mod options;
pub use options::*;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    #[snafu(display("{routine} did not converge"))]
    NonConvergence { routine: String },
    #[snafu(display("degenerate geometry: {details}"))]
    DegenerateGeometry { details: String },
    #[snafu(display("{operation} is not supported by this engine"))]
    Unsupported { operation: String },
    #[snafu(display("two-body computation failed: {source}"))]
    EngineAstro { source: AstroError },
}

fn unsupported<T>(operation: &str) -> Result<T, EngineError> {
    Err(EngineError::Unsupported {
        operation: operation.to_string(),
    })
}

/// The astrodynamics engine: orbit propagation, targeting and PAD data generation.
///
/// All operations are pure functions of their inputs. None is retried internally: a failure is reported
/// as an [`EngineError`] and the calling calculation falls back to a state vector only uplink.
///
/// Every operation defaults to [`EngineError::Unsupported`], so an engine only implements what the
/// flown timeline needs. All velocities are in m/s, all distances in meters, all times in GET.
pub trait AstroEngine {
    /// Propagates the state vector to the requested GET.
    fn coast(&self, sv: &StateVector, get: Duration) -> Result<StateVector, EngineError> {
        let _ = (sv, get);
        unsupported("coast")
    }

    /// Returns the state right after the provided maneuver.
    fn execute_maneuver(
        &self,
        sv: &StateVector,
        tig: Duration,
        dv_lvlh_m_s: &Vector3<f64>,
        thruster: Thruster,
    ) -> Result<StateVector, EngineError> {
        let _ = (sv, tig, dv_lvlh_m_s, thruster);
        unsupported("execute maneuver")
    }

    /// Plans the TLI burn of the requested opportunity.
    fn tli_plan(&self, sv: &StateVector, opportunity: u8) -> Result<PoweredFlight, EngineError> {
        let _ = (sv, opportunity);
        unsupported("TLI planning")
    }

    fn translunar_midcourse(
        &self,
        opts: &MidcourseOpts,
    ) -> Result<MidcourseSolution, EngineError> {
        let _ = opts;
        unsupported("translunar midcourse")
    }

    fn loi_targets(&self, opts: &LoiOpts) -> Result<LoiTargets, EngineError> {
        let _ = opts;
        unsupported("LOI targeting")
    }

    /// Converts an impulsive inertial delta-V to a finite burn with the provided thruster.
    fn powered_flight(
        &self,
        sv: &StateVector,
        tig: Duration,
        dv_inertial_m_s: &Vector3<f64>,
        thruster: Thruster,
    ) -> Result<PoweredFlight, EngineError> {
        let _ = (sv, tig, dv_inertial_m_s, thruster);
        unsupported("powered flight")
    }

    /// Circularization at the provided altitude, used for LOI-2.
    fn orbit_adjust(
        &self,
        sv: &StateVector,
        tig: Duration,
        altitude_m: f64,
        thruster: Thruster,
    ) -> Result<PoweredFlight, EngineError> {
        let _ = (sv, tig, altitude_m, thruster);
        unsupported("orbit adjust")
    }

    fn entry_targeting(&self, opts: &EntryTargetingOpts) -> Result<EntrySolution, EngineError> {
        let _ = opts;
        unsupported("entry targeting")
    }

    fn return_to_earth(&self, opts: &ReturnToEarthOpts) -> Result<ReturnSolution, EngineError> {
        let _ = opts;
        unsupported("return to Earth")
    }

    /// Entry conditions of the current trajectory, without any maneuver.
    fn entry_prediction(&self, sv: &StateVector) -> Result<EntryData, EngineError> {
        let _ = sv;
        unsupported("entry prediction")
    }

    fn refsmmat(
        &self,
        sv: &StateVector,
        kind: &RefsmmatKind,
    ) -> Result<Matrix3<f64>, EngineError> {
        let _ = (sv, kind);
        unsupported("REFSMMAT")
    }

    fn descent_plan(&self, opts: &DescentPlanOpts) -> Result<DescentPlan, EngineError> {
        let _ = opts;
        unsupported("descent planning")
    }

    /// Returns the inertial delta-V at `t1`.
    fn lambert(&self, opts: &LambertOpts) -> Result<Vector3<f64>, EngineError> {
        let _ = opts;
        unsupported("Lambert targeting")
    }

    fn concentric_rendezvous(
        &self,
        opts: &ConcentricOpts,
    ) -> Result<ConcentricSolution, EngineError> {
        let _ = opts;
        unsupported("concentric rendezvous")
    }

    fn docking_initiation(
        &self,
        opts: &DockingInitiationOpts,
    ) -> Result<DockingInitiationSolution, EngineError> {
        let _ = opts;
        unsupported("docking initiation")
    }

    /// Insertion and CSI times of the rendezvous following the provided phasing maneuver.
    fn rendezvous_plan(
        &self,
        csm: &StateVector,
        lm: &StateVector,
        phasing: Duration,
    ) -> Result<RendezvousPlan, EngineError> {
        let _ = (csm, lm, phasing);
        unsupported("rendezvous planning")
    }

    /// First crossing of the provided selenographic longitude after `guess`.
    fn time_of_longitude(
        &self,
        sv: &StateVector,
        longitude_deg: f64,
        guess: Duration,
    ) -> Result<Duration, EngineError> {
        let _ = (sv, longitude_deg, guess);
        unsupported("time of longitude")
    }

    /// Orbital midnight closest to `guess`.
    fn orbital_midnight(&self, sv: &StateVector, guess: Duration) -> Result<Duration, EngineError> {
        let _ = (sv, guess);
        unsupported("orbital midnight")
    }

    /// Crossing of the lunar terminator into daylight after `guess`.
    fn terminator_rise(&self, sv: &StateVector, guess: Duration) -> Result<Duration, EngineError> {
        let _ = (sv, guess);
        unsupported("terminator rise")
    }

    fn map_update(&self, sv: &StateVector, kind: MapKind) -> Result<MapUpdate, EngineError> {
        let _ = (sv, kind);
        unsupported("map update")
    }

    fn landmark_tracking(
        &self,
        sv: &StateVector,
        landmark: &Landmark,
        guess: Duration,
    ) -> Result<LandmarkSighting, EngineError> {
        let _ = (sv, landmark, guess);
        unsupported("landmark tracking")
    }

    fn maneuver_pad(&self, opts: &ManeuverPadOpts) -> Result<ManeuverPadData, EngineError> {
        let _ = opts;
        unsupported("maneuver PAD")
    }

    fn block_data(
        &self,
        sv: &StateVector,
        targets: &[BlockDataTarget],
    ) -> Result<Vec<BlockDataSolution>, EngineError> {
        let _ = (sv, targets);
        unsupported("block data")
    }

    fn entry_pad(
        &self,
        sv: &StateVector,
        refsmmat: &Matrix3<f64>,
        longitude_deg: f64,
    ) -> Result<EntryPadData, EngineError> {
        let _ = (sv, refsmmat, longitude_deg);
        unsupported("entry PAD")
    }

    /// SPS gimbal trims (pitch, yaw) in degrees for the provided configuration.
    fn gimbal_trims(
        &self,
        masses: &VehicleMasses,
        docked: bool,
    ) -> Result<(f64, f64), EngineError> {
        let _ = (masses, docked);
        unsupported("gimbal trims")
    }

    /// Torquing angles aligning the LM platform to the CSM platform while docked, in degrees.
    fn docked_alignment(
        &self,
        csm_gimbals_deg: &Vector3<f64>,
        lm_gimbals_deg: &Vector3<f64>,
        csm_refsmmat: &Matrix3<f64>,
    ) -> Result<Vector3<f64>, EngineError> {
        let _ = (csm_gimbals_deg, lm_gimbals_deg, csm_refsmmat);
        unsupported("docked alignment")
    }
}

#[cfg(test)]
mod ut_engine {
    use super::*;
    use crate::cosmic::Body;

    struct Nothing;
    impl AstroEngine for Nothing {}

    #[test]
    fn defaults_are_unsupported() {
        let sv = StateVector::new(
            Duration::ZERO,
            Body::Earth,
            Vector3::new(6.6e6, 0.0, 0.0),
            Vector3::new(0.0, 7.8e3, 0.0),
            130_000.0,
        );
        assert_eq!(
            Nothing.coast(&sv, Duration::ZERO),
            Err(EngineError::Unsupported {
                operation: "coast".to_string()
            })
        );
        let err = Nothing.entry_prediction(&sv).unwrap_err();
        assert_eq!(format!("{err}"), "entry prediction is not supported by this engine");
    }
}
