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
use crate::io::LandingSite;
use crate::linalg::{Matrix3, Vector3};
use crate::time::Duration;
use crate::utils::{FT2M, NM2M};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// Engine used for a maneuver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Thruster {
    /// Service propulsion system
    Sps,
    /// Service module RCS, +X translation on two quads
    RcsPlus2,
    /// Service module RCS, +X translation on four quads
    RcsPlus4,
    /// LM descent propulsion system
    Dps,
    /// LM ascent propulsion system
    Aps,
    /// S-IVB J-2 engine, TLI only
    Sivb,
}

impl Thruster {
    pub fn is_rcs(&self) -> bool {
        matches!(self, Self::RcsPlus2 | Self::RcsPlus4)
    }

    /// Whether this thruster belongs to the LM
    pub fn is_lm(&self) -> bool {
        matches!(self, Self::Dps | Self::Aps)
    }
}

impl fmt::Display for Thruster {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Sps => write!(f, "SPS/G&N"),
            Self::RcsPlus2 => write!(f, "RCS/G&N +X2"),
            Self::RcsPlus4 => write!(f, "RCS/G&N +X4"),
            Self::Dps => write!(f, "DPS/PGNS"),
            Self::Aps => write!(f, "APS/PGNS"),
            Self::Sivb => write!(f, "S-IVB"),
        }
    }
}

/// Targeting mode of a translunar midcourse correction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MidcourseMode {
    /// Return to the free-return trajectory
    #[default]
    FreeReturn,
    /// Target the nominal LOI node
    Nodal,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct MidcourseOpts {
    pub sv: StateVector,
    /// Ignition time of the correction
    pub tig: Duration,
    /// Pericynthion time currently planned
    pub loi_get: Duration,
    #[builder(default)]
    pub mode: MidcourseMode,
    /// Desired height of pericynthion
    #[builder(default = 60.0 * NM2M)]
    pub h_pc_m: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MidcourseSolution {
    pub tig: Duration,
    pub dv_inertial_m_s: Vector3<f64>,
    /// Pericynthion time of the corrected trajectory
    pub loi_get: Duration,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct LoiOpts {
    pub sv: StateVector,
    pub site: LandingSite,
    #[builder(default = 170.0 * NM2M)]
    pub h_apo_m: f64,
    #[builder(default = 60.0 * NM2M)]
    pub h_peri_m: f64,
}

/// One of the two LOI solutions, one per ascending/descending approach to the node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoiCandidate {
    pub tig: Duration,
    pub dv_inertial_m_s: Vector3<f64>,
    /// Predicted LOI-1 delta-V magnitude
    pub dv_loi1_m_s: f64,
    /// Height of the node
    pub h_node_m: f64,
    /// Argument of the node on the approach hyperbola, degrees
    pub f_nd_h_deg: f64,
    /// Argument of the node on the lunar ellipse, degrees
    pub f_nd_e_deg: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoiTargets {
    /// Height of pericynthion of the current approach trajectory
    pub h_pc_m: f64,
    pub candidates: [LoiCandidate; 2],
}

/// Result of converting an impulsive maneuver to a finite burn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PoweredFlight {
    pub tig: Duration,
    pub dv_lvlh_m_s: Vector3<f64>,
    pub burn_time: Duration,
    pub sv_post: StateVector,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct EntryTargetingOpts {
    pub sv: StateVector,
    pub tig_guess: Duration,
    pub entry_longitude_deg: f64,
    #[builder(default = Thruster::Sps)]
    pub thruster: Thruster,
    /// Retarget the splash longitude instead of only the flight path angle
    #[builder(default)]
    pub longitude_control: bool,
    /// Desired time of landing, if constrained
    #[builder(default, setter(strip_option))]
    pub return_get: Option<Duration>,
}

/// Entry conditions of a return trajectory.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Entry interface (400k ft) time
    #[serde(with = "crate::io::duration_parts")]
    pub ei_get: Duration,
    /// Range to go from 0.05g to the landing point, nautical miles
    pub rtgo_nm: f64,
    /// Inertial velocity at entry interface, ft/s
    pub vio_fps: f64,
    /// Time of 0.05g
    #[serde(with = "crate::io::duration_parts")]
    pub get05g: Duration,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EntrySolution {
    pub tig: Duration,
    pub dv_inertial_m_s: Vector3<f64>,
    pub sv_post: StateVector,
    pub entry: EntryData,
}

/// Return speed class of a return-to-Earth solution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReturnSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct ReturnToEarthOpts {
    pub sv: StateVector,
    pub tig_guess: Duration,
    pub entry_longitude_deg: f64,
    #[builder(default)]
    pub return_speed: ReturnSpeed,
    pub max_entry_speed_fps: f64,
    #[builder(default = Thruster::Sps)]
    pub thruster: Thruster,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReturnSolution {
    pub tig: Duration,
    pub dv_inertial_m_s: Vector3<f64>,
    pub sv_post: StateVector,
    pub entry: EntryData,
    pub pericynthion_altitude_m: f64,
}

/// Rule used to compute a REFSMMAT.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RefsmmatKind {
    /// Launch pad alignment at liftoff
    Liftoff,
    /// Passive thermal control attitude at the provided time
    Ptc { get: Duration },
    /// Landing site alignment at touchdown
    LandingSite { get: Duration, site: LandingSite },
    /// Alignment which puts the burn attitude at zero gimbal angles
    PreferredManeuver {
        tig: Duration,
        dv_lvlh_m_s: Vector3<f64>,
        thruster: Thruster,
        heads_up: bool,
    },
    /// Entry alignment at entry interface
    Entry { ei_get: Duration },
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct DescentPlanOpts {
    /// LM state vector before DOI
    pub sv: StateVector,
    pub site: LandingSite,
    /// Earliest time for DOI
    pub threshold_get: Duration,
    #[builder(default = 50_000.0 * FT2M)]
    pub pdi_altitude_m: f64,
    /// Central angle between PDI and touchdown
    #[builder(default = 14.51)]
    pub flight_arc_deg: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DescentPlan {
    pub doi_tig: Duration,
    pub dv_lvlh_m_s: Vector3<f64>,
    pub pdi_get: Duration,
    pub touchdown_get: Duration,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct LambertOpts {
    pub chaser: StateVector,
    pub target: StateVector,
    /// Ignition time
    pub t1: Duration,
    /// Arrival time
    pub t2: Duration,
    /// Arrival offset from the target in its local vertical frame
    #[builder(default = Vector3::zeros())]
    pub offset_m: Vector3<f64>,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct ConcentricOpts {
    pub chaser: StateVector,
    pub target: StateVector,
    pub t_csi: Duration,
    /// Differential height at the constant delta-height maneuver
    pub delta_h_m: f64,
    /// Line of sight elevation at TPI
    pub elevation_deg: f64,
    #[builder(default, setter(strip_option))]
    pub t_tpi_guess: Option<Duration>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConcentricSolution {
    pub t_csi: Duration,
    pub dv_lvlh_m_s: Vector3<f64>,
    pub t_cdh: Duration,
    pub t_tpi: Duration,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct DockingInitiationOpts {
    pub chaser: StateVector,
    pub target: StateVector,
    /// Time of the abort maneuver
    pub t_abort: Duration,
    pub tpi_guess: Duration,
    pub delta_h_m: f64,
    pub elevation_deg: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DockingInitiationSolution {
    pub tig: Duration,
    pub dv_inertial_m_s: Vector3<f64>,
    pub t_csi: Duration,
    pub t_tpi: Duration,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RendezvousPlan {
    pub insertion: Duration,
    pub csi: Duration,
}

/// Kind of map update: lunar orbit revolutions, or the transearth coast after TEI.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapKind {
    LunarOrbit,
    Transearth,
}

/// Acquisition and loss of signal times around the Moon.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapUpdate {
    pub los: Duration,
    pub aos: Duration,
    /// Crossing of the 180 degree meridian
    pub pm: Duration,
    pub sunrise: Duration,
    pub sunset: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Landmark {
    pub id: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Landmark {
    pub fn new(id: &str, latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            id: id.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LandmarkSighting {
    /// Time over the landmark
    pub t1: Duration,
    /// Start of the marks
    pub t2: Duration,
    pub cross_range_m: f64,
}

#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct ManeuverPadOpts {
    pub sv: StateVector,
    pub tig: Duration,
    pub dv_lvlh_m_s: Vector3<f64>,
    pub thruster: Thruster,
    pub refsmmat: Matrix3<f64>,
    #[builder(default = true)]
    pub heads_up: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ManeuverPadData {
    /// Roll, pitch, yaw at ignition in degrees
    pub att_deg: Vector3<f64>,
    pub burn_time: Duration,
    /// Delta-V counter setting
    pub dvc_m_s: f64,
    pub dvt_m_s: f64,
    pub ha_m: f64,
    pub hp_m: f64,
    pub weight_kg: f64,
}

/// Target of a P37 return-to-Earth block data entry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockDataTarget {
    pub tig: Duration,
    /// Desired landing time
    pub t_z: Duration,
    pub longitude_deg: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockDataSolution {
    pub tig: Duration,
    pub dv_m_s: f64,
    pub latitude_deg: f64,
    pub get400k: Duration,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EntryPadData {
    pub att_deg: Vector3<f64>,
    pub entry: EntryData,
    /// Maximum expected load factor
    pub max_g: f64,
}
