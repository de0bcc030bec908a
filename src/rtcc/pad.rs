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

use crate::engine::{EntryData, MapKind, Thruster};
use crate::io::duration_parts;
use crate::linalg::Vector3;
use crate::time::Duration;
use crate::utils::{format_get, format_get_cs};
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Shape of a PAD form, used to allocate the PAD buffer before a calculation fills it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
pub enum PadKind {
    Maneuver,
    LmManeuver,
    BlockData,
    Tli,
    MapUpdate,
    Landmark,
    Entry,
    Dap,
    Torquing,
    Csi,
    Generic,
}

/// External delta-V maneuver PAD, CSM or LM.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManeuverPad {
    pub purpose: String,
    pub thruster: Thruster,
    #[serde(with = "duration_parts")]
    pub tig: Duration,
    /// LVLH delta-V, ft/s
    pub dv_lvlh_fps: Vector3<f64>,
    /// Roll, pitch and yaw at ignition, degrees
    pub att_deg: Vector3<f64>,
    #[serde(with = "duration_parts")]
    pub burn_time: Duration,
    pub dvc_fps: f64,
    pub dvt_fps: f64,
    pub ha_nm: f64,
    pub hp_nm: f64,
    pub weight_lbs: f64,
    pub heads_up: bool,
    pub remarks: String,
    /// Entry conditions, on return maneuvers only
    pub entry: Option<EntryData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDataEntry {
    #[serde(with = "duration_parts")]
    pub tig: Duration,
    pub dv_fps: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(with = "duration_parts")]
    pub get400k: Duration,
}

/// P37 return-to-Earth block data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDataPad {
    pub entries: Vec<BlockDataEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TliPad {
    /// Start of the TLI sequence (timebase 6)
    #[serde(with = "duration_parts")]
    pub tb6p: Duration,
    pub ign_att_deg: Vector3<f64>,
    #[serde(with = "duration_parts")]
    pub burn_time: Duration,
    pub dvc_fps: f64,
    /// Inertial velocity at cutoff
    pub vi_fps: f64,
    /// Attitude for separation
    pub sep_att_deg: Vector3<f64>,
    /// Attitude for LM extraction
    pub ext_att_deg: Vector3<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapUpdatePad {
    pub kind: MapKind,
    pub rev: u32,
    #[serde(with = "duration_parts")]
    pub los: Duration,
    #[serde(with = "duration_parts")]
    pub pm: Duration,
    #[serde(with = "duration_parts")]
    pub aos: Duration,
    #[serde(with = "duration_parts")]
    pub sunrise: Duration,
    #[serde(with = "duration_parts")]
    pub sunset: Duration,
    /// Acquisition after the maneuver of this revolution, zero if there is none
    #[serde(with = "duration_parts")]
    pub aos2: Duration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkEntry {
    pub id: String,
    #[serde(with = "duration_parts")]
    pub t1: Duration,
    #[serde(with = "duration_parts")]
    pub t2: Duration,
    pub cross_range_nm: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_nm: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPad {
    pub entries: Vec<LandmarkEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryPad {
    pub area: String,
    pub att_deg: Vector3<f64>,
    pub entry: EntryData,
    pub max_g: f64,
    pub remarks: String,
}

/// Digital autopilot configuration data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DapPad {
    pub csm_weight_lbs: f64,
    pub lm_weight_lbs: f64,
    pub pitch_trim_deg: f64,
    pub yaw_trim_deg: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TorquingPad {
    pub angles_deg: Vector3<f64>,
}

/// Coelliptic sequence initiation PAD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsiPad {
    #[serde(with = "duration_parts")]
    pub t_csi: Duration,
    #[serde(with = "duration_parts")]
    pub t_tpi: Duration,
    pub dv_lvlh_fps: Vector3<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenericPad {
    pub purpose: String,
    pub text: String,
}

/// A filled crew procedure card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Pad {
    Maneuver(ManeuverPad),
    LmManeuver(ManeuverPad),
    BlockData(BlockDataPad),
    Tli(TliPad),
    MapUpdate(MapUpdatePad),
    Landmark(LandmarkPad),
    Entry(EntryPad),
    Dap(DapPad),
    Torquing(TorquingPad),
    Csi(CsiPad),
    Generic(GenericPad),
}

impl Pad {
    pub fn kind(&self) -> PadKind {
        match self {
            Self::Maneuver(_) => PadKind::Maneuver,
            Self::LmManeuver(_) => PadKind::LmManeuver,
            Self::BlockData(_) => PadKind::BlockData,
            Self::Tli(_) => PadKind::Tli,
            Self::MapUpdate(_) => PadKind::MapUpdate,
            Self::Landmark(_) => PadKind::Landmark,
            Self::Entry(_) => PadKind::Entry,
            Self::Dap(_) => PadKind::Dap,
            Self::Torquing(_) => PadKind::Torquing,
            Self::Csi(_) => PadKind::Csi,
            Self::Generic(_) => PadKind::Generic,
        }
    }

    /// Returns the maneuver PAD, CSM or LM, if this is one
    pub fn maneuver(&self) -> Option<&ManeuverPad> {
        match self {
            Self::Maneuver(pad) | Self::LmManeuver(pad) => Some(pad),
            _ => None,
        }
    }

    pub fn generic(purpose: &str, text: String) -> Self {
        Self::Generic(GenericPad {
            purpose: purpose.to_string(),
            text,
        })
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Maneuver(pad) | Self::LmManeuver(pad) => write!(
                f,
                "{} {} TIG {} dV ({:+.1}, {:+.1}, {:+.1}) ft/s att ({:03.0}, {:03.0}, {:03.0}) {}",
                pad.purpose,
                pad.thruster,
                format_get_cs(pad.tig),
                pad.dv_lvlh_fps.x,
                pad.dv_lvlh_fps.y,
                pad.dv_lvlh_fps.z,
                pad.att_deg.x,
                pad.att_deg.y,
                pad.att_deg.z,
                pad.remarks
            ),
            Self::BlockData(pad) => {
                write!(f, "P37 block data:")?;
                for entry in &pad.entries {
                    write!(
                        f,
                        " [{} {:.0} ft/s {:+.0}]",
                        format_get(entry.tig),
                        entry.dv_fps,
                        entry.longitude_deg
                    )?;
                }
                Ok(())
            }
            Self::Tli(pad) => write!(
                f,
                "TLI TB6 {} BT {} VI {:.0} ft/s",
                format_get(pad.tb6p),
                pad.burn_time,
                pad.vi_fps
            ),
            Self::MapUpdate(pad) => write!(
                f,
                "Map update rev {} LOS {} PM {} AOS {}",
                pad.rev,
                format_get(pad.los),
                format_get(pad.pm),
                format_get(pad.aos)
            ),
            Self::Landmark(pad) => {
                write!(f, "Landmark tracking:")?;
                for entry in &pad.entries {
                    write!(f, " [{} T1 {}]", entry.id, format_get(entry.t1))?;
                }
                Ok(())
            }
            Self::Entry(pad) => write!(
                f,
                "Entry {} lat {:+.2} lng {:+.2} 400K {} {}",
                pad.area,
                pad.entry.latitude_deg,
                pad.entry.longitude_deg,
                format_get(pad.entry.ei_get),
                pad.remarks
            ),
            Self::Dap(pad) => write!(
                f,
                "DAP CSM {:.0} lbs LM {:.0} lbs trims {:+.2}/{:+.2}",
                pad.csm_weight_lbs, pad.lm_weight_lbs, pad.pitch_trim_deg, pad.yaw_trim_deg
            ),
            Self::Torquing(pad) => write!(
                f,
                "Torquing angles X {:+.3} Y {:+.3} Z {:+.3}",
                pad.angles_deg.x, pad.angles_deg.y, pad.angles_deg.z
            ),
            Self::Csi(pad) => write!(
                f,
                "CSI {} TPI {}",
                format_get(pad.t_csi),
                format_get(pad.t_tpi)
            ),
            Self::Generic(pad) => write!(f, "{}: {}", pad.purpose, pad.text),
        }
    }
}
