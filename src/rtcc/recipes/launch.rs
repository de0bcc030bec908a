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

//! Earth orbit and TLI day: mission initialization, TLI planning and the TLI day PADs.

use super::{round_to, Workspace};
use crate::engine::{BlockDataTarget, EntryTargetingOpts, RefsmmatKind, Thruster};
use crate::linalg::Vector3;
use crate::rtcc::{
    BlockDataEntry, BlockDataPad, Calculation, ConfigChange, EngineSnafu, Pad, PlannedManeuver,
    RtccError, TliPad, Uplink, UplinkSegment,
};
use crate::time::{Duration, Unit};
use crate::utils::{fps_to_m_s, hhmmss, imu_limit, m_s_to_fps, vec_fps};
use crate::vehicle::{Computer, Vehicle};
use snafu::ResultExt;

/// Time from the start of timebase 6 to TLI ignition
const TB6_TO_IGNITION: f64 = 9.0 * 60.0 + 38.0;
/// Launch vehicle timebase once TLI has been inhibited
const TB_TLI_INHIBITED: u8 = 5;

/// Stores the launch azimuth and the CSM platform alignment at liftoff.
pub(crate) fn mission_init(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    ws.params.launch_azimuth_deg = ws.vehicle.launch_azimuth_deg();
    let refsmmat = match ws.vehicle.onboard_refsmmat(Computer::Cmc) {
        Some(matrix) => matrix,
        None => ws
            .engine
            .refsmmat(&ws.csm_sv(), &RefsmmatKind::Liftoff)
            .context(EngineSnafu)?,
    };
    ws.params.stored_refsmmat_csm = Some(refsmmat);
    info!(
        "mission initialized, launch azimuth {:.3} deg",
        ws.params.launch_azimuth_deg
    );
    Ok(Calculation::nothing())
}

/// Plans TLI and the CSM separation in the maneuver plan table. A re-plan overwrites the
/// previous TLI and SEP in place and drops whatever was planned after them.
pub(crate) fn tli_simulation(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let opportunity = if ws.get() > 3 * Unit::Hour { 2 } else { 1 };
    let sv = ws.csm_sv();
    let tli = ws.engine.tli_plan(&sv, opportunity).context(EngineSnafu)?;
    let cutoff = tli.tig + tli.burn_time;

    let sep_tig = cutoff + 15 * Unit::Minute;
    let sep_dv = Vector3::new(fps_to_m_s(1.0), 0.0, 0.0);
    let sv_sep = ws.engine.coast(&tli.sv_post, sep_tig).context(EngineSnafu)?;
    let sv_post_sep = ws
        .engine
        .execute_maneuver(&sv_sep, sep_tig, &sep_dv, Thruster::RcsPlus4)
        .context(EngineSnafu)?;

    let plan = [
        PlannedManeuver {
            name: "TLI".to_string(),
            thruster: Thruster::Sivb,
            tig: tli.tig,
            dv_lvlh_m_s: tli.dv_lvlh_m_s,
            attitude_deg: None,
            config_change: ConfigChange::None,
            sv_before: sv,
            sv_after: tli.sv_post,
        },
        PlannedManeuver {
            name: "SEP".to_string(),
            thruster: Thruster::RcsPlus4,
            tig: sep_tig,
            dv_lvlh_m_s: sep_dv,
            attitude_deg: Some(Vector3::new(41.6, 120.8, 131.9)),
            config_change: ConfigChange::Undocking,
            sv_before: sv_sep,
            sv_after: sv_post_sep,
        },
    ];

    ws.mpt.delete_from(Vehicle::Csm, plan.len());
    for (index, maneuver) in plan.into_iter().enumerate() {
        if ws.mpt.get(Vehicle::Csm, index).is_some() {
            ws.mpt.replace(Vehicle::Csm, index, maneuver)?;
        } else {
            ws.mpt.append(Vehicle::Csm, maneuver);
        }
    }

    ws.params.tli_opportunity = opportunity;
    ws.params.time_of_ignition = tli.tig;
    ws.params.tli = cutoff;
    Ok(Calculation::nothing())
}

/// TLI+90 minutes abort PAD, plus a state vector for the onboard TLI monitoring.
pub(crate) fn tli_abort_pad(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let tig = round_to(ws.params.time_of_ignition, 30 * Unit::Minute) + 90 * Unit::Minute;
    let sv0 = match ws.mpt.get(Vehicle::Csm, 0) {
        Some(tli) => tli.sv_after,
        None => ws.csm_sv(),
    };

    let opts = EntryTargetingOpts::builder()
        .sv(sv0)
        .tig_guess(tig)
        .entry_longitude_deg(ws.config.tli_abort_longitude_deg)
        .thruster(Thruster::Sps)
        .build();
    let sol = ws.engine.entry_targeting(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv0, sol.tig, &sol.dv_inertial_m_s, Thruster::Sps)?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        "TLI+90",
        &sv0,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Sps,
        &refsmmat,
        true,
    )?;
    pad.remarks = "No ullage".to_string();
    pad.entry = Some(sol.entry);

    let sv_uplink = ws
        .engine
        .coast(&ws.csm_sv(), ws.params.time_of_ignition - 10 * Unit::Minute)
        .context(EngineSnafu)?;
    let uplink = Uplink::new(Computer::Cmc, "CSM state vector and V66")
        .with(UplinkSegment::StateVector {
            slot: Vehicle::Csm,
            sv: sv_uplink,
        })
        .with(UplinkSegment::V66);

    Ok(Calculation::pad(Pad::Maneuver(pad)).with_uplink(uplink))
}

fn block_data(ws: &Workspace<'_>, targets: &[BlockDataTarget]) -> Result<Calculation, RtccError> {
    let solutions = ws
        .engine
        .block_data(&ws.csm_sv(), targets)
        .context(EngineSnafu)?;

    let entries = solutions
        .iter()
        .zip(targets)
        .map(|(sol, target)| BlockDataEntry {
            tig: sol.tig,
            dv_fps: m_s_to_fps(sol.dv_m_s),
            latitude_deg: sol.latitude_deg,
            longitude_deg: target.longitude_deg,
            get400k: sol.get400k,
        })
        .collect();

    Ok(Calculation::pad(Pad::BlockData(BlockDataPad { entries })))
}

/// TLI+4 hours P37 PAD
pub(crate) fn tli_p37(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let target = BlockDataTarget {
        tig: hhmmss(6, 30, 0.0),
        t_z: hhmmss(22, 21, 0.0),
        longitude_deg: ws.config.entry_longitude_deg,
    };
    block_data(ws, &[target])
}

/// P37 block data 1 and 2, anchored to TLI.
pub(crate) fn p37_block_data(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let tli_base = round_to(ws.params.tli, 30 * Unit::Minute);
    let offsets: &[(i64, Duration)] = if code == 8 {
        &[
            (11, hhmmss(46, 37, 0.0)),
            (25, hhmmss(70, 28, 0.0)),
            (35, hhmmss(94, 35, 0.0)),
        ]
    } else {
        &[
            (25, hhmmss(70, 28, 0.0)),
            (35, hhmmss(94, 35, 0.0)),
            (44, hhmmss(94, 14, 0.0)),
            (53, hhmmss(118, 33, 0.0)),
        ]
    };

    let targets: Vec<BlockDataTarget> = offsets
        .iter()
        .map(|(hours, t_z)| BlockDataTarget {
            tig: tli_base + *hours * Unit::Hour,
            t_z: *t_z,
            longitude_deg: ws.config.entry_longitude_deg,
        })
        .collect();
    block_data(ws, &targets)
}

/// TLI PAD from the planned TLI and separation maneuvers. Clears the plan table once read.
pub(crate) fn tli_pad(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let len = ws.mpt.len(Vehicle::Csm);
    let tli = ws
        .mpt
        .get(Vehicle::Csm, 0)
        .cloned()
        .ok_or(RtccError::ManeuverIndex { index: 0, len })?;
    let sep_att = ws
        .mpt
        .get(Vehicle::Csm, 1)
        .and_then(|sep| sep.attitude_deg)
        .ok_or(RtccError::ManeuverIndex { index: 1, len })?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let data = ws.maneuver_pad(
        "TLI",
        &tli.sv_before,
        tli.tig,
        tli.dv_lvlh_m_s,
        Thruster::Sivb,
        &refsmmat,
        true,
    )?;

    let pad = TliPad {
        tb6p: tli.tig - TB6_TO_IGNITION * Unit::Second,
        ign_att_deg: data.att_deg,
        burn_time: data.burn_time,
        dvc_fps: data.dvc_fps,
        vi_fps: m_s_to_fps(tli.sv_after.vmag_m_s()),
        sep_att_deg: sep_att,
        ext_att_deg: imu_limit(Vector3::new(
            300.0 - sep_att.x,
            sep_att.y + 180.0,
            360.0 - sep_att.z,
        )),
    };

    ws.mpt.clear(Vehicle::Csm);
    Ok(Calculation::pad(Pad::Tli(pad)))
}

/// Scrubs TLI if the launch vehicle inhibited it.
pub(crate) fn tli_evaluation(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    if ws.vehicle.launch_vehicle_timebase() == TB_TLI_INHIBITED {
        Ok(Calculation::scrub("TLI", None))
    } else {
        Ok(Calculation::nothing())
    }
}

/// Evasive maneuver PAD, two hours after TLI.
pub(crate) fn evasive(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let tig = ws.params.tli + 2 * Unit::Hour;
    let dv = Vector3::new(fps_to_m_s(5.1), 0.0, fps_to_m_s(19.0));
    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad("Evasive", &ws.csm_sv(), tig, dv, Thruster::Sps, &refsmmat, true)?;
    pad.remarks = "No ullage".to_string();
    debug!("evasive maneuver dV {:.1} ft/s", vec_fps(&dv).norm());
    Ok(Calculation::pad(Pad::Maneuver(pad)))
}

/// Passive thermal control REFSMMAT, loaded as the desired REFSMMAT.
pub(crate) fn ptc_refsmmat(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let matrix = ws
        .engine
        .refsmmat(
            &ws.csm_sv(),
            &RefsmmatKind::Ptc {
                get: hhmmss(133, 19, 4.0),
            },
        )
        .context(EngineSnafu)?;
    Ok(Calculation::uplink(
        Uplink::new(Computer::Cmc, "PTC REFSMMAT").with(UplinkSegment::Refsmmat {
            matrix,
            desired: true,
        }),
    ))
}
