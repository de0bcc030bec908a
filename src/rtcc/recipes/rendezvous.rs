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

//! Rendezvous: insertion and its CSM backup, CSI, and the APS depletion burn of the jettisoned ascent stage.

use super::Workspace;
use crate::engine::{ConcentricOpts, LambertOpts, Thruster};
use crate::linalg::Vector3;
use crate::rtcc::{Calculation, CsiPad, EngineSnafu, Pad, RtccError, Uplink, UplinkSegment};
use crate::time::Unit;
use crate::utils::{format_get, fps_to_m_s, hhmmss, kg_to_lbs, vec_fps, NM2M};
use crate::vehicle::{Computer, Vehicle};
use snafu::ResultExt;

/// Preliminary (75) and final (76) CSM backup insertion, three minutes after the planned LM insertion.
pub(crate) fn backup_insertion(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv_csm = ws.csm_sv();
    let sv_lm = ws.lm_sv();
    let t1 = ws.params.insertion + 3 * Unit::Minute;

    let opts = LambertOpts::builder()
        .chaser(sv_csm)
        .target(sv_lm)
        .t1(t1)
        .t2(ws.params.csi)
        .offset_m(Vector3::new(110.0 * NM2M, 0.0, -14.7 * NM2M))
        .build();
    let dv = ws.engine.lambert(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv_csm, t1, &dv, Thruster::Sps)?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        "Backup Insertion",
        &sv_csm,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Sps,
        &refsmmat,
        false,
    )?;

    let coe = ConcentricOpts::builder()
        .chaser(burn.sv_post)
        .target(sv_lm)
        .t_csi(ws.params.csi)
        .delta_h_m(-15.0 * NM2M)
        .elevation_deg(208.3)
        .build();
    let sol = ws.engine.concentric_rendezvous(&coe).context(EngineSnafu)?;
    pad.remarks = format!(
        "CSI: {}, TPI: {}, N equals 1",
        format_get(ws.params.csi),
        format_get(sol.t_tpi)
    );

    let calc = Calculation::pad(Pad::Maneuver(pad));
    if code == 76 {
        let uplink = Uplink::new(Computer::Cmc, "CSM state vector").with(ws.sv_segment(Vehicle::Csm));
        Ok(calc.with_uplink(uplink))
    } else {
        Ok(calc)
    }
}

/// Preliminary (77) and final (78) LM insertion, computed on the ascent stage alone.
pub(crate) fn insertion(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv_csm = ws.csm_sv();
    let sv_lm = ws.lm_sv().with_mass(ws.vehicle.masses().lm_ascent_kg);

    let opts = LambertOpts::builder()
        .chaser(sv_lm)
        .target(sv_csm)
        .t1(ws.params.insertion)
        .t2(ws.params.csi)
        .offset_m(Vector3::new(-147.0 * NM2M, 0.0, 14.7 * NM2M))
        .build();
    let dv = ws.engine.lambert(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv_lm, ws.params.insertion, &dv, Thruster::Aps)?;

    let refsmmat = ws.refsmmat(Computer::Lgc);
    let mut pad = ws.maneuver_pad(
        "Insertion",
        &sv_lm,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Aps,
        &refsmmat,
        false,
    )?;

    if code == 78 {
        pad.remarks = format!("LM ascent stage weight is {:.0}", pad.weight_lbs);
        let uplink = Uplink::new(Computer::Cmc, "CSM state vector").with(ws.sv_segment(Vehicle::Csm));
        Ok(Calculation::pad(Pad::LmManeuver(pad)).with_uplink(uplink))
    } else {
        Ok(Calculation::pad(Pad::LmManeuver(pad)))
    }
}

/// CSI PAD from the concentric rendezvous solution.
pub(crate) fn csi(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let opts = ConcentricOpts::builder()
        .chaser(ws.lm_sv())
        .target(ws.csm_sv())
        .t_csi(ws.params.csi)
        .delta_h_m(15.0 * NM2M)
        .elevation_deg(26.6)
        .t_tpi_guess(ws.params.tpi)
        .build();
    let sol = ws.engine.concentric_rendezvous(&opts).context(EngineSnafu)?;
    info!(
        "CSI at {} ({:.1} ft/s), TPI at {}",
        format_get(sol.t_csi),
        vec_fps(&sol.dv_lvlh_m_s).norm(),
        format_get(sol.t_tpi)
    );

    Ok(Calculation::pad(Pad::Csi(CsiPad {
        t_csi: sol.t_csi,
        t_tpi: sol.t_tpi,
        dv_lvlh_fps: vec_fps(&sol.dv_lvlh_m_s),
    })))
}

pub(crate) fn lm_weight(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    Ok(Calculation::pad(Pad::generic(
        "LM Weight",
        format!("LM weight is {:.0}", kg_to_lbs(ws.vehicle.masses().lm_kg)),
    )))
}

/// APS burn to depletion of the unmanned ascent stage, over the zero meridian.
pub(crate) fn aps_depletion(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.lm_sv();
    let guess = hhmmss(108, 0, 0.0);
    let sv1 = ws.engine.coast(&sv, guess).context(EngineSnafu)?;
    let tig = ws
        .engine
        .time_of_longitude(&sv1, 0.0, guess)
        .context(EngineSnafu)?;

    let dv = Vector3::new(fps_to_m_s(4600.0), 0.0, 0.0);
    let refsmmat = ws.refsmmat(Computer::Lgc);
    let mut pad = ws.maneuver_pad("APS Depletion", &sv, tig, dv, Thruster::Aps, &refsmmat, false)?;

    let csm_att = ws
        .engine
        .docked_alignment(
            &ws.vehicle.imu_gimbal_angles_deg(Vehicle::Csm),
            &pad.att_deg,
            &ws.refsmmat(Computer::Cmc),
        )
        .context(EngineSnafu)?;
    pad.remarks = format!(
        "CSM IMU angles. Roll {:.0}, pitch {:.0}, yaw {:.0}",
        csm_att.x, csm_att.y, csm_att.z
    );

    let uplink = Uplink::new(Computer::Lgc, "LM state vector").with(UplinkSegment::StateVector {
        slot: Vehicle::Lm,
        sv,
    });
    Ok(Calculation::pad(Pad::LmManeuver(pad)).with_uplink(uplink))
}
