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

//! LM activation and descent: landing site REFSMMAT, DAP data, DOI, phasing and the PDI abort.

use super::{floor_to, Workspace};
use crate::cosmic::StateVector;
use crate::engine::{
    DescentPlan, DescentPlanOpts, DockingInitiationOpts, LambertOpts, RefsmmatKind, Thruster,
};
use crate::linalg::{Matrix3, Vector3};
use crate::rtcc::{
    AstroSnafu, Calculation, DapPad, EngineSnafu, Pad, RtccError, TorquingPad, Uplink,
    UplinkSegment,
};
use crate::time::{Duration, Unit};
use crate::utils::{
    format_get, format_get_cs, format_mmss, fps_to_m_s, hhmmss, kg_to_lbs, FT2M, NM2M,
};
use crate::vehicle::{Computer, DockingPort, Vehicle};
use snafu::ResultExt;

/// Nominal AGS K-factor
const NOMINAL_K_FACTOR_H: i64 = 90;

fn descent_plan(ws: &Workspace<'_>, sv: &StateVector) -> Result<DescentPlan, RtccError> {
    let opts = DescentPlanOpts::builder()
        .sv(*sv)
        .site(ws.config.landing_site)
        .threshold_get(hhmmss(99, 0, 0.0))
        .build();
    let plan = ws.engine.descent_plan(&opts).context(EngineSnafu)?;
    debug!(
        "descent plan: DOI {} PDI {} touchdown {}",
        format_get(plan.doi_tig),
        format_get(plan.pdi_get),
        format_get(plan.touchdown_get)
    );
    Ok(plan)
}

fn landing_site_refsmmat(
    ws: &Workspace<'_>,
    touchdown: Duration,
) -> Result<Matrix3<f64>, RtccError> {
    ws.engine
        .refsmmat(
            &ws.csm_sv(),
            &RefsmmatKind::LandingSite {
                get: touchdown,
                site: ws.config.landing_site,
            },
        )
        .context(EngineSnafu)
}

/// LM state right after DOI, as last computed
fn after_doi(ws: &Workspace<'_>) -> Result<StateVector, RtccError> {
    ws.engine
        .execute_maneuver(
            &ws.lm_sv(),
            ws.params.time_of_ignition,
            &ws.params.delta_v_lvlh_m_s,
            Thruster::Dps,
        )
        .context(EngineSnafu)
}

/// State vector and desired landing site REFSMMAT.
pub(crate) fn lls_refsmmat(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let plan = descent_plan(ws, &sv)?;
    ws.params.doi = plan.doi_tig;
    ws.params.touchdown = plan.touchdown_get;

    let matrix = landing_site_refsmmat(ws, plan.touchdown_get)?;
    let uplink = ws
        .csm_sv_v66("CSM state vector and V66, LLS2 REFSMMAT")
        .with(UplinkSegment::Refsmmat {
            matrix,
            desired: true,
        });
    Ok(Calculation::uplink(uplink))
}

/// CSM (61) and LM (62) digital autopilot data.
pub(crate) fn dap_data(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let masses = ws.vehicle.masses();
    let docked = code == 62 || ws.vehicle.docked(DockingPort::CsmForward);
    let (pitch, yaw) = ws
        .engine
        .gimbal_trims(&masses, docked)
        .context(EngineSnafu)?;

    Ok(Calculation::pad(Pad::Dap(DapPad {
        csm_weight_lbs: kg_to_lbs(masses.csm_kg),
        lm_weight_lbs: kg_to_lbs(masses.lm_kg),
        pitch_trim_deg: pitch,
        yaw_trim_deg: yaw,
    })))
}

/// Gyro torquing angles to align the LM platform on the CSM platform while docked.
pub(crate) fn gyro_torquing(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let angles_deg = ws
        .engine
        .docked_alignment(
            &ws.vehicle.imu_gimbal_angles_deg(Vehicle::Csm),
            &ws.vehicle.imu_gimbal_angles_deg(Vehicle::Lm),
            &ws.refsmmat(Computer::Cmc),
        )
        .context(EngineSnafu)?;
    Ok(Calculation::pad(Pad::Torquing(TorquingPad { angles_deg })))
}

/// LGC activation: clock increment, both state vectors and the landing site REFSMMAT.
pub(crate) fn lgc_activation(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let delta = ws.get() - ws.vehicle.computer_clock(Computer::Lgc);
    let touchdown = if ws.params.touchdown == Duration::ZERO {
        ws.config.nominal_landing
    } else {
        ws.params.touchdown
    };
    let matrix = landing_site_refsmmat(ws, touchdown)?;

    // The LM is still docked: the CSM state vector goes in both slots
    let sv = ws.csm_sv();
    let uplink = Uplink::new(Computer::Lgc, "Clock update, state vectors, LS REFSMMAT")
        .with(UplinkSegment::ClockIncrement { delta })
        .with(UplinkSegment::StateVector {
            slot: Vehicle::Csm,
            sv,
        })
        .with(UplinkSegment::StateVector {
            slot: Vehicle::Lm,
            sv,
        })
        .with(UplinkSegment::Refsmmat {
            matrix,
            desired: false,
        });
    Ok(Calculation::uplink(uplink))
}

/// AGS activation: the K-factor, defaulted to 90 hours if the AGS clock is not plausible.
pub(crate) fn ags_activation(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let nominal = NOMINAL_K_FACTOR_H * Unit::Hour;
    let k_factor = match ws.vehicle.ags_k_factor() {
        Some(k) if (k - nominal).abs() <= 2 * Unit::Minute => k,
        Some(k) => {
            warn!("AGS K-factor {} rejected, using {}", format_get(k), format_get(nominal));
            nominal
        }
        None => nominal,
    };
    Ok(Calculation::pad(Pad::generic(
        "AGS Activation",
        format!("K-Factor: {} GET", format_get_cs(k_factor)),
    )))
}

/// CSM separation, half a revolution before DOI, with the undocking time.
pub(crate) fn separation(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let period = sv.period().context(AstroSnafu)?;
    let sep = floor_to(ws.params.doi - period * 0.5, Unit::Second * 1);
    let undock = floor_to(sep - 25 * Unit::Minute, Unit::Minute * 1);

    let dv = Vector3::new(0.0, 0.0, fps_to_m_s(-2.5));
    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad("Separation", &sv, sep, dv, Thruster::RcsPlus4, &refsmmat, true)?;
    pad.remarks = format!("Undocking at {} GET", format_get(undock));
    ws.params.sep = sep;

    let uplink = Uplink::new(Computer::Cmc, "State vectors")
        .with(UplinkSegment::StateVector {
            slot: Vehicle::Csm,
            sv,
        })
        .with(UplinkSegment::StateVector {
            slot: Vehicle::Lm,
            sv,
        });
    Ok(Calculation::pad(Pad::Maneuver(pad)).with_uplink(uplink))
}

/// DOI, with the rendezvous plan of the phasing, insertion, CSI and TPI times.
pub(crate) fn doi(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.lm_sv();
    let plan = descent_plan(ws, &sv)?;
    ws.params.doi = plan.doi_tig;
    ws.params.pdi = plan.pdi_get;
    ws.params.touchdown = plan.touchdown_get;

    let refsmmat = ws.refsmmat(Computer::Lgc);
    let mut pad = ws.maneuver_pad(
        "DOI",
        &sv,
        plan.doi_tig,
        plan.dv_lvlh_m_s,
        Thruster::Dps,
        &refsmmat,
        true,
    )?;
    ws.params.store_maneuver(plan.doi_tig, plan.dv_lvlh_m_s);

    let sv_doi = after_doi(ws)?;
    let phasing = ws
        .engine
        .time_of_longitude(&sv_doi, -12.5, plan.pdi_get)
        .context(EngineSnafu)?;
    let tpi = ws
        .engine
        .orbital_midnight(&ws.csm_sv(), hhmmss(105, 9, 0.0))
        .context(EngineSnafu)?;
    let rendezvous = ws
        .engine
        .rendezvous_plan(&ws.csm_sv(), &sv_doi, phasing)
        .context(EngineSnafu)?;
    ws.params.phasing = phasing;
    ws.params.tpi = tpi;
    ws.params.insertion = rendezvous.insertion;
    ws.params.csi = rendezvous.csi;
    pad.remarks = format!(
        "CSI time: {}, TPI time: {}, N equal to 1",
        format_get(rendezvous.csi),
        format_get(tpi)
    );

    let uplink = Uplink::new(Computer::Lgc, "LM state vector, DOI target load")
        .with(UplinkSegment::StateVector {
            slot: Vehicle::Lm,
            sv,
        })
        .with(UplinkSegment::ExternalDeltaV {
            tig: plan.doi_tig,
            dv_lvlh_m_s: plan.dv_lvlh_m_s,
        })
        .with(UplinkSegment::LandingTime {
            get: plan.touchdown_get,
        });
    Ok(Calculation::pad(Pad::LmManeuver(pad)).with_uplink(uplink))
}

/// Preliminary (72, before DOI) and final (73) phasing maneuver.
pub(crate) fn phasing(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let preliminary = code == 72;
    let sv_lm = if preliminary { after_doi(ws)? } else { ws.lm_sv() };

    let opts = LambertOpts::builder()
        .chaser(sv_lm)
        .target(ws.csm_sv())
        .t1(ws.params.phasing)
        .t2(ws.params.insertion)
        .offset_m(Vector3::new(-270.0 * NM2M, 0.0, 60.0 * NM2M - 60_000.0 * FT2M))
        .build();
    let dv = ws.engine.lambert(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv_lm, ws.params.phasing, &dv, Thruster::Dps)?;

    let refsmmat = ws.refsmmat(Computer::Lgc);
    let mut pad = ws.maneuver_pad(
        "Phasing",
        &sv_lm,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Dps,
        &refsmmat,
        false,
    )?;

    if preliminary {
        let guess = burn.tig - Unit::Hour;
        let t_100e = ws
            .engine
            .time_of_longitude(&sv_lm, 100.0, guess)
            .context(EngineSnafu)?;
        let t_site = ws
            .engine
            .time_of_longitude(&sv_lm, ws.config.landing_site.longitude_deg, guess)
            .context(EngineSnafu)?;
        pad.remarks = format!(
            "100-degree east time is {}. Site 2 time is {}",
            format_mmss(burn.tig - t_100e),
            format_mmss(burn.tig - t_site)
        );
    }
    Ok(Calculation::pad(Pad::LmManeuver(pad)))
}

/// PDI abort: a docking initiation from the post-DOI orbit at pericynthion.
pub(crate) fn pdi_abort(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv_doi = after_doi(ws)?;
    let t_abort = sv_doi.get + sv_doi.time_to_periapsis().context(AstroSnafu)?;
    let tpi = ws
        .engine
        .orbital_midnight(&ws.csm_sv(), hhmmss(103, 9, 0.0))
        .context(EngineSnafu)?;

    let opts = DockingInitiationOpts::builder()
        .chaser(sv_doi)
        .target(ws.csm_sv())
        .t_abort(t_abort)
        .tpi_guess(tpi)
        .delta_h_m(15.0 * NM2M)
        .elevation_deg(26.6)
        .build();
    let dki = ws.engine.docking_initiation(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv_doi, dki.tig, &dki.dv_inertial_m_s, Thruster::Dps)?;

    let refsmmat = ws.refsmmat(Computer::Lgc);
    let mut pad = ws.maneuver_pad(
        "PDI Abort",
        &sv_doi,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Dps,
        &refsmmat,
        false,
    )?;
    pad.remarks = format!(
        "15 seconds at 10 percent, then full thrust. CSI time: {}, TPI time: {}, N equal to 1",
        format_get(dki.t_csi),
        format_get(tpi)
    );
    Ok(Calculation::pad(Pad::LmManeuver(pad)))
}
