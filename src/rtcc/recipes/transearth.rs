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

//! Transearth coast: MCC-5, MCC-6 and MCC-7, the entry PADs, and the abort return corrections.

use super::{exceeds, sps_or_rcs, Workspace};
use crate::engine::{EntryData, EntrySolution, EntryTargetingOpts, RefsmmatKind, Thruster};
use crate::linalg::Vector3;
use crate::rtcc::{Calculation, EngineSnafu, EntryPad, Pad, RtccError, UplinkSegment};
use crate::time::{Duration, Unit};
use crate::utils::{between_pm_180, format_get};
use crate::vehicle::Computer;
use snafu::ResultExt;

fn retrofire(entry: &EntryData, tig: Duration, dv_lvlh_m_s: Vector3<f64>) -> UplinkSegment {
    UplinkSegment::RetrofireDeltaV {
        latitude_deg: entry.latitude_deg,
        longitude_deg: entry.longitude_deg,
        tig,
        dv_lvlh_m_s,
    }
}

/// Corridor control, with longitude control when far enough from entry and off the target by more than 2 degrees.
fn corridor_control(ws: &Workspace<'_>, tig: Duration) -> Result<EntrySolution, RtccError> {
    let target = ws.config.entry_longitude_deg;
    let opts = EntryTargetingOpts::builder()
        .sv(ws.csm_sv())
        .tig_guess(tig)
        .entry_longitude_deg(target)
        .build();
    let sol = ws.engine.entry_targeting(&opts).context(EngineSnafu)?;

    let miss_deg = between_pm_180(sol.entry.longitude_deg - target);
    if tig < ws.params.ei - 24 * Unit::Hour && miss_deg.abs() > 2.0 {
        debug!("splash longitude off by {miss_deg:.2} deg, longitude control");
        let opts = EntryTargetingOpts::builder()
            .sv(ws.csm_sv())
            .tig_guess(tig)
            .entry_longitude_deg(target)
            .longitude_control(true)
            .return_get(ws.params.ei)
            .build();
        ws.engine.entry_targeting(&opts).context(EngineSnafu)
    } else {
        Ok(sol)
    }
}

/// MCC-5 (90), preliminary and final MCC-6 (91, 92), MCC-7 decision (93) and MCC-7 (94).
pub(crate) fn transearth_midcourse(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    if ws.params.tei == Duration::ZERO {
        ws.params.tei = ws.config.nominal_tei;
    }
    if ws.params.ei == Duration::ZERO {
        ws.params.ei = ws.config.nominal_ei;
    }

    let (name, mcc_time) = match code {
        90 => ("MCC-5", ws.params.tei + 15 * Unit::Hour),
        91 | 92 => ("MCC-6", ws.params.ei - 15 * Unit::Hour),
        _ => ("MCC-7", ws.params.ei - 3 * Unit::Hour),
    };

    let sv = ws.csm_sv();
    let sol = corridor_control(ws, mcc_time)?;
    let thruster = sps_or_rcs(sv.mass_kg, sol.dv_inertial_m_s.norm());
    let burn = ws.burn(&sv, sol.tig, &sol.dv_inertial_m_s, thruster)?;

    let threshold_fps = if mcc_time > ws.params.ei - 50 * Unit::Hour {
        1.0
    } else {
        2.0
    };
    let scrubbed = !exceeds(&burn.dv_lvlh_m_s, threshold_fps);

    let refsmmat = if code == 94 {
        ws.engine
            .refsmmat(
                &sol.sv_post,
                &RefsmmatKind::Entry {
                    ei_get: sol.entry.ei_get,
                },
            )
            .context(EngineSnafu)?
    } else {
        ws.refsmmat(Computer::Cmc)
    };

    let calc = if scrubbed {
        let entry = ws.engine.entry_prediction(&sv).context(EngineSnafu)?;
        ws.params.ei = entry.ei_get;
        ws.params.splash_latitude_deg = entry.latitude_deg;
        ws.params.splash_longitude_deg = entry.longitude_deg;
        ws.params.store_maneuver(mcc_time, Vector3::zeros());

        let uplink = match code {
            90..=92 => Some(ws.csm_sv_v66("CSM state vector and V66")),
            94 => Some(
                ws.csm_sv_v66("CSM state vector and V66, entry target, Entry REFSMMAT")
                    .with(UplinkSegment::EntryTarget {
                        latitude_deg: entry.latitude_deg,
                        longitude_deg: entry.longitude_deg,
                    })
                    .with(UplinkSegment::Refsmmat {
                        matrix: refsmmat,
                        desired: true,
                    }),
            ),
            _ => None,
        };
        Calculation::scrub(name, uplink)
    } else {
        ws.params.ei = sol.entry.ei_get;
        ws.params.splash_latitude_deg = sol.entry.latitude_deg;
        ws.params.splash_longitude_deg = sol.entry.longitude_deg;
        ws.params.store_maneuver(burn.tig, burn.dv_lvlh_m_s);

        let mut pad = ws.maneuver_pad(
            name,
            &sv,
            burn.tig,
            burn.dv_lvlh_m_s,
            thruster,
            &refsmmat,
            true,
        )?;
        if thruster == Thruster::Sps {
            pad.remarks = "Two-jet ullage for 14 seconds".to_string();
        }
        pad.entry = Some(sol.entry);

        let calc = Calculation::pad(Pad::Maneuver(pad));
        match code {
            90 | 92 => calc.with_uplink(
                ws.csm_sv_v66("CSM state vector and V66, target load")
                    .with(retrofire(&sol.entry, burn.tig, burn.dv_lvlh_m_s)),
            ),
            91 => calc.with_uplink(ws.csm_sv_v66("CSM state vector and V66")),
            93 => calc.with_message(format!("{name} will be executed")),
            _ => calc.with_uplink(
                ws.csm_sv_v66("CSM state vector and V66, target load, Entry REFSMMAT")
                    .with(retrofire(&sol.entry, burn.tig, burn.dv_lvlh_m_s))
                    .with(UplinkSegment::Refsmmat {
                        matrix: refsmmat,
                        desired: true,
                    }),
            ),
        }
    };

    ws.params.tig_store1 = ws.params.time_of_ignition;
    ws.params.sv_store1 = Some(sol.sv_post);
    info!(
        "{name} {} at {}, EI {}",
        if scrubbed { "scrubbed" } else { "planned" },
        format_get(mcc_time),
        format_get(ws.params.ei)
    );
    Ok(calc)
}

/// Entry PADs: assuming MCC-6 or MCC-7 (96, 97, 98), and the final lunar entry PAD (99).
pub(crate) fn entry_pad(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let maneuver = ws.params.delta_v_lvlh_m_s.norm() != 0.0 && code != 99;

    let sv = match (maneuver, ws.params.sv_store1) {
        (true, Some(sv_post)) => sv_post,
        _ => ws.csm_sv(),
    };
    let refsmmat = match (code, ws.params.sv_store1) {
        (99, _) | (_, None) => ws.refsmmat(Computer::Cmc),
        (_, Some(sv_post)) => {
            let ei_get = if ws.params.ei == Duration::ZERO {
                ws.config.nominal_ei
            } else {
                ws.params.ei
            };
            ws.engine
                .refsmmat(&sv_post, &RefsmmatKind::Entry { ei_get })
                .context(EngineSnafu)?
        }
    };
    let longitude_deg = if ws.params.splash_longitude_deg == 0.0 {
        ws.config.entry_longitude_deg
    } else {
        ws.params.splash_longitude_deg
    };
    let data = ws
        .engine
        .entry_pad(&sv, &refsmmat, longitude_deg)
        .context(EngineSnafu)?;

    let remarks = match (maneuver, code) {
        (true, 96 | 97) => "Assumes MCC-6",
        (true, 98) | (false, 96 | 97) => "Assumes MCC-7",
        _ => "",
    };
    let pad = Pad::Entry(EntryPad {
        area: ws.config.recovery_area.clone(),
        att_deg: data.att_deg,
        entry: data.entry,
        max_g: data.max_g,
        remarks: remarks.to_string(),
    });

    if code == 99 {
        Ok(Calculation::pad(pad).with_uplink(ws.csm_sv_v66("State vector and V66")))
    } else {
        Ok(Calculation::pad(pad))
    }
}

/// Entry interface prediction of the current trajectory, after an abort.
pub(crate) fn abort_entry_evaluation(
    _code: u16,
    ws: &mut Workspace<'_>,
) -> Result<Calculation, RtccError> {
    let entry = ws
        .engine
        .entry_prediction(&ws.csm_sv())
        .context(EngineSnafu)?;
    ws.params.ei = entry.ei_get;
    ws.params.splash_latitude_deg = entry.latitude_deg;
    ws.params.splash_longitude_deg = entry.longitude_deg;
    info!(
        "predicted EI {} splash {:+.2} {:+.2}",
        format_get(entry.ei_get),
        entry.latitude_deg,
        entry.longitude_deg
    );
    Ok(Calculation::nothing())
}

/// Midcourse correction five hours after an abort TEI.
pub(crate) fn abort_midcourse(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let opts = EntryTargetingOpts::builder()
        .sv(sv)
        .tig_guess(ws.params.tei + 5 * Unit::Hour)
        .entry_longitude_deg(ws.config.entry_longitude_deg)
        .build();
    let sol = ws.engine.entry_targeting(&opts).context(EngineSnafu)?;
    let thruster = sps_or_rcs(sv.mass_kg, sol.dv_inertial_m_s.norm());
    let burn = ws.burn(&sv, sol.tig, &sol.dv_inertial_m_s, thruster)?;

    if !exceeds(&burn.dv_lvlh_m_s, 2.0) {
        return Ok(Calculation::scrub(
            "Abort MCC",
            Some(ws.csm_sv_v66("CSM state vector and V66")),
        ));
    }

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        "Abort MCC",
        &sv,
        burn.tig,
        burn.dv_lvlh_m_s,
        thruster,
        &refsmmat,
        true,
    )?;
    pad.entry = Some(sol.entry);
    ws.params.ei = sol.entry.ei_get;
    ws.params.splash_latitude_deg = sol.entry.latitude_deg;
    ws.params.splash_longitude_deg = sol.entry.longitude_deg;
    ws.params.store_maneuver(burn.tig, burn.dv_lvlh_m_s);

    let uplink = ws
        .csm_sv_v66("CSM state vector and V66, target load")
        .with(retrofire(&sol.entry, burn.tig, burn.dv_lvlh_m_s));
    Ok(Calculation::pad(Pad::Maneuver(pad)).with_uplink(uplink))
}
