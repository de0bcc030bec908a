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

//! Lunar orbit: LOI, TEI updates, map updates and landmark tracking.

use super::{choose_loi, Workspace};
use crate::cosmic::{Body, StateVector};
use crate::engine::{Landmark, LoiOpts, MapKind, ReturnSpeed, ReturnToEarthOpts, Thruster};
use crate::rtcc::{
    AstroSnafu, Calculation, EngineSnafu, LandmarkEntry, LandmarkPad, MapUpdatePad, Pad,
    RtccError, UplinkSegment,
};
use crate::time::{Duration, Unit};
use crate::utils::{hhmmss, kg_to_lbs, m_to_nm, NM2M};
use crate::vehicle::Computer;
use snafu::ResultExt;

/// Preliminary (20) and final (21) LOI-1, on the lower delta-V solution.
pub(crate) fn loi1(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let opts = LoiOpts::builder()
        .sv(sv)
        .site(ws.config.landing_site)
        .build();
    let targets = ws.engine.loi_targets(&opts).context(EngineSnafu)?;
    let loi = choose_loi(&targets);
    let burn = ws.burn(&sv, loi.tig, &loi.dv_inertial_m_s, Thruster::Sps)?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        "LOI-1",
        &sv,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Sps,
        &refsmmat,
        false,
    )?;
    pad.remarks = format!(
        "No ullage. LM weight is {:.0}",
        kg_to_lbs(ws.vehicle.masses().lm_kg)
    );
    ws.params.store_maneuver(burn.tig, burn.dv_lvlh_m_s);

    let calc = Calculation::pad(Pad::Maneuver(pad));
    if code == 21 {
        let uplink = ws
            .csm_sv_v66("CSM state vector and V66, target load")
            .with(UplinkSegment::ExternalDeltaV {
                tig: burn.tig,
                dv_lvlh_m_s: burn.dv_lvlh_m_s,
            });
        Ok(calc.with_uplink(uplink))
    } else {
        Ok(calc)
    }
}

/// LOI-2 circularization at 60 NM.
pub(crate) fn loi2(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let burn = ws
        .engine
        .orbit_adjust(
            &sv,
            ws.params.loi + 3 * Unit::Hour + 30 * Unit::Minute,
            60.0 * NM2M,
            Thruster::Sps,
        )
        .context(EngineSnafu)?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        "LOI-2",
        &sv,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Sps,
        &refsmmat,
        false,
    )?;
    pad.remarks = "Two-jet ullage for 17 seconds".to_string();
    ws.params.store_maneuver(burn.tig, burn.dv_lvlh_m_s);
    ws.params.loi2 = burn.tig;

    let uplink = ws
        .csm_sv_v66("CSM state vector and V66, target load")
        .with(UplinkSegment::ExternalDeltaV {
            tig: burn.tig,
            dv_lvlh_m_s: burn.dv_lvlh_m_s,
        });
    Ok(Calculation::pad(Pad::Maneuver(pad)).with_uplink(uplink))
}

/// LOI-1 evaluation: scrubbed unless the CSM is captured by the Moon.
pub(crate) fn loi1_evaluation(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let ecc = sv.ecc().context(AstroSnafu)?;
    if sv.body == Body::Moon && ecc < 1.0 {
        info!("LOI-1 confirmed, eccentricity {ecc:.4}");
        Ok(Calculation::nothing())
    } else {
        Ok(Calculation::scrub("LOI-1", None))
    }
}

fn tei_name_and_coast(code: u16) -> (String, Duration) {
    match code {
        30 => ("TEI-1".to_string(), Unit::Hour * 1),
        31 => ("TEI-4".to_string(), Unit::Hour * 7),
        32 => ("TEI-5".to_string(), Unit::Hour * 5),
        33 => ("TEI-10".to_string(), Unit::Hour * 11),
        34 => ("TEI-22".to_string(), Unit::Hour * 11),
        35..=39 => (format!("TEI-{}", code - 12), Unit::Hour * 1),
        130 => ("TEI-29".to_string(), Unit::Hour * 5),
        131 => ("TEI-30".to_string(), Unit::Hour * 2),
        132 => ("TEI-31".to_string(), Unit::Hour * 2),
        133 => ("TEI-31".to_string(), Duration::ZERO),
        _ => ("TEI-32".to_string(), Unit::Hour * 3),
    }
}

/// TEI updates. The first three are computed after the maneuver currently planned, e.g. from the post LOI-1 orbit.
/// The final TEI (133) is stored as the next maneuver and loaded in the CMC.
pub(crate) fn tei_update(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let (name, coast) = tei_name_and_coast(code);

    let sv0 = ws.csm_sv();
    let sv1 = if matches!(code, 30..=32) {
        ws.engine
            .execute_maneuver(
                &sv0,
                ws.params.time_of_ignition,
                &ws.params.delta_v_lvlh_m_s,
                Thruster::Sps,
            )
            .context(EngineSnafu)?
    } else {
        sv0
    };

    let opts = ReturnToEarthOpts::builder()
        .sv(sv1)
        .tig_guess(sv1.get + coast)
        .entry_longitude_deg(ws.config.entry_longitude_deg)
        .return_speed(ReturnSpeed::Normal)
        .max_entry_speed_fps(ws.config.tei_max_entry_speed_fps)
        .build();
    let sol = ws.engine.return_to_earth(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv1, sol.tig, &sol.dv_inertial_m_s, Thruster::Sps)?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        &name,
        &sv1,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Sps,
        &refsmmat,
        false,
    )?;
    pad.remarks = "Two-jet ullage for 14 seconds".to_string();
    pad.entry = Some(sol.entry);

    if code != 134 {
        ws.params.store_return(
            sol.tig,
            sol.entry.ei_get,
            sol.entry.latitude_deg,
            sol.entry.longitude_deg,
        );
    }

    let calc = Calculation::pad(Pad::Maneuver(pad));
    if code == 133 {
        ws.params.store_maneuver(burn.tig, burn.dv_lvlh_m_s);
        let uplink = ws
            .csm_sv_v66("State vector and V66, target load")
            .with(UplinkSegment::ExternalDeltaV {
                tig: burn.tig,
                dv_lvlh_m_s: burn.dv_lvlh_m_s,
            });
        Ok(calc.with_uplink(uplink))
    } else {
        Ok(calc)
    }
}

fn map_pad(kind: MapKind, rev: u32, upd: &crate::engine::MapUpdate) -> MapUpdatePad {
    MapUpdatePad {
        kind,
        rev,
        los: upd.los,
        pm: upd.pm,
        aos: upd.aos,
        sunrise: upd.sunrise,
        sunset: upd.sunset,
        aos2: Duration::ZERO,
    }
}

/// State right after the maneuver currently planned
fn after_planned_burn(ws: &Workspace<'_>, sv: &StateVector) -> Result<StateVector, RtccError> {
    ws.engine
        .execute_maneuver(
            sv,
            ws.params.time_of_ignition,
            &ws.params.delta_v_lvlh_m_s,
            Thruster::Sps,
        )
        .context(EngineSnafu)
}

/// Lunar orbit and transearth map updates.
///
/// Rev 1 and rev 3 combine the current orbit (LOS) with the orbit after LOI-1 or LOI-2 (AOS). The TEI map update
/// gives the acquisition both without and after the burn.
pub(crate) fn map_update(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv0 = ws.csm_sv();
    let pad = match code {
        40 | 42 => {
            let pre = ws
                .engine
                .map_update(&sv0, MapKind::LunarOrbit)
                .context(EngineSnafu)?;
            let mut sv1 = after_planned_burn(ws, &sv0)?;
            if code == 40 {
                sv1 = ws
                    .engine
                    .coast(&sv1, sv1.get - 30 * Unit::Minute)
                    .context(EngineSnafu)?;
            }
            let post = ws
                .engine
                .map_update(&sv1, MapKind::LunarOrbit)
                .context(EngineSnafu)?;
            let mut pad = map_pad(MapKind::LunarOrbit, if code == 40 { 1 } else { 3 }, &pre);
            pad.aos = post.aos;
            pad
        }
        144 => {
            let pre = ws
                .engine
                .map_update(&sv0, MapKind::Transearth)
                .context(EngineSnafu)?;
            let sv1 = after_planned_burn(ws, &sv0)?;
            let post = ws
                .engine
                .map_update(&sv1, MapKind::Transearth)
                .context(EngineSnafu)?;
            let mut pad = map_pad(MapKind::Transearth, 32, &pre);
            pad.aos2 = post.aos;
            pad
        }
        _ => {
            let rev = match code {
                41 => 2,
                43 => 4,
                44 => 11,
                45..=49 => u32::from(code) - 23,
                140 => 27,
                141 => 29,
                142 => 30,
                _ => 31,
            };
            let sv1 = match code {
                45 => ws
                    .engine
                    .coast(&sv0, sv0.get + 8 * Unit::Hour)
                    .context(EngineSnafu)?,
                141 => ws
                    .engine
                    .coast(&sv0, sv0.get + 2 * Unit::Hour)
                    .context(EngineSnafu)?,
                _ => sv0,
            };
            let upd = ws
                .engine
                .map_update(&sv1, MapKind::LunarOrbit)
                .context(EngineSnafu)?;
            map_pad(MapKind::LunarOrbit, rev, &upd)
        }
    };
    Ok(Calculation::pad(Pad::MapUpdate(pad)))
}

struct Sighting {
    landmark: Landmark,
    guess: Duration,
}

impl Sighting {
    fn new(id: &str, lat: f64, lng: f64, alt_nm: f64, guess: Duration) -> Self {
        Self {
            landmark: Landmark::new(id, lat, lng, alt_nm * NM2M),
            guess,
        }
    }
}

fn cp1(guess: Duration) -> Sighting {
    Sighting::new("CP-1", 0.875, 170.146, 0.0, guess)
}

fn cp2(guess: Duration) -> Sighting {
    Sighting::new("CP-2", 1.0, 127.4, 0.0, guess)
}

fn f1(guess: Duration) -> Sighting {
    Sighting::new("F-1", 1.6, 86.88, 0.0, guess)
}

fn b1(guess: Duration) -> Sighting {
    Sighting::new("B-1", 2.522, 35.036, -1.54, guess)
}

fn lm130(guess: Duration) -> Sighting {
    Sighting::new("130", 1.266, 23.678, -1.73, guess)
}

/// Landmark tracking PADs.
pub(crate) fn landmark_tracking(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sightings = match code {
        50 => vec![f1(hhmmss(82, 27, 0.0))],
        51 => vec![b1(hhmmss(82, 45, 0.0))],
        52 => vec![lm130(hhmmss(96, 35, 0.0))],
        53..=56 => {
            // Two revolutions apart, each pass two minutes earlier
            let k = i64::from(code - 53);
            vec![
                cp1(hhmmss(121 + 2 * k, 26 - 2 * k, 0.0)),
                cp2(hhmmss(121 + 2 * k, 41 - 2 * k, 0.0)),
                f1(hhmmss(121 + 2 * k, 54 - 2 * k, 0.0)),
                lm130(hhmmss(122 + 2 * k, 15 - 2 * k, 0.0)),
            ]
        }
        _ => vec![
            b1(hhmmss(134, 0, 0.0)),
            Sighting::new("150", 0.283, -1.428, -1.05, hhmmss(134, 12, 0.0)),
        ],
    };

    let sv = ws.csm_sv();
    let mut entries = Vec::with_capacity(sightings.len());
    for sighting in &sightings {
        let mark = ws
            .engine
            .landmark_tracking(&sv, &sighting.landmark, sighting.guess)
            .context(EngineSnafu)?;
        entries.push(LandmarkEntry {
            id: sighting.landmark.id.clone(),
            t1: mark.t1,
            t2: mark.t2,
            cross_range_nm: m_to_nm(mark.cross_range_m),
            latitude_deg: sighting.landmark.latitude_deg,
            longitude_deg: sighting.landmark.longitude_deg,
            altitude_nm: m_to_nm(sighting.landmark.altitude_m),
        });
    }
    debug!("{} landmark sighting(s) computed", entries.len());

    Ok(Calculation::pad(Pad::Landmark(LandmarkPad { entries })))
}
