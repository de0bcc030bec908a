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

//! State vector uplinks, and the photography and TV PADs.

use super::Workspace;
use crate::rtcc::{Calculation, EngineSnafu, Pad, RtccError, Uplink};
use crate::time::{Duration, Unit};
use crate::utils::{format_get, hhmmss};
use crate::vehicle::{Computer, Vehicle};
use snafu::ResultExt;

/// CSM (100), CSM and LM (101), LM (102) state vectors, and CSM state vector with V66 (103).
pub(crate) fn state_vector(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let uplink = match code {
        100 => Uplink::new(Computer::Cmc, "CSM state vector").with(ws.sv_segment(Vehicle::Csm)),
        101 => Uplink::new(Computer::Cmc, "CSM and LM state vectors")
            .with(ws.sv_segment(Vehicle::Csm))
            .with(ws.sv_segment(Vehicle::Lm)),
        102 => Uplink::new(Computer::Lgc, "LM state vector").with(ws.sv_segment(Vehicle::Lm)),
        _ => ws.csm_sv_v66("CSM state vector and V66"),
    };
    Ok(Calculation::uplink(uplink))
}

fn crossing(ws: &Workspace<'_>, longitude_deg: f64, after: Duration) -> Result<Duration, RtccError> {
    ws.engine
        .time_of_longitude(&ws.csm_sv(), longitude_deg, after)
        .context(EngineSnafu)
}

/// Oblique strip photography of landing site 2 (200) or 3 (202).
pub(crate) fn oblique_strip(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let (site, longitude_deg, guess) = if code == 200 {
        ("LLS 2", 23.65, hhmmss(118, 0, 0.0))
    } else {
        ("LLS 3", -1.35, hhmmss(132, 0, 0.0))
    };
    let t2 = crossing(ws, longitude_deg, guess)?;
    let t1 = t2 - 2 * Unit::Minute;
    let t0 = t1 - hhmmss(0, 4, 23.0);

    Ok(Calculation::pad(Pad::generic(
        "Photo",
        format!(
            "OBLIQUE STRIP {site}  T0 {}  T1 {}  T2 {}",
            format_get(t0),
            format_get(t1),
            format_get(t2)
        ),
    )))
}

/// Vertical stereo strip from the terminator.
pub(crate) fn vertical_stereo(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let t0 = ws
        .engine
        .terminator_rise(&ws.csm_sv(), hhmmss(119, 0, 0.0))
        .context(EngineSnafu)?;
    let t1 = t0 + 28 * Unit::Minute;
    let t2 = crossing(ws, 65.0, t1)?;
    let t3 = crossing(ws, 34.0, t2)?;

    Ok(Calculation::pad(Pad::generic(
        "Photo",
        format!(
            "VERTICAL STEREO  T0 {} Camera start  T1 {} (Sub-solar pt)  T2 {} (65E)  T3 {} (34E)",
            format_get(t0),
            format_get(t1),
            format_get(t2),
            format_get(t3)
        ),
    )))
}

/// Descent strip over landing site 3.
pub(crate) fn descent_strip(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let t0 = crossing(ws, 90.0, hhmmss(135, 0, 0.0))?;
    let t1 = crossing(ws, 85.0, t0)?;
    let t2 = crossing(ws, 30.0, t1)?;

    Ok(Calculation::pad(Pad::generic(
        "Photo",
        format!(
            "DESCENT STRIP AND LLS3  T0 {}  T1 {} (85E)  T2 {} (30E)",
            format_get(t0),
            format_get(t1),
            format_get(t2)
        ),
    )))
}

pub(crate) fn tv_update(_code: u16, _ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    Ok(Calculation::pad(Pad::generic(
        "TV",
        "TV UPDATE  R 180 HGA  P 293 P -58  Y 000 Y 005".to_string(),
    )))
}
