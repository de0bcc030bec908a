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

use crate::mcc::MissionState;
use crate::rtcc::PadKind;
use snafu::prelude::*;

/// Errors raised inside the sequencer. None of these escape a tick: they are logged, and either stall the
/// current step or halt the mission.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MccError {
    #[snafu(display("calculation {code} requested by {requested_by:?} while {in_flight} is still in flight"))]
    CalculationInFlight {
        code: u16,
        in_flight: u16,
        requested_by: MissionState,
    },
    #[snafu(display("PAD buffer still holds a {held:?} form, cannot allocate a {requested:?} form"))]
    PadBufferBusy { held: PadKind, requested: PadKind },
    #[snafu(display("checkpoint rejected: {reason}"))]
    Checkpoint { reason: String },
}
