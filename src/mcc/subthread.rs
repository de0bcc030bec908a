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


use super::MissionState;
use crate::errors::MccError;
use crate::rtcc::{CalcParams, ManeuverPlanTable, Products};
use serde_derive::{Deserialize, Serialize};

/// What a finished calculation leaves for the sequencer: its products and the mission parameters and plan table it
/// wrote, applied only when the result is collected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub scrubbed: bool,
    pub params: CalcParams,
    pub mpt: ManeuverPlanTable,
    pub products: Products,
}

/// A calculation issued by the sequencer, tagged with the state which issued it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub code: u16,
    pub state: MissionState,
    /// Set once the dispatcher returned
    pub result: Option<Completion>,
}

/// The single calculation slot of the sequencer.
///
/// Calculations run to completion inside the tick which issues them, but the result is only collected by a later
/// poll. Until then the request counts as in flight and no other request may be issued.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Subthread {
    request: Option<Request>,
}

impl Subthread {
    /// Reserves the slot for `code` on behalf of `state`.
    ///
    /// A result left behind by another state is stale and dropped. A request of the same state which was not
    /// collected yet is still in flight.
    pub fn issue(&mut self, code: u16, state: MissionState) -> Result<(), MccError> {
        if let Some(pending) = &self.request {
            if pending.state == state {
                return Err(MccError::CalculationInFlight {
                    code,
                    in_flight: pending.code,
                    requested_by: state,
                });
            }
            warn!(
                "dropping the result of calculation {} issued by {:?}",
                pending.code, pending.state
            );
        }
        self.request = Some(Request {
            code,
            state,
            result: None,
        });
        Ok(())
    }

    pub fn complete(&mut self, result: Completion) {
        if let Some(request) = self.request.as_mut() {
            request.result = Some(result);
        }
    }

    /// Collects the result of a completed request. Results issued by another state are discarded unapplied.
    pub fn collect(&mut self, state: MissionState) -> Option<Completion> {
        match self.request.take() {
            Some(Request {
                state: issuer,
                result: Some(result),
                ..
            }) if issuer == state => Some(result),
            Some(request) if request.state != state => {
                warn!(
                    "discarding stale result of calculation {} issued by {:?}",
                    request.code, request.state
                );
                None
            }
            pending => {
                self.request = pending;
                None
            }
        }
    }

    /// Drops any pending request and its result, returning its function code
    pub fn discard(&mut self) -> Option<u16> {
        self.request.take().map(|request| request.code)
    }

    pub fn in_flight(&self) -> Option<u16> {
        self.request.as_ref().map(|request| request.code)
    }
}
