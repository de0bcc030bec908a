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


use super::{AbortMode, MissionState};
use crate::rtcc::{CalcParams, MissionEpoch};
use crate::time::Duration;
use crate::vehicle::{DockingPort, LunarRevolution, Stage, VehicleService};

/// Snapshot of everything a trigger may read, taken when the trigger is evaluated.
pub struct Gate<'a> {
    pub get: Duration,
    /// Time since the current sub-state started
    pub sub_state_time: Duration,
    pub params: &'a CalcParams,
    pub stage: Stage,
    pub revolution: LunarRevolution,
    pub forward_docked: bool,
    pub sla_docked: bool,
}

impl<'a> Gate<'a> {
    pub fn new(
        vehicle: &dyn VehicleService,
        params: &'a CalcParams,
        sub_state_start: Duration,
    ) -> Self {
        let get = vehicle.get();
        Self {
            get,
            sub_state_time: get - sub_state_start,
            params,
            stage: vehicle.stage(),
            revolution: vehicle.lunar_revolution(),
            forward_docked: vehicle.docked(DockingPort::CsmForward),
            sla_docked: vehicle.docked(DockingPort::SivbAdapter),
        }
    }

    fn docked(&self, port: DockingPort) -> bool {
        match port {
            DockingPort::CsmForward => self.forward_docked,
            DockingPort::SivbAdapter => self.sla_docked,
        }
    }
}

/// Condition gating a transition. All time comparisons are strict.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    Always,
    /// Time in the current sub-state greater than
    Dwell(Duration),
    /// GET greater than an absolute time
    At(Duration),
    /// GET greater than a mission epoch plus an offset. The epoch is read when the trigger is evaluated, so a
    /// refined epoch moves the trigger.
    After(MissionEpoch, Duration),
    /// Revolution count reached, and time in that revolution greater than
    MoonRev { rev: u32, time_in_rev: Duration },
    StageAtLeast(Stage),
    Docked(DockingPort),
    Undocked(DockingPort),
    All(Vec<Trigger>),
}

impl Trigger {
    pub fn holds(&self, gate: &Gate<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::Dwell(dwell) => gate.sub_state_time > *dwell,
            Self::At(get) => gate.get > *get,
            Self::After(epoch, offset) => gate.get > gate.params.epoch(*epoch) + *offset,
            Self::MoonRev { rev, time_in_rev } => {
                gate.revolution.rev >= *rev && gate.revolution.time_in_rev > *time_in_rev
            }
            Self::StageAtLeast(stage) => gate.stage >= *stage,
            Self::Docked(port) => gate.docked(*port),
            Self::Undocked(port) => !gate.docked(*port),
            Self::All(triggers) => triggers.iter().all(|trigger| trigger.holds(gate)),
        }
    }
}

/// Where a transition leads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    State(MissionState),
    Abort(AbortMode),
}
