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

//! Mission states with their own sub-state sequence: liftoff, TLI, the S-IVB disposal, and the phase changes at
//! lunar orbit, TEI, entry and splashdown.

use super::{Mcc, MissionPhase, MissionState, Target, Trigger};
use crate::engine::AstroEngine;
use crate::rtcc::MissionEpoch;
use crate::time::{Duration, Unit};
use crate::utils::hhmmss;
use crate::vehicle::{DockingPort, SivbCommand, Stage, VehicleService};

impl<E: AstroEngine> Mcc<E> {
    pub(super) fn compound(&mut self, vehicle: &mut dyn VehicleService) {
        use MissionState::*;

        let next = match (self.state, self.sub_state) {
            (Prelaunch, _) => {
                if self.get > Duration::ZERO {
                    self.add_message("Liftoff".to_string());
                    Some(MissionInit)
                } else {
                    None
                }
            }
            (TliConfirm, 0) => {
                self.set_phase(MissionPhase::TranslunarCoast);
                self.add_message("TLI".to_string());
                self.set_sub_state(1);
                None
            }
            (TliConfirm, _) => self
                .holds(&Trigger::After(MissionEpoch::Tli, 20 * Unit::Minute), vehicle)
                .then_some(EvasivePad),
            (SivbEvasive, 0) => {
                if self.holds(&Trigger::StageAtLeast(Stage::CsmLem), vehicle) {
                    self.set_sub_state(1);
                }
                None
            }
            (SivbEvasive, 1) => {
                // LM extracted from the S-IVB
                if self.holds(&Trigger::Undocked(DockingPort::SivbAdapter), vehicle) {
                    self.set_sub_state(2);
                }
                None
            }
            (SivbEvasive, 2) => {
                if self.sub_state_time() > hhmmss(0, 3, 30.0) {
                    vehicle.sivb_command(SivbCommand::EvasiveManeuverEnable);
                    self.add_message("S-IVB evasive maneuver enabled".to_string());
                    self.set_sub_state(3);
                }
                None
            }
            (SivbEvasive, _) => {
                let tli_elapsed = self.holds(
                    &Trigger::After(MissionEpoch::Tli, hhmmss(1, 31, 40.0)),
                    vehicle,
                );
                (self.sub_state_time() >= 8 * Unit::Minute && tli_elapsed).then_some(SivbTimebase8)
            }
            (SivbTimebase8, 0) => {
                if vehicle.stage() >= Stage::CsmLem {
                    vehicle.sivb_command(SivbCommand::Timebase8Enable);
                    self.add_message("S-IVB timebase 8 enabled".to_string());
                }
                self.set_sub_state(1);
                None
            }
            (SivbTimebase8, _) => self
                .holds(&Trigger::After(MissionEpoch::Tli, hhmmss(2, 29, 0.0)), vehicle)
                .then_some(PtcRefsmmat),
            (LunarOrbitBegin, 0) => {
                self.set_phase(MissionPhase::LunarOrbit);
                self.set_sub_state(1);
                None
            }
            (LunarOrbitBegin, _) => {
                let rev = vehicle.lunar_revolution();
                (rev.rev >= 1 && rev.time_in_rev > 65 * Unit::Minute).then_some(Rev2Map)
            }
            (TransearthBegin, 0) => {
                self.set_phase(MissionPhase::TransearthCoast);
                self.set_sub_state(1);
                None
            }
            (TransearthBegin, _) => self
                .holds(&Trigger::After(MissionEpoch::Tei, 20 * Unit::Minute), vehicle)
                .then_some(TransearthStateVector),
            (Entry, 0) => {
                self.set_phase(MissionPhase::Entry);
                self.set_sub_state(1);
                None
            }
            (Entry, _) => self
                .holds(&Trigger::StageAtLeast(Stage::CmRecovery), vehicle)
                .then_some(Landing),
            (Landing, 0) => {
                self.set_phase(MissionPhase::Recovery);
                self.add_message("Splashdown".to_string());
                self.set_sub_state(1);
                None
            }
            (Landing, _) => None,
            (state, sub_state) => {
                self.halt(format!("{state:?} has no sub-state {sub_state}"));
                None
            }
        };

        if let Some(state) = next {
            self.go(vehicle, Target::State(state));
        }
    }
}
