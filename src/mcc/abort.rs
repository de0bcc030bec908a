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

//! Abort sequencing: the Earth orbit, translunar and lunar orbit abort modes.

use super::{HandoffStep, Mcc, MissionPhase, MissionState, Target, Trigger, UplinkProtocol};
use crate::engine::AstroEngine;
use crate::rtcc::{MissionEpoch, PadKind};
use crate::time::{Duration, Unit};
use crate::utils::{format_get, hhmmss};
use crate::vehicle::{Stage, Vehicle, VehicleService};
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Entry interface prediction after an abort TEI
pub(crate) const ABORT_ENTRY_EVALUATION: u16 = 205;
/// Midcourse correction after an abort TEI
pub(crate) const ABORT_MIDCOURSE: u16 = 300;

/// First sub-state of the crew hand-off of the abort midcourse correction
pub(crate) const ABORT_HANDOFF_BASE: u8 = 5;
const FLYBY: u8 = 13;
const FLYBY_EVALUATION: u8 = 14;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
pub enum AbortMode {
    EarthOrbit,
    Translunar,
    LunarOrbit,
}

impl AbortMode {
    /// Mode number as used by the flight controllers
    pub fn number(&self) -> u8 {
        match self {
            Self::EarthOrbit => 5,
            Self::Translunar => 6,
            Self::LunarOrbit => 7,
        }
    }

    /// Mission state in which this abort mode is sequenced
    pub fn state(&self) -> MissionState {
        match self {
            Self::EarthOrbit => MissionState::AbortOrbit,
            Self::Translunar | Self::LunarOrbit => MissionState::Abort,
        }
    }
}

impl fmt::Display for AbortMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::EarthOrbit => "Earth orbit",
            Self::Translunar => "translunar",
            Self::LunarOrbit => "lunar orbit",
        };
        write!(f, "mode {} ({name}) abort", self.number())
    }
}

/// Time of the abort TEI when aborting from a free return at `get`.
fn abort_tei(get: Duration, tli: Duration) -> Duration {
    let ladder: [(i64, i64); 5] = [(45, 60), (35, 45), (25, 35), (15, 25), (8, 15)];
    for (after_hours, tei_hours) in ladder {
        if get > after_hours * Unit::Hour {
            return tei_hours * Unit::Hour;
        }
    }
    if get > tli + 90 * Unit::Minute {
        8 * Unit::Hour
    } else {
        tli + 90 * Unit::Minute
    }
}

impl<E: AstroEngine> Mcc<E> {
    pub(super) fn abort_sequence(&mut self, vehicle: &mut dyn VehicleService) {
        match self.abort_mode {
            Some(AbortMode::EarthOrbit) => self.earth_orbit_abort(vehicle),
            Some(AbortMode::Translunar) => self.translunar_abort(vehicle),
            Some(AbortMode::LunarOrbit) => self.lunar_orbit_abort(vehicle),
            None => self.halt(format!("{:?} entered without an abort mode", self.state)),
        }
    }

    fn earth_orbit_abort(&mut self, vehicle: &mut dyn VehicleService) {
        if self.holds(&Trigger::StageAtLeast(Stage::CmRecovery), vehicle) {
            self.go(vehicle, Target::State(MissionState::Landing));
        }
    }

    fn translunar_abort(&mut self, vehicle: &mut dyn VehicleService) {
        let ei_before = |hours: i64, minutes: i64| {
            Trigger::After(MissionEpoch::Ei, -hhmmss(hours, minutes, 0.0))
        };

        match self.sub_state {
            0 => {
                if self.get > 60 * Unit::Hour {
                    info!("past the free return abort window, waiting for the flyby");
                    self.set_sub_state(FLYBY);
                } else {
                    self.params.tei = abort_tei(self.get, self.params.tli);
                    info!("abort TEI at {}", format_get(self.params.tei));
                    self.set_sub_state(1);
                }
            }
            1 => {
                if self.holds(&Trigger::After(MissionEpoch::Tei, 10 * Unit::Minute), vehicle) {
                    self.set_phase(MissionPhase::TransearthCoast);
                    if self.issue(ABORT_ENTRY_EVALUATION, &*vehicle) {
                        self.set_sub_state(2);
                    }
                }
            }
            2 => {
                if self.collect().is_some() {
                    if self.params.tei > self.params.ei - 12 * Unit::Hour {
                        self.set_sub_state(3);
                    } else {
                        self.set_sub_state(4);
                    }
                }
            }
            3 => {
                if self.holds(&ei_before(4, 35), vehicle) {
                    self.go(vehicle, Target::State(MissionState::Mcc7));
                }
            }
            4 => {
                if self.holds(&Trigger::After(MissionEpoch::Tei, 4 * Unit::Hour), vehicle) {
                    vehicle.slow_if_desired();
                    self.set_sub_state(ABORT_HANDOFF_BASE);
                }
            }
            FLYBY => {
                if self.holds(&Trigger::After(MissionEpoch::Loi, hhmmss(2, 30, 0.0)), vehicle) {
                    let sv = vehicle.state_vector(Vehicle::Csm);
                    match sv.time_to_periapsis() {
                        Ok(dt) => self.params.loi = sv.get + dt,
                        Err(err) => warn!("keeping pericynthion at {}: {err}", format_get(self.params.loi)),
                    }
                    if self.issue(ABORT_ENTRY_EVALUATION, &*vehicle) {
                        self.set_sub_state(FLYBY_EVALUATION);
                    }
                }
            }
            FLYBY_EVALUATION => {
                if self.collect().is_some() {
                    if self.params.ei - self.params.loi > 45 * Unit::Hour {
                        self.params.tei = self.params.loi;
                        self.go(vehicle, Target::State(MissionState::TransearthBegin));
                    } else {
                        self.params.tei = self.params.ei - 30 * Unit::Hour;
                        self.set_sub_state(4);
                    }
                }
            }
            sub => match HandoffStep::from_offset(sub - ABORT_HANDOFF_BASE) {
                Some(HandoffStep::AwaitTrigger) => {
                    if self.holds(&ei_before(4, 35), vehicle) {
                        self.go(vehicle, Target::State(MissionState::Mcc7));
                    }
                }
                Some(step) => self.hand_off(
                    vehicle,
                    step,
                    UplinkProtocol::PadWithCmcUplink,
                    Some(PadKind::Maneuver),
                    ABORT_MIDCOURSE,
                    ABORT_HANDOFF_BASE,
                ),
                None => self.halt(format!("{:?} has no sub-state {sub}", self.state)),
            },
        }
    }

    fn lunar_orbit_abort(&mut self, vehicle: &mut dyn VehicleService) {
        let revolution = vehicle.lunar_revolution();
        match self.sub_state {
            0 => {
                if revolution.time_in_rev > 900 * Unit::Second {
                    self.set_sub_state(1);
                }
            }
            1 => {
                let sv = vehicle.state_vector(Vehicle::Csm);
                let periapsis = match sv.ecc() {
                    Ok(ecc) if ecc > 0.7 => sv.time_to_periapsis().map(|dt| sv.get + dt),
                    Ok(ecc) => {
                        debug!("eccentricity {ecc:.3}, still in lunar orbit");
                        self.set_sub_state(2);
                        return;
                    }
                    Err(err) => Err(err),
                };
                match periapsis {
                    Ok(tei) => {
                        self.params.tei = tei;
                        info!("transearth trajectory, TEI at {}", format_get(tei));
                        self.go(vehicle, Target::State(MissionState::TransearthBegin));
                    }
                    Err(err) => {
                        warn!("cannot classify the trajectory: {err}");
                        self.set_sub_state(2);
                    }
                }
            }
            _ => {
                if revolution.time_in_rev < 100 * Unit::Second {
                    self.set_sub_state(0);
                }
            }
        }
    }
}

#[cfg(test)]
mod ut_abort {
    use super::*;

    #[test]
    fn tei_ladder() {
        let tli = hhmmss(2, 33, 0.0);
        assert_eq!(abort_tei(hhmmss(3, 0, 0.0), tli), tli + 90 * Unit::Minute);
        assert_eq!(abort_tei(hhmmss(5, 0, 0.0), tli), 8 * Unit::Hour);
        assert_eq!(abort_tei(8 * Unit::Hour, tli), 8 * Unit::Hour);
        assert_eq!(abort_tei(hhmmss(8, 0, 1.0), tli), 15 * Unit::Hour);
        assert_eq!(abort_tei(hhmmss(30, 0, 0.0), tli), 35 * Unit::Hour);
        assert_eq!(abort_tei(hhmmss(59, 0, 0.0), tli), 60 * Unit::Hour);
    }

    #[test]
    fn modes() {
        assert_eq!(AbortMode::EarthOrbit.state(), MissionState::AbortOrbit);
        assert_eq!(AbortMode::LunarOrbit.state(), MissionState::Abort);
        assert_eq!(AbortMode::Translunar.number(), 6);
        assert_eq!(
            format!("{}", AbortMode::LunarOrbit),
            "mode 7 (lunar orbit) abort"
        );
    }
}
