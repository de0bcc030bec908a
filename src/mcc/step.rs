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


use super::{MissionState, Target, Trigger};
use crate::rtcc::PadKind;
use crate::vehicle::Computer;
use serde_derive::{Deserialize, Serialize};

/// How the products of a calculation reach the crew.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UplinkProtocol {
    /// Ground only calculation
    None,
    PadOnly,
    PadWithCmcUplink,
    PadWithLgcUplink,
    CmcUplinkOnly,
    LgcUplinkOnly,
    /// LGC uplink sent without waiting for the crew
    LgcUplinkDirect,
}

impl UplinkProtocol {
    pub fn has_pad(&self) -> bool {
        matches!(
            self,
            Self::PadOnly | Self::PadWithCmcUplink | Self::PadWithLgcUplink
        )
    }

    /// The computer receiving the uplink, if any
    pub fn computer(&self) -> Option<Computer> {
        match self {
            Self::PadWithCmcUplink | Self::CmcUplinkOnly => Some(Computer::Cmc),
            Self::PadWithLgcUplink | Self::LgcUplinkOnly | Self::LgcUplinkDirect => {
                Some(Computer::Lgc)
            }
            Self::None | Self::PadOnly => None,
        }
    }
}

/// Steps of the crew hand-off, as offsets from the first sub-state of the protocol.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandoffStep {
    /// Allocate the PAD buffer and issue the calculation
    Dispatch,
    AwaitCalculation,
    /// "Ready for uplink" offered to the crew
    AwaitCrew,
    NotReady,
    Transmit,
    AwaitDrain,
    /// Products handed over, waiting for the transition trigger. "Repeat uplink" may be offered.
    AwaitTrigger,
    Repeat,
}

impl HandoffStep {
    pub const COUNT: u8 = 8;

    pub fn from_offset(offset: u8) -> Option<Self> {
        match offset {
            0 => Some(Self::Dispatch),
            1 => Some(Self::AwaitCalculation),
            2 => Some(Self::AwaitCrew),
            3 => Some(Self::NotReady),
            4 => Some(Self::Transmit),
            5 => Some(Self::AwaitDrain),
            6 => Some(Self::AwaitTrigger),
            7 => Some(Self::Repeat),
            _ => None,
        }
    }

    pub fn offset(self) -> u8 {
        self as u8
    }
}

/// A single crew update: run `code` on entry, hand its products over with `protocol`, then leave for `next` once
/// `ready` holds.
#[derive(Clone, Debug, PartialEq)]
pub struct StepRule {
    pub protocol: UplinkProtocol,
    pub pad: Option<PadKind>,
    pub code: u16,
    pub ready: Trigger,
    pub next: MissionState,
    /// Taken instead of `next` when the calculation was scrubbed
    pub alt: Option<(Trigger, Target)>,
}

/// How the sequencer drives a state.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Step(StepRule),
    /// Hand written sub-state sequence, with its last sub-state
    Compound { last_sub_state: u8 },
    /// Abort sub-sequencer, selected by the abort mode
    Abort { last_sub_state: u8 },
}

impl Rule {
    pub fn last_sub_state(&self) -> u8 {
        match self {
            Self::Step(_) => HandoffStep::COUNT - 1,
            Self::Compound { last_sub_state } | Self::Abort { last_sub_state } => *last_sub_state,
        }
    }
}
