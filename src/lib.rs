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

/*! # apollo-mcc

Mission control for a simulated lunar mission: the Mission Control Center (MCC) sequencer walks the
flight through its procedural timeline, and the Real Time Computer Complex (RTCC) computes the crew
products (PADs and computer uplinks) the sequencer asks for at each step.

The vehicle simulation and the astrodynamics numerics are external collaborators, consumed through the
[`vehicle::VehicleService`] and [`engine::AstroEngine`] traits.
*/

/// Vehicle state vectors, central bodies and the two-body orbital elements needed by the sequencer.
pub mod cosmic;

/// Utility functions shared by different modules: unit conversions, angle wrapping and GET formatting.
pub mod utils;

mod errors;
/// The sequencer never panics and never returns an error from a tick; errors are logged and mapped to a scrub, a stall or a halt.
pub use self::errors::MccError;

/// All the input/output needs for this library: mission configuration and serialization helpers.
pub mod io;

/// The interface to the simulated spacecraft.
pub mod vehicle;

/// The interface to the astrodynamics engine, with its option and solution structures.
pub mod engine;

/// The Real Time Computer Complex: numbered calculations, PAD forms, uplink payloads and the maneuver plan table.
pub mod rtcc;

/// The Mission Control Center: the mission state machine and the crew hand-off protocol.
pub mod mcc;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::cosmic::{Body, StateVector};
pub use self::mcc::{Mcc, MissionPhase, MissionState};
pub use self::rtcc::{CalcParams, Rtcc};
