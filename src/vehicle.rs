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

use crate::cosmic::StateVector;
use crate::linalg::{Matrix3, Vector3};
use crate::rtcc::Uplink;
use crate::time::{Duration, Epoch};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Onboard guidance computers which can receive an uplink.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Computer {
    /// Command Module Computer
    Cmc,
    /// LM Guidance Computer
    Lgc,
    /// Abort Guidance System
    Ags,
}

impl fmt::Display for Computer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Cmc => write!(f, "CMC"),
            Self::Lgc => write!(f, "LGC"),
            Self::Ags => write!(f, "AGS"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vehicle {
    Csm,
    Lm,
}

/// Configuration of the command ship, in flight order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// On the launch vehicle, up to and including the S-IVB
    Launch,
    /// CSM separated from the S-IVB, with or without the LM
    CsmLem,
    /// Command module separated from the service module
    Cm,
    /// Command module in the atmosphere
    CmEntry,
    /// Main parachutes deployed or on the water
    CmRecovery,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DockingPort {
    /// CSM forward hatch to the LM overhead hatch
    CsmForward,
    /// LM in the spacecraft-LM adapter on top of the S-IVB
    SivbAdapter,
}

/// Digital command system requests to the S-IVB instrument unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SivbCommand {
    EvasiveManeuverEnable,
    Timebase8Enable,
}

/// Revolution counter in lunar orbit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LunarRevolution {
    /// Number of completed revolutions since LOI, starts at zero
    pub rev: u32,
    /// Time since the start of the current revolution
    pub time_in_rev: Duration,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VehicleMasses {
    pub csm_kg: f64,
    pub lm_kg: f64,
    pub lm_ascent_kg: f64,
}

/// The simulated spacecraft, as seen from the ground.
///
/// The sequencer reads everything through this trait and writes only through [`VehicleService::transmit_uplink`],
/// [`VehicleService::sivb_command`] and the time acceleration hook.
pub trait VehicleService {
    /// Ground elapsed time, i.e. time since liftoff
    fn get(&self) -> Duration;

    /// Ground time of the current tick
    fn gmt(&self) -> Epoch;

    fn stage(&self) -> Stage;

    fn docked(&self, port: DockingPort) -> bool;

    /// Current state vector of the requested vehicle, as tracked by the ground
    fn state_vector(&self, vehicle: Vehicle) -> StateVector;

    fn masses(&self) -> VehicleMasses;

    /// REFSMMAT currently stored in the requested computer, if the platform is aligned
    fn onboard_refsmmat(&self, computer: Computer) -> Option<Matrix3<f64>>;

    /// Outer, inner and middle gimbal angles in degrees
    fn imu_gimbal_angles_deg(&self, vehicle: Vehicle) -> Vector3<f64>;

    /// Mission time as counted by the requested computer clock
    fn computer_clock(&self, computer: Computer) -> Duration;

    /// AGS clock zero (K-factor) as loaded, if any
    fn ags_k_factor(&self) -> Option<Duration>;

    /// Current timebase of the launch vehicle digital computer
    fn launch_vehicle_timebase(&self) -> u8;

    /// Launch azimuth in degrees
    fn launch_azimuth_deg(&self) -> f64;

    fn lunar_revolution(&self) -> LunarRevolution;

    /// Whether the LM is on the surface
    fn ground_contact(&self) -> bool;

    /// Whether the uplink buffer of the requested computer has been fully read by the vehicle
    fn uplink_drained(&self, computer: Computer) -> bool;

    /// Queues an uplink payload for transmission to `uplink.computer`
    fn transmit_uplink(&mut self, uplink: &Uplink);

    fn sivb_command(&mut self, command: SivbCommand);

    /// Called before long coasts so that a host running at high time acceleration can slow down.
    fn slow_if_desired(&mut self) {}
}
