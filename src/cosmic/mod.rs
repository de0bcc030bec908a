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

use crate::linalg::Vector3;
use crate::time::Duration;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

/// Earth gravitational parameter, m^3/s^2
pub const EARTH_MU_M3_S2: f64 = 3.986_004_356e14;
/// Moon gravitational parameter, m^3/s^2
pub const MOON_MU_M3_S2: f64 = 4.902_800_66e12;
/// Earth equatorial radius used by the guidance computers, meters
pub const EARTH_RADIUS_M: f64 = 6.373_338e6;
/// Mean lunar radius, meters
pub const MOON_RADIUS_M: f64 = 1.738_09e6;

/// Central body of a state vector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Earth,
    Moon,
}

impl Body {
    /// Gravitational parameter of this body in m^3/s^2
    pub fn mu_m3_s2(&self) -> f64 {
        match self {
            Self::Earth => EARTH_MU_M3_S2,
            Self::Moon => MOON_MU_M3_S2,
        }
    }

    pub fn radius_m(&self) -> f64 {
        match self {
            Self::Earth => EARTH_RADIUS_M,
            Self::Moon => MOON_RADIUS_M,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Earth => write!(f, "Earth"),
            Self::Moon => write!(f, "Moon"),
        }
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("state vector has a zero position or velocity"))]
    Degenerate,
    #[snafu(display("orbit is parabolic (ecc = {ecc}), elements are undefined"))]
    Parabolic { ecc: f64 },
    #[snafu(display("orbit is not elliptical (ecc = {ecc}) so it has no period"))]
    NotElliptical { ecc: f64 },
}

/// An inertial state vector of a spacecraft, time tagged in GET.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Ground elapsed time of this state
    #[serde(with = "crate::io::duration_parts")]
    pub get: Duration,
    pub body: Body,
    /// Position in meters, body centered inertial
    pub radius_m: Vector3<f64>,
    /// Velocity in meters per second, body centered inertial
    pub velocity_m_s: Vector3<f64>,
    /// Total vehicle mass in kilograms
    pub mass_kg: f64,
}

impl StateVector {
    pub fn new(
        get: Duration,
        body: Body,
        radius_m: Vector3<f64>,
        velocity_m_s: Vector3<f64>,
        mass_kg: f64,
    ) -> Self {
        Self {
            get,
            body,
            radius_m,
            velocity_m_s,
            mass_kg,
        }
    }

    /// Returns the magnitude of the radius vector in meters
    pub fn rmag_m(&self) -> f64 {
        self.radius_m.norm()
    }

    /// Returns the magnitude of the velocity vector in m/s
    pub fn vmag_m_s(&self) -> f64 {
        self.velocity_m_s.norm()
    }

    /// Altitude above the mean radius of the central body, in meters
    pub fn altitude_m(&self) -> f64 {
        self.rmag_m() - self.body.radius_m()
    }

    /// Returns a copy of this state with a new mass
    pub fn with_mass(mut self, mass_kg: f64) -> Self {
        self.mass_kg = mass_kg;
        self
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} @ {}] r = {:.3} km  v = {:.6} km/s  m = {:.1} kg",
            self.body,
            crate::utils::format_get_cs(self.get),
            self.rmag_m() / 1e3,
            self.vmag_m_s() / 1e3,
            self.mass_kg
        )
    }
}

mod elements;
pub use self::elements::*;
