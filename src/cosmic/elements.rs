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

use super::{AstroError, StateVector};
use crate::linalg::Vector3;
use crate::time::{Duration, Unit};
use crate::utils::between_0_360;
use std::f64::consts::{PI, TAU};

/// If an orbit has an eccentricity below this value, it is considered circular.
pub const ECC_EPSILON: f64 = 1e-11;

/// Two-body orbital elements derived from a state vector. The sequencer only needs a handful of them
/// (eccentricity for the abort classification and the time to the next periapsis), so everything else is
/// left to the astrodynamics engine.
impl StateVector {
    fn check(&self) -> Result<(), AstroError> {
        if self.rmag_m() < f64::EPSILON || self.vmag_m_s() < f64::EPSILON {
            Err(AstroError::Degenerate)
        } else {
            Ok(())
        }
    }

    /// Returns the specific mechanical energy in m^2/s^2
    pub fn energy_m2_s2(&self) -> Result<f64, AstroError> {
        self.check()?;
        Ok(self.vmag_m_s().powi(2) / 2.0 - self.body.mu_m3_s2() / self.rmag_m())
    }

    /// Returns the eccentricity vector (no unit)
    pub fn evec(&self) -> Result<Vector3<f64>, AstroError> {
        self.check()?;
        let r = self.radius_m;
        let v = self.velocity_m_s;
        let mu = self.body.mu_m3_s2();
        Ok(((v.norm_squared() - mu / r.norm()) * r - (r.dot(&v)) * v) / mu)
    }

    /// Returns the eccentricity (no unit)
    pub fn ecc(&self) -> Result<f64, AstroError> {
        Ok(self.evec()?.norm())
    }

    /// Returns the semi-major axis in meters, negative for hyperbolic orbits
    pub fn sma_m(&self) -> Result<f64, AstroError> {
        let ecc = self.ecc()?;
        if (ecc - 1.0).abs() < ECC_EPSILON {
            return Err(AstroError::Parabolic { ecc });
        }
        Ok(-self.body.mu_m3_s2() / (2.0 * self.energy_m2_s2()?))
    }

    /// Returns the orbital period, only defined for elliptical orbits
    pub fn period(&self) -> Result<Duration, AstroError> {
        let ecc = self.ecc()?;
        if ecc >= 1.0 {
            return Err(AstroError::NotElliptical { ecc });
        }
        let sma = self.sma_m()?;
        Ok(TAU * (sma.powi(3) / self.body.mu_m3_s2()).sqrt() * Unit::Second)
    }

    /// Returns the true anomaly in degrees between 0 and 360.0
    ///
    /// NOTE: On circular orbits, the true anomaly is measured from the position vector along the X axis.
    pub fn ta_deg(&self) -> Result<f64, AstroError> {
        let ecc = self.ecc()?;
        if ecc < ECC_EPSILON {
            let cos_nu = self.radius_m.x / self.rmag_m();
            let nu = cos_nu.clamp(-1.0, 1.0).acos().to_degrees();
            return Ok(if self.radius_m.y < 0.0 { 360.0 - nu } else { nu });
        }
        let cos_nu = self.evec()?.dot(&self.radius_m) / (ecc * self.rmag_m());
        let nu = cos_nu.clamp(-1.0, 1.0).acos().to_degrees();
        if self.radius_m.dot(&self.velocity_m_s) < 0.0 {
            Ok(between_0_360(360.0 - nu))
        } else {
            Ok(nu)
        }
    }

    /// Returns the periapsis altitude above the mean radius of the central body in meters
    pub fn periapsis_altitude_m(&self) -> Result<f64, AstroError> {
        let sma = self.sma_m()?;
        let ecc = self.ecc()?;
        Ok(sma * (1.0 - ecc) - self.body.radius_m())
    }

    /// Returns whether this state is on a closed orbit around its central body.
    pub fn is_captured(&self) -> bool {
        matches!(self.ecc(), Ok(ecc) if ecc < 1.0)
    }

    /// Returns the time until the next periapsis passage.
    ///
    /// On an ellipse this is always in [0, period). On a hyperbola, the result is negative once the
    /// periapsis has been passed.
    pub fn time_to_periapsis(&self) -> Result<Duration, AstroError> {
        let ecc = self.ecc()?;
        let sma = self.sma_m()?;
        let mu = self.body.mu_m3_s2();
        let nu = self.ta_deg()?.to_radians();

        let seconds = if ecc < 1.0 {
            let ea = ((1.0 - ecc.powi(2)).sqrt() * nu.sin()).atan2(ecc + nu.cos());
            let ma = (ea - ecc * ea.sin()).rem_euclid(TAU);
            let mean_motion = (mu / sma.powi(3)).sqrt();
            if ma == 0.0 {
                0.0
            } else {
                (TAU - ma) / mean_motion
            }
        } else {
            // Hyperbolic anomaly from the true anomaly, measured in (-PI, PI]
            let nu = if nu > PI { nu - TAU } else { nu };
            let ha = 2.0 * (((ecc - 1.0) / (ecc + 1.0)).sqrt() * (nu / 2.0).tan()).atanh();
            let ma = ecc * ha.sinh() - ha;
            let mean_motion = (mu / (-sma).powi(3)).sqrt();
            -ma / mean_motion
        };

        Ok(seconds * Unit::Second)
    }
}
