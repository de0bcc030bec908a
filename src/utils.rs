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

use crate::time::{Duration, Unit};
use na::Vector3;

/// Feet to meters
pub const FT2M: f64 = 0.3048;
/// Nautical miles to meters
pub const NM2M: f64 = 1852.0;
/// Pounds (mass) to kilograms
pub const LBS2KG: f64 = 0.453_592_37;

/// Converts a velocity in meters per second to feet per second.
pub fn m_s_to_fps(v: f64) -> f64 {
    v / FT2M
}

/// Converts a velocity in feet per second to meters per second.
pub fn fps_to_m_s(v: f64) -> f64 {
    v * FT2M
}

/// Converts a vector in meters per second to feet per second.
pub fn vec_fps(v: &Vector3<f64>) -> Vector3<f64> {
    v / FT2M
}

pub fn m_to_nm(d: f64) -> f64 {
    d / NM2M
}

pub fn kg_to_lbs(m: f64) -> f64 {
    m / LBS2KG
}

/// Returns the provided angle bounded between 0.0 and 360.0
pub fn between_0_360(angle: f64) -> f64 {
    let mut bounded = angle % 360.0;
    if bounded < 0.0 {
        bounded += 360.0;
    }
    bounded
}

/// Returns the provided angle bounded in (-180.0, 180.0]
pub fn between_pm_180(angle: f64) -> f64 {
    let bounded = between_0_360(angle);
    if bounded > 180.0 {
        bounded - 360.0
    } else {
        bounded
    }
}

/// Wraps each gimbal angle of an attitude into [0, 360), the way the IMU counters read them.
pub fn imu_limit(att_deg: Vector3<f64>) -> Vector3<f64> {
    att_deg.map(between_0_360)
}

/// Builds a GET from hours, minutes and seconds.
pub fn hhmmss(hours: i64, minutes: i64, seconds: f64) -> Duration {
    hours * Unit::Hour + minutes * Unit::Minute + seconds * Unit::Second
}

/// Formats a GET as `HHH:MM:SS`, rounded to the nearest second.
pub fn format_get(get: Duration) -> String {
    let total = get.to_seconds().round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{:03}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Formats a GET as `HHH:MM:SS.ss`, used on the PADs which carry centiseconds.
pub fn format_get_cs(get: Duration) -> String {
    let centis = (get.to_seconds() * 100.0).round() as i64;
    let sign = if centis < 0 { "-" } else { "" };
    let centis = centis.abs();
    let seconds = centis / 100;
    format!(
        "{sign}{:03}:{:02}:{:02}.{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60,
        centis % 100
    )
}

/// Formats a duration as `MM:SS`, used for short times on the photography and phasing PADs.
pub fn format_mmss(duration: Duration) -> String {
    let total = duration.to_seconds().round().abs() as i64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod ut_utils {
    use super::*;

    #[test]
    fn angle_bounds() {
        assert_eq!(between_0_360(-90.0), 270.0);
        assert_eq!(between_0_360(720.0), 0.0);
        assert_eq!(between_pm_180(180.0), 180.0);
        assert_eq!(between_pm_180(-180.0), 180.0);
        assert_eq!(between_pm_180(190.0), -170.0);
        assert_eq!(between_pm_180(-190.0), 170.0);
    }

    #[test]
    fn get_formatting() {
        assert_eq!(format_get(hhmmss(75, 49, 40.2)), "075:49:40");
        assert_eq!(format_get(hhmmss(2, 0, 59.6)), "002:01:00");
        assert_eq!(format_get_cs(hhmmss(137, 20, 0.25)), "137:20:00.25");
        assert_eq!(format_mmss(Unit::Second * 263), "04:23");
    }
}
