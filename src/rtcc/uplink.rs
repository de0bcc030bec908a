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

use crate::cosmic::{Body, StateVector};
use crate::io::duration_parts;
use crate::linalg::{Matrix3, Vector3};
use crate::time::Duration;
use crate::vehicle::{Computer, Vehicle};
use serde_derive::{Deserialize, Serialize};
use std::fmt::Write;

/// Erasable addresses of the uplinked quantities
const ADDR_CSM_STATE: u16 = 0o1501;
const ADDR_LM_STATE: u16 = 0o1521;
const ADDR_EXTERNAL_DV: u16 = 0o3404;
const ADDR_ENTRY_TARGET: u16 = 0o3400;
const ADDR_REFSMMAT: u16 = 0o1735;
const ADDR_DESIRED_REFSMMAT: u16 = 0o306;
const ADDR_TLAND: u16 = 0o2400;

/// Largest magnitude of a double precision fraction, 28 bits.
const DP_FULL_SCALE: f64 = 268_435_456.0;

/// One independently formatted block of an uplink payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UplinkSegment {
    /// State vector loaded in the CSM or LM slot of the target computer
    StateVector { slot: Vehicle, sv: StateVector },
    /// P30 external delta-V target load
    ExternalDeltaV {
        #[serde(with = "duration_parts")]
        tig: Duration,
        dv_lvlh_m_s: Vector3<f64>,
    },
    /// P30 target load with the splash point of the return
    RetrofireDeltaV {
        latitude_deg: f64,
        longitude_deg: f64,
        #[serde(with = "duration_parts")]
        tig: Duration,
        dv_lvlh_m_s: Vector3<f64>,
    },
    EntryTarget { latitude_deg: f64, longitude_deg: f64 },
    /// Either the current REFSMMAT or the desired one, loaded for a later realignment
    Refsmmat { matrix: Matrix3<f64>, desired: bool },
    /// Increment of the computer clock
    ClockIncrement {
        #[serde(with = "duration_parts")]
        delta: Duration,
    },
    /// Predicted touchdown time (TLAND)
    LandingTime {
        #[serde(with = "duration_parts")]
        get: Duration,
    },
    /// Keystroke copying the CSM state vector to the LM slot
    V66,
}

/// Splits a value into two ones-complement 14 bit halves of a double precision word.
fn dp_words(value: f64, scale: f64) -> [u16; 2] {
    let fraction = (value / scale).clamp(-1.0, 1.0);
    let magnitude = ((fraction.abs() * DP_FULL_SCALE).round() as u32).min(0x0FFF_FFFF);
    let mut words = [(magnitude >> 14) as u16, (magnitude & 0x3FFF) as u16];
    if fraction < 0.0 {
        for word in words.iter_mut() {
            *word ^= 0x7FFF;
        }
    }
    words
}

fn centiseconds(duration: Duration) -> f64 {
    duration.to_seconds() * 100.0
}

fn revolutions(angle_deg: f64) -> f64 {
    angle_deg / 360.0
}

/// Renders a V71 block: count, address, then each data word.
fn v71(address: u16, words: &[u16]) -> String {
    let mut block = format!("V71E{:o}E{:o}E", words.len() + 2, address);
    for word in words {
        // Writing to a String cannot fail
        let _ = write!(block, "{word:05o}E");
    }
    block.push_str("V33E");
    block
}

impl UplinkSegment {
    /// Renders this segment as the keystrokes of an octal V71 load
    pub fn render(&self) -> String {
        match self {
            Self::StateVector { slot, sv } => {
                // Position and velocity scaling depend on the sphere of influence
                let (r_scale, v_scale) = match sv.body {
                    Body::Earth => (2f64.powi(29), 2f64.powi(7)),
                    Body::Moon => (2f64.powi(27), 2f64.powi(5)),
                };
                let flag = match sv.body {
                    Body::Earth => 1,
                    Body::Moon => 2,
                };
                let mut words = vec![flag];
                for r in sv.radius_m.iter() {
                    words.extend(dp_words(*r, r_scale));
                }
                for v in sv.velocity_m_s.iter() {
                    // m/cs
                    words.extend(dp_words(*v / 100.0, v_scale));
                }
                words.extend(dp_words(centiseconds(sv.get), 2f64.powi(28)));
                let address = match slot {
                    Vehicle::Csm => ADDR_CSM_STATE,
                    Vehicle::Lm => ADDR_LM_STATE,
                };
                v71(address, &words)
            }
            Self::ExternalDeltaV { tig, dv_lvlh_m_s } => {
                let mut words = Vec::with_capacity(8);
                for dv in dv_lvlh_m_s.iter() {
                    words.extend(dp_words(*dv / 100.0, 2f64.powi(7)));
                }
                words.extend(dp_words(centiseconds(*tig), 2f64.powi(28)));
                v71(ADDR_EXTERNAL_DV, &words)
            }
            Self::RetrofireDeltaV {
                latitude_deg,
                longitude_deg,
                tig,
                dv_lvlh_m_s,
            } => {
                let mut words = Vec::with_capacity(12);
                words.extend(dp_words(revolutions(*latitude_deg), 1.0));
                words.extend(dp_words(revolutions(*longitude_deg), 1.0));
                for dv in dv_lvlh_m_s.iter() {
                    words.extend(dp_words(*dv / 100.0, 2f64.powi(7)));
                }
                words.extend(dp_words(centiseconds(*tig), 2f64.powi(28)));
                v71(ADDR_ENTRY_TARGET, &words)
            }
            Self::EntryTarget {
                latitude_deg,
                longitude_deg,
            } => {
                let mut words = Vec::with_capacity(4);
                words.extend(dp_words(revolutions(*latitude_deg), 1.0));
                words.extend(dp_words(revolutions(*longitude_deg), 1.0));
                v71(ADDR_ENTRY_TARGET, &words)
            }
            Self::Refsmmat { matrix, desired } => {
                let mut words = Vec::with_capacity(18);
                // Row major, as stored onboard
                for row in matrix.row_iter() {
                    for element in row.iter() {
                        words.extend(dp_words(*element, 2.0));
                    }
                }
                let address = if *desired {
                    ADDR_DESIRED_REFSMMAT
                } else {
                    ADDR_REFSMMAT
                };
                v71(address, &words)
            }
            Self::ClockIncrement { delta } => {
                let [hi, lo] = dp_words(centiseconds(*delta), 2f64.powi(28));
                format!("V73E{hi:05o}E{lo:05o}EV33E")
            }
            Self::LandingTime { get } => {
                v71(ADDR_TLAND, &dp_words(centiseconds(*get), 2f64.powi(28)))
            }
            Self::V66 => "V66E".to_string(),
        }
    }

    /// Whether this segment loads a maneuver target
    pub fn is_target_load(&self) -> bool {
        matches!(
            self,
            Self::ExternalDeltaV { .. } | Self::RetrofireDeltaV { .. }
        )
    }
}

/// An uplink payload: the ordered concatenation of independently formatted segments, for one computer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Uplink {
    pub computer: Computer,
    /// Human readable summary, e.g. "CSM state vector and V66, target load"
    pub description: String,
    pub segments: Vec<UplinkSegment>,
}

impl Uplink {
    pub fn new(computer: Computer, description: &str) -> Self {
        Self {
            computer,
            description: description.to_string(),
            segments: Vec::new(),
        }
    }

    /// Builder style append of a segment
    pub fn with(mut self, segment: UplinkSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn push(&mut self, segment: UplinkSegment) {
        self.segments.push(segment);
    }

    /// Renders the full payload, segment after segment
    pub fn render(&self) -> String {
        self.segments.iter().map(|seg| seg.render()).collect()
    }

    pub fn has_target_load(&self) -> bool {
        self.segments.iter().any(|seg| seg.is_target_load())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
