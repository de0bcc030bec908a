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

use crate::cosmic::AstroError;
use crate::engine::{AstroEngine, EngineError};
use crate::io::MissionConfig;
use crate::vehicle::{Computer, Vehicle, VehicleService};
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;

mod catalog;
pub use catalog::{codes, lookup, CatalogEntry, RecipeFamily};

mod mpt;
pub use mpt::{ConfigChange, ManeuverPlanTable, PlannedManeuver};

mod pad;
pub use pad::*;

mod params;
pub use params::{CalcParams, MissionEpoch};

mod uplink;
pub use uplink::{Uplink, UplinkSegment};

mod recipes;
pub(crate) use recipes::Workspace;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RtccError {
    #[snafu(display("no calculation has function code {code}"))]
    UnknownCode { code: u16 },
    #[snafu(display("calculation {code} produced a {produced:?} PAD in a {allocated:?} buffer"))]
    PadMismatch {
        code: u16,
        allocated: PadKind,
        produced: PadKind,
    },
    #[snafu(display("no maneuver #{index} in a plan table of {len}"))]
    ManeuverIndex { index: usize, len: usize },
    #[snafu(display("astrodynamics engine failed: {source}"))]
    Engine { source: EngineError },
    #[snafu(display("orbital elements failed: {source}"))]
    Astro { source: AstroError },
}

/// What a single recipe produced. Either everything a crew product needs, or a scrub.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Calculation {
    pub pad: Option<Pad>,
    pub uplink: Option<Uplink>,
    pub message: Option<String>,
    pub scrubbed: bool,
}

impl Calculation {
    /// A calculation which only updated the mission parameters
    pub fn nothing() -> Self {
        Self::default()
    }

    pub fn pad(pad: Pad) -> Self {
        Self {
            pad: Some(pad),
            ..Default::default()
        }
    }

    pub fn uplink(uplink: Uplink) -> Self {
        Self {
            uplink: Some(uplink),
            ..Default::default()
        }
    }

    /// A scrub of the named maneuver, with the uplink prepared in its place (if any)
    pub fn scrub(name: &str, uplink: Option<Uplink>) -> Self {
        Self {
            pad: None,
            uplink,
            message: Some(format!("{name} has been scrubbed.")),
            scrubbed: true,
        }
    }

    pub fn with_uplink(mut self, uplink: Uplink) -> Self {
        self.uplink = Some(uplink);
        self
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// The exchange buffers shared by the sequencer and the dispatcher.
///
/// The sequencer allocates the PAD slot (`pad_kind`) before dispatching; the dispatcher fills the PAD, the uplink
/// and the operator message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Products {
    pub pad_kind: Option<PadKind>,
    pub pad: Option<Pad>,
    pub uplink: Option<Uplink>,
    /// Operator message, empty if none
    pub message: String,
}

impl Products {
    /// Products with a PAD slot allocated for the provided form
    pub fn with_pad(kind: PadKind) -> Self {
        Self {
            pad_kind: Some(kind),
            ..Default::default()
        }
    }

    fn clear_outputs(&mut self) {
        self.pad = None;
        self.uplink = None;
        self.message.clear();
    }
}

/// Everything a calculation may read or write, lent by the sequencer for the duration of one dispatch.
pub struct CalcContext<'a> {
    pub params: &'a mut CalcParams,
    pub mpt: &'a mut ManeuverPlanTable,
    pub vehicle: &'a dyn VehicleService,
    pub config: &'a MissionConfig,
}

/// The Real Time Computer Complex: a command processor over the numbered calculations of the mission.
pub struct Rtcc<E: AstroEngine> {
    engine: E,
}

impl<E: AstroEngine> Rtcc<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs calculation `code` and fills the products. Returns whether the underlying maneuver is scrubbed.
    ///
    /// The mission parameters and the maneuver plan table are only written if the recipe completes. If the
    /// astrodynamics engine fails, the products fall back to a state vector only uplink with a message, and the
    /// calculation is reported as scrubbed. An unknown code or a PAD of the wrong shape is reported as a scrub
    /// with nothing to uplink.
    pub fn dispatch(&self, code: u16, ctx: CalcContext<'_>, out: &mut Products) -> bool {
        out.clear_outputs();

        let entry = match lookup(code) {
            Some(entry) => entry,
            None => {
                let err = RtccError::UnknownCode { code };
                error!("{err}");
                out.message = format!("Calculation {code} is not available.");
                return true;
            }
        };

        debug!("dispatching {code} ({})", entry.name);

        let mut ws = Workspace {
            engine: &self.engine,
            params: ctx.params.clone(),
            mpt: ctx.mpt.clone(),
            vehicle: ctx.vehicle,
            config: ctx.config,
        };

        match (entry.recipe)(code, &mut ws) {
            Ok(calc) => {
                if let (Some(pad), Some(allocated)) = (&calc.pad, out.pad_kind) {
                    if pad.kind() != allocated {
                        let err = RtccError::PadMismatch {
                            code,
                            allocated,
                            produced: pad.kind(),
                        };
                        error!("{err}");
                        out.message = format!("{} could not be formatted.", entry.name);
                        return true;
                    }
                }

                *ctx.params = ws.params;
                *ctx.mpt = ws.mpt;

                if calc.scrubbed {
                    info!("{} scrubbed", entry.name);
                } else if out.pad_kind.is_some() {
                    out.pad = calc.pad;
                } else if calc.pad.is_some() {
                    debug!("{}: no PAD buffer allocated, PAD dropped", entry.name);
                }
                out.uplink = calc.uplink;
                if let Some(message) = calc.message {
                    out.message = message;
                }
                calc.scrubbed
            }
            Err(err) => {
                warn!("{} failed: {err}", entry.name);
                let (vehicle, computer) = match entry.pad {
                    Some(PadKind::LmManeuver) | Some(PadKind::Csi) => (Vehicle::Lm, Computer::Lgc),
                    _ => (Vehicle::Csm, Computer::Cmc),
                };
                let description = match vehicle {
                    Vehicle::Csm => "CSM state vector",
                    Vehicle::Lm => "LM state vector",
                };
                out.uplink = Some(Uplink::new(computer, description).with(
                    UplinkSegment::StateVector {
                        slot: vehicle,
                        sv: ctx.vehicle.state_vector(vehicle),
                    },
                ));
                out.message = format!(
                    "{} could not be computed ({err}), {} only.",
                    entry.name,
                    description.to_lowercase()
                );
                true
            }
        }
    }
}
