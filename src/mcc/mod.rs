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

//! The mission control sequencer.
//!
//! [`Mcc`] walks the mission timeline one tick at a time. Each mission state is sequenced by a [`Rule`]: most
//! states are a single crew update (run a calculation, hand its PAD and uplink over to the crew, wait for the
//! next trigger), a few are hand written sub-state sequences, and the abort states run their own sub-sequencer.
//! Everything the sequencer knows is plain data, so it can be checkpointed and restored between ticks.

use crate::engine::AstroEngine;
use crate::errors::MccError;
use crate::io::{duration_parts, ConfigRepr, MissionConfig};
use crate::rtcc::{CalcContext, CalcParams, ManeuverPlanTable, Pad, PadKind, Products, Rtcc, Uplink};
use crate::time::{Duration, Unit};
use crate::utils::format_get;
use crate::vehicle::VehicleService;
use serde_derive::{Deserialize, Serialize};

mod abort;
pub use abort::AbortMode;

mod compound;

mod state;
pub use state::{MissionPhase, MissionState};

mod step;
pub use step::{HandoffStep, Rule, StepRule, UplinkProtocol};

mod subthread;
pub use subthread::{Completion, Request, Subthread};

mod table;
pub use table::rule;

mod trigger;
pub use trigger::{Gate, Target, Trigger};

/// Operator or crew facing message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(with = "duration_parts")]
    pub get: Duration,
    pub text: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub get: Duration,
    pub from: MissionState,
    pub to: MissionState,
}

/// A calculation run on behalf of a mission state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dispatched {
    pub get: Duration,
    pub state: MissionState,
    pub code: u16,
    pub scrubbed: bool,
}

/// A response offered to the crew, such as "Ready for uplink"
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewOption {
    pub label: String,
    pub enabled: bool,
}

impl CrewOption {
    fn offer(&mut self, label: &str) {
        self.label = label.to_string();
        self.enabled = true;
    }

    fn withdraw(&mut self) {
        self.enabled = false;
    }
}

/// The durable state of the sequencer, taken between two ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub state: MissionState,
    pub sub_state: u8,
    #[serde(with = "duration_parts")]
    pub sub_state_start: Duration,
    pub phase: MissionPhase,
    pub abort_mode: Option<AbortMode>,
    pub params: CalcParams,
    pub mpt: ManeuverPlanTable,
    pub products: Products,
    pub subthread: Subthread,
    pub scrubbed: bool,
    pub positive: CrewOption,
    pub negative: CrewOption,
    pub pad_shown: bool,
    pub halted: bool,
}

impl ConfigRepr for Checkpoint {}

impl Checkpoint {
    pub fn to_yaml(&self) -> Result<String, MccError> {
        serde_yaml::to_string(self).map_err(|e| MccError::Checkpoint {
            reason: e.to_string(),
        })
    }

    pub fn from_yaml(data: &str) -> Result<Self, MccError> {
        Self::loads(data).map_err(|e| MccError::Checkpoint {
            reason: e.to_string(),
        })
    }
}

/// Mission control: the sequencer, its calculation slot and the crew hand-off buffers.
pub struct Mcc<E: AstroEngine> {
    rtcc: Rtcc<E>,
    config: MissionConfig,
    state: MissionState,
    sub_state: u8,
    sub_state_start: Duration,
    phase: MissionPhase,
    abort_mode: Option<AbortMode>,
    params: CalcParams,
    mpt: ManeuverPlanTable,
    products: Products,
    subthread: Subthread,
    /// Result of the last calculation collected in this state
    scrubbed: bool,
    positive: CrewOption,
    negative: CrewOption,
    pad_shown: bool,
    halted: bool,
    /// GET of the current tick
    get: Duration,
    messages: Vec<Message>,
    transitions: Vec<Transition>,
    dispatches: Vec<Dispatched>,
}

impl<E: AstroEngine> Mcc<E> {
    pub fn new(rtcc: Rtcc<E>, config: MissionConfig) -> Self {
        Self {
            rtcc,
            config,
            state: MissionState::Prelaunch,
            sub_state: 0,
            sub_state_start: Duration::ZERO,
            phase: MissionPhase::default(),
            abort_mode: None,
            params: CalcParams::default(),
            mpt: ManeuverPlanTable::default(),
            products: Products::default(),
            subthread: Subthread::default(),
            scrubbed: false,
            positive: CrewOption::default(),
            negative: CrewOption::default(),
            pad_shown: false,
            halted: false,
            get: Duration::ZERO,
            messages: Vec::new(),
            transitions: Vec::new(),
            dispatches: Vec::new(),
        }
    }

    /// Rebuilds a sequencer from a checkpoint. The GET of the checkpoint is unknown until the next tick.
    pub fn restore(rtcc: Rtcc<E>, config: MissionConfig, cp: Checkpoint) -> Result<Self, MccError> {
        let last = match rule(cp.state) {
            Some(rule) => rule.last_sub_state(),
            None => {
                return Err(MccError::Checkpoint {
                    reason: format!("{:?} is not sequenced", cp.state),
                })
            }
        };
        if cp.sub_state > last {
            return Err(MccError::Checkpoint {
                reason: format!("{:?} has no sub-state {}", cp.state, cp.sub_state),
            });
        }
        if matches!(cp.state, MissionState::Abort | MissionState::AbortOrbit) && cp.abort_mode.is_none() {
            return Err(MccError::Checkpoint {
                reason: format!("{:?} without an abort mode", cp.state),
            });
        }

        let mut mcc = Self::new(rtcc, config);
        mcc.state = cp.state;
        mcc.sub_state = cp.sub_state;
        mcc.sub_state_start = cp.sub_state_start;
        mcc.get = cp.sub_state_start;
        mcc.phase = cp.phase;
        mcc.abort_mode = cp.abort_mode;
        mcc.params = cp.params;
        mcc.mpt = cp.mpt;
        mcc.products = cp.products;
        mcc.subthread = cp.subthread;
        mcc.scrubbed = cp.scrubbed;
        mcc.positive = cp.positive;
        mcc.negative = cp.negative;
        mcc.pad_shown = cp.pad_shown;
        mcc.halted = cp.halted;
        info!("restored in {:?} sub-state {}", mcc.state, mcc.sub_state);
        Ok(mcc)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state,
            sub_state: self.sub_state,
            sub_state_start: self.sub_state_start,
            phase: self.phase,
            abort_mode: self.abort_mode,
            params: self.params.clone(),
            mpt: self.mpt.clone(),
            products: self.products.clone(),
            subthread: self.subthread.clone(),
            scrubbed: self.scrubbed,
            positive: self.positive.clone(),
            negative: self.negative.clone(),
            pad_shown: self.pad_shown,
            halted: self.halted,
        }
    }

    /// Runs one tick of the sequencer. Nothing in here fails: errors are logged and either stall the current step
    /// or halt the sequencer.
    pub fn advance(&mut self, vehicle: &mut dyn VehicleService) {
        if self.halted {
            return;
        }
        self.get = vehicle.get();

        match rule(self.state) {
            Some(Rule::Step(step)) => self.crew_update(vehicle, step),
            Some(Rule::Compound { .. }) => self.compound(vehicle),
            Some(Rule::Abort { .. }) => self.abort_sequence(vehicle),
            None => self.halt(format!("{:?} is not sequenced", self.state)),
        }
    }

    /// Crew response to the option currently offered: `true` for "Ready for uplink", `false` for "Repeat uplink" or
    /// to defer the uplink.
    pub fn crew_response(&mut self, positive: bool) {
        let (base, step) = match self.hand_off_position() {
            Some(position) => position,
            None => {
                debug!("crew response ignored in {:?}", self.state);
                return;
            }
        };

        match (step, positive) {
            (HandoffStep::AwaitCrew | HandoffStep::NotReady, true) if self.positive.enabled => {
                info!("crew ready for uplink");
                self.set_sub_state(base + HandoffStep::Transmit.offset());
            }
            (HandoffStep::AwaitCrew, false) if self.positive.enabled => {
                info!("crew not ready for uplink");
                self.set_sub_state(base + HandoffStep::NotReady.offset());
            }
            (HandoffStep::AwaitTrigger, false) if self.negative.enabled => {
                info!("crew requested the uplink again");
                self.set_sub_state(base + HandoffStep::Repeat.offset());
            }
            _ => debug!("crew response {positive} ignored in {step:?}"),
        }
    }

    /// Declares an abort. Any calculation in flight is dropped and the crew hand-off buffers are freed.
    pub fn declare_abort(&mut self, mode: AbortMode) {
        if let Some(code) = self.subthread.discard() {
            warn!("calculation {code} dropped by the abort");
        }
        self.add_message(format!("MCC: {mode} declared"));
        self.enter_abort(mode);
    }

    /// Shows the PAD currently held, if any
    pub fn show_pad(&mut self) {
        self.pad_shown = self.products.pad.is_some();
    }

    pub fn hide_pad(&mut self) {
        self.pad_shown = false;
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn sub_state(&self) -> u8 {
        self.sub_state
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    pub fn abort_mode(&self) -> Option<AbortMode> {
        self.abort_mode
    }

    pub fn params(&self) -> &CalcParams {
        &self.params
    }

    pub fn mpt(&self) -> &ManeuverPlanTable {
        &self.mpt
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn rtcc(&self) -> &Rtcc<E> {
        &self.rtcc
    }

    /// The PAD form currently held by the crew hand-off buffer
    pub fn pad_kind(&self) -> Option<PadKind> {
        self.products.pad_kind
    }

    pub fn pad(&self) -> Option<&Pad> {
        self.products.pad.as_ref()
    }

    pub fn pad_shown(&self) -> bool {
        self.pad_shown
    }

    /// The last uplink prepared, including the uplink of a scrubbed calculation, which is never sent
    pub fn uplink(&self) -> Option<&Uplink> {
        self.products.uplink.as_ref()
    }

    /// The label of the positive crew option, if offered
    pub fn positive_option(&self) -> Option<&str> {
        self.positive.enabled.then_some(self.positive.label.as_str())
    }

    /// The label of the negative crew option, if offered
    pub fn negative_option(&self) -> Option<&str> {
        self.negative.enabled.then_some(self.negative.label.as_str())
    }

    pub fn in_flight(&self) -> Option<u16> {
        self.subthread.in_flight()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn dispatches(&self) -> &[Dispatched] {
        &self.dispatches
    }

    fn crew_update(&mut self, vehicle: &mut dyn VehicleService, rule: &'static StepRule) {
        match HandoffStep::from_offset(self.sub_state) {
            Some(HandoffStep::AwaitTrigger) => {
                let target = match (&rule.alt, self.scrubbed) {
                    (Some((trigger, target)), true) => self.holds(trigger, vehicle).then_some(*target),
                    _ => self
                        .holds(&rule.ready, vehicle)
                        .then_some(Target::State(rule.next)),
                };
                if let Some(target) = target {
                    self.go(vehicle, target);
                }
            }
            Some(step) => self.hand_off(vehicle, step, rule.protocol, rule.pad, rule.code, 0),
            None => self.halt(format!("{:?} has no sub-state {}", self.state, self.sub_state)),
        }
    }

    /// Runs one step of the crew hand-off of calculation `code`, whose sub-states start at `base`.
    fn hand_off(
        &mut self,
        vehicle: &mut dyn VehicleService,
        step: HandoffStep,
        protocol: UplinkProtocol,
        pad: Option<PadKind>,
        code: u16,
        base: u8,
    ) {
        match step {
            HandoffStep::Dispatch => {
                if let Some(requested) = pad {
                    if let Some(held) = self.products.pad_kind {
                        self.halt(MccError::PadBufferBusy { held, requested }.to_string());
                        return;
                    }
                }
                if !self.issue_with_pad(code, pad, &*vehicle) {
                    return;
                }
                self.set_sub_state(base + HandoffStep::AwaitCalculation.offset());
            }
            HandoffStep::AwaitCalculation => {
                let scrubbed = match self.collect() {
                    Some(scrubbed) => scrubbed,
                    None => return,
                };
                self.scrubbed = scrubbed;
                if !self.products.message.is_empty() {
                    self.add_message(self.products.message.clone());
                }

                let next = if scrubbed {
                    self.free_pad();
                    HandoffStep::AwaitTrigger
                } else {
                    if protocol.has_pad() {
                        self.present_pad();
                    }
                    match protocol.computer() {
                        None => HandoffStep::AwaitTrigger,
                        Some(_) if self.products.uplink.is_none() => {
                            debug!("calculation {code} prepared no uplink");
                            HandoffStep::AwaitTrigger
                        }
                        Some(_) if protocol == UplinkProtocol::LgcUplinkDirect => HandoffStep::Transmit,
                        Some(_) => {
                            self.add_message("Ready for uplink?".to_string());
                            self.positive.offer("Ready for uplink");
                            HandoffStep::AwaitCrew
                        }
                    }
                };
                self.set_sub_state(base + next.offset());
            }
            HandoffStep::AwaitCrew | HandoffStep::NotReady | HandoffStep::AwaitTrigger => {}
            HandoffStep::Transmit => {
                if self.sub_state_time() <= Unit::Second * 1 {
                    return;
                }
                match self.products.uplink.clone() {
                    Some(uplink) => {
                        vehicle.transmit_uplink(&uplink);
                        self.positive.withdraw();
                        self.add_message(format!("Uplink: {}", uplink.description));
                        self.set_sub_state(base + HandoffStep::AwaitDrain.offset());
                    }
                    None => self.set_sub_state(base + HandoffStep::AwaitTrigger.offset()),
                }
            }
            HandoffStep::AwaitDrain => {
                let drained = match &self.products.uplink {
                    Some(uplink) => vehicle.uplink_drained(uplink.computer),
                    None => true,
                };
                if drained {
                    self.add_message("Uplink completed!".to_string());
                    self.negative.offer("Repeat uplink");
                    self.set_sub_state(base + HandoffStep::AwaitTrigger.offset());
                }
            }
            HandoffStep::Repeat => {
                self.negative.withdraw();
                self.free_pad();
                self.set_sub_state(base + HandoffStep::Dispatch.offset());
            }
        }
    }

    /// Base sub-state and step of the crew hand-off under way, if any
    fn hand_off_position(&self) -> Option<(u8, HandoffStep)> {
        match rule(self.state)? {
            Rule::Step(_) => HandoffStep::from_offset(self.sub_state).map(|step| (0, step)),
            Rule::Abort { .. }
                if self.abort_mode == Some(AbortMode::Translunar)
                    && self.sub_state >= abort::ABORT_HANDOFF_BASE =>
            {
                HandoffStep::from_offset(self.sub_state - abort::ABORT_HANDOFF_BASE)
                    .map(|step| (abort::ABORT_HANDOFF_BASE, step))
            }
            _ => None,
        }
    }

    /// Issues a ground only calculation. Returns whether it was issued.
    fn issue(&mut self, code: u16, vehicle: &dyn VehicleService) -> bool {
        self.issue_with_pad(code, None, vehicle)
    }

    /// Reserves the calculation slot, allocates the PAD buffer and runs calculation `code` on a copy of the mission
    /// parameters. Nothing it wrote is applied until a later tick collects it. Returns whether the calculation was
    /// issued.
    fn issue_with_pad(&mut self, code: u16, pad: Option<PadKind>, vehicle: &dyn VehicleService) -> bool {
        if let Err(e) = self.subthread.issue(code, self.state) {
            error!("{e}");
            return false;
        }
        self.products = match pad {
            Some(kind) => Products::with_pad(kind),
            None => Products::default(),
        };

        let mut params = self.params.clone();
        let mut mpt = self.mpt.clone();
        let mut products = self.products.clone();
        let ctx = CalcContext {
            params: &mut params,
            mpt: &mut mpt,
            vehicle,
            config: &self.config,
        };
        let scrubbed = self.rtcc.dispatch(code, ctx, &mut products);
        self.subthread.complete(Completion {
            scrubbed,
            params,
            mpt,
            products,
        });
        self.dispatches.push(Dispatched {
            get: self.get,
            state: self.state,
            code,
            scrubbed,
        });
        true
    }

    /// Applies the result of the calculation issued by this state, once at least a second has passed. Returns
    /// whether it was scrubbed.
    fn collect(&mut self) -> Option<bool> {
        if self.sub_state_time() <= Unit::Second * 1 {
            return None;
        }
        let done = self.subthread.collect(self.state)?;
        self.params = done.params;
        self.mpt = done.mpt;
        self.products = done.products;
        Some(done.scrubbed)
    }

    fn present_pad(&mut self) {
        if let Some(pad) = &self.products.pad {
            let text = format!("New {:?} PAD", pad.kind());
            self.pad_shown = self.config.pad_auto_show;
            self.add_message(text);
        }
    }

    fn free_pad(&mut self) {
        self.products.pad_kind = None;
        self.products.pad = None;
        self.pad_shown = false;
    }

    fn holds(&self, trigger: &Trigger, vehicle: &dyn VehicleService) -> bool {
        trigger.holds(&Gate::new(vehicle, &self.params, self.sub_state_start))
    }

    fn sub_state_time(&self) -> Duration {
        self.get - self.sub_state_start
    }

    fn go(&mut self, vehicle: &mut dyn VehicleService, target: Target) {
        vehicle.slow_if_desired();
        match target {
            Target::State(state) => self.set_state(state),
            Target::Abort(mode) => {
                self.add_message(format!("MCC: {mode} required"));
                self.enter_abort(mode);
            }
        }
    }

    fn enter_abort(&mut self, mode: AbortMode) {
        self.abort_mode = Some(mode);
        self.set_state(mode.state());
    }

    fn set_state(&mut self, to: MissionState) {
        info!("{} {:?} -> {:?}", format_get(self.get), self.state, to);
        self.transitions.push(Transition {
            get: self.get,
            from: self.state,
            to,
        });
        self.state = to;
        self.sub_state = 0;
        self.sub_state_start = self.get;
        self.scrubbed = false;
        self.products = Products::default();
        self.pad_shown = false;
        self.positive.withdraw();
        self.negative.withdraw();
    }

    fn set_sub_state(&mut self, sub_state: u8) {
        debug!("{:?} sub-state {} -> {sub_state}", self.state, self.sub_state);
        self.sub_state = sub_state;
        self.sub_state_start = self.get;
    }

    fn set_phase(&mut self, phase: MissionPhase) {
        if self.phase != phase {
            info!("mission phase: {phase}");
            self.phase = phase;
        }
    }

    fn add_message(&mut self, text: String) {
        info!("{} {text}", format_get(self.get));
        self.messages.push(Message { get: self.get, text });
    }

    /// Stops the sequencer for good. Only restoring a checkpoint brings it back.
    fn halt(&mut self, reason: String) {
        error!("sequencer halted in {:?}: {reason}", self.state);
        self.halted = true;
        self.add_message(format!("MCC halted: {reason}"));
    }
}
