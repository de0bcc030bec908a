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

//! The mission timeline: one rule per mission state.

use super::{AbortMode, MissionState, Rule, StepRule, Target, Trigger, UplinkProtocol};
use crate::rtcc::{MissionEpoch as E, PadKind as P};
use crate::time::{Duration, Unit};
use crate::utils::hhmmss;
use crate::vehicle::{DockingPort, Stage};
use lazy_static::lazy_static;
use std::collections::HashMap;

fn step(
    protocol: UplinkProtocol,
    pad: Option<P>,
    code: u16,
    ready: Trigger,
    next: MissionState,
) -> StepRule {
    StepRule {
        protocol,
        pad,
        code,
        ready,
        next,
        alt: None,
    }
}

fn ground(code: u16, ready: Trigger, next: MissionState) -> StepRule {
    step(UplinkProtocol::None, None, code, ready, next)
}

fn pad_only(pad: P, code: u16, ready: Trigger, next: MissionState) -> StepRule {
    step(UplinkProtocol::PadOnly, Some(pad), code, ready, next)
}

fn pad_cmc(pad: P, code: u16, ready: Trigger, next: MissionState) -> StepRule {
    step(UplinkProtocol::PadWithCmcUplink, Some(pad), code, ready, next)
}

fn pad_lgc(pad: P, code: u16, ready: Trigger, next: MissionState) -> StepRule {
    step(UplinkProtocol::PadWithLgcUplink, Some(pad), code, ready, next)
}

fn cmc(code: u16, ready: Trigger, next: MissionState) -> StepRule {
    step(UplinkProtocol::CmcUplinkOnly, None, code, ready, next)
}

fn lgc(code: u16, ready: Trigger, next: MissionState) -> StepRule {
    step(UplinkProtocol::LgcUplinkOnly, None, code, ready, next)
}

/// LGC uplink sent as soon as it is computed, without waiting for the crew
fn lgc_direct(code: u16, ready: Trigger, next: MissionState) -> StepRule {
    step(UplinkProtocol::LgcUplinkDirect, None, code, ready, next)
}

/// Path taken instead of `next` when the calculation was scrubbed
fn or_if_scrubbed(mut rule: StepRule, trigger: Trigger, target: Target) -> StepRule {
    rule.alt = Some((trigger, target));
    rule
}

fn minutes(minutes: i64) -> Duration {
    minutes * Unit::Minute
}

fn dwell(m: i64) -> Trigger {
    Trigger::Dwell(minutes(m))
}

fn after(epoch: E, offset: Duration) -> Trigger {
    Trigger::After(epoch, offset)
}

fn rev(rev: u32, m: i64) -> Trigger {
    Trigger::MoonRev {
        rev,
        time_in_rev: minutes(m),
    }
}

fn build() -> HashMap<MissionState, Rule> {
    use MissionState::*;

    let steps = vec![
        // Earth orbit
        (MissionInit, ground(1, Trigger::At(minutes(10)), TliSimulation)),
        (TliSimulation, ground(2, dwell(2), TliAbortPad)),
        (TliAbortPad, pad_cmc(P::Maneuver, 3, dwell(5), TliBlockData)),
        (TliBlockData, pad_only(P::BlockData, 4, dwell(5), TliPad)),
        (TliPad, pad_only(P::Tli, 5, after(E::Tli, minutes(10)), TliEvaluation)),
        (
            TliEvaluation,
            or_if_scrubbed(
                ground(6, Trigger::Always, TliConfirm),
                Trigger::At(3 * Unit::Hour),
                Target::State(TliSimulation),
            ),
        ),
        // Translunar coast
        (EvasivePad, pad_only(P::Maneuver, 7, dwell(5), SivbEvasive)),
        (PtcRefsmmat, cmc(10, dwell(10), BlockData1)),
        (BlockData1, pad_only(P::BlockData, 8, after(E::Tli, 5 * Unit::Hour), Mcc1Evaluation)),
        (
            Mcc1Evaluation,
            or_if_scrubbed(
                ground(11, Trigger::Always, Mcc1),
                after(E::Tli, 11 * Unit::Hour),
                Target::State(BlockData2),
            ),
        ),
        (Mcc1, pad_cmc(P::Maneuver, 12, after(E::Tli, 11 * Unit::Hour), BlockData2)),
        (BlockData2, pad_only(P::BlockData, 9, after(E::Tli, 21 * Unit::Hour), Mcc2)),
        (Mcc2, pad_cmc(P::Maneuver, 13, after(E::Loi, -40 * Unit::Hour), FlybyPad)),
        (FlybyPad, pad_only(P::Maneuver, 14, after(E::Loi, -hhmmss(23, 30, 0.0)), Mcc3)),
        (Mcc3, pad_cmc(P::Maneuver, 15, after(E::Loi, -8 * Unit::Hour), Mcc4)),
        (Mcc4, pad_cmc(P::Maneuver, 16, after(E::Loi, -4 * Unit::Hour), Pc2Pad)),
        (Pc2Pad, pad_only(P::Maneuver, 17, after(E::Loi, -hhmmss(2, 20, 0.0)), Loi1Preliminary)),
        (Loi1Preliminary, pad_only(P::Maneuver, 20, dwell(5), Tei1)),
        (Tei1, pad_only(P::Maneuver, 30, dwell(5), Tei4)),
        (Tei4, pad_only(P::Maneuver, 31, after(E::Loi, minutes(-60)), Rev1Map)),
        (Rev1Map, pad_only(P::MapUpdate, 40, dwell(5), Loi1)),
        (Loi1, pad_cmc(P::Maneuver, 21, after(E::TimeOfIgnition, minutes(7)), Loi1Evaluation)),
        (
            Loi1Evaluation,
            or_if_scrubbed(
                ground(23, Trigger::Always, LunarOrbitBegin),
                Trigger::Always,
                Target::Abort(AbortMode::Translunar),
            ),
        ),
        // Lunar orbit
        (Rev2Map, pad_only(P::MapUpdate, 41, dwell(5), Tei5)),
        (Tei5, pad_only(P::Maneuver, 32, dwell(5), Loi2)),
        (Loi2, pad_cmc(P::Maneuver, 22, rev(2, 60), Rev3Map)),
        (Rev3Map, pad_only(P::MapUpdate, 42, dwell(5), Tei10)),
        (Tei10, pad_only(P::Maneuver, 33, rev(3, 30), Rev4Map)),
        (Rev4Map, pad_only(P::MapUpdate, 43, dwell(5), LandmarkF1)),
        (LandmarkF1, pad_only(P::Landmark, 50, dwell(5), LandmarkB1)),
        (LandmarkB1, pad_only(P::Landmark, 51, rev(10, 30), Rev11Map)),
        (Rev11Map, pad_only(P::MapUpdate, 44, dwell(5), Landmark130)),
        (Landmark130, pad_only(P::Landmark, 52, rev(11, 10), LlsRefsmmat)),
        // LM activation, descent rehearsal and rendezvous
        (LlsRefsmmat, cmc(60, dwell(10), LgcActivation)),
        (LgcActivation, lgc(64, dwell(5), AgsActivation)),
        (AgsActivation, pad_only(P::Generic, 65, dwell(5), CsmDap)),
        (CsmDap, pad_only(P::Dap, 61, dwell(5), LmDap)),
        (LmDap, pad_only(P::Dap, 62, dwell(5), GyroTorquing)),
        (GyroTorquing, pad_only(P::Torquing, 63, dwell(5), Separation)),
        (Separation, pad_cmc(P::Maneuver, 70, dwell(5), Doi)),
        (Doi, pad_lgc(P::LmManeuver, 71, dwell(5), PhasingPreliminary)),
        (PhasingPreliminary, pad_only(P::LmManeuver, 72, dwell(5), PdiAbort)),
        (PdiAbort, pad_only(P::LmManeuver, 74, dwell(5), Tei22)),
        (Tei22, pad_only(P::Maneuver, 34, after(E::Doi, minutes(10)), Phasing)),
        (Phasing, pad_only(P::LmManeuver, 73, dwell(5), LmStateVector)),
        (LmStateVector, lgc_direct(102, dwell(5), BackupInsertionPreliminary)),
        (
            BackupInsertionPreliminary,
            pad_only(P::Maneuver, 75, after(E::Phasing, minutes(30)), InsertionPreliminary),
        ),
        (
            InsertionPreliminary,
            pad_only(P::LmManeuver, 77, after(E::Insertion, minutes(-20)), BackupInsertion),
        ),
        (BackupInsertion, pad_cmc(P::Maneuver, 76, dwell(3), Insertion)),
        (Insertion, pad_cmc(P::LmManeuver, 78, after(E::Insertion, minutes(10)), Csi)),
        (Csi, pad_only(P::Csi, 79, dwell(10), RendezvousStateVectors)),
        (
            RendezvousStateVectors,
            cmc(
                101,
                Trigger::All(vec![
                    Trigger::Docked(DockingPort::CsmForward),
                    after(E::Tpi, minutes(30)),
                ]),
                LmWeight,
            ),
        ),
        (LmWeight, pad_only(P::Generic, 80, dwell(5), ApsDepletion)),
        (
            ApsDepletion,
            pad_lgc(
                P::LmManeuver,
                81,
                Trigger::All(vec![
                    Trigger::Undocked(DockingPort::CsmForward),
                    after(E::Tpi, hhmmss(2, 30, 0.0)),
                ]),
                CsmStateVector,
            ),
        ),
        (CsmStateVector, cmc(100, rev(21, 60), Rev22Map)),
        // Lunar orbit after the rendezvous
        (Rev22Map, pad_only(P::MapUpdate, 45, dwell(5), Tei23)),
        (Tei23, pad_only(P::Maneuver, 35, rev(22, 30), Rev23Map)),
        (Rev23Map, pad_only(P::MapUpdate, 46, dwell(5), Lls2Photo)),
        (Lls2Photo, pad_only(P::Generic, 200, dwell(5), VerticalStereo)),
        (VerticalStereo, pad_only(P::Generic, 201, rev(23, 30), Rev24Map)),
        (Rev24Map, pad_only(P::MapUpdate, 47, dwell(5), Tei24)),
        (Tei24, pad_only(P::Maneuver, 36, dwell(5), Landmark24)),
        (Landmark24, pad_only(P::Landmark, 53, rev(24, 30), Rev25Map)),
        (Rev25Map, pad_only(P::MapUpdate, 48, dwell(5), Tei25)),
        (Tei25, pad_only(P::Maneuver, 37, dwell(5), Landmark25)),
        (Landmark25, pad_only(P::Landmark, 54, rev(25, 30), Rev26Map)),
        (Rev26Map, pad_only(P::MapUpdate, 49, dwell(5), Tei26)),
        (Tei26, pad_only(P::Maneuver, 38, dwell(5), Landmark26)),
        (Landmark26, pad_only(P::Landmark, 55, rev(26, 30), Rev27Map)),
        (Rev27Map, pad_only(P::MapUpdate, 140, dwell(5), Tei27)),
        (Tei27, pad_only(P::Maneuver, 39, dwell(5), Landmark27)),
        (Landmark27, pad_only(P::Landmark, 56, dwell(5), TvUpdate)),
        (TvUpdate, pad_only(P::Generic, 204, rev(28, 30), Rev29Map)),
        (Rev29Map, pad_only(P::MapUpdate, 141, dwell(5), Tei29)),
        (Tei29, pad_only(P::Maneuver, 130, rev(29, 30), Rev30Map)),
        (Rev30Map, pad_only(P::MapUpdate, 142, dwell(5), Tei30)),
        (Tei30, pad_only(P::Maneuver, 131, dwell(5), Landmark28)),
        (Landmark28, pad_only(P::Landmark, 57, dwell(5), Lls3Photo)),
        (Lls3Photo, pad_only(P::Generic, 202, rev(30, 30), Rev31Map)),
        (Rev31Map, pad_only(P::MapUpdate, 143, dwell(5), DescentStrip)),
        (DescentStrip, pad_only(P::Generic, 203, dwell(5), Tei31Preliminary)),
        (Tei31Preliminary, pad_only(P::Maneuver, 132, dwell(5), Tei32)),
        (Tei32, pad_only(P::Maneuver, 134, after(E::Tei, -hhmmss(1, 30, 0.0)), TeiMap)),
        (TeiMap, pad_only(P::MapUpdate, 144, dwell(5), Tei31)),
        (Tei31, pad_cmc(P::Maneuver, 133, after(E::Tei, minutes(5)), TransearthBegin)),
        // Transearth coast
        (TransearthStateVector, cmc(103, after(E::Tei, 14 * Unit::Hour), Mcc5)),
        (Mcc5, pad_cmc(P::Maneuver, 90, after(E::Ei, -24 * Unit::Hour), Mcc6Preliminary)),
        (Mcc6Preliminary, pad_cmc(P::Maneuver, 91, dwell(5), EntryPadNoMcc6)),
        (EntryPadNoMcc6, pad_only(P::Entry, 96, after(E::Ei, -16 * Unit::Hour), Mcc6)),
        (Mcc6, pad_cmc(P::Maneuver, 92, dwell(5), EntryPadMcc6)),
        (EntryPadMcc6, pad_only(P::Entry, 97, after(E::Ei, -6 * Unit::Hour), Mcc7Decision)),
        (
            Mcc7Decision,
            or_if_scrubbed(
                pad_only(P::Maneuver, 93, after(E::Ei, -hhmmss(4, 35, 0.0)), Mcc7),
                after(E::Ei, minutes(-45)),
                Target::State(FinalEntryPad),
            ),
        ),
        (Mcc7, pad_cmc(P::Maneuver, 94, dwell(5), EntryPadMcc7)),
        (EntryPadMcc7, pad_only(P::Entry, 98, after(E::Ei, minutes(-45)), FinalEntryPad)),
        (FinalEntryPad, pad_cmc(P::Entry, 99, Trigger::StageAtLeast(Stage::Cm), Entry)),
    ];

    let mut rules: HashMap<MissionState, Rule> = steps
        .into_iter()
        .map(|(state, rule)| (state, Rule::Step(rule)))
        .collect();

    let compound: [(MissionState, u8); 8] = [
        (Prelaunch, 0),
        (TliConfirm, 1),
        (SivbEvasive, 3),
        (SivbTimebase8, 1),
        (LunarOrbitBegin, 1),
        (TransearthBegin, 1),
        (Entry, 1),
        (Landing, 1),
    ];
    for (state, last_sub_state) in compound {
        rules.insert(state, Rule::Compound { last_sub_state });
    }
    rules.insert(AbortOrbit, Rule::Abort { last_sub_state: 0 });
    rules.insert(Abort, Rule::Abort { last_sub_state: 14 });

    rules
}

lazy_static! {
    static ref RULES: HashMap<MissionState, Rule> = build();
}

/// The rule sequencing a mission state
pub fn rule(state: MissionState) -> Option<&'static Rule> {
    RULES.get(&state)
}
