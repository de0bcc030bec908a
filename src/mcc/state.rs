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


use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Coarse mission phase, read by the displays and the telemetry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
pub enum MissionPhase {
    #[default]
    EarthOrbit,
    TranslunarCoast,
    LunarOrbit,
    TransearthCoast,
    Entry,
    Recovery,
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::EarthOrbit => "Earth orbit",
            Self::TranslunarCoast => "Translunar coast",
            Self::LunarOrbit => "Lunar orbit",
            Self::TransearthCoast => "Transearth coast",
            Self::Entry => "Entry",
            Self::Recovery => "Recovery",
        };
        write!(f, "{name}")
    }
}

/// One value per step of the mission timeline, in flight order, followed by the abort branches.
///
/// Most states are a single crew update: entering the state runs its calculation, and the state is left once the
/// update was handed to the crew and the trigger of the next update fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
pub enum MissionState {
    Prelaunch,
    MissionInit,
    TliSimulation,
    TliAbortPad,
    TliBlockData,
    TliPad,
    TliEvaluation,
    TliConfirm,
    EvasivePad,
    SivbEvasive,
    SivbTimebase8,
    PtcRefsmmat,
    BlockData1,
    Mcc1Evaluation,
    Mcc1,
    BlockData2,
    Mcc2,
    FlybyPad,
    Mcc3,
    Mcc4,
    Pc2Pad,
    Loi1Preliminary,
    Tei1,
    Tei4,
    Rev1Map,
    Loi1,
    Loi1Evaluation,
    LunarOrbitBegin,
    Rev2Map,
    Tei5,
    Loi2,
    Rev3Map,
    Tei10,
    Rev4Map,
    LandmarkF1,
    LandmarkB1,
    Rev11Map,
    Landmark130,
    LlsRefsmmat,
    LgcActivation,
    AgsActivation,
    CsmDap,
    LmDap,
    GyroTorquing,
    Separation,
    Doi,
    PhasingPreliminary,
    PdiAbort,
    Tei22,
    Phasing,
    LmStateVector,
    BackupInsertionPreliminary,
    InsertionPreliminary,
    BackupInsertion,
    Insertion,
    Csi,
    RendezvousStateVectors,
    LmWeight,
    ApsDepletion,
    CsmStateVector,
    Rev22Map,
    Tei23,
    Rev23Map,
    Lls2Photo,
    VerticalStereo,
    Rev24Map,
    Tei24,
    Landmark24,
    Rev25Map,
    Tei25,
    Landmark25,
    Rev26Map,
    Tei26,
    Landmark26,
    Rev27Map,
    Tei27,
    Landmark27,
    TvUpdate,
    Rev29Map,
    Tei29,
    Rev30Map,
    Tei30,
    Landmark28,
    Lls3Photo,
    Rev31Map,
    DescentStrip,
    Tei31Preliminary,
    Tei32,
    TeiMap,
    Tei31,
    TransearthBegin,
    TransearthStateVector,
    Mcc5,
    Mcc6Preliminary,
    EntryPadNoMcc6,
    Mcc6,
    EntryPadMcc6,
    Mcc7Decision,
    Mcc7,
    EntryPadMcc7,
    FinalEntryPad,
    Entry,
    Landing,
    /// Earth orbit abort (mode 5)
    AbortOrbit,
    /// Translunar (mode 6) or lunar orbit (mode 7) abort
    Abort,
}
