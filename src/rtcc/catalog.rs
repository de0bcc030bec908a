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

use super::recipes::{descent, generic, launch, lunar_orbit, rendezvous, transearth, translunar};
use super::{Calculation, PadKind, RtccError, Workspace};
use lazy_static::lazy_static;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub(crate) type Recipe = fn(u16, &mut Workspace<'_>) -> Result<Calculation, RtccError>;

/// Mission phase a calculation belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeFamily {
    Launch,
    Translunar,
    LunarOrbit,
    Descent,
    Rendezvous,
    Transearth,
    Generic,
}

/// A numbered calculation of the mission.
#[derive(Clone)]
pub struct CatalogEntry {
    pub code: u16,
    /// Name of the product, used in the operator messages
    pub name: &'static str,
    pub family: RecipeFamily,
    /// PAD form the calculation fills, if any
    pub pad: Option<PadKind>,
    pub(crate) recipe: Recipe,
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ({:?}", self.code, self.name, self.family)?;
        match self.pad {
            Some(kind) => write!(f, ", {kind:?} PAD)"),
            None => write!(f, ")"),
        }
    }
}

fn entry(
    code: u16,
    name: &'static str,
    family: RecipeFamily,
    pad: Option<PadKind>,
    recipe: Recipe,
) -> (u16, CatalogEntry) {
    (
        code,
        CatalogEntry {
            code,
            name,
            family,
            pad,
            recipe,
        },
    )
}

fn build() -> HashMap<u16, CatalogEntry> {
    use RecipeFamily::*;

    let mut entries = vec![
        entry(1, "Mission initialization", Launch, None, launch::mission_init),
        entry(2, "TLI simulation", Launch, None, launch::tli_simulation),
        entry(3, "TLI+90", Launch, Some(PadKind::Maneuver), launch::tli_abort_pad),
        entry(4, "TLI+4", Launch, Some(PadKind::BlockData), launch::tli_p37),
        entry(5, "TLI PAD", Launch, Some(PadKind::Tli), launch::tli_pad),
        entry(6, "TLI", Launch, None, launch::tli_evaluation),
        entry(7, "Evasive", Launch, Some(PadKind::Maneuver), launch::evasive),
        entry(8, "P37 block data 1", Launch, Some(PadKind::BlockData), launch::p37_block_data),
        entry(9, "P37 block data 2", Launch, Some(PadKind::BlockData), launch::p37_block_data),
        entry(10, "PTC REFSMMAT", Launch, None, launch::ptc_refsmmat),
        entry(11, "MCC-1 evaluation", Translunar, None, translunar::early_midcourse),
        entry(12, "MCC-1", Translunar, Some(PadKind::Maneuver), translunar::early_midcourse),
        entry(13, "MCC-2", Translunar, Some(PadKind::Maneuver), translunar::early_midcourse),
        entry(14, "Flyby", Translunar, Some(PadKind::Maneuver), translunar::flyby),
        entry(15, "MCC-3", Translunar, Some(PadKind::Maneuver), translunar::mcc3),
        entry(16, "MCC-4", Translunar, Some(PadKind::Maneuver), translunar::mcc4),
        entry(17, "PC+2", Translunar, Some(PadKind::Maneuver), translunar::pc2),
        entry(20, "Preliminary LOI-1", LunarOrbit, Some(PadKind::Maneuver), lunar_orbit::loi1),
        entry(21, "LOI-1", LunarOrbit, Some(PadKind::Maneuver), lunar_orbit::loi1),
        entry(22, "LOI-2", LunarOrbit, Some(PadKind::Maneuver), lunar_orbit::loi2),
        entry(23, "LOI-1 evaluation", LunarOrbit, None, lunar_orbit::loi1_evaluation),
        entry(60, "State vector and LLS REFSMMAT", Descent, None, descent::lls_refsmmat),
        entry(61, "CSM DAP data", Descent, Some(PadKind::Dap), descent::dap_data),
        entry(62, "LM DAP data", Descent, Some(PadKind::Dap), descent::dap_data),
        entry(63, "Gyro torquing angles", Descent, Some(PadKind::Torquing), descent::gyro_torquing),
        entry(64, "LGC activation", Descent, None, descent::lgc_activation),
        entry(65, "AGS activation", Descent, Some(PadKind::Generic), descent::ags_activation),
        entry(70, "Separation", Descent, Some(PadKind::Maneuver), descent::separation),
        entry(71, "DOI", Descent, Some(PadKind::LmManeuver), descent::doi),
        entry(72, "Preliminary phasing", Descent, Some(PadKind::LmManeuver), descent::phasing),
        entry(73, "Phasing", Descent, Some(PadKind::LmManeuver), descent::phasing),
        entry(74, "PDI abort", Descent, Some(PadKind::LmManeuver), descent::pdi_abort),
        entry(75, "Preliminary backup insertion", Rendezvous, Some(PadKind::Maneuver), rendezvous::backup_insertion),
        entry(76, "Backup insertion", Rendezvous, Some(PadKind::Maneuver), rendezvous::backup_insertion),
        entry(77, "Preliminary insertion", Rendezvous, Some(PadKind::LmManeuver), rendezvous::insertion),
        entry(78, "Insertion", Rendezvous, Some(PadKind::LmManeuver), rendezvous::insertion),
        entry(79, "CSI", Rendezvous, Some(PadKind::Csi), rendezvous::csi),
        entry(80, "LM weight", Rendezvous, Some(PadKind::Generic), rendezvous::lm_weight),
        entry(81, "APS depletion", Rendezvous, Some(PadKind::LmManeuver), rendezvous::aps_depletion),
        entry(90, "MCC-5", Transearth, Some(PadKind::Maneuver), transearth::transearth_midcourse),
        entry(91, "Preliminary MCC-6", Transearth, Some(PadKind::Maneuver), transearth::transearth_midcourse),
        entry(92, "MCC-6", Transearth, Some(PadKind::Maneuver), transearth::transearth_midcourse),
        entry(93, "MCC-7 decision", Transearth, Some(PadKind::Maneuver), transearth::transearth_midcourse),
        entry(94, "MCC-7", Transearth, Some(PadKind::Maneuver), transearth::transearth_midcourse),
        entry(96, "Entry PAD without MCC-6", Transearth, Some(PadKind::Entry), transearth::entry_pad),
        entry(97, "Entry PAD after MCC-6", Transearth, Some(PadKind::Entry), transearth::entry_pad),
        entry(98, "Entry PAD after MCC-7", Transearth, Some(PadKind::Entry), transearth::entry_pad),
        entry(99, "Final entry PAD", Transearth, Some(PadKind::Entry), transearth::entry_pad),
        entry(100, "CSM state vector", Generic, None, generic::state_vector),
        entry(101, "CSM and LM state vectors", Generic, None, generic::state_vector),
        entry(102, "LM state vector", Generic, None, generic::state_vector),
        entry(103, "CSM state vector and V66", Generic, None, generic::state_vector),
        entry(200, "LLS 2 photography", Generic, Some(PadKind::Generic), generic::oblique_strip),
        entry(201, "Vertical stereo photography", Generic, Some(PadKind::Generic), generic::vertical_stereo),
        entry(202, "LLS 3 photography", Generic, Some(PadKind::Generic), generic::oblique_strip),
        entry(203, "Descent strip photography", Generic, Some(PadKind::Generic), generic::descent_strip),
        entry(204, "TV update", Generic, Some(PadKind::Generic), generic::tv_update),
        entry(205, "Abort entry evaluation", Transearth, None, transearth::abort_entry_evaluation),
        entry(300, "Abort MCC", Transearth, Some(PadKind::Maneuver), transearth::abort_midcourse),
    ];

    let tei: [(u16, &'static str); 15] = [
        (30, "TEI-1"),
        (31, "TEI-4"),
        (32, "TEI-5"),
        (33, "TEI-10"),
        (34, "TEI-22"),
        (35, "TEI-23"),
        (36, "TEI-24"),
        (37, "TEI-25"),
        (38, "TEI-26"),
        (39, "TEI-27"),
        (130, "TEI-29"),
        (131, "TEI-30"),
        (132, "Preliminary TEI-31"),
        (133, "TEI-31"),
        (134, "TEI-32"),
    ];
    entries.extend(
        tei.into_iter()
            .map(|(code, name)| entry(code, name, LunarOrbit, Some(PadKind::Maneuver), lunar_orbit::tei_update)),
    );

    let maps: [(u16, &'static str); 15] = [
        (40, "Rev 1 map update"),
        (41, "Rev 2 map update"),
        (42, "Rev 3 map update"),
        (43, "Rev 4 map update"),
        (44, "Rev 11 map update"),
        (45, "Rev 22 map update"),
        (46, "Rev 23 map update"),
        (47, "Rev 24 map update"),
        (48, "Rev 25 map update"),
        (49, "Rev 26 map update"),
        (140, "Rev 27 map update"),
        (141, "Rev 29 map update"),
        (142, "Rev 30 map update"),
        (143, "Rev 31 map update"),
        (144, "TEI map update"),
    ];
    entries.extend(
        maps.into_iter()
            .map(|(code, name)| entry(code, name, LunarOrbit, Some(PadKind::MapUpdate), lunar_orbit::map_update)),
    );

    let landmarks: [(u16, &'static str); 8] = [
        (50, "F-1 landmark tracking"),
        (51, "B-1 landmark tracking"),
        (52, "130 landmark tracking"),
        (53, "Rev 24 landmark tracking"),
        (54, "Rev 25 landmark tracking"),
        (55, "Rev 26 landmark tracking"),
        (56, "Rev 27 landmark tracking"),
        (57, "Rev 28 landmark tracking"),
    ];
    entries.extend(landmarks.into_iter().map(|(code, name)| {
        entry(code, name, LunarOrbit, Some(PadKind::Landmark), lunar_orbit::landmark_tracking)
    }));

    entries.into_iter().collect()
}

lazy_static! {
    static ref CATALOG: HashMap<u16, CatalogEntry> = build();
}

/// Resolves a function code to its calculation
pub fn lookup(code: u16) -> Option<&'static CatalogEntry> {
    CATALOG.get(&code)
}

/// All function codes known to the dispatcher, in increasing order
pub fn codes() -> Vec<u16> {
    let mut codes: Vec<u16> = CATALOG.keys().copied().collect();
    codes.sort_unstable();
    codes
}
