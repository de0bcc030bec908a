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

use super::RtccError;
use crate::cosmic::StateVector;
use crate::engine::Thruster;
use crate::io::duration_parts;
use crate::linalg::Vector3;
use crate::time::Duration;
use crate::vehicle::Vehicle;
use serde_derive::{Deserialize, Serialize};

/// Configuration change performed at the end of a planned maneuver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigChange {
    None,
    Undocking,
    Docking,
}

/// A burn queued in the maneuver plan table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedManeuver {
    pub name: String,
    pub thruster: Thruster,
    #[serde(with = "duration_parts")]
    pub tig: Duration,
    pub dv_lvlh_m_s: Vector3<f64>,
    /// Inertial attitude held during the burn, if fixed
    pub attitude_deg: Option<Vector3<f64>>,
    pub config_change: ConfigChange,
    pub sv_before: StateVector,
    pub sv_after: StateVector,
}

/// The maneuver plan table: the ordered ledger of planned burns, one list per vehicle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManeuverPlanTable {
    csm: Vec<PlannedManeuver>,
    lm: Vec<PlannedManeuver>,
}

impl ManeuverPlanTable {
    fn table(&self, vehicle: Vehicle) -> &Vec<PlannedManeuver> {
        match vehicle {
            Vehicle::Csm => &self.csm,
            Vehicle::Lm => &self.lm,
        }
    }

    fn table_mut(&mut self, vehicle: Vehicle) -> &mut Vec<PlannedManeuver> {
        match vehicle {
            Vehicle::Csm => &mut self.csm,
            Vehicle::Lm => &mut self.lm,
        }
    }

    /// Appends a maneuver and returns its index
    pub fn append(&mut self, vehicle: Vehicle, maneuver: PlannedManeuver) -> usize {
        debug!(
            "MPT {vehicle:?}: appending {} at {}",
            maneuver.name,
            crate::utils::format_get(maneuver.tig)
        );
        let table = self.table_mut(vehicle);
        table.push(maneuver);
        table.len() - 1
    }

    /// Replaces the maneuver at the provided index
    pub fn replace(
        &mut self,
        vehicle: Vehicle,
        index: usize,
        maneuver: PlannedManeuver,
    ) -> Result<(), RtccError> {
        let table = self.table_mut(vehicle);
        let len = table.len();
        match table.get_mut(index) {
            Some(slot) => {
                *slot = maneuver;
                Ok(())
            }
            None => Err(RtccError::ManeuverIndex { index, len }),
        }
    }

    /// Deletes the maneuver at the provided index and all those after it. Returns how many were deleted.
    pub fn delete_from(&mut self, vehicle: Vehicle, index: usize) -> usize {
        let table = self.table_mut(vehicle);
        if index >= table.len() {
            return 0;
        }
        let removed = table.len() - index;
        table.truncate(index);
        debug!("MPT {vehicle:?}: deleted {removed} maneuver(s) from #{index}");
        removed
    }

    pub fn clear(&mut self, vehicle: Vehicle) -> usize {
        self.delete_from(vehicle, 0)
    }

    pub fn get(&self, vehicle: Vehicle, index: usize) -> Option<&PlannedManeuver> {
        self.table(vehicle).get(index)
    }

    pub fn maneuvers(&self, vehicle: Vehicle) -> &[PlannedManeuver] {
        self.table(vehicle)
    }

    pub fn is_empty(&self, vehicle: Vehicle) -> bool {
        self.table(vehicle).is_empty()
    }

    pub fn len(&self, vehicle: Vehicle) -> usize {
        self.table(vehicle).len()
    }
}

#[cfg(test)]
mod ut_mpt {
    use super::*;
    use crate::cosmic::Body;
    use crate::time::Unit;

    fn burn(name: &str, hours: i64) -> PlannedManeuver {
        let sv = StateVector::new(
            hours * Unit::Hour,
            Body::Earth,
            Vector3::new(6.6e6, 0.0, 0.0),
            Vector3::new(0.0, 7.8e3, 0.0),
            130_000.0,
        );
        PlannedManeuver {
            name: name.to_string(),
            thruster: Thruster::Sps,
            tig: hours * Unit::Hour,
            dv_lvlh_m_s: Vector3::new(10.0, 0.0, 0.0),
            attitude_deg: None,
            config_change: ConfigChange::None,
            sv_before: sv,
            sv_after: sv,
        }
    }

    #[test]
    fn ledger_operations() {
        let mut mpt = ManeuverPlanTable::default();
        assert_eq!(mpt.append(Vehicle::Csm, burn("TLI", 2)), 0);
        assert_eq!(mpt.append(Vehicle::Csm, burn("SEP", 3)), 1);
        assert_eq!(mpt.append(Vehicle::Csm, burn("MCC", 9)), 2);
        assert!(mpt.is_empty(Vehicle::Lm));

        mpt.replace(Vehicle::Csm, 2, burn("MCC-1", 11)).unwrap();
        assert_eq!(mpt.get(Vehicle::Csm, 2).unwrap().name, "MCC-1");
        assert_eq!(
            mpt.replace(Vehicle::Lm, 0, burn("DOI", 99)),
            Err(RtccError::ManeuverIndex { index: 0, len: 0 })
        );

        assert_eq!(mpt.delete_from(Vehicle::Csm, 1), 2);
        assert_eq!(mpt.len(Vehicle::Csm), 1);
        assert_eq!(mpt.delete_from(Vehicle::Csm, 5), 0);
        assert_eq!(mpt.clear(Vehicle::Csm), 1);
        assert!(mpt.is_empty(Vehicle::Csm));
    }
}
