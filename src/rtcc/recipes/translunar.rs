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

//! Translunar coast: midcourse corrections, LOI execution criteria and the lunar flyby aborts.

use super::{exceeds, loi_should_scrub, round_to, sps_or_rcs, refsmmat_reachable, Workspace};
use crate::cosmic::StateVector;
use crate::engine::{
    LoiOpts, MidcourseMode, MidcourseOpts, MidcourseSolution, RefsmmatKind, ReturnSpeed,
    ReturnToEarthOpts, Thruster,
};
use crate::rtcc::{Calculation, EngineSnafu, MissionEpoch, Pad, RtccError, UplinkSegment};
use crate::time::{Duration, Unit};
use crate::utils::m_to_nm;
use crate::vehicle::Computer;
use snafu::ResultExt;

fn midcourse(
    ws: &Workspace<'_>,
    sv: &StateVector,
    tig: Duration,
    mode: MidcourseMode,
) -> Result<MidcourseSolution, RtccError> {
    let opts = MidcourseOpts::builder()
        .sv(*sv)
        .tig(tig)
        .loi_get(ws.params.loi)
        .mode(mode)
        .build();
    ws.engine.translunar_midcourse(&opts).context(EngineSnafu)
}

fn loi_opts(ws: &Workspace<'_>, sv: &StateVector) -> LoiOpts {
    LoiOpts::builder()
        .sv(*sv)
        .site(ws.config.landing_site)
        .build()
}

/// Thruster, LVLH burn, maneuver PAD and target load of a midcourse solution.
fn midcourse_products(
    ws: &mut Workspace<'_>,
    name: &str,
    sv: &StateVector,
    sol: &MidcourseSolution,
) -> Result<(Pad, UplinkSegment), RtccError> {
    let thruster = sps_or_rcs(sv.mass_kg, sol.dv_inertial_m_s.norm());
    let burn = ws.burn(sv, sol.tig, &sol.dv_inertial_m_s, thruster)?;
    ws.params.store_maneuver(burn.tig, burn.dv_lvlh_m_s);

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(name, sv, burn.tig, burn.dv_lvlh_m_s, thruster, &refsmmat, true)?;
    if thruster == Thruster::Sps {
        pad.remarks = "No ullage".to_string();
    }
    Ok((
        Pad::Maneuver(pad),
        UplinkSegment::ExternalDeltaV {
            tig: burn.tig,
            dv_lvlh_m_s: burn.dv_lvlh_m_s,
        },
    ))
}

/// MCC-1 evaluation (11), MCC-1 (12) and MCC-2 (13).
///
/// The correction is only flown if deferring it to the MCC-3 slot would cost more than 25 ft/s. The evaluation
/// additionally requires more than 50 ft/s at the MCC-1 slot.
pub(crate) fn early_midcourse(code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let name = if code == 13 { "MCC-2" } else { "MCC-1" };

    if !ws.params.is_set(MissionEpoch::Loi) {
        ws.params.loi = ws.config.nominal_loi;
    }

    let tli_base = round_to(ws.params.time_of_ignition, Unit::Minute * 1);
    let tig = if code == 13 {
        tli_base + 24 * Unit::Hour
    } else {
        tli_base + 9 * Unit::Hour
    };
    let mcc3 = ws.params.loi - 22 * Unit::Hour;

    let sv = ws.csm_sv();
    let deferred = midcourse(ws, &sv, mcc3, MidcourseMode::FreeReturn)?;
    if code == 11 {
        ws.params.loi = deferred.loi_get;
    }

    // None if scrubbed
    let solution = if exceeds(&deferred.dv_inertial_m_s, 25.0) {
        let sol = midcourse(ws, &sv, tig, MidcourseMode::FreeReturn)?;
        if code == 11 && !exceeds(&sol.dv_inertial_m_s, 50.0) {
            None
        } else {
            Some(sol)
        }
    } else {
        None
    };

    if code == 11 {
        return Ok(match solution {
            Some(sol) => {
                ws.params.loi = sol.loi_get;
                Calculation::nothing().with_message(format!("{name} with liftoff REFSMMAT."))
            }
            None => Calculation::scrub(name, None),
        });
    }

    match solution {
        None => Ok(Calculation::scrub(
            name,
            Some(ws.csm_sv_v66("CSM state vector and V66")),
        )),
        Some(sol) => {
            ws.params.loi = sol.loi_get;
            let (pad, target) = midcourse_products(ws, name, &sv, &sol)?;
            let uplink = ws
                .csm_sv_v66("CSM state vector and V66, target load")
                .with(target);
            Ok(Calculation::pad(pad).with_uplink(uplink))
        }
    }
}

/// Lunar flyby abort PAD: slow return around the Moon.
pub(crate) fn flyby(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let opts = ReturnToEarthOpts::builder()
        .sv(sv)
        .tig_guess(ws.params.loi - 5 * Unit::Hour)
        .entry_longitude_deg(ws.config.entry_longitude_deg)
        .return_speed(ReturnSpeed::Slow)
        .max_entry_speed_fps(ws.config.default_max_entry_speed_fps)
        .build();
    let sol = ws.engine.return_to_earth(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv, sol.tig, &sol.dv_inertial_m_s, Thruster::Sps)?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        "Flyby",
        &sv,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Sps,
        &refsmmat,
        false,
    )?;
    pad.remarks = format!(
        "No ullage. Height of pericynthion is {:.0} NM",
        m_to_nm(sol.pericynthion_altitude_m)
    );
    pad.entry = Some(sol.entry);

    ws.params.store_return(
        sol.tig,
        sol.entry.ei_get,
        sol.entry.latitude_deg,
        sol.entry.longitude_deg,
    );

    Ok(Calculation::pad(Pad::Maneuver(pad)).with_uplink(ws.csm_sv_v66("CSM state vector and V66")))
}

/// MCC-3: scrubbed if the correction is small and the approach already satisfies the LOI criteria.
pub(crate) fn mcc3(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let sol = midcourse(ws, &sv, ws.params.loi - 22 * Unit::Hour, MidcourseMode::Nodal)?;

    let scrubbed = if exceeds(&sol.dv_inertial_m_s, 3.0) {
        false
    } else {
        let targets = ws
            .engine
            .loi_targets(&loi_opts(ws, &sv))
            .context(EngineSnafu)?;
        loi_should_scrub(&targets)
    };

    if scrubbed {
        return Ok(Calculation::scrub(
            "MCC-3",
            Some(ws.csm_sv_v66("CSM state vector and V66")),
        ));
    }

    ws.params.loi = sol.loi_get;
    let (pad, target) = midcourse_products(ws, "MCC-3", &sv, &sol)?;
    Ok(Calculation::pad(pad).with_uplink(
        ws.csm_sv_v66("CSM state vector and V66, target load")
            .with(target),
    ))
}

/// MCC-4, with the landing site REFSMMAT loaded as the desired REFSMMAT in both outcomes.
pub(crate) fn mcc4(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();

    let scrubbed = match ws.engine.loi_targets(&loi_opts(ws, &sv)) {
        Ok(targets) => loi_should_scrub(&targets),
        Err(err) => {
            warn!("MCC-4: LOI criteria unavailable ({err}), evaluating the correction");
            false
        }
    };

    let touchdown = if ws.params.touchdown != Duration::ZERO {
        ws.params.touchdown
    } else {
        ws.config.nominal_landing
    };
    let ls_refsmmat = ws
        .engine
        .refsmmat(
            &sv,
            &RefsmmatKind::LandingSite {
                get: touchdown,
                site: ws.config.landing_site,
            },
        )
        .context(EngineSnafu)?;
    let desired = UplinkSegment::Refsmmat {
        matrix: ls_refsmmat,
        desired: true,
    };

    if scrubbed {
        return Ok(Calculation::scrub(
            "MCC-4",
            Some(
                ws.csm_sv_v66("CSM state vector and V66, Landing Site REFSMMAT")
                    .with(desired),
            ),
        ));
    }

    let sol = midcourse(ws, &sv, ws.params.loi - 5 * Unit::Hour, MidcourseMode::Nodal)?;
    ws.params.loi = sol.loi_get;
    let (pad, target) = midcourse_products(ws, "MCC-4", &sv, &sol)?;
    Ok(Calculation::pad(pad).with_uplink(
        ws.csm_sv_v66("CSM state vector and V66, target load, Landing Site REFSMMAT")
            .with(target)
            .with(desired),
    ))
}

/// PC+2 abort PAD. If the burn attitude is not reachable on the current platform, the PAD is regenerated for the
/// preferred REFSMMAT of the burn.
pub(crate) fn pc2(_code: u16, ws: &mut Workspace<'_>) -> Result<Calculation, RtccError> {
    let sv = ws.csm_sv();
    let opts = ReturnToEarthOpts::builder()
        .sv(sv)
        .tig_guess(ws.params.loi + 2 * Unit::Hour)
        .entry_longitude_deg(ws.config.entry_longitude_deg)
        .return_speed(ReturnSpeed::Fast)
        .max_entry_speed_fps(ws.config.pc2_max_entry_speed_fps)
        .build();
    let sol = ws.engine.return_to_earth(&opts).context(EngineSnafu)?;
    let burn = ws.burn(&sv, sol.tig, &sol.dv_inertial_m_s, Thruster::Sps)?;

    let refsmmat = ws.refsmmat(Computer::Cmc);
    let mut pad = ws.maneuver_pad(
        "PC+2",
        &sv,
        burn.tig,
        burn.dv_lvlh_m_s,
        Thruster::Sps,
        &refsmmat,
        false,
    )?;

    if !refsmmat_reachable(&pad.att_deg) {
        debug!(
            "PC+2 attitude ({:.1}, {:.1}, {:.1}) not reachable, reselecting the REFSMMAT",
            pad.att_deg.x, pad.att_deg.y, pad.att_deg.z
        );
        let preferred = ws
            .engine
            .refsmmat(
                &sv,
                &RefsmmatKind::PreferredManeuver {
                    tig: burn.tig,
                    dv_lvlh_m_s: burn.dv_lvlh_m_s,
                    thruster: Thruster::Sps,
                    heads_up: true,
                },
            )
            .context(EngineSnafu)?;
        pad = ws.maneuver_pad(
            "PC+2",
            &sv,
            burn.tig,
            burn.dv_lvlh_m_s,
            Thruster::Sps,
            &preferred,
            true,
        )?;
        pad.remarks = "Requires realignment to preferred REFSMMAT".to_string();
    }
    pad.entry = Some(sol.entry);

    ws.params.store_return(
        sol.tig,
        sol.entry.ei_get,
        sol.entry.latitude_deg,
        sol.entry.longitude_deg,
    );

    Ok(Calculation::pad(Pad::Maneuver(pad)))
}

#[cfg(test)]
mod ut_translunar {
    use super::*;
    use crate::cosmic::Body;
    use crate::engine::{AstroEngine, EngineError, ManeuverPadData, ManeuverPadOpts, PoweredFlight};
    use crate::io::MissionConfig;
    use crate::linalg::{Matrix3, Vector3};
    use crate::rtcc::{CalcParams, ManeuverPlanTable, Uplink};
    use crate::utils::fps_to_m_s;
    use crate::vehicle::{
        DockingPort, LunarRevolution, SivbCommand, Stage, Vehicle, VehicleMasses, VehicleService,
    };
    use crate::time::Epoch;

    struct Coasting;

    impl VehicleService for Coasting {
        fn get(&self) -> Duration {
            30 * Unit::Hour
        }
        fn gmt(&self) -> Epoch {
            Epoch::from_gregorian_utc_at_midnight(1969, 5, 19)
        }
        fn stage(&self) -> Stage {
            Stage::CsmLem
        }
        fn docked(&self, _port: DockingPort) -> bool {
            true
        }
        fn state_vector(&self, _vehicle: Vehicle) -> StateVector {
            StateVector::new(
                30 * Unit::Hour,
                Body::Earth,
                Vector3::new(2.0e8, 0.0, 0.0),
                Vector3::new(0.0, 1.0e3, 0.0),
                43_000.0,
            )
        }
        fn masses(&self) -> VehicleMasses {
            VehicleMasses::default()
        }
        fn onboard_refsmmat(&self, _computer: Computer) -> Option<Matrix3<f64>> {
            Some(Matrix3::identity())
        }
        fn imu_gimbal_angles_deg(&self, _vehicle: Vehicle) -> Vector3<f64> {
            Vector3::zeros()
        }
        fn computer_clock(&self, _computer: Computer) -> Duration {
            self.get()
        }
        fn ags_k_factor(&self) -> Option<Duration> {
            None
        }
        fn launch_vehicle_timebase(&self) -> u8 {
            7
        }
        fn launch_azimuth_deg(&self) -> f64 {
            72.0
        }
        fn lunar_revolution(&self) -> LunarRevolution {
            LunarRevolution {
                rev: 0,
                time_in_rev: Duration::ZERO,
            }
        }
        fn ground_contact(&self) -> bool {
            false
        }
        fn uplink_drained(&self, _computer: Computer) -> bool {
            true
        }
        fn transmit_uplink(&mut self, _uplink: &Uplink) {}
        fn sivb_command(&mut self, _command: SivbCommand) {}
    }

    /// Burn attitudes past gimbal lock until the platform is realigned
    struct GimbalLock;

    impl AstroEngine for GimbalLock {
        fn return_to_earth(
            &self,
            opts: &ReturnToEarthOpts,
        ) -> Result<crate::engine::ReturnSolution, EngineError> {
            Ok(crate::engine::ReturnSolution {
                tig: opts.tig_guess,
                dv_inertial_m_s: Vector3::new(fps_to_m_s(3000.0), 0.0, 0.0),
                sv_post: opts.sv,
                entry: crate::engine::EntryData {
                    latitude_deg: -10.0,
                    longitude_deg: -165.0,
                    ei_get: 140 * Unit::Hour,
                    rtgo_nm: 1300.0,
                    vio_fps: 37_000.0,
                    get05g: 140 * Unit::Hour + 30 * Unit::Second,
                },
                pericynthion_altitude_m: 100e3,
            })
        }

        fn powered_flight(
            &self,
            sv: &StateVector,
            tig: Duration,
            dv_inertial_m_s: &Vector3<f64>,
            _thruster: Thruster,
        ) -> Result<PoweredFlight, EngineError> {
            Ok(PoweredFlight {
                tig,
                dv_lvlh_m_s: *dv_inertial_m_s,
                burn_time: 3 * Unit::Minute,
                sv_post: *sv,
            })
        }

        fn refsmmat(
            &self,
            _sv: &StateVector,
            _kind: &RefsmmatKind,
        ) -> Result<Matrix3<f64>, EngineError> {
            Ok(Matrix3::identity() * -1.0)
        }

        fn maneuver_pad(&self, opts: &ManeuverPadOpts) -> Result<ManeuverPadData, EngineError> {
            let yaw = if opts.refsmmat == Matrix3::identity() {
                75.0
            } else {
                10.0
            };
            Ok(ManeuverPadData {
                att_deg: Vector3::new(180.0, 0.0, yaw),
                burn_time: 3 * Unit::Minute,
                dvc_m_s: 900.0,
                dvt_m_s: 910.0,
                ha_m: 0.0,
                hp_m: 0.0,
                weight_kg: 43_000.0,
            })
        }
    }

    #[test]
    fn pc2_reselects_refsmmat() {
        let config = MissionConfig::default();
        let mut ws = Workspace {
            engine: &GimbalLock,
            params: CalcParams::default(),
            mpt: ManeuverPlanTable::default(),
            vehicle: &Coasting,
            config: &config,
        };
        ws.params.loi = config.nominal_loi;

        let calc = pc2(17, &mut ws).unwrap();
        let pad = calc.pad.unwrap();
        let pad = pad.maneuver().unwrap();
        assert_eq!(pad.remarks, "Requires realignment to preferred REFSMMAT");
        assert!(pad.heads_up);
        assert_eq!(pad.att_deg.z, 10.0);
        assert_eq!(ws.params.tei, config.nominal_loi + 2 * Unit::Hour);
        assert_eq!(ws.params.ei, 140 * Unit::Hour);
    }
}
