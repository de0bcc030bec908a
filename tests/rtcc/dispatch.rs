use crate::{init_logging, Capsule, Planner};
use apollo_mcc::cosmic::StateVector;
use apollo_mcc::engine::{AstroEngine, EngineError, PoweredFlight, Thruster};
use apollo_mcc::io::MissionConfig;
use apollo_mcc::linalg::Vector3;
use apollo_mcc::rtcc::{
    CalcContext, CalcParams, ManeuverPlanTable, PadKind, Products, Rtcc, UplinkSegment,
};
use apollo_mcc::time::{Duration, Unit};
use apollo_mcc::utils::hhmmss;
use apollo_mcc::vehicle::{Computer, Vehicle};

struct Bench {
    rtcc: Rtcc<Planner>,
    params: CalcParams,
    mpt: ManeuverPlanTable,
    capsule: Capsule,
    config: MissionConfig,
}

impl Bench {
    fn new(midcourse_fps: f64) -> Self {
        init_logging();
        let mut params = CalcParams::default();
        params.tli = hhmmss(2, 44, 0.0);
        params.time_of_ignition = hhmmss(2, 38, 0.0);
        Self {
            rtcc: Rtcc::new(Planner {
                deferred_fps: midcourse_fps,
                midcourse_fps,
                loi_shift: 2 * Unit::Minute,
                ..Default::default()
            }),
            params,
            mpt: ManeuverPlanTable::default(),
            capsule: Capsule::at(10 * Unit::Hour),
            config: MissionConfig::default(),
        }
    }

    fn dispatch(&mut self, code: u16, out: &mut Products) -> bool {
        let ctx = CalcContext {
            params: &mut self.params,
            mpt: &mut self.mpt,
            vehicle: &self.capsule,
            config: &self.config,
        };
        self.rtcc.dispatch(code, ctx, out)
    }
}

#[test]
fn unknown_code() {
    let mut bench = Bench::new(40.0);
    let before = bench.params.clone();
    let mut out = Products::with_pad(PadKind::Maneuver);

    assert!(bench.dispatch(999, &mut out));
    assert_eq!(out.message, "Calculation 999 is not available.");
    assert!(out.pad.is_none());
    assert!(out.uplink.is_none());
    assert_eq!(bench.params, before);
}

#[test]
fn midcourse_is_planned() {
    let mut bench = Bench::new(40.0);
    let mut out = Products::with_pad(PadKind::Maneuver);

    assert!(!bench.dispatch(12, &mut out));
    let pad = out.pad.as_ref().unwrap().maneuver().unwrap();
    assert_eq!(pad.purpose, "MCC-1");

    let uplink = out.uplink.as_ref().unwrap();
    assert_eq!(uplink.computer, Computer::Cmc);
    assert_eq!(uplink.description, "CSM state vector and V66, target load");
    assert!(uplink.has_target_load());

    assert_eq!(bench.params.time_of_ignition, hhmmss(11, 38, 0.0));
    assert_eq!(
        bench.params.loi,
        bench.config.nominal_loi + 2 * Unit::Minute
    );
    assert!(bench.params.delta_v_lvlh_m_s.norm() > 0.0);
}

#[test]
fn pad_dropped_without_a_buffer() {
    let mut bench = Bench::new(40.0);
    let mut out = Products::default();

    assert!(!bench.dispatch(12, &mut out));
    assert!(out.pad.is_none());
    assert!(out.uplink.is_some());
}

#[test]
fn pad_mismatch_is_a_scrub() {
    let mut bench = Bench::new(40.0);
    let before = bench.params.clone();
    let mut out = Products::with_pad(PadKind::Entry);

    assert!(bench.dispatch(12, &mut out));
    assert_eq!(out.message, "MCC-1 could not be formatted.");
    assert!(out.pad.is_none());
    assert!(out.uplink.is_none());
    // Nothing of the failed recipe is kept
    assert_eq!(bench.params, before);
}

#[test]
fn engine_failure_falls_back() {
    let mut bench = Bench::new(40.0);
    let before = bench.params.clone();
    let mut out = Products::with_pad(PadKind::Generic);

    // The test engine cannot compute longitude crossings
    assert!(bench.dispatch(200, &mut out));
    assert!(out.pad.is_none());
    assert!(out
        .message
        .starts_with("LLS 2 photography could not be computed ("));
    assert!(out.message.ends_with("), csm state vector only."));

    let uplink = out.uplink.unwrap();
    assert_eq!(uplink.computer, Computer::Cmc);
    assert_eq!(uplink.description, "CSM state vector");
    assert_eq!(
        uplink.segments,
        vec![UplinkSegment::StateVector {
            slot: Vehicle::Csm,
            sv: bench.capsule.csm
        }]
    );
    assert_eq!(bench.params, before);
}

#[test]
fn state_vectors() {
    let mut bench = Bench::new(40.0);
    for (code, computer, segments) in [
        (100, Computer::Cmc, 1),
        (101, Computer::Cmc, 2),
        (102, Computer::Lgc, 1),
    ] {
        let mut out = Products::default();
        assert!(!bench.dispatch(code, &mut out), "{code}");
        let uplink = out.uplink.unwrap();
        assert_eq!(uplink.computer, computer);
        assert_eq!(uplink.segments.len(), segments);
        assert!(out.message.is_empty());
    }
}

#[test]
fn outputs_are_cleared_before_each_run() {
    let mut bench = Bench::new(40.0);
    let mut out = Products::with_pad(PadKind::Maneuver);
    assert!(!bench.dispatch(12, &mut out));
    assert!(out.pad.is_some());

    assert!(bench.dispatch(999, &mut out));
    assert!(out.pad.is_none());
    assert!(out.uplink.is_none());
    assert_eq!(out.pad_kind, Some(PadKind::Maneuver));
}

/// Only knows how to plan the two TLI opportunities
struct Saturn;

impl AstroEngine for Saturn {
    fn coast(&self, sv: &StateVector, _get: Duration) -> Result<StateVector, EngineError> {
        Ok(*sv)
    }

    fn execute_maneuver(
        &self,
        sv: &StateVector,
        _tig: Duration,
        _dv_lvlh_m_s: &Vector3<f64>,
        _thruster: Thruster,
    ) -> Result<StateVector, EngineError> {
        Ok(*sv)
    }

    fn tli_plan(&self, sv: &StateVector, opportunity: u8) -> Result<PoweredFlight, EngineError> {
        let tig = match opportunity {
            1 => hhmmss(2, 38, 0.0),
            _ => hhmmss(4, 10, 0.0),
        };
        Ok(PoweredFlight {
            tig,
            dv_lvlh_m_s: Vector3::new(3100.0, 0.0, 0.0),
            burn_time: 5 * Unit::Minute + 47 * Unit::Second,
            sv_post: *sv,
        })
    }
}

#[test]
fn tli_replan_overwrites_the_plan() {
    init_logging();
    let rtcc = Rtcc::new(Saturn);
    let config = MissionConfig::default();
    let mut params = CalcParams::default();
    let mut mpt = ManeuverPlanTable::default();
    let mut capsule = Capsule::at(Unit::Hour * 1);

    let mut out = Products::default();
    let ctx = CalcContext {
        params: &mut params,
        mpt: &mut mpt,
        vehicle: &capsule,
        config: &config,
    };
    assert!(!rtcc.dispatch(2, ctx, &mut out));
    assert_eq!(params.tli_opportunity, 1);
    assert_eq!(mpt.len(Vehicle::Csm), 2);
    assert_eq!(mpt.get(Vehicle::Csm, 0).unwrap().tig, hhmmss(2, 38, 0.0));

    // A later burn planned against the first opportunity
    let mut mcc1 = mpt.get(Vehicle::Csm, 1).unwrap().clone();
    mcc1.name = "MCC-1".to_string();
    mpt.append(Vehicle::Csm, mcc1);

    capsule.get = 4 * Unit::Hour;
    let ctx = CalcContext {
        params: &mut params,
        mpt: &mut mpt,
        vehicle: &capsule,
        config: &config,
    };
    assert!(!rtcc.dispatch(2, ctx, &mut out));
    assert_eq!(params.tli_opportunity, 2);
    assert_eq!(params.time_of_ignition, hhmmss(4, 10, 0.0));
    assert_eq!(params.tli, hhmmss(4, 15, 47.0));

    let names: Vec<&str> = mpt
        .maneuvers(Vehicle::Csm)
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, ["TLI", "SEP"]);
    assert_eq!(mpt.get(Vehicle::Csm, 0).unwrap().tig, hhmmss(4, 10, 0.0));
    assert_eq!(mpt.get(Vehicle::Csm, 1).unwrap().tig, hhmmss(4, 30, 47.0));
}
