use crate::{checkpoint_at, fly, resume, Capsule, Planner};
use apollo_mcc::cosmic::Body;
use apollo_mcc::mcc::{AbortMode, MissionPhase, MissionState};
use apollo_mcc::rtcc::CalcParams;
use apollo_mcc::time::Unit;
use apollo_mcc::utils::hhmmss;
use apollo_mcc::vehicle::{LunarRevolution, Stage};
use approx::assert_abs_diff_eq;
use rstest::*;
use std::f64::consts::PI;

#[rstest]
#[case::transearth(0.72, true)]
#[case::still_captured(0.5, false)]
fn lunar_orbit_abort(#[case] ecc: f64, #[case] leaves: bool) {
    let start = 120 * Unit::Hour;
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::Tei23, 6, start, CalcParams::default()),
    );
    let mut capsule = Capsule::in_lunar_orbit(start, ecc);
    capsule.revolution = LunarRevolution {
        rev: 22,
        time_in_rev: 1_000 * Unit::Second,
    };

    mcc.declare_abort(AbortMode::LunarOrbit);
    assert_eq!(mcc.state(), MissionState::Abort);
    mcc.advance(&mut capsule);
    assert_eq!(mcc.sub_state(), 1);
    mcc.advance(&mut capsule);

    if leaves {
        assert_eq!(mcc.state(), MissionState::TransearthBegin);
        // From apolune, the next perilune is half a period away
        let ra = capsule.csm.radius_m.norm();
        let sma = ra / (1.0 + ecc);
        let half_period_s = PI * (sma.powi(3) / Body::Moon.mu_m3_s2()).sqrt();
        assert_abs_diff_eq!(
            (mcc.params().tei - start).to_seconds(),
            half_period_s,
            epsilon = 1e-3
        );
        mcc.advance(&mut capsule);
        assert_eq!(mcc.phase(), MissionPhase::TransearthCoast);
    } else {
        assert_eq!(mcc.state(), MissionState::Abort);
        assert_eq!(mcc.sub_state(), 2);
        capsule.revolution.time_in_rev = 50 * Unit::Second;
        mcc.advance(&mut capsule);
        assert_eq!(mcc.sub_state(), 0);
    }
}

#[test]
fn translunar_abort_returns_through_mcc7() {
    let start = 30 * Unit::Hour;
    let mut params = CalcParams::default();
    params.tli = hhmmss(2, 44, 0.0);
    let planner = Planner {
        ei: 100 * Unit::Hour,
        ..Default::default()
    };
    let mut mcc = resume(planner, checkpoint_at(MissionState::BlockData2, 6, start, params));
    let mut capsule = Capsule::at(start);

    mcc.declare_abort(AbortMode::Translunar);
    mcc.advance(&mut capsule);
    assert_eq!(mcc.params().tei, 35 * Unit::Hour);
    assert_eq!(mcc.sub_state(), 1);

    fly(&mut mcc, &mut capsule, 96 * Unit::Hour, Unit::Minute * 1, |mcc| {
        mcc.state() != MissionState::Abort
    });

    assert_eq!(mcc.state(), MissionState::Mcc7);
    assert_eq!(mcc.phase(), MissionPhase::TransearthCoast);
    assert_eq!(mcc.params().ei, 100 * Unit::Hour);
    let codes: Vec<u16> = mcc.dispatches().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![205, 300]);
    // No entry targeting available, the correction falls back to a state vector
    assert!(mcc.dispatches()[1].scrubbed);
    assert!(capsule.uplinks.is_empty());
    let transition = mcc.transitions().last().unwrap();
    assert!(transition.get > hhmmss(95, 25, 0.0));
    assert!(transition.get <= hhmmss(95, 26, 0.0));
}

#[test]
fn abort_drops_the_calculation_in_flight() {
    let start = 10 * Unit::Hour;
    let mut params = CalcParams::default();
    params.tli = hhmmss(2, 44, 0.0);
    params.loi = hhmmss(75, 49, 40.0);
    let planner = Planner {
        deferred_fps: 30.0,
        midcourse_fps: 40.0,
        loi_shift: 3 * Unit::Hour,
        ..Default::default()
    };
    let mut mcc = resume(planner, checkpoint_at(MissionState::Mcc1, 0, start, params.clone()));
    let mut capsule = Capsule::at(start);

    mcc.advance(&mut capsule);
    assert_eq!(mcc.in_flight(), Some(12));
    // Computed, but not collected yet
    assert_eq!(mcc.params(), &params);

    mcc.declare_abort(AbortMode::Translunar);
    assert_eq!(mcc.in_flight(), None);
    assert_eq!(mcc.params(), &params);
    assert_eq!(mcc.pad_kind(), None);
    assert!(mcc.pad().is_none());
    assert_eq!(mcc.abort_mode(), Some(AbortMode::Translunar));
    assert_eq!(
        mcc.messages().last().unwrap().text,
        "MCC: mode 6 (translunar) abort declared"
    );
}

#[test]
fn earth_orbit_abort_waits_for_splashdown() {
    let start = Unit::Hour * 1;
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::TliPad, 6, start, CalcParams::default()),
    );
    let mut capsule = Capsule::at(start);

    mcc.declare_abort(AbortMode::EarthOrbit);
    assert_eq!(mcc.state(), MissionState::AbortOrbit);

    capsule.stage = Stage::Cm;
    fly(&mut mcc, &mut capsule, Unit::Hour * 2, Unit::Minute * 1, |_| false);
    assert_eq!(mcc.state(), MissionState::AbortOrbit);

    capsule.stage = Stage::CmRecovery;
    mcc.advance(&mut capsule);
    assert_eq!(mcc.state(), MissionState::Landing);
    mcc.advance(&mut capsule);
    assert_eq!(mcc.phase(), MissionPhase::Recovery);
    assert_eq!(mcc.messages().last().unwrap().text, "Splashdown");
}

#[test]
fn failed_loi_leads_to_the_flyby_abort() {
    let start = 76 * Unit::Hour;
    let mut params = CalcParams::default();
    params.loi = hhmmss(75, 49, 40.2);
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::Loi1Evaluation, 0, start, params),
    );
    // Still on an Earth centered state vector, so not captured
    let mut capsule = Capsule::at(start);

    fly(&mut mcc, &mut capsule, start + Unit::Second * 10, Unit::Second * 1, |mcc| {
        mcc.state() != MissionState::Loi1Evaluation
    });
    assert_eq!(mcc.state(), MissionState::Abort);
    assert_eq!(mcc.abort_mode(), Some(AbortMode::Translunar));

    // Past 60 hours there is no direct abort, the sequencer waits for the flyby
    capsule.get += Unit::Second * 1;
    mcc.advance(&mut capsule);
    assert_eq!(mcc.sub_state(), 13);
}
