use crate::{checkpoint_at, fly, mission, resume, Capsule, Planner};
use apollo_mcc::mcc::{MissionPhase, MissionState};
use apollo_mcc::rtcc::CalcParams;
use apollo_mcc::time::{Duration, Unit};
use apollo_mcc::utils::hhmmss;
use apollo_mcc::vehicle::{SivbCommand, Stage};
use rstest::*;

#[test]
fn liftoff_and_mission_init() {
    let mut mcc = mission(Planner::default());
    let mut capsule = Capsule::at(-10 * Unit::Second);

    fly(&mut mcc, &mut capsule, 11 * Unit::Minute, Unit::Second * 1, |_| false);

    let transitions = mcc.transitions();
    assert_eq!(transitions[0].from, MissionState::Prelaunch);
    assert_eq!(transitions[0].to, MissionState::MissionInit);
    assert_eq!(transitions[0].get, Unit::Second * 1);
    // Gated on GET strictly greater than ten minutes
    assert_eq!(transitions[1].to, MissionState::TliSimulation);
    assert_eq!(transitions[1].get, 601 * Unit::Second);

    let init = mcc.dispatches()[0];
    assert_eq!(init.code, 1);
    assert_eq!(init.state, MissionState::MissionInit);
    assert!(!init.scrubbed);
    assert_eq!(mcc.params().launch_azimuth_deg, 72.0);
    assert_eq!(mcc.phase(), MissionPhase::EarthOrbit);
}

#[rstest]
#[case::inhibited(5, MissionState::TliSimulation)]
#[case::flown(7, MissionState::TliConfirm)]
fn tli_evaluation(#[case] timebase: u8, #[case] next: MissionState) {
    let start = hhmmss(2, 50, 0.0);
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::TliEvaluation, 0, start, CalcParams::default()),
    );
    let mut capsule = Capsule::at(start);
    capsule.timebase = timebase;

    fly(&mut mcc, &mut capsule, hhmmss(3, 0, 5.0), Unit::Second * 1, |mcc| {
        mcc.state() != MissionState::TliEvaluation
    });

    assert_eq!(mcc.state(), next);
    let transition = mcc.transitions()[0];
    if timebase == 5 {
        // The scrub takes the alternate path only, once the next opportunity gate opens
        assert!(transition.get > 3 * Unit::Hour);
        assert!(mcc.messages().iter().any(|m| m.text == "TLI has been scrubbed."));
    } else {
        assert!(transition.get < hhmmss(2, 50, 5.0));
    }
}

#[test]
fn epoch_gate_is_strict() {
    let mut params = CalcParams::default();
    params.tei = hhmmss(137, 20, 0.0);
    let start = params.tei - 10 * Unit::Minute;
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::Tei31, 6, start, params.clone()),
    );

    for (offset_s, state) in [
        (299, MissionState::Tei31),
        (300, MissionState::Tei31),
        (301, MissionState::TransearthBegin),
    ] {
        let mut capsule = Capsule::at(params.tei + offset_s * Unit::Second);
        mcc.advance(&mut capsule);
        assert_eq!(mcc.state(), state, "TEI + {offset_s} s");
    }
}

#[test]
fn refined_epoch_moves_the_gate() {
    let start = 53 * Unit::Hour;
    let mut params = CalcParams::default();
    params.tli = hhmmss(2, 44, 0.0);
    params.loi = 75 * Unit::Hour;
    let planner = Planner {
        deferred_fps: 10.0,
        loi_shift: 10 * Unit::Minute,
        ..Default::default()
    };
    let mut mcc = resume(planner, checkpoint_at(MissionState::Mcc3, 0, start, params));
    let mut capsule = Capsule::at(start);

    mcc.advance(&mut capsule);
    capsule.get += Unit::Minute * 1;
    mcc.advance(&mut capsule);
    assert_eq!(mcc.positive_option(), Some("Ready for uplink"));
    assert_eq!(mcc.params().loi, hhmmss(75, 10, 0.0));

    mcc.crew_response(true);
    fly(&mut mcc, &mut capsule, hhmmss(67, 5, 0.0), Unit::Minute * 1, |_| false);
    assert_eq!(capsule.uplinks.len(), 1);
    assert_eq!(mcc.state(), MissionState::Mcc3);

    fly(&mut mcc, &mut capsule, hhmmss(67, 15, 0.0), Unit::Minute * 1, |mcc| {
        mcc.state() != MissionState::Mcc3
    });
    assert_eq!(mcc.state(), MissionState::Mcc4);
    assert!(mcc.transitions()[0].get > hhmmss(67, 10, 0.0));
}

#[test]
fn sivb_disposal() {
    let mut params = CalcParams::default();
    params.tli = hhmmss(2, 44, 0.0);
    let start = hhmmss(3, 20, 0.0);
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::SivbEvasive, 0, start, params),
    );
    let mut capsule = Capsule::at(start);
    capsule.stage = Stage::Launch;
    capsule.sla_docked = true;

    fly(&mut mcc, &mut capsule, hhmmss(3, 30, 0.0), Unit::Second * 10, |_| false);
    assert_eq!(mcc.sub_state(), 0);

    capsule.stage = Stage::CsmLem;
    fly(&mut mcc, &mut capsule, hhmmss(3, 40, 0.0), Unit::Second * 10, |_| false);
    assert_eq!(mcc.sub_state(), 1);

    // LM extraction
    capsule.sla_docked = false;
    fly(&mut mcc, &mut capsule, hhmmss(5, 20, 0.0), Unit::Second * 10, |mcc| {
        mcc.state() == MissionState::PtcRefsmmat
    });

    assert_eq!(
        capsule.sivb,
        vec![SivbCommand::EvasiveManeuverEnable, SivbCommand::Timebase8Enable]
    );
    assert_eq!(mcc.state(), MissionState::PtcRefsmmat);
    assert!(mcc.transitions()[1].get > hhmmss(5, 13, 0.0));
}

#[test]
fn sequencing_is_deterministic() {
    let run = || {
        let mut mcc = mission(Planner::default());
        let mut capsule = Capsule::at(-10 * Unit::Second);
        fly(&mut mcc, &mut capsule, hhmmss(3, 30, 0.0), Unit::Second * 5, |_| false);
        let calls = mcc.rtcc().engine().calls.borrow().clone();
        (
            mcc.transitions().to_vec(),
            mcc.dispatches().to_vec(),
            mcc.messages().to_vec(),
            calls,
            capsule.uplinks.len(),
        )
    };

    let first = run();
    assert!(first.0.len() > 3);
    assert_eq!(first, run());
}

#[test]
fn idle_ticks_change_nothing() {
    let start = Duration::ZERO;
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::Landing, 1, start, CalcParams::default()),
    );
    let before = mcc.checkpoint();
    let mut capsule = Capsule::at(hhmmss(195, 0, 0.0));
    mcc.advance(&mut capsule);
    assert_eq!(mcc.checkpoint(), before);
}
