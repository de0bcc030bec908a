use crate::{checkpoint_at, fly, resume, Capsule, Planner};
use apollo_mcc::mcc::{HandoffStep, Mcc, MissionState};
use apollo_mcc::rtcc::{CalcParams, PadKind, Products};
use apollo_mcc::time::{Duration, Unit};
use apollo_mcc::utils::hhmmss;
use apollo_mcc::vehicle::Computer;
use rstest::*;


fn start() -> Duration {
    10 * Unit::Hour
}

fn translunar_params() -> CalcParams {
    let mut params = CalcParams::default();
    params.tli = hhmmss(2, 44, 0.0);
    params.time_of_ignition = hhmmss(2, 38, 0.0);
    params
}

/// MCC-1 at 10 hours GET, with the provided corrections in ft/s
fn mcc1(deferred_fps: f64) -> (Mcc<Planner>, Capsule) {
    let planner = Planner {
        deferred_fps,
        midcourse_fps: 40.0,
        ..Default::default()
    };
    let mcc = resume(
        planner,
        checkpoint_at(MissionState::Mcc1, 0, start(), translunar_params()),
    );
    (mcc, Capsule::at(start()))
}

fn step(mcc: &Mcc<Planner>) -> Option<HandoffStep> {
    HandoffStep::from_offset(mcc.sub_state())
}

#[rstest]
#[case::deferred_is_cheap(24.9, true)]
#[case::deferred_is_expensive(25.1, false)]
fn midcourse_threshold(#[case] deferred_fps: f64, #[case] scrubbed: bool) {
    let (mut mcc, mut capsule) = mcc1(deferred_fps);
    fly(&mut mcc, &mut capsule, start() + Unit::Minute * 1, Unit::Second * 1, |mcc| {
        mcc.sub_state() > HandoffStep::AwaitCalculation.offset()
    });

    assert_eq!(mcc.dispatches()[0].scrubbed, scrubbed);
    assert_eq!(mcc.in_flight(), None);
    if scrubbed {
        assert_eq!(step(&mcc), Some(HandoffStep::AwaitTrigger));
        assert!(mcc.pad().is_none());
        assert_eq!(mcc.pad_kind(), None);
        assert_eq!(mcc.positive_option(), None);
        // The state vector uplink is kept but never offered
        assert_eq!(mcc.uplink().unwrap().description, "CSM state vector and V66");
        assert!(mcc.messages().iter().any(|m| m.text == "MCC-1 has been scrubbed."));
        assert_eq!(mcc.rtcc().engine().calls.borrow().len(), 1);
    } else {
        assert_eq!(step(&mcc), Some(HandoffStep::AwaitCrew));
        let pad = mcc.pad().unwrap().maneuver().unwrap();
        assert_eq!(pad.purpose, "MCC-1");
        assert!(mcc.pad_shown());
        assert_eq!(mcc.positive_option(), Some("Ready for uplink"));
        assert_eq!(mcc.uplink().unwrap().computer, Computer::Cmc);
    }
    assert!(capsule.uplinks.is_empty());

    // Neither outcome leaves before TLI + 11 hours
    fly(&mut mcc, &mut capsule, hhmmss(13, 44, 0.0), Unit::Minute * 1, |_| false);
    assert_eq!(mcc.state(), MissionState::Mcc1);
    if scrubbed {
        fly(&mut mcc, &mut capsule, hhmmss(13, 46, 0.0), Unit::Minute * 1, |_| false);
        assert_eq!(mcc.state(), MissionState::BlockData2);
    }
}

#[test]
fn uplink_and_repeat() {
    let (mut mcc, mut capsule) = mcc1(25.1);
    fly(&mut mcc, &mut capsule, start() + Unit::Minute * 1, Unit::Second * 1, |mcc| {
        step(mcc) == Some(HandoffStep::AwaitCrew)
    });

    // Not ready yet
    mcc.crew_response(false);
    assert_eq!(step(&mcc), Some(HandoffStep::NotReady));
    capsule.get += Unit::Minute * 1;
    mcc.advance(&mut capsule);
    assert!(capsule.uplinks.is_empty());

    mcc.crew_response(true);
    assert_eq!(step(&mcc), Some(HandoffStep::Transmit));
    capsule.drained = false;
    let until = capsule.get + Unit::Second * 10;
    fly(&mut mcc, &mut capsule, until, Unit::Second * 1, |_| false);
    assert_eq!(capsule.uplinks.len(), 1);
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitDrain));
    assert_eq!(mcc.positive_option(), None);

    capsule.drained = true;
    mcc.advance(&mut capsule);
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitTrigger));
    assert_eq!(mcc.negative_option(), Some("Repeat uplink"));
    assert!(mcc.messages().iter().any(|m| m.text == "Uplink completed!"));

    // Repeat runs the calculation again and offers the new uplink
    mcc.crew_response(false);
    assert_eq!(step(&mcc), Some(HandoffStep::Repeat));
    let until = capsule.get + Unit::Second * 10;
    fly(&mut mcc, &mut capsule, until, Unit::Second * 1, |mcc| {
        step(mcc) == Some(HandoffStep::AwaitCrew)
    });
    assert_eq!(mcc.dispatches().len(), 2);
    assert_eq!(mcc.negative_option(), None);
    assert_eq!(mcc.positive_option(), Some("Ready for uplink"));
}

#[test]
fn epochs_change_when_the_result_is_collected() {
    let planner = Planner {
        deferred_fps: 30.0,
        midcourse_fps: 40.0,
        loi_shift: 2 * Unit::Minute,
        ..Default::default()
    };
    let mut mcc = resume(
        planner,
        checkpoint_at(MissionState::Mcc1, 0, start(), translunar_params()),
    );
    let mut capsule = Capsule::at(start());

    mcc.advance(&mut capsule);
    assert_eq!(mcc.in_flight(), Some(12));
    assert_eq!(mcc.params(), &translunar_params());
    assert!(mcc.uplink().is_none());

    capsule.get += Unit::Second * 2;
    mcc.advance(&mut capsule);
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitCrew));
    assert_eq!(mcc.params().loi, mcc.config().nominal_loi + 2 * Unit::Minute);
    assert_eq!(mcc.params().time_of_ignition, hhmmss(11, 38, 0.0));
}

#[test]
fn responses_out_of_turn_are_ignored() {
    let (mut mcc, mut capsule) = mcc1(24.9);
    mcc.crew_response(true);
    assert_eq!(step(&mcc), Some(HandoffStep::Dispatch));

    fly(&mut mcc, &mut capsule, start() + Unit::Minute * 1, Unit::Second * 1, |mcc| {
        step(mcc) == Some(HandoffStep::AwaitTrigger)
    });
    // Nothing was uplinked, so there is nothing to repeat
    mcc.crew_response(false);
    mcc.crew_response(true);
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitTrigger));
}

#[test]
fn one_calculation_in_flight() {
    let (mut mcc, mut capsule) = mcc1(25.1);
    mcc.advance(&mut capsule);
    assert_eq!(mcc.in_flight(), Some(12));
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitCalculation));

    // Rewind to the dispatch step while the result is still pending: the request is refused
    let mut cp = mcc.checkpoint();
    cp.sub_state = HandoffStep::Dispatch.offset();
    cp.products = Products::default();
    let mut rewound = resume(Planner::default(), cp);
    capsule.get += Unit::Second * 5;
    rewound.advance(&mut capsule);
    assert!(rewound.dispatches().is_empty());
    assert_eq!(rewound.in_flight(), Some(12));
    assert_eq!(step(&rewound), Some(HandoffStep::Dispatch));
    assert!(!rewound.is_halted());

    // The original collects its result
    mcc.advance(&mut capsule);
    assert_eq!(mcc.in_flight(), None);
}

#[test]
fn busy_pad_buffer_halts() {
    let mut cp = checkpoint_at(MissionState::Mcc2, 0, start(), translunar_params());
    cp.products = Products::with_pad(PadKind::BlockData);
    let mut mcc = resume(Planner::default(), cp);
    let mut capsule = Capsule::at(start());

    mcc.advance(&mut capsule);
    assert!(mcc.is_halted());
    assert!(mcc.dispatches().is_empty());
    assert!(mcc.messages().last().unwrap().text.starts_with("MCC halted"));

    let before = mcc.checkpoint();
    capsule.get += Unit::Hour * 1;
    mcc.advance(&mut capsule);
    assert_eq!(mcc.checkpoint(), before);
}

#[test]
fn engine_failure_falls_back_to_a_state_vector() {
    let mut params = translunar_params();
    params.loi = 75 * Unit::Hour;
    let start = 71 * Unit::Hour;
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::Mcc4, 0, start, params),
    );
    let mut capsule = Capsule::at(start);

    fly(&mut mcc, &mut capsule, start + Unit::Minute * 1, Unit::Second * 1, |mcc| {
        mcc.sub_state() > HandoffStep::AwaitCalculation.offset()
    });

    assert!(mcc.dispatches()[0].scrubbed);
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitTrigger));
    assert!(mcc.pad().is_none());
    assert_eq!(mcc.uplink().unwrap().description, "CSM state vector");
    assert!(mcc
        .messages()
        .iter()
        .any(|m| m.text.starts_with("MCC-4 could not be computed")));
    // Failed calculations never touch the mission parameters
    assert_eq!(mcc.params().loi, 75 * Unit::Hour);
}

#[test]
fn direct_uplink_skips_the_crew() {
    let start = hhmmss(99, 0, 0.0);
    let mut mcc = resume(
        Planner::default(),
        checkpoint_at(MissionState::LmStateVector, 0, start, CalcParams::default()),
    );
    let mut capsule = Capsule::at(start);
    capsule.drained = false;

    let mut offered = false;
    while step(&mcc) != Some(HandoffStep::AwaitDrain) && capsule.get < start + Unit::Minute * 1 {
        mcc.advance(&mut capsule);
        offered |= mcc.positive_option().is_some();
        capsule.get += Unit::Second * 1;
    }
    assert!(!offered);
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitDrain));
    assert_eq!(capsule.uplinks.len(), 1);
    assert_eq!(capsule.uplinks[0].computer, Computer::Lgc);
    assert_eq!(capsule.uplinks[0].description, "LM state vector");
    assert!(!mcc.messages().iter().any(|m| m.text == "Ready for uplink?"));

    capsule.drained = true;
    mcc.advance(&mut capsule);
    assert_eq!(step(&mcc), Some(HandoffStep::AwaitTrigger));

    let until = capsule.get + Unit::Minute * 6;
    fly(&mut mcc, &mut capsule, until, Unit::Minute * 1, |_| false);
    assert_eq!(mcc.state(), MissionState::BackupInsertionPreliminary);
    assert_eq!(capsule.uplinks.len(), 1);
}
