use crate::{checkpoint_at, fly, init_logging, resume, Capsule, Planner};
use apollo_mcc::io::{ConfigRepr, MissionConfig};
use apollo_mcc::mcc::{Checkpoint, HandoffStep, Mcc, MissionState};
use apollo_mcc::rtcc::{CalcParams, Rtcc};
use apollo_mcc::time::Unit;
use apollo_mcc::utils::hhmmss;
use apollo_mcc::MccError;

fn planner() -> Planner {
    Planner {
        deferred_fps: 30.0,
        midcourse_fps: 40.0,
        ..Default::default()
    }
}

#[test]
fn resumes_where_it_left_off() {
    let start = 10 * Unit::Hour;
    let mut params = CalcParams::default();
    params.tli = hhmmss(2, 44, 0.0);
    let mut mcc = resume(planner(), checkpoint_at(MissionState::Mcc1, 0, start, params));
    let mut capsule = Capsule::at(start);
    fly(&mut mcc, &mut capsule, start + Unit::Minute * 1, Unit::Second * 1, |mcc| {
        HandoffStep::from_offset(mcc.sub_state()) == Some(HandoffStep::AwaitCrew)
    });

    let cp = mcc.checkpoint();
    let yaml = cp.to_yaml().unwrap();
    let reloaded = Checkpoint::from_yaml(&yaml).unwrap();
    assert_eq!(reloaded, cp);
    assert_eq!(Checkpoint::loads(&yaml).unwrap(), cp);

    let mut restored = resume(planner(), reloaded);
    assert_eq!(restored.pad(), mcc.pad());
    assert_eq!(restored.positive_option(), Some("Ready for uplink"));

    let mut twin = Capsule::at(start);
    twin.get = capsule.get;
    mcc.crew_response(true);
    restored.crew_response(true);
    fly(&mut mcc, &mut capsule, start + Unit::Minute * 5, Unit::Second * 1, |_| false);
    fly(&mut restored, &mut twin, start + Unit::Minute * 5, Unit::Second * 1, |_| false);

    assert_eq!(restored.checkpoint(), mcc.checkpoint());
    assert_eq!(twin.uplinks, capsule.uplinks);
    assert_eq!(capsule.uplinks.len(), 1);
}

#[test]
fn inconsistent_checkpoints_are_rejected() {
    init_logging();
    let restore = |cp: Checkpoint| Mcc::restore(Rtcc::new(Planner::default()), MissionConfig::default(), cp);

    let start = 10 * Unit::Hour;
    for (state, sub_state) in [
        (MissionState::Mcc1, HandoffStep::COUNT),
        (MissionState::TliConfirm, 2),
        (MissionState::Abort, 15),
    ] {
        let cp = checkpoint_at(state, sub_state, start, CalcParams::default());
        assert!(
            matches!(restore(cp), Err(MccError::Checkpoint { .. })),
            "{state:?} sub-state {sub_state}"
        );
    }

    let mut cp = checkpoint_at(MissionState::Abort, 0, start, CalcParams::default());
    cp.abort_mode = None;
    assert!(matches!(restore(cp), Err(MccError::Checkpoint { .. })));

    assert!(matches!(
        Checkpoint::from_yaml("state: Mcc9\n"),
        Err(MccError::Checkpoint { .. })
    ));
}
