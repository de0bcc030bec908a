extern crate pretty_env_logger as pel;

mod mission_control;
mod rtcc;

use apollo_mcc::cosmic::{Body, StateVector};
use apollo_mcc::engine::{
    AstroEngine, EngineError, EntryData, ManeuverPadData, ManeuverPadOpts, MidcourseOpts,
    MidcourseSolution, PoweredFlight, Thruster,
};
use apollo_mcc::io::MissionConfig;
use apollo_mcc::linalg::{Matrix3, Vector3};
use apollo_mcc::mcc::{AbortMode, Checkpoint, Mcc, MissionPhase, MissionState};
use apollo_mcc::rtcc::{CalcParams, ManeuverPlanTable, Products, Rtcc, Uplink};
use apollo_mcc::time::{Duration, Epoch, Unit};
use apollo_mcc::utils::fps_to_m_s;
use apollo_mcc::vehicle::{
    Computer, DockingPort, LunarRevolution, SivbCommand, Stage, Vehicle, VehicleMasses,
    VehicleService,
};
use std::cell::RefCell;

/// Spacecraft whose telemetry is set by the test
pub struct Capsule {
    pub get: Duration,
    pub stage: Stage,
    pub forward_docked: bool,
    pub sla_docked: bool,
    pub csm: StateVector,
    pub lm: StateVector,
    pub revolution: LunarRevolution,
    pub timebase: u8,
    pub drained: bool,
    pub uplinks: Vec<Uplink>,
    pub sivb: Vec<SivbCommand>,
}

impl Capsule {
    pub fn at(get: Duration) -> Self {
        let sv = StateVector::new(
            get,
            Body::Earth,
            Vector3::new(2.0e8, 0.0, 0.0),
            Vector3::new(0.0, 1.0e3, 0.0),
            43_000.0,
        );
        Self {
            get,
            stage: Stage::CsmLem,
            forward_docked: true,
            sla_docked: false,
            csm: sv,
            lm: sv.with_mass(15_000.0),
            revolution: LunarRevolution {
                rev: 0,
                time_in_rev: Duration::ZERO,
            },
            timebase: 7,
            drained: true,
            uplinks: Vec::new(),
            sivb: Vec::new(),
        }
    }

    /// Lunar orbit with the provided eccentricity, at apolune
    pub fn in_lunar_orbit(get: Duration, ecc: f64) -> Self {
        let mut capsule = Self::at(get);
        let ra = Body::Moon.radius_m() + 300e3;
        let va = (Body::Moon.mu_m3_s2() * (1.0 - ecc) / ra).sqrt();
        capsule.csm = StateVector::new(
            get,
            Body::Moon,
            Vector3::new(ra, 0.0, 0.0),
            Vector3::new(0.0, va, 0.0),
            28_000.0,
        );
        capsule
    }
}

impl VehicleService for Capsule {
    fn get(&self) -> Duration {
        self.get
    }
    fn gmt(&self) -> Epoch {
        Epoch::from_gregorian_utc_hms(1969, 5, 18, 16, 49, 0) + self.get
    }
    fn stage(&self) -> Stage {
        self.stage
    }
    fn docked(&self, port: DockingPort) -> bool {
        match port {
            DockingPort::CsmForward => self.forward_docked,
            DockingPort::SivbAdapter => self.sla_docked,
        }
    }
    fn state_vector(&self, vehicle: Vehicle) -> StateVector {
        match vehicle {
            Vehicle::Csm => self.csm,
            Vehicle::Lm => self.lm,
        }
    }
    fn masses(&self) -> VehicleMasses {
        VehicleMasses {
            csm_kg: self.csm.mass_kg,
            lm_kg: self.lm.mass_kg,
            lm_ascent_kg: 4_700.0,
        }
    }
    fn onboard_refsmmat(&self, _computer: Computer) -> Option<Matrix3<f64>> {
        Some(Matrix3::identity())
    }
    fn imu_gimbal_angles_deg(&self, _vehicle: Vehicle) -> Vector3<f64> {
        Vector3::zeros()
    }
    fn computer_clock(&self, _computer: Computer) -> Duration {
        self.get
    }
    fn ags_k_factor(&self) -> Option<Duration> {
        None
    }
    fn launch_vehicle_timebase(&self) -> u8 {
        self.timebase
    }
    fn launch_azimuth_deg(&self) -> f64 {
        72.0
    }
    fn lunar_revolution(&self) -> LunarRevolution {
        self.revolution
    }
    fn ground_contact(&self) -> bool {
        true
    }
    fn uplink_drained(&self, _computer: Computer) -> bool {
        self.drained
    }
    fn transmit_uplink(&mut self, uplink: &Uplink) {
        self.uplinks.push(uplink.clone());
    }
    fn sivb_command(&mut self, command: SivbCommand) {
        self.sivb.push(command);
    }
}

/// Engine answering the midcourse, burn and entry questions with canned values. Everything else is unsupported,
/// so the calculations needing it fall back to a state vector uplink.
#[derive(Default)]
pub struct Planner {
    /// Midcourse correction at the MCC-3 slot, ft/s
    pub deferred_fps: f64,
    /// Midcourse correction at any other time, ft/s
    pub midcourse_fps: f64,
    /// Shift of the pericynthion time computed by a midcourse correction
    pub loi_shift: Duration,
    /// Entry interface of the predicted return
    pub ei: Duration,
    pub calls: RefCell<Vec<String>>,
}

impl Planner {
    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }
}

impl AstroEngine for Planner {
    fn translunar_midcourse(&self, opts: &MidcourseOpts) -> Result<MidcourseSolution, EngineError> {
        self.record("midcourse");
        let fps = if opts.tig == opts.loi_get - 22 * Unit::Hour {
            self.deferred_fps
        } else {
            self.midcourse_fps
        };
        Ok(MidcourseSolution {
            tig: opts.tig,
            dv_inertial_m_s: Vector3::new(fps_to_m_s(fps), 0.0, 0.0),
            loi_get: opts.loi_get + self.loi_shift,
        })
    }

    fn powered_flight(
        &self,
        sv: &StateVector,
        tig: Duration,
        dv_inertial_m_s: &Vector3<f64>,
        _thruster: Thruster,
    ) -> Result<PoweredFlight, EngineError> {
        self.record("powered flight");
        Ok(PoweredFlight {
            tig,
            dv_lvlh_m_s: *dv_inertial_m_s,
            burn_time: 10 * Unit::Second,
            sv_post: *sv,
        })
    }

    fn maneuver_pad(&self, opts: &ManeuverPadOpts) -> Result<ManeuverPadData, EngineError> {
        self.record("maneuver PAD");
        Ok(ManeuverPadData {
            att_deg: Vector3::new(180.0, 12.0, 0.0),
            burn_time: 10 * Unit::Second,
            dvc_m_s: opts.dv_lvlh_m_s.norm(),
            dvt_m_s: opts.dv_lvlh_m_s.norm(),
            ha_m: 0.0,
            hp_m: 0.0,
            weight_kg: opts.sv.mass_kg,
        })
    }

    fn entry_prediction(&self, _sv: &StateVector) -> Result<EntryData, EngineError> {
        self.record("entry prediction");
        Ok(EntryData {
            latitude_deg: -13.0,
            longitude_deg: -165.0,
            ei_get: self.ei,
            rtgo_nm: 1_300.0,
            vio_fps: 36_300.0,
            get05g: self.ei + 30 * Unit::Second,
        })
    }
}

pub fn init_logging() {
    let _ = pel::try_init();
}

pub fn mission(planner: Planner) -> Mcc<Planner> {
    init_logging();
    Mcc::new(Rtcc::new(planner), MissionConfig::default())
}

/// A checkpoint in `state` and `sub_state`, with nothing in flight and free buffers
pub fn checkpoint_at(state: MissionState, sub_state: u8, get: Duration, params: CalcParams) -> Checkpoint {
    Checkpoint {
        state,
        sub_state,
        sub_state_start: get,
        phase: MissionPhase::TranslunarCoast,
        abort_mode: match state {
            MissionState::AbortOrbit => Some(AbortMode::EarthOrbit),
            MissionState::Abort => Some(AbortMode::Translunar),
            _ => None,
        },
        params,
        mpt: ManeuverPlanTable::default(),
        products: Products::default(),
        subthread: Default::default(),
        scrubbed: false,
        positive: Default::default(),
        negative: Default::default(),
        pad_shown: false,
        halted: false,
    }
}

pub fn resume(planner: Planner, cp: Checkpoint) -> Mcc<Planner> {
    init_logging();
    Mcc::restore(Rtcc::new(planner), MissionConfig::default(), cp).unwrap()
}

/// Advances the sequencer every `step` until `until` is passed, or until `stop` holds.
pub fn fly<F>(mcc: &mut Mcc<Planner>, capsule: &mut Capsule, until: Duration, step: Duration, stop: F)
where
    F: Fn(&Mcc<Planner>) -> bool,
{
    while capsule.get <= until {
        mcc.advance(capsule);
        if stop(mcc) {
            return;
        }
        capsule.get += step;
    }
}
