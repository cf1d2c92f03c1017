//! Input core - owns devices, mapping table and shared pad state
//!
//! ```text
//!                    init / reload
//! SettingsProvider ─────────────────► DeviceRegistry + MappingTable
//!                                            │
//! TickScheduler ──tick(lateness)──► poll ────┴──► TickAggregator ──► PadContext
//!       ▲                                                                │
//!       └───────── schedule(period - lateness) ◄── HidConsumer ◄─────────┘
//! ```
//!
//! Pad state, circle pad, mapping table and device set live behind one lock, so
//! a tick never sees a table that does not belong to the devices it polls.
//! Touch state has its own lock.
//!
//! Every `init` and `shutdown` starts a new generation. A tick only re-arms the
//! scheduler if its generation is still current, so a tick that straddles a
//! restart cannot leave a second tick chain behind.

use crate::config::SettingsProvider;
use crate::controller::aggregator::TickAggregator;
use crate::controller::detection::DetectionSession;
use crate::controller::state::{CirclePad, PadUpdate, TickParams, TouchState};
use crate::device::{DeviceHandle, DeviceRegistry, GamepadBackend, InputSnapshot, Keyboard};
use crate::hid::HidConsumer;
use crate::mapping::{DeviceIdentity, InputMapping, MappingTable, PadState};
use crate::timing::{TickCallback, TickScheduler};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a tick reads or writes
#[derive(Default)]
struct PadContext {
    pad_state: PadState,
    circle_pad: CirclePad,
    table: MappingTable,
    devices: Vec<DeviceHandle>,
    aggregator: TickAggregator,
    params: TickParams,
    period: Duration,
}

pub struct InputCore {
    pad: Mutex<PadContext>,
    touch: Mutex<TouchState>,
    registry: DeviceRegistry,
    settings: Arc<dyn SettingsProvider>,
    scheduler: Arc<dyn TickScheduler>,
    hid: Arc<dyn HidConsumer>,
    generation: Mutex<u64>,
}

impl InputCore {
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        gamepads: Arc<dyn GamepadBackend>,
        scheduler: Arc<dyn TickScheduler>,
        hid: Arc<dyn HidConsumer>,
    ) -> Self {
        Self {
            pad: Mutex::new(PadContext::default()),
            touch: Mutex::new(TouchState::default()),
            registry: DeviceRegistry::new(gamepads),
            settings,
            scheduler,
            hid,
            generation: Mutex::new(0),
        }
    }

    /// Builds devices and table, then starts ticking
    ///
    /// The registered callback only holds a weak reference; once the last
    /// `Arc<InputCore>` is gone, pending ticks do nothing.
    pub fn init(self: &Arc<Self>) {
        info!("Initializing input core");
        let period = {
            let mut ctx = self.pad.lock();
            self.rebuild(&mut ctx);
            ctx.period
        };

        let mut generation = self.generation.lock();
        *generation += 1;
        let current = *generation;

        let core = Arc::downgrade(self);
        let callback: TickCallback = Arc::new(move |lateness| {
            if let Some(core) = core.upgrade() {
                core.tick_in(current, lateness);
            }
        });
        self.scheduler.register(callback);
        self.scheduler.schedule(period);
        info!("Input core running with {:?} tick period", period);
    }

    /// Stops ticking and drops every device
    pub fn shutdown(&self) {
        info!("Shutting down input core");
        {
            let mut generation = self.generation.lock();
            *generation += 1;
            self.scheduler.unschedule();
        }
        self.pad.lock().devices.clear();
    }

    /// Rebuilds devices and table from the current configuration
    ///
    /// Does nothing while no devices are registered, i.e. before `init`.
    pub fn reload(&self) {
        let mut ctx = self.pad.lock();
        if ctx.devices.is_empty() {
            debug!("Reload skipped, no devices registered");
            return;
        }

        info!("Reloading input configuration");
        ctx.devices.clear();
        self.rebuild(&mut ctx);
    }

    /// One input tick; normally only called by the scheduler
    pub fn tick(&self, lateness: Duration) {
        let current = *self.generation.lock();
        self.tick_in(current, lateness);
    }

    fn tick_in(&self, generation: u64, lateness: Duration) {
        let (update, period) = {
            let mut guard = self.pad.lock();
            let ctx = &mut *guard;

            let inputs: Vec<InputSnapshot> = ctx.devices.iter().map(|device| device.poll()).collect();
            ctx.circle_pad =
                ctx.aggregator
                    .process(&inputs, &ctx.table, &ctx.params, &mut ctx.pad_state);

            let update = PadUpdate {
                buttons: ctx.pad_state,
                circle_pad: ctx.circle_pad,
            };
            (update, ctx.period)
        };

        self.hid.pad_state_updated(update);

        let current = self.generation.lock();
        if *current != generation {
            debug!("Core restarted during tick, not re-arming");
            return;
        }
        self.scheduler.schedule(period.saturating_sub(lateness));
    }

    pub fn tick_period(&self) -> Duration {
        self.pad.lock().period
    }

    pub fn pad_state(&self) -> PadState {
        self.pad.lock().pad_state
    }

    /// Overwrites the pad bits; bound inputs take over again on their next transition
    pub fn set_pad_state(&self, state: PadState) {
        debug!("Pad state overwritten: {:#010x}", state.bits());
        self.pad.lock().pad_state = state;
    }

    pub fn circle_pad(&self) -> CirclePad {
        self.pad.lock().circle_pad
    }

    pub fn touch_state(&self) -> TouchState {
        *self.touch.lock()
    }

    pub fn set_touch_state(&self, state: TouchState) {
        *self.touch.lock() = state;
    }

    pub fn keyboard(&self) -> Arc<Keyboard> {
        self.registry.keyboard()
    }

    pub fn all_devices(&self) -> Vec<DeviceHandle> {
        self.registry.all_devices()
    }

    /// Runs a detection session over all available devices
    ///
    /// Blocks the calling thread for at most `max_duration`. Returns `None` if
    /// nothing new was pressed in time.
    pub fn detect_input<F: FnMut()>(&self, max_duration: Duration, pump: F) -> Option<InputMapping> {
        let threshold = self.pad.lock().params.threshold;
        DetectionSession::create(self.all_devices(), threshold)
            .capture_baseline()
            .scan(max_duration, pump)
    }

    pub fn mapping_table(&self) -> MappingTable {
        self.pad.lock().table.clone()
    }

    // polling order
    pub fn device_identities(&self) -> Vec<DeviceIdentity> {
        self.pad
            .lock()
            .devices
            .iter()
            .map(|device| device.identity())
            .collect()
    }

    fn rebuild(&self, ctx: &mut PadContext) {
        let config = self.settings.current();
        let mappings = config.input_mappings();

        ctx.devices = self
            .registry
            .build_device_set(&mappings, &config.circle_pad_modifier);
        ctx.table = MappingTable::build(&mappings);
        ctx.params = TickParams::from(&config);
        ctx.period = config.tick_period();

        // button history restarts as released, so the bits have to as well
        ctx.aggregator.reset();
        ctx.pad_state = PadState::empty();
        ctx.circle_pad = CirclePad::default();

        info!(
            "Mapping table built: {} inputs, {} devices",
            ctx.table.len(),
            ctx.devices.len()
        );
    }
}
