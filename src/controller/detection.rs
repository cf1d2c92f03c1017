//! Interactive "press a button to bind it" detection
//!
//! ```text
//! Armed ──capture_baseline──► Scanning ──scan──► Option<InputMapping>
//! ```
//!
//! Inputs already held when the session starts are recorded in a baseline and
//! only count once they have been released and pressed again.

use crate::device::DeviceHandle;
use crate::mapping::InputMapping;
use statum::{machine, state};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[state]
#[derive(Debug, Clone)]
pub enum DetectionState {
    Armed,    // Devices cleared, nothing sampled yet
    Scanning, // Baseline recorded, waiting for a fresh press
}

#[machine]
pub struct DetectionSession<S: DetectionState> {
    devices: Vec<DeviceHandle>,
    threshold: f32,
    baseline: BTreeMap<InputMapping, bool>,
}

impl<S: DetectionState> DetectionSession<S> {
    fn sample(&self) -> impl Iterator<Item = (InputMapping, f32)> + '_ {
        self.devices.iter().flat_map(|device| device.poll())
    }
}

impl DetectionSession<Armed> {
    /// Starts a session over `devices`, clearing their latched state
    pub fn create(devices: Vec<DeviceHandle>, threshold: f32) -> Self {
        info!(
            "Starting input detection over {} devices, threshold {}",
            devices.len(),
            threshold
        );
        for device in &devices {
            device.clear_edge_state();
        }

        Self::new(devices, threshold, BTreeMap::new())
    }

    /// Records which inputs are already held
    pub fn capture_baseline(mut self) -> DetectionSession<Scanning> {
        let samples: Vec<_> = self.sample().collect();
        for (mapping, strength) in samples {
            // first report of an input wins
            self.baseline
                .entry(mapping)
                .or_insert(strength >= self.threshold);
        }

        debug!(
            "Baseline captured: {} inputs, {} held",
            self.baseline.len(),
            self.baseline.values().filter(|&&held| held).count()
        );
        self.transition()
    }
}

impl DetectionSession<Scanning> {
    /// Polls until a fresh press shows up or `max_duration` has passed
    ///
    /// `pump` runs once per iteration before the deadline check, so callers can
    /// keep their event loop alive while waiting.
    pub fn scan<F: FnMut()>(mut self, max_duration: Duration, mut pump: F) -> Option<InputMapping> {
        let start = Instant::now();

        loop {
            pump();
            if start.elapsed() >= max_duration {
                info!("Input detection timed out after {:?}", max_duration);
                return None;
            }

            let samples: Vec<_> = self.sample().collect();
            for (mapping, strength) in samples {
                let held = self.baseline.entry(mapping.clone()).or_insert(false);
                if strength >= self.threshold {
                    if !*held {
                        info!("Detected input {} after {:?}", mapping, start.elapsed());
                        return Some(mapping);
                    }
                } else if *held {
                    debug!("{} released, armed for detection", mapping);
                    *held = false;
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }
}
