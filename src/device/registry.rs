//! Resolves the configured mappings into live devices

use crate::device::{DeviceHandle, GamepadBackend, InputDevice, Keyboard};
use crate::mapping::{DeviceFramework, DeviceIdentity, DeviceKind, InputMapping};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Creates devices by identity and owns the keyboard singleton
///
/// The index-0 window keyboard is shared: every device set built by this
/// registry and every caller of [`DeviceRegistry::keyboard`] get the same
/// instance, so key events keep flowing across reloads.
pub struct DeviceRegistry {
    gamepads: Arc<dyn GamepadBackend>,
    keyboard: Mutex<Option<Arc<Keyboard>>>,
}

impl DeviceRegistry {
    pub fn new(gamepads: Arc<dyn GamepadBackend>) -> Self {
        Self {
            gamepads,
            keyboard: Mutex::new(None),
        }
    }

    /// The main keyboard, created on first use
    pub fn keyboard(&self) -> Arc<Keyboard> {
        self.keyboard
            .lock()
            .get_or_insert_with(|| {
                debug!("Creating main keyboard");
                Arc::new(Keyboard::new())
            })
            .clone()
    }

    /// Distinct devices referenced by the bound mappings and the modifier
    pub fn unique_devices(
        mappings: &[InputMapping],
        modifier: &InputMapping,
    ) -> BTreeSet<DeviceIdentity> {
        mappings
            .iter()
            .chain(std::iter::once(modifier))
            .filter(|mapping| !mapping.is_unbound())
            .map(InputMapping::device)
            .collect()
    }

    /// Creates and initializes one device per distinct identity
    ///
    /// Identities no device can be built for are skipped. A device that fails
    /// to initialize is kept; it simply reports no input.
    pub fn build_device_set(
        &self,
        mappings: &[InputMapping],
        modifier: &InputMapping,
    ) -> Vec<DeviceHandle> {
        let identities = Self::unique_devices(mappings, modifier);
        let mut devices = Vec::with_capacity(identities.len());

        for identity in identities {
            let Some(device) = self.create(&identity) else {
                debug!("No device for {}, its mappings stay silent", identity);
                continue;
            };
            if let Err(e) = device.initialize(identity.index) {
                warn!("Failed to initialize {}: {}", identity, e);
            }
            devices.push(device);
        }

        info!("Device set built with {} devices", devices.len());
        devices
    }

    /// Every device currently available on the system, keyboard last
    pub fn all_devices(&self) -> Vec<DeviceHandle> {
        let mut devices = self.gamepads.enumerate();
        devices.push(self.keyboard());
        devices
    }

    fn create(&self, identity: &DeviceIdentity) -> Option<DeviceHandle> {
        match (identity.framework, identity.kind) {
            (DeviceFramework::Window, DeviceKind::Keyboard) if identity.index == 0 => {
                Some(self.keyboard())
            }
            (DeviceFramework::Window, DeviceKind::Keyboard) => Some(Arc::new(Keyboard::new())),
            (DeviceFramework::Gilrs, DeviceKind::Gamepad) => Some(self.gamepads.open()),
            _ => None,
        }
    }
}
