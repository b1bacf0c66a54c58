//! Device registry: typed factory from [`DeviceKind`] to constructor.

use std::collections::BTreeMap;

use crate::id::DeviceId;

use super::{Alarm, Device, DeviceKind, DeviceModel, Door, Light, Microwave, Outlet, Tv};

/// Builds a device of one kind in its initial state with default attributes.
pub type Constructor = fn(DeviceId, String) -> Device;

/// Maps each supported kind to its constructor.
///
/// Used when materializing devices from configuration or user input.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    constructors: BTreeMap<DeviceKind, Constructor>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DeviceKind::Door, |id, name| {
            Device::new(id, name, DeviceModel::Door(Door::default()))
        });
        registry.register(DeviceKind::Light, |id, name| {
            Device::new(id, name, DeviceModel::Light(Light::default()))
        });
        registry.register(DeviceKind::Outlet, |id, name| {
            Device::new(id, name, DeviceModel::Outlet(Outlet::default()))
        });
        registry.register(DeviceKind::Alarm, |id, name| {
            Device::new(id, name, DeviceModel::Alarm(Alarm))
        });
        registry.register(DeviceKind::Microwave, |id, name| {
            Device::new(id, name, DeviceModel::Microwave(Microwave::default()))
        });
        registry.register(DeviceKind::Tv, |id, name| {
            Device::new(id, name, DeviceModel::Tv(Tv::default()))
        });
        registry
    }
}

impl DeviceRegistry {
    /// A registry with no kinds registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register (or replace) the constructor for `kind`.
    pub fn register(&mut self, kind: DeviceKind, constructor: Constructor) {
        self.constructors.insert(kind, constructor);
    }

    /// Build a new device, or `None` when `kind` is not registered.
    #[must_use]
    pub fn create(
        &self,
        kind: DeviceKind,
        id: impl Into<DeviceId>,
        name: impl Into<String>,
    ) -> Option<Device> {
        self.constructors
            .get(&kind)
            .map(|constructor| constructor(id.into(), name.into()))
    }

    /// Registered kinds, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = DeviceKind> + '_ {
        self.constructors.keys().copied()
    }
}
