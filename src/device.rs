//! Gamepad snapshots from evdev
//!
//! Gamepads are the event devices that report an absolute X axis and joystick
//! button codes. A joystick id indexes them in device node order, so ids are
//! stable for a given set of plugged-in controllers.
//!
//! Button order follows the usual Linux joystick numbering: codes from
//! `BTN_JOYSTICK` upward first, then the `BTN_MISC` block. Axes are every
//! absolute axis below `ABS_MISC` except hats.

use evdev::{AbsoluteAxisType, Device, Key};
use padkeys_engine::{InputError, InputSource, Snapshot};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const BTN_MISC: u16 = 0x100;
const BTN_JOYSTICK: u16 = 0x120;
const BTN_DIGI: u16 = 0x140;
const KEY_CNT: u16 = 0x300;
const ABS_HAT0X: u16 = 0x10;
const ABS_HAT3Y: u16 = 0x17;
const ABS_MISC: u16 = 0x28;

/// Summary of one detected gamepad
#[derive(Debug, Clone)]
pub struct GamepadInfo {
    pub id: usize,
    pub path: PathBuf,
    pub name: String,
    pub buttons: usize,
    pub axes: usize,
}

/// All gamepads, in joystick id order
pub fn list_gamepads() -> Vec<GamepadInfo> {
    gamepads()
        .into_iter()
        .enumerate()
        .map(|(id, (path, device))| GamepadInfo {
            id,
            name: device.name().unwrap_or("Unknown").to_string(),
            buttons: button_codes(&device).len(),
            axes: axis_codes(&device).len(),
            path,
        })
        .collect()
}

fn gamepads() -> Vec<(PathBuf, Device)> {
    let mut found: Vec<_> = evdev::enumerate()
        .filter(|(_, device)| is_gamepad(device))
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

fn is_gamepad(device: &Device) -> bool {
    let has_x = device
        .supported_absolute_axes()
        .is_some_and(|axes| axes.contains(AbsoluteAxisType::ABS_X));
    let has_buttons = device
        .supported_keys()
        .is_some_and(|keys| (BTN_JOYSTICK..BTN_DIGI).any(|code| keys.contains(Key::new(code))));
    has_x && has_buttons
}

fn button_codes(device: &Device) -> Vec<Key> {
    let Some(keys) = device.supported_keys() else {
        return Vec::new();
    };
    (BTN_JOYSTICK..KEY_CNT)
        .chain(BTN_MISC..BTN_JOYSTICK)
        .map(Key::new)
        .filter(|key| keys.contains(*key))
        .collect()
}

fn axis_codes(device: &Device) -> Vec<AbsoluteAxisType> {
    let Some(axes) = device.supported_absolute_axes() else {
        return Vec::new();
    };
    axes.iter()
        .filter(|axis| axis.0 < ABS_MISC && !(ABS_HAT0X..=ABS_HAT3Y).contains(&axis.0))
        .collect()
}

/// Map a raw reading onto [-1, 1]
///
/// `None` when the reported range is empty.
pub fn normalize(value: i32, min: i32, max: i32) -> Option<f32> {
    if max <= min {
        return None;
    }
    let span = f64::from(max) - f64::from(min);
    let unit = (f64::from(value) - f64::from(min)) / span;
    Some(((unit * 2.0 - 1.0) as f32).clamp(-1.0, 1.0))
}

/// Snapshot provider backed by one evdev gamepad
pub struct EvdevGamepad {
    path: PathBuf,
    device: Option<Device>,
    buttons: Vec<Key>,
    axes: Vec<AbsoluteAxisType>,
}

impl EvdevGamepad {
    /// Open the gamepad with the given joystick id
    pub fn open(joystick_id: usize) -> Result<Self, InputError> {
        let (path, device) = gamepads()
            .into_iter()
            .nth(joystick_id)
            .ok_or(InputError::NotFound(joystick_id))?;
        Ok(Self::from_device(path, device))
    }

    fn from_device(path: PathBuf, device: Device) -> Self {
        let buttons = button_codes(&device);
        let axes = axis_codes(&device);
        info!(
            "Opened {} at {} ({} buttons, {} axes)",
            device.name().unwrap_or("Unknown"),
            path.display(),
            buttons.len(),
            axes.len()
        );
        Self {
            path,
            device: Some(device),
            buttons,
            axes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.device.as_ref()?.name()
    }

    fn read(&self, device: &Device) -> std::io::Result<Snapshot> {
        let keys = device.get_key_state()?;
        let abs = device.get_abs_state()?;

        let buttons = self.buttons.iter().map(|key| keys.contains(*key)).collect();
        let axes = self
            .axes
            .iter()
            .map(|axis| {
                let info = abs.get(usize::from(axis.0))?;
                normalize(info.value, info.minimum, info.maximum)
            })
            .collect();
        Ok(Snapshot::new(buttons, axes))
    }

    /// Try to get the device node back after a disconnect
    fn reopen(&mut self) -> Result<(), InputError> {
        let device = Device::open(&self.path).map_err(|_| InputError::Disconnected)?;
        debug!("Reopened {}", self.path.display());
        self.device = Some(device);
        Ok(())
    }
}

impl InputSource for EvdevGamepad {
    fn poll(&mut self) -> Result<Snapshot, InputError> {
        if self.device.is_none() {
            self.reopen()?;
        }
        let Some(device) = self.device.as_ref() else {
            return Err(InputError::Disconnected);
        };
        match self.read(device) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                self.device = None;
                if e.raw_os_error() == Some(libc::ENODEV) {
                    Err(InputError::Disconnected)
                } else {
                    Err(InputError::Read(e))
                }
            }
        }
    }
}
