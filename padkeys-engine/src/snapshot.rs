//! Per-tick input snapshot and the provider trait

use crate::error::InputError;

/// Controller state sampled once per tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Button states in device index order
    pub buttons: Vec<bool>,
    /// Axis values in [-1, 1]; `None` where the device gave no reading
    pub axes: Vec<Option<f32>>,
}

impl Snapshot {
    pub fn new(buttons: Vec<bool>, axes: Vec<Option<f32>>) -> Self {
        Self { buttons, axes }
    }

    /// Button state; indices the device doesn't have read as released
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Axis value; missing or unreadable axes read as 0.0
    pub fn axis(&self, index: usize) -> f32 {
        match self.axes.get(index).copied().flatten() {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }
}

/// Snapshot provider (the physical controller)
pub trait InputSource {
    /// Sample the device; must not block beyond a bounded read
    fn poll(&mut self) -> Result<Snapshot, InputError>;
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn poll(&mut self) -> Result<Snapshot, InputError> {
        (**self).poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reads_neutral() {
        let snap = Snapshot::new(vec![true], vec![Some(0.5), None, Some(f32::NAN)]);
        assert!(snap.button(0));
        assert!(!snap.button(7));
        assert_eq!(snap.axis(0), 0.5);
        assert_eq!(snap.axis(1), 0.0);
        assert_eq!(snap.axis(2), 0.0);
        assert_eq!(snap.axis(9), 0.0);
    }
}
