//! Hardware abstraction: everything the duty cycle needs from the board.
//!
//! Real targets implement this over their accelerometer DMA, ADC and radio;
//! [`crate::mock_hal::MockHal`] implements it in software.

use sgate_core::AlertKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HalError {
    #[error("radio transmission failed: {0}")]
    Radio(String),
}

pub trait HardwareAbstraction {
    /// Fill `buf` with the latest samples, returning how many were written.
    fn read_vibration_data(&mut self, buf: &mut [i16]) -> usize;

    /// Current cell voltage in millivolts.
    fn battery_voltage_mv(&mut self) -> u16;

    /// Milliseconds since boot.
    fn tick_ms(&self) -> u64;

    fn enter_sleep(&mut self, duration_ms: u32);

    /// Send an alert with a 0-100 confidence.
    fn transmit_alert(&mut self, kind: AlertKind, confidence_percent: u8) -> Result<(), HalError>;

    fn is_wake_event_pending(&self) -> bool;

    fn clear_wake_event(&mut self);
}
