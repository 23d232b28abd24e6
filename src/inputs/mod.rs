//! Conversion inputs of one context
//!
//! Unlike the options these are never persisted or shared between contexts.

use tokio::sync::watch;

use crate::core::{Error, Result};

pub const HOURS: &str = "hours";
pub const MINUTES: &str = "minutes";
pub const SECONDS: &str = "seconds";
pub const DIVIDE: &str = "divide";

/// The four conversion inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputsState {
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
    /// Divisor applied to the total duration
    pub divide: f64,
}

impl Default for InputsState {
    fn default() -> Self {
        InputsState {
            hours: 0.0,
            minutes: 0.0,
            seconds: 0.0,
            divide: 1.0,
        }
    }
}

/// An inputs update; absent fields are left alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialInputs {
    /// Must be greater than or equal to 0
    pub hours: Option<f64>,
    /// Must be greater than or equal to 0
    pub minutes: Option<f64>,
    /// Must be greater than or equal to 0
    pub seconds: Option<f64>,
    /// Must be greater than 0
    pub divide: Option<f64>,
}

impl From<InputsState> for PartialInputs {
    fn from(state: InputsState) -> Self {
        PartialInputs {
            hours: Some(state.hours),
            minutes: Some(state.minutes),
            seconds: Some(state.seconds),
            divide: Some(state.divide),
        }
    }
}

/// Holds the inputs and publishes every accepted change
pub struct InputsStore {
    state: watch::Sender<InputsState>,
}

impl InputsStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(InputsState::default());
        InputsStore { state }
    }

    /// Validates and applies an update field by field, in declaration order.
    ///
    /// The first invalid field fails the call; fields before it stay applied.
    pub fn set_inputs(&self, inputs: &PartialInputs) -> Result<()> {
        if let Some(hours) = non_negative(HOURS, inputs.hours)? {
            self.state.send_modify(|s| s.hours = hours);
        }

        if let Some(minutes) = non_negative(MINUTES, inputs.minutes)? {
            self.state.send_modify(|s| s.minutes = minutes);
        }

        if let Some(seconds) = non_negative(SECONDS, inputs.seconds)? {
            self.state.send_modify(|s| s.seconds = seconds);
        }

        if let Some(divide) = inputs.divide {
            // NaN fails the comparison
            if !(divide > 0.0) {
                return Err(Error::validation(DIVIDE, divide));
            }
            self.state.send_modify(|s| s.divide = divide);
        }

        Ok(())
    }

    /// Restores the default inputs
    pub fn reset_inputs(&self) -> Result<()> {
        self.set_inputs(&InputsState::default().into())
    }

    /// Returns a copy of the current inputs
    pub fn snapshot(&self) -> InputsState {
        *self.state.borrow()
    }

    /// Returns a read-only view notified on every change
    pub fn subscribe(&self) -> watch::Receiver<InputsState> {
        self.state.subscribe()
    }
}

impl Default for InputsStore {
    fn default() -> Self {
        Self::new()
    }
}

fn non_negative(field: &'static str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if v >= 0.0 => Ok(Some(v)),
        Some(v) => Err(Error::validation(field, v)),
        None => Ok(None),
    }
}
