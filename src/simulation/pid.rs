//! PID controller state carried by adaptive cruise control vehicles

/// Proportional gain
pub const PID_KP: f64 = 0.5;
/// Integral gain (zero: the integral is tracked but has no effect)
pub const PID_KI: f64 = 0.0;
/// Derivative gain
pub const PID_KD: f64 = 0.2;

/// Error accumulators persisted across ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidState {
    pub last_error: f64,
    pub integral_error: f64,
}

impl PidState {
    /// Feed the current error and return the control output
    pub fn update(&mut self, error: f64) -> f64 {
        self.integral_error += error;
        let derivative = error - self.last_error;
        self.last_error = error;

        PID_KP * error + PID_KI * self.integral_error + PID_KD * derivative
    }
}
