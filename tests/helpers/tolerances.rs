//! Tolerance constants for model tests.

/// Softmax outputs summing to one in f32.
pub const PROB_EPSILON: f32 = 1e-4;

/// Predictions from the same weights before and after a snapshot round trip.
/// The recorder stores full precision, so only reduction order can differ.
pub const PREDICTION_EPSILON: f32 = 1e-6;

/// Note times after adding an offset.
pub const TIME_EPSILON: f64 = 1e-9;
