//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a deal closing.
#[derive(Clone, Copy, Debug)]
pub struct Closing;

/// Marker type describing a moment something becomes due.
#[derive(Clone, Copy, Debug)]
pub struct Due;

/// Marker type describing a payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// Marker type describing a hiring.
#[derive(Clone, Copy, Debug)]
pub struct Hiring;
