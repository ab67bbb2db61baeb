/// Marker for values a host framework can dispatch on as an "activity".
///
/// Carries no behavior; implementing it only declares conformance.
pub trait Activity {}
