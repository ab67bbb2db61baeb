// Test module organization
pub mod test_flatten;
#[cfg(feature = "serde")]
pub mod test_serde;
