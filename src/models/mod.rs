pub mod account;
pub mod application;
pub mod interview;
pub mod job;

/// Returned when a stored or submitted string is not one of an enum's known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
