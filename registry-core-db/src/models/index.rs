use super::identifiable::Identifiable;

/// Trait for index records that can be uniquely identified
pub trait Index: Identifiable {}