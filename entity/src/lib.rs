use uuid::Uuid;

pub mod case_recordings;
pub mod recording_status;
pub mod site_configs;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
