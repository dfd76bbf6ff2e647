pub use entity::{case_recordings, recording_status, site_configs, Id};

pub mod case_recording;
pub mod error;
pub mod site_config;

/// Parses an id as it arrives from a URL. A string that isn't a UUID cannot name any
/// record, so it is reported as not found.
pub(crate) fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::RecordNotFound,
    })
}
