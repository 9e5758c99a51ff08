pub mod api_error;
pub mod error_recorder;
pub(crate) mod core;
