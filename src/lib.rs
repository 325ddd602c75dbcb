pub mod cli;
pub mod configuration;
pub mod convert;
pub mod error;
pub mod inspect;
pub mod kotatsu;
pub mod mihon;
pub mod pipeline;
pub mod source;
pub mod telemetry;
pub mod util;
