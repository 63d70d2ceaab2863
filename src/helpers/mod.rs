pub mod date;

pub use date::{pretty_format, pretty_format_from_api, pretty_format_now};
