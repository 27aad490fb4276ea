pub mod error;
pub mod formatter;
pub mod protocol;
pub mod report;
pub mod request;
pub mod selector;
pub mod time;
