pub mod action;
pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod orchestrator;
pub mod poll;
pub mod primitives;
pub mod probes;
pub mod resolver;
pub mod runner;
pub mod session;
pub mod workflow;

pub use bookrunner_common::error;
pub use bookrunner_common::formatter;
pub use bookrunner_common::protocol;
pub use bookrunner_common::report;
pub use bookrunner_common::request;
pub use bookrunner_common::selector;
pub use bookrunner_common::time;
