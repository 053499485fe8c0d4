//! Command implementations.

pub mod extractor;
pub mod run;
pub mod worker;

pub use self::extractor::execute_extractor;
pub use self::run::execute_run;
pub use self::worker::execute_worker;
