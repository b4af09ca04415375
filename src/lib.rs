pub mod fetch;
pub mod process;
pub mod report;
