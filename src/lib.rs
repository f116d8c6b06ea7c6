pub mod api;
pub mod errors;
pub mod preview;
pub mod prompt;
pub mod report;
pub mod scaffold;
pub mod skeleton;
