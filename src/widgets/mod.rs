pub mod chart;
pub mod controls;
pub mod debug;
pub mod files;
pub mod open_prompt;
pub mod selector;
