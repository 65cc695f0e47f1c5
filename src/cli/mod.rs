pub mod list;
pub mod run;
pub mod setup;
pub mod ui;
