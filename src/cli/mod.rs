pub mod app;
pub mod commands;
pub mod demo;
pub mod dispatch;
pub mod env;
pub mod inspect;
pub mod output;
pub mod run;
pub mod runtime;

pub use app::run;
