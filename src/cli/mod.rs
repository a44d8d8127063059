pub mod app;
pub mod check;
pub mod commands;
pub mod context;
pub mod demo;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod key;
pub mod output;
pub mod runtime;
pub mod toggle;

pub use app::run;
pub use runtime::BridgeRuntime;
