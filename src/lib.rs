pub mod ai;
pub mod autocomplete;
pub mod chat;
pub mod commands;
pub mod config;
pub mod content;
pub mod input;
pub mod logging;
pub mod lookup;
pub mod storage;
pub mod timer;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
