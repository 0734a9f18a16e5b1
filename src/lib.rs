pub mod apps;
pub mod config;
pub mod constants;
pub mod desktop;
pub mod drivers;
pub mod event_loop;
pub mod interaction;
pub mod keybindings;
pub mod layout;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod viewport;
pub mod window;
