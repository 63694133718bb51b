pub mod app;
pub mod avatar;
pub mod chat_panel;
pub mod fonts;
pub mod hud;
pub mod settings;
pub mod settings_io;
pub mod settings_window;
pub mod start_screen;
