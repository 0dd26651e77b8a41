pub mod app;
pub mod event;
pub mod layout;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::App;
