// Configuration loading

pub mod settings;
pub mod theme;

pub use settings::GridSettings;
pub use theme::GridTheme;
