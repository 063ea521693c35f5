pub mod overlay;

pub use self::overlay::OverlayWidget;
