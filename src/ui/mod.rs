pub mod composer;
pub mod format;
pub mod view;
