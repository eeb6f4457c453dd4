pub mod admin;
pub mod panel;

pub use admin::{Admin, AdminEntity};
pub use panel::{Panel, PanelEntity};
