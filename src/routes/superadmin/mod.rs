mod handler;
mod model;

pub use handler::{panel_inbounds, test_panel};
pub use model::{TestPanelRequest, TestPanelResponse};
