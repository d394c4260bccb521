mod header;
mod modals;
mod status;

pub use header::{HeaderInfo, render_header};
pub use modals::{render_confirm_run_modal, render_model_picker_modal};
pub use status::render_status;
