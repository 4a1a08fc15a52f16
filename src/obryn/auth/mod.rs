pub mod gate;

pub use gate::{APP_PASSWORD, app_gate_passes, dev_gate_passes};
