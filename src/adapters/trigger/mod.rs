mod manual;
mod signal;

pub use manual::{ManualTrigger, ManualTriggerHandle};
pub use signal::SignalTrigger;
