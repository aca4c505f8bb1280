pub mod decide;
pub mod inputs;
pub mod nearest;
pub mod watch;

pub use decide::{run_decide, DecideArgs};
pub use nearest::{run_nearest, NearestArgs};
pub use watch::{run_watch, WatchArgs};
