pub mod operation;
pub mod sink;

pub use operation::{InitOperation, LoadInputOperation, MainOperation};
pub use sink::{NotificationEvent, NotificationSink};
