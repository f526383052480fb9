pub mod dispatcher;

pub use dispatcher::{Event, EventDispatcher, EventKind, Handler};
