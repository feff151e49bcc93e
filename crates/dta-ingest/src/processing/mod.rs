//! Run orchestration: scan, handle, publish, summarize

mod dispatcher;

pub use dispatcher::Dispatcher;
