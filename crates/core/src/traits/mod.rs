pub mod collaborators;
pub mod message_queue;
pub mod registry;
pub mod task_store;
pub mod watermark;

pub use collaborators::*;
pub use message_queue::*;
pub use registry::*;
pub use task_store::*;
pub use watermark::*;
