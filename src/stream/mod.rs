//! MJPEG streaming over HTTP

pub mod mjpeg;
pub mod producer;
pub mod server;
pub mod shared;

pub use producer::{FrameLoop, OpenSource, Producer, Step};
pub use server::{create_router, run_server};
pub use shared::{SharedState, SharedStateHandle, StatusResponse, StatusSnapshot};
