pub mod stream_result;

pub use stream_result::StreamResult;
