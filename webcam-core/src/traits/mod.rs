pub mod media_host;
pub mod media_stream;
pub mod surface;
pub mod webcam_delegate;
