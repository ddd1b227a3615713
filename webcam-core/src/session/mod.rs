pub mod coordinator;
pub mod presentation;
pub mod webcam;
