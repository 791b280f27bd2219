pub mod error;
mod poll;
mod segmenter;

pub use error::SegmentError;
pub use poll::Poll;
pub use segmenter::{PollEvents, RoundSegmenter};

#[cfg(test)]
mod tests;
