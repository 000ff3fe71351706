//! Background/foreground segmentation of grayscale video with a
//! sample-consensus (ViBe) pixel model.
//!
//! The model lives in [`segmentation`]; [`capture`] and [`output`] supply
//! frames to it and store its masks.

pub mod capture;
pub mod output;
pub mod segmentation;
