//! Text formats for persisting region subtitles inside a line-oriented project document.

pub mod chunk;
pub mod project;
