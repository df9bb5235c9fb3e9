//! The notes chunk: multi-line text embedded in a line-oriented document.
//!
//! A chunk starts with a caller-supplied header that ends in `\n|`. Every line break of the
//! text becomes `\n|`, so each payload line starts with the `|` continuation marker, and the
//! chunk is closed by a `>` line:
//!
//! ```text
//! <NOTES
//! |first line
//! |second line
//! >
//! ```

/// Header used when the caller has nothing more specific.
pub const DEFAULT_HEADER: &str = "<NOTES\n|";

const CONTINUATION: char = '|';
const TERMINATOR: char = '>';

/// Embeds `text` after `header`. Carriage returns are dropped.
#[must_use]
pub fn encode_chunk(text: &str, header: &str) -> String {
    let mut chunk = String::with_capacity(header.len() + text.len() + text.len() / 16 + 3);
    chunk.push_str(header);

    for char in text.chars() {
        match char {
            '\n' => {
                chunk.push('\n');
                chunk.push(CONTINUATION);
            }
            '\r' => {}
            _ => chunk.push(char),
        }
    }

    chunk.push('\n');
    chunk.push(TERMINATOR);
    chunk.push('\n');
    chunk
}

/// Extracts the text from a chunk. Everything up to and including the first `|` is header.
/// A block without any `|` holds no text.
#[must_use]
pub fn decode_chunk(block: &str) -> String {
    let Some(header_end) = block.find(CONTINUATION) else {
        return String::new();
    };

    let mut text = String::with_capacity(block.len() - header_end);
    let mut previous = CONTINUATION;
    for char in block[header_end + 1..].chars() {
        match char {
            '\r' | '\n' => {}
            CONTINUATION if previous == '\n' => text.push('\n'),
            _ => text.push(char),
        }
        previous = char;
    }

    if text.ends_with(TERMINATOR) {
        text.pop();
    }
    text
}
