//! Line-level parsers for the two subtitle interchange formats: `.ass` event lines and `.srt`
//! index and timing lines. File-level state (sections, blank-line-terminated text) lives in
//! [`super::import`].

use once_cell::sync::OnceCell;
use regex::Regex;
use thiserror::Error;

use crate::region::Time;

/// Number of comma-separated fields in front of the text of an `.ass` event line.
const EVENT_FIELD_COUNT: usize = 9;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Not a dialogue event line")]
    NotAnEvent,

    #[error("Truncated event line")]
    TruncatedLine,

    #[error("Event line has no text")]
    EmptyText,

    #[error("Found invalid timecode: {0}")]
    InvalidTimecode(String),

    #[error("Found invalid subtitle index: {0}")]
    InvalidIndex(String),

    #[error("Found invalid time range: {0}")]
    InvalidTimeRange(String),
}

/// The parts of a `Dialogue:` line that matter for region subtitles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEvent<'a> {
    pub start: Time,
    pub end: Time,

    /// May be empty.
    pub actor: &'a str,

    /// Raw event text, still including override tags. Never empty.
    pub text: &'a str,
}

/// Whether `line` is a section header (`[Something]`), and if so, whether it opens the events
/// section.
#[must_use]
pub fn section_header(line: &str) -> Option<bool> {
    if !line.starts_with('[') {
        return None;
    }

    Some(
        line.get(..8)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("[events]")),
    )
}

/// Parses a `Dialogue:` line. The first nine fields are split on plain commas, everything after
/// the ninth comma is the text, up to the end of the line.
///
/// # Errors
/// Returns an error if the line is not a dialogue line, has fewer than nine fields in front of
/// the text, has no text, or if one of its timecodes is invalid.
pub fn parse_dialogue_line(line: &str) -> Result<DialogueEvent<'_>, Error> {
    let fields_str = line
        .get(..9)
        .filter(|prefix| prefix.eq_ignore_ascii_case("dialogue:"))
        .map(|_| line[9..].trim_start_matches(' '))
        .ok_or(Error::NotAnEvent)?;

    let mut split = fields_str.splitn(EVENT_FIELD_COUNT + 1, ',');
    let mut fields: [&str; EVENT_FIELD_COUNT] = [""; EVENT_FIELD_COUNT];
    for field in &mut fields {
        *field = split.next().ok_or(Error::TruncatedLine)?;
    }
    let text = split.next().ok_or(Error::TruncatedLine)?;

    let start = parse_timecode(fields[1])?;
    let end = parse_timecode(fields[2])?;

    let text = text.split(['\r', '\n']).next().unwrap_or_default();
    if text.is_empty() {
        return Err(Error::EmptyText);
    }

    Ok(DialogueEvent {
        start,
        end,
        actor: fields[4].trim(),
        text,
    })
}

static TIMECODE_REGEX: OnceCell<Regex> = OnceCell::new();

/// Parses an `H:MM:SS.cc` timecode. Like a `scanf`, leading whitespace is skipped and anything
/// after the last number is ignored.
///
/// # Errors
/// Returns [`Error::InvalidTimecode`] if the timecode does not match.
pub fn parse_timecode(timecode: &str) -> Result<Time, Error> {
    let timecode_regex = TIMECODE_REGEX.get_or_init(|| {
        Regex::new(r"^\s*(\d+):(\d+):(\d+)\.(\d+)").expect("timecode regex is valid")
    });

    let invalid = || Error::InvalidTimecode(timecode.to_string());
    let captures = timecode_regex.captures(timecode).ok_or_else(invalid)?;
    let number = |index: usize| captures[index].parse::<i64>().map_err(|_| invalid());

    let centis = number(4)?.checked_mul(10).ok_or_else(invalid)?;
    clock_millis(number(1)?, number(2)?, number(3)?)
        .and_then(|millis| millis.checked_add(centis))
        .map(Time)
        .ok_or_else(invalid)
}

static TIME_RANGE_REGEX: OnceCell<Regex> = OnceCell::new();

/// Parses an `H:MM:SS,mmm --> H:MM:SS,mmm` timing line.
///
/// # Errors
/// Returns [`Error::InvalidTimeRange`] unless all eight numbers are present.
pub fn parse_time_range(line: &str) -> Result<(Time, Time), Error> {
    let range_regex = TIME_RANGE_REGEX.get_or_init(|| {
        Regex::new(r"^\s*(\d+):(\d+):(\d+),(\d+)\s*-->\s*(\d+):(\d+):(\d+),(\d+)")
            .expect("time range regex is valid")
    });

    let invalid = || Error::InvalidTimeRange(line.trim_end().to_string());
    let captures = range_regex.captures(line).ok_or_else(invalid)?;
    let number = |index: usize| captures[index].parse::<i64>().map_err(|_| invalid());

    let time = |first: usize| -> Result<Time, Error> {
        let millis = number(first + 3)?;
        clock_millis(number(first)?, number(first + 1)?, number(first + 2)?)
            .and_then(|clock| clock.checked_add(millis))
            .map(Time)
            .ok_or_else(invalid)
    };
    Ok((time(1)?, time(5)?))
}

/// Parses the numeric index line in front of an `.srt` entry. Leading whitespace and trailing
/// garbage are tolerated; zero is not a valid index.
///
/// # Errors
/// Returns [`Error::InvalidIndex`] if the line does not start with a non-zero number.
pub fn parse_index_line(line: &str) -> Result<i32, Error> {
    let trimmed = line.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);

    match trimmed[..digits_end].parse::<i32>() {
        Ok(index) if index != 0 => Ok(index),
        _ => Err(Error::InvalidIndex(line.trim_end().to_string())),
    }
}

/// `None` if the result does not fit.
fn clock_millis(hours: i64, minutes: i64, seconds: i64) -> Option<i64> {
    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)
}
