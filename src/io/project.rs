//! Persisted project records.
//!
//! A subtitle is stored as a notes chunk whose header carries its region id and times, followed
//! by the actor line:
//!
//! ```text
//! <SUBTITLE 12 1.000000 2.500000
//! Alice
//! |Hello
//! |world
//! >
//! ```
//!
//! Older documents only carry the region id (`<SUBTITLE 12`) and no actor line; those
//! subtitles are attributed to the unknown actor. An actor is stored as
//! `<ACTOR enabled packed_colour custom`, its name, an optional linked name, and `>`. Settings
//! are a single `<SETTINGS blob` line followed by `>`.

use thiserror::Error;

use super::chunk;
use crate::actor::Actor;
use crate::colour::{self, Colour};
use crate::config::{Settings, UNKNOWN_ACTOR};
use crate::region::{RegionId, Time};
use crate::subtitle::{Binding, RegionSubtitle};

pub const SUBTITLE_TAG: &str = "<SUBTITLE";
pub const ACTOR_TAG: &str = "<ACTOR";
pub const SETTINGS_TAG: &str = "<SETTINGS";
const END_LINE: &str = ">";

/// Region id written for orphaned subtitles.
const NO_REGION: i32 = -1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed record header: {0}")]
    MalformedHeader(String),

    #[error("Record is missing its closing line: {0}")]
    Unterminated(String),
}

/// One record of a persisted project.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Subtitle(RegionSubtitle),
    Actor(Actor),
    Settings(Settings),
}

/// Serializes a subtitle. For a subtitle bound to a region, `live_bounds` should be the region's
/// current bounds, or `None` if the region is gone. Subtitles without a live region are written
/// as orphaned, at their last known bounds.
#[must_use]
pub fn write_subtitle(subtitle: &RegionSubtitle, live_bounds: Option<(Time, Time)>) -> String {
    let (id, (start, end)) = match (subtitle.binding, live_bounds) {
        (Binding::Linked { region, .. }, Some(bounds)) => (region.0, bounds),
        (binding, _) => (NO_REGION, binding.bounds()),
    };

    let header = format!(
        "{SUBTITLE_TAG} {id} {:.6} {:.6}\n{}\n|",
        start.as_seconds(),
        end.as_seconds(),
        subtitle.actor
    );
    chunk::encode_chunk(&subtitle.notes, &header)
}

#[must_use]
pub fn write_actor(actor: &Actor) -> String {
    let mut record = format!(
        "{ACTOR_TAG} {} {} {}\n{}\n",
        u8::from(actor.enabled),
        colour::pack_optional(actor.colour),
        u8::from(actor.has_custom_colour),
        actor.name,
    );
    if actor.is_linked() {
        record.push_str(&actor.linked);
        record.push('\n');
    }
    record.push_str(END_LINE);
    record.push('\n');
    record
}

/// # Errors
/// Returns an error when the settings could not be serialized.
pub fn write_settings(settings: &Settings) -> anyhow::Result<String> {
    Ok(format!("{SETTINGS_TAG} {}\n{END_LINE}\n", settings.to_blob()?))
}

/// Reads all records from a project document. Lines outside of records are ignored, as are
/// actor records without a name.
///
/// # Errors
/// Returns an error when a record header cannot be parsed or a record is not closed.
pub fn read_records(document: &str) -> Result<Vec<Record>, Error> {
    let mut records = vec![];
    let mut lines = document.lines();

    while let Some(line) = lines.next() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some(SUBTITLE_TAG) => {
                let tokens: Vec<&str> = tokens.collect();
                records.push(Record::Subtitle(read_subtitle(line, &tokens, &mut lines)?));
            }
            Some(ACTOR_TAG) => {
                let tokens: Vec<&str> = tokens.collect();
                if let Some(actor) = read_actor(line, &tokens, &mut lines)? {
                    records.push(Record::Actor(actor));
                }
            }
            Some(SETTINGS_TAG) => {
                let blob = tokens.next().unwrap_or_default();
                let settings = Settings::from_blob(blob.as_bytes()).unwrap_or_else(|error| {
                    tracing::warn!("using default settings: {error}");
                    Settings::default()
                });
                expect_end(line, &mut lines)?;
                records.push(Record::Settings(settings));
            }
            _ => {}
        }
    }

    Ok(records)
}

fn read_subtitle<'a>(
    header: &str,
    tokens: &[&str],
    lines: &mut impl Iterator<Item = &'a str>,
) -> Result<RegionSubtitle, Error> {
    let malformed = || Error::MalformedHeader(header.to_string());

    let id = tokens
        .first()
        .and_then(|token| token.parse::<i32>().ok())
        .ok_or_else(malformed)?;

    let (times, actor) = if tokens.len() >= 3 {
        let seconds = |token: &str| token.parse::<f64>().map(Time::from_seconds);
        let start = seconds(tokens[1]).map_err(|_| malformed())?;
        let end = seconds(tokens[2]).map_err(|_| malformed())?;
        let actor = lines
            .next()
            .ok_or_else(|| Error::Unterminated(header.to_string()))?;
        (Some((start, end)), actor.to_owned())
    } else {
        (None, UNKNOWN_ACTOR.to_owned())
    };

    let mut block = String::new();
    loop {
        let line = lines
            .next()
            .ok_or_else(|| Error::Unterminated(header.to_string()))?;
        block.push_str(line);
        block.push('\n');
        if line == END_LINE {
            break;
        }
    }

    let (start, end) = times.unwrap_or_default();
    let binding = if id <= 0 {
        Binding::Orphaned { start, end }
    } else {
        Binding::Linked {
            region: RegionId(id),
            start,
            end,
        }
    };

    Ok(RegionSubtitle {
        binding,
        notes: chunk::decode_chunk(&block),
        actor,
    })
}

fn read_actor<'a>(
    header: &str,
    tokens: &[&str],
    lines: &mut impl Iterator<Item = &'a str>,
) -> Result<Option<Actor>, Error> {
    let flag = |index: usize| -> Result<bool, Error> {
        tokens
            .get(index)
            .and_then(|token| token.parse::<i64>().ok())
            .map(|value| value == 1)
            .ok_or_else(|| Error::MalformedHeader(header.to_string()))
    };
    let enabled = flag(0)?;
    let custom = flag(2)?;
    let packed = tokens
        .get(1)
        .and_then(|token| token.parse::<u32>().ok())
        .ok_or_else(|| Error::MalformedHeader(header.to_string()))?;

    let name = lines
        .next()
        .ok_or_else(|| Error::Unterminated(header.to_string()))?;
    if name == END_LINE {
        return Ok(None);
    }

    let mut linked = String::new();
    let next = lines
        .next()
        .ok_or_else(|| Error::Unterminated(header.to_string()))?;
    if next != END_LINE {
        next.clone_into(&mut linked);
        expect_end(header, lines)?;
    }

    if name.is_empty() {
        return Ok(None);
    }

    Ok(Some(Actor {
        name: name.to_owned(),
        colour: Colour::unpack(packed),
        enabled,
        has_custom_colour: custom,
        linked,
    }))
}

fn expect_end<'a>(header: &str, lines: &mut impl Iterator<Item = &'a str>) -> Result<(), Error> {
    match lines.next() {
        Some(END_LINE) => Ok(()),
        _ => Err(Error::Unterminated(header.to_string())),
    }
}
