//! Plain-text reports for the clipboard.

use once_cell::sync::OnceCell;
use regex::Regex;
use thiserror::Error;

use crate::actor::ActorSet;
use crate::project::Project;
use crate::region::{RegionStore, Time};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("No marked subtitles to copy")]
    NothingToCopy,

    #[error("No linked actors")]
    NoLinkedActors,
}

struct Entry<'a> {
    start: Time,
    end: Time,
    text: &'a str,
}

static LINE_BREAK_REGEX: OnceCell<Regex> = OnceCell::new();

/// Joins all lines of `text` with single spaces, swallowing spaces around each break.
fn single_line(text: &str) -> String {
    let line_break_regex = LINE_BREAK_REGEX.get_or_init(|| {
        Regex::new(r" *(?:(?:\\N|\\n|\r\n|\r|\n) *)+").expect("line break regex is valid")
    });
    line_break_regex.replace_all(text, " ").into_owned()
}

/// Lists every subtitle that has at least one marker inside its region, one
/// `start - end text` line per subtitle, sorted by start time.
///
/// Subtitles of linked actors are grouped under their link name; the rest come first, without a
/// heading. Orphaned subtitles and subtitles whose region has vanished are left out.
///
/// # Errors
/// Returns [`Error::NothingToCopy`] if no subtitle qualifies.
pub fn copy_markers(store: &dyn RegionStore, project: &Project) -> Result<String, Error> {
    let markers = store.marker_positions();

    let mut unlinked: Vec<Entry> = vec![];
    let mut groups: Vec<(&str, Vec<Entry>)> = vec![];

    for subtitle in &project.subtitles {
        let Some(bounds) = subtitle.region().and_then(|region| store.find_region(region)) else {
            continue;
        };
        if !markers
            .iter()
            .any(|&marker| bounds.start <= marker && marker < bounds.end)
        {
            continue;
        }

        let entry = Entry {
            start: bounds.start,
            end: bounds.end,
            text: &subtitle.notes,
        };
        match project.actors.linked_name(&subtitle.actor) {
            Some(linked) => match groups.iter_mut().find(|(name, _)| *name == linked) {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((linked, vec![entry])),
            },
            None => unlinked.push(entry),
        }
    }

    let mut lines = entry_lines(&mut unlinked);
    for (linked, entries) in &mut groups {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push((*linked).to_owned());
        lines.extend(entry_lines(entries));
    }

    if lines.is_empty() {
        return Err(Error::NothingToCopy);
    }
    tracing::debug!("copied {} lines", lines.len());
    Ok(lines.join("\n"))
}

fn entry_lines(entries: &mut [Entry]) -> Vec<String> {
    // Stable, so entries starting together keep their creation order
    entries.sort_by_key(|entry| entry.start);
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} - {} {}",
                entry.start.clock(),
                entry.end.clock(),
                single_line(entry.text)
            )
        })
        .collect()
}

/// Which characters each performer voices:
///
/// ```text
/// Narrator:
/// - Alice
/// - Bob
///
/// Host:
/// - Eve
/// ```
///
/// # Errors
/// Returns [`Error::NoLinkedActors`] if no actor is linked.
pub fn role_distribution(actors: &ActorSet) -> Result<String, Error> {
    let groups: Vec<String> = actors
        .link_names()
        .into_iter()
        .map(|linked| {
            std::iter::once(format!("{linked}:"))
                .chain(
                    actors
                        .iter()
                        .filter(|actor| actor.linked == linked)
                        .map(|actor| format!("- {}", actor.name)),
                )
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    if groups.is_empty() {
        return Err(Error::NoLinkedActors);
    }
    Ok(groups.join("\n\n"))
}
