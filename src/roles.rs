//! Role files: which characters a performer voices, and which colours they get.
//!
//! ```ini
//! ; comment
//! [Narrator]
//! color = #FF8000
//! character = Alice
//! character = Bob
//!
//! [character:Carol]
//! color = #0080FF
//! ```
//!
//! A `[Name]` section links every listed character to `Name` and, if it has a `color` line,
//! gives all of them that colour. A `[character:Name]` section only colours `Name`. Keys are
//! case-insensitive.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context as _;
use thiserror::Error;

use crate::actor::{Actor, ActorSet, ImportedRoles};
use crate::colour::Colour;

const CHARACTER_PREFIX: &str = "character:";
const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to write role file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to format role file: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("No linked or coloured actors to export")]
    NothingToExport,
}

/// One section of a role file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// `[Name]`: characters voiced by `name`.
    Linked {
        name: String,
        colour: Option<Colour>,
        characters: Vec<String>,
    },

    /// `[character:Name]`: a colour for a single actor.
    Character {
        name: String,
        colour: Option<Colour>,
    },
}

impl Section {
    fn set_colour(&mut self, new_colour: Colour) {
        match self {
            Section::Linked { colour, .. } | Section::Character { colour, .. } => {
                *colour = Some(new_colour);
            }
        }
    }
}

/// Parses role file text into its sections. Lines that do not fit the format are ignored.
#[must_use]
pub fn parse_role_file(text: &str) -> Vec<Section> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut sections: Vec<Section> = vec![];
    // Whether key/value lines currently belong to the last section in `sections`
    let mut in_section = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            in_section = match header.rfind(']') {
                Some(closing) => {
                    sections.push(parse_section_header(&header[..closing]));
                    true
                }
                None => false,
            };
            continue;
        }

        let Some(section) = sections.last_mut().filter(|_| in_section) else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim_end(), value.trim_start());

        if key.eq_ignore_ascii_case("color") {
            if let Some(colour) = Colour::from_hex(value) {
                section.set_colour(colour);
            }
        } else if key.eq_ignore_ascii_case("character") && !value.is_empty() {
            if let Section::Linked { characters, .. } = section {
                characters.push(value.to_owned());
            }
        }
    }

    sections
}

fn parse_section_header(header: &str) -> Section {
    match header.get(..CHARACTER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CHARACTER_PREFIX) => Section::Character {
            name: header[CHARACTER_PREFIX.len()..].trim().to_owned(),
            colour: None,
        },
        _ => Section::Linked {
            name: header.trim().to_owned(),
            colour: None,
            characters: vec![],
        },
    }
}

/// Applies a role file to a project's actors.
///
/// All live actors are first reset to unlinked with their generated colour. Live actors named
/// in the file are then updated in place. Every character named in the file is also recorded
/// in `imported`, which is cleared first, so that its role survives even while nothing
/// references it.
pub fn decode_role_file(text: &str, actors: &mut ActorSet, imported: &mut ImportedRoles) {
    let sections = parse_role_file(text);

    imported.clear();
    for actor in actors.iter_mut() {
        actor.reset_role();
    }

    for section in sections {
        match section {
            Section::Linked {
                name: linked,
                colour,
                characters,
            } => {
                for character in characters {
                    let mut placeholder = Actor::new(&character);
                    placeholder.linked.clone_from(&linked);
                    if let Some(colour) = colour {
                        placeholder.set_custom_colour(colour);
                    }

                    if let Some(actor) = actors.get_mut(&character) {
                        actor.linked.clone_from(&linked);
                        if let Some(colour) = colour {
                            actor.set_custom_colour(colour);
                        }
                    }
                    imported.record(placeholder);
                }
            }
            Section::Character {
                name,
                colour: Some(colour),
            } => {
                let mut placeholder = Actor::new(&name);
                placeholder.set_custom_colour(colour);

                if let Some(actor) = actors.get_mut(&name) {
                    actor.set_custom_colour(colour);
                }
                imported.record(placeholder);
            }
            Section::Character { colour: None, .. } => {}
        }
    }

    tracing::debug!("decoded role file with {} roles", imported.len());
}

/// Writes the roles of a project: every live actor that is linked or has a custom colour,
/// plus every imported role whose name is not live.
///
/// # Errors
/// Returns [`Error::NothingToExport`] if there is no such actor.
pub fn encode_role_file(actors: &ActorSet, imported: &ImportedRoles) -> Result<String, Error> {
    let merged: Vec<&Actor> = actors
        .iter()
        .filter(|actor| actor.is_linked() || actor.has_custom_colour)
        .chain(imported.iter().filter(|role| !actors.contains(&role.name)))
        .collect();

    if merged.is_empty() {
        return Err(Error::NothingToExport);
    }

    let mut text = String::new();
    let mut written: Vec<&str> = vec![];

    for actor in merged.iter().filter(|actor| actor.is_linked()) {
        let linked = actor.linked.as_str();
        if written.contains(&linked) {
            continue;
        }
        written.push(linked);

        let members: Vec<&&Actor> = merged.iter().filter(|a| a.linked == linked).collect();

        writeln!(text, "[{linked}]")?;
        if let Some(colour) = members
            .iter()
            .find(|member| member.has_custom_colour)
            .and_then(|member| member.colour)
        {
            writeln!(text, "color = {}", colour.to_hex())?;
        }
        for member in members {
            writeln!(text, "character = {}", member.name)?;
        }
        text.push('\n');
    }

    for actor in merged
        .iter()
        .filter(|actor| !actor.is_linked() && actor.has_custom_colour)
    {
        if let Some(colour) = actor.colour {
            write!(
                text,
                "[{CHARACTER_PREFIX}{}]\ncolor = {}\n\n",
                actor.name,
                colour.to_hex()
            )?;
        }
    }

    Ok(text)
}

/// Reads a role file from disk and applies it, see [`decode_role_file`].
///
/// # Errors
/// Returns an error if the file cannot be read. Nothing is changed in that case.
pub fn import_roles_file(
    path: &Path,
    actors: &mut ActorSet,
    imported: &mut ImportedRoles,
) -> anyhow::Result<()> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read role file {}", path.display()))?;
    decode_role_file(&String::from_utf8_lossy(&data), actors, imported);
    Ok(())
}

/// Writes the roles of a project to disk, see [`encode_role_file`].
///
/// # Errors
/// Returns an error if there is nothing to export (in which case no file is created), or if
/// the file cannot be written.
pub fn export_roles_file(
    path: &Path,
    actors: &ActorSet,
    imported: &ImportedRoles,
) -> Result<(), Error> {
    let text = encode_role_file(actors, imported)?;
    std::fs::write(path, text)?;
    Ok(())
}
