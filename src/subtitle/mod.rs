//! This module contains the in-memory representation of region
//! subtitles, the annotations bound to regions on the host's
//! timeline, as well as the display names derived from them.

use crate::actor::ActorSet;
use crate::config::{REGION_NAME_MAX_CHARS, Settings, UNKNOWN_ACTOR};
use crate::region::{RegionId, RegionStore, Time};

pub mod import;
pub mod parse;
pub mod tags;

/// Where a subtitle's region currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Bound to a region that is expected to exist in the host's store. `start` and `end` are
    /// the region's bounds when it was last seen.
    Linked {
        region: RegionId,
        start: Time,
        end: Time,
    },

    /// The region was deleted, by disabling its actor or by the host. The last known bounds are
    /// kept so the region can be re-created later.
    Orphaned { start: Time, end: Time },
}

impl Binding {
    /// The last known bounds of the region.
    #[must_use]
    pub fn bounds(self) -> (Time, Time) {
        match self {
            Binding::Linked { start, end, .. } | Binding::Orphaned { start, end } => (start, end),
        }
    }
}

/// One annotation bound to one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSubtitle {
    pub binding: Binding,

    /// The annotation text, with `\n` line breaks.
    pub notes: String,

    /// Actor name. Empty means unassigned, [`UNKNOWN_ACTOR`] means explicitly unknown.
    pub actor: String,
}

impl RegionSubtitle {
    #[must_use]
    pub fn new(region: RegionId, start: Time, end: Time, notes: &str, actor: &str) -> Self {
        Self {
            binding: Binding::Linked { region, start, end },
            notes: notes.to_owned(),
            actor: actor.to_owned(),
        }
    }

    #[must_use]
    pub fn orphaned(start: Time, end: Time, notes: &str, actor: &str) -> Self {
        Self {
            binding: Binding::Orphaned { start, end },
            notes: notes.to_owned(),
            actor: actor.to_owned(),
        }
    }

    /// The bound region, unless orphaned.
    #[must_use]
    pub fn region(&self) -> Option<RegionId> {
        match self.binding {
            Binding::Linked { region, .. } => Some(region),
            Binding::Orphaned { .. } => None,
        }
    }

    /// Whether the subtitle's region currently resolves in `store`.
    #[must_use]
    pub fn is_valid(&self, store: &dyn RegionStore) -> bool {
        self.region()
            .is_some_and(|region| store.find_region(region).is_some())
    }

    /// Updates the cached bounds from the live region. If the region is gone, the subtitle is
    /// orphaned at its last known bounds and true is returned.
    pub fn track(&mut self, store: &dyn RegionStore) -> bool {
        let Binding::Linked { region, start, end } = self.binding else {
            return false;
        };

        match store.find_region(region) {
            Some(bounds) => {
                self.binding = Binding::Linked {
                    region,
                    start: bounds.start,
                    end: bounds.end,
                };
                false
            }
            None => {
                self.binding = Binding::Orphaned { start, end };
                true
            }
        }
    }

    /// Whether a known actor is attached, i.e. neither unassigned nor unknown.
    #[must_use]
    pub fn has_actor(&self) -> bool {
        has_actor(&self.actor)
    }
}

pub(crate) fn has_actor(actor: &str) -> bool {
    !actor.is_empty() && actor != UNKNOWN_ACTOR
}

/// All region subtitles of a project, in order of creation.
#[derive(Debug, Clone, Default)]
pub struct SubtitleTrack {
    subtitles: Vec<RegionSubtitle>,
}

impl SubtitleTrack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subtitles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subtitles.is_empty()
    }

    pub fn push(&mut self, subtitle: RegionSubtitle) {
        self.subtitles.push(subtitle);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegionSubtitle> {
        self.subtitles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RegionSubtitle> {
        self.subtitles.iter_mut()
    }

    /// The subtitle bound to `region`, if any.
    #[must_use]
    pub fn find(&self, region: RegionId) -> Option<&RegionSubtitle> {
        self.subtitles
            .iter()
            .find(|subtitle| subtitle.region() == Some(region))
    }

    pub fn find_mut(&mut self, region: RegionId) -> Option<&mut RegionSubtitle> {
        self.subtitles
            .iter_mut()
            .find(|subtitle| subtitle.region() == Some(region))
    }

    #[must_use]
    pub fn contains(&self, region: RegionId) -> bool {
        self.find(region).is_some()
    }

    /// Removes the subtitle bound to `region` and returns it.
    pub fn remove(&mut self, region: RegionId) -> Option<RegionSubtitle> {
        let index = self
            .subtitles
            .iter()
            .position(|subtitle| subtitle.region() == Some(region))?;
        Some(self.subtitles.remove(index))
    }

    /// Whether any subtitle is attributed to `actor`.
    #[must_use]
    pub fn references_actor(&self, actor: &str) -> bool {
        self.subtitles.iter().any(|subtitle| subtitle.actor == actor)
    }

    pub fn clear(&mut self) {
        self.subtitles.clear();
    }
}

impl<'a> IntoIterator for &'a SubtitleTrack {
    type Item = &'a RegionSubtitle;
    type IntoIter = std::slice::Iter<'a, RegionSubtitle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Formats one annotation the way it is shown to the user: `(actor) notes`, or
/// `Linked (actor) notes` when the actor is linked and the actor prefix is switched on. Without
/// an actor, just the notes.
#[must_use]
pub fn display_line(actors: &ActorSet, settings: &Settings, actor: &str, notes: &str) -> String {
    if actor.is_empty() {
        return notes.to_owned();
    }

    let linked = if settings.actor_prefix && has_actor(actor) {
        actors.linked_name(actor)
    } else {
        None
    };

    match linked {
        Some(linked) => format!("{linked} ({actor}) {notes}"),
        None => format!("({actor}) {notes}"),
    }
}

/// The name given to a subtitle's region on the timeline. Unknown actors are left out, line
/// breaks become spaces, and the result is ellipsized to [`REGION_NAME_MAX_CHARS`] characters.
#[must_use]
pub fn region_name(actors: &ActorSet, settings: &Settings, actor: &str, notes: &str) -> String {
    let full = if has_actor(actor) {
        display_line(actors, settings, actor, notes)
    } else {
        notes.to_owned()
    };

    ellipsize(&full.replace(['\r', '\n'], " "), REGION_NAME_MAX_CHARS)
}

fn ellipsize(text: &str, max_chars: usize) -> String {
    const ELLIPSIS: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut result: String = text
        .chars()
        .take(max_chars.saturating_sub(ELLIPSIS.len()))
        .collect();
    result.push_str(ELLIPSIS);
    result
}
