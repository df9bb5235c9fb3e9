//! The project-scoped owner of all notes state, and its persistence inside the host's project
//! document.

use anyhow::Context as _;

use crate::actor::{ActorSet, ImportedRoles};
use crate::config::Settings;
use crate::io::project::{self, Record};
use crate::region::RegionStore;
use crate::subtitle::SubtitleTrack;

/// Everything one host project knows about its notes. Hosts with several open projects keep one
/// of these per project.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub actors: ActorSet,

    /// Roles read from the last role file, kept so they can be written back out even while no
    /// subtitle uses them.
    pub imported_roles: ImportedRoles,

    pub subtitles: SubtitleTrack,

    pub settings: Settings,
}

impl Project {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets all state, as when the host starts a new project. Does not touch the host's
    /// regions.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Serializes the project into lines for the host's project document.
    ///
    /// Subtitles without notes are not written. Bound subtitles are written with the current
    /// times of their region. If that region no longer exists, the subtitle is written as
    /// orphaned at its last known times.
    ///
    /// # Errors
    /// Returns an error when the settings could not be serialized.
    pub fn save(&self, store: &dyn RegionStore) -> anyhow::Result<String> {
        let mut document = String::new();

        for subtitle in &self.subtitles {
            if subtitle.notes.is_empty() {
                continue;
            }

            let live_bounds = subtitle.region().and_then(|region| {
                let bounds = store.find_region(region);
                if bounds.is_none() {
                    tracing::debug!("saving subtitle of vanished region {region} as orphaned");
                }
                bounds.map(|bounds| (bounds.start, bounds.end))
            });
            document.push_str(&project::write_subtitle(subtitle, live_bounds));
        }

        for actor in self.actors.iter() {
            document.push_str(&project::write_actor(actor));
        }

        document.push_str(
            &project::write_settings(&self.settings).context("Failed to save project settings")?,
        );
        Ok(document)
    }

    /// Reads a project back from the lines [`Project::save`] wrote. Actors referenced by a
    /// subtitle but missing from the document are created with default attributes.
    ///
    /// # Errors
    /// Returns an error if a record is malformed. Nothing is loaded in that case.
    pub fn load(document: &str) -> Result<Self, project::Error> {
        let mut loaded = Self::new();

        for record in project::read_records(document)? {
            match record {
                Record::Subtitle(subtitle) => loaded.subtitles.push(subtitle),
                Record::Actor(actor) => loaded.actors.insert(actor),
                Record::Settings(settings) => loaded.settings = settings,
            }
        }

        let Self {
            actors, subtitles, ..
        } = &mut loaded;
        for subtitle in subtitles.iter().filter(|subtitle| !subtitle.actor.is_empty()) {
            actors.find_or_create(&subtitle.actor);
        }

        tracing::info!(
            "loaded {} subtitles and {} actors",
            loaded.subtitles.len(),
            loaded.actors.len()
        );
        Ok(loaded)
    }
}
