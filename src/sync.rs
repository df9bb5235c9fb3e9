//! Keeping region subtitles and the host's regions in agreement.
//!
//! A subtitle is bound to a region while its actor is enabled. Disabling the actor deletes the
//! region and orphans the subtitle with the region's last bounds; enabling it again re-creates
//! the region there. Colour and display name changes are pushed to the live regions without
//! touching their timing.
//!
//! The cursor-driven part lives in [`Session`]: which subtitled regions overlap the cursor,
//! which of them is selected, and what text to show for them.

use crate::colour::Colour;
use crate::config::UNKNOWN_ACTOR;
use crate::project::Project;
use crate::region::{NewRegion, RegionId, RegionStore, Time};
use crate::subtitle::{self, Binding, RegionSubtitle};

/// Colour for a region showing a subtitle by `actor`, respecting the colour-coding switch.
fn region_colour(project: &Project, actor: &str) -> Option<Colour> {
    if project.settings.coloured_regions {
        project.actors.effective_colour(actor)
    } else {
        None
    }
}

/// Deletes the regions of all of `actor`'s bound subtitles, keeping their last bounds. Returns
/// the number of subtitles orphaned.
pub fn orphan_actor_regions(
    store: &mut dyn RegionStore,
    project: &mut Project,
    actor: &str,
) -> usize {
    let mut orphaned = 0;

    for subtitle in project.subtitles.iter_mut().filter(|s| s.actor == actor) {
        let Binding::Linked { region, start, end } = subtitle.binding else {
            continue;
        };
        let (start, end) = match store.find_region(region) {
            Some(bounds) => {
                store.delete_region(region);
                (bounds.start, bounds.end)
            }
            None => {
                tracing::debug!("region {region} of a subtitle by {actor} is already gone");
                (start, end)
            }
        };

        subtitle.binding = Binding::Orphaned { start, end };
        orphaned += 1;
    }

    tracing::debug!("orphaned {orphaned} subtitles by {actor}");
    orphaned
}

/// Re-creates regions for all of `actor`'s subtitles whose region is gone, at their cached
/// bounds. Returns the number of regions created.
pub fn recreate_actor_regions(
    store: &mut dyn RegionStore,
    project: &mut Project,
    actor: &str,
) -> usize {
    let colour = region_colour(project, actor);
    let mut created = 0;

    let Project {
        actors,
        subtitles,
        settings,
        ..
    } = project;

    for subtitle in subtitles.iter_mut().filter(|s| s.actor == actor) {
        subtitle.track(&*store);
        let Binding::Orphaned { start, end } = subtitle.binding else {
            continue;
        };

        let name = subtitle::region_name(actors, settings, &subtitle.actor, &subtitle.notes);
        match store.create_region(NewRegion {
            start,
            end,
            name: &name,
            colour,
            index_hint: None,
        }) {
            Some(region) => {
                subtitle.binding = Binding::Linked { region, start, end };
                created += 1;
            }
            None => tracing::warn!("host refused to re-create region {}..{}", start.0, end.0),
        }
    }

    tracing::debug!("re-created {created} regions for {actor}");
    created
}

/// Refreshes the cached bounds of every bound subtitle and orphans those whose region the host
/// deleted. Returns the number of subtitles orphaned.
pub fn track_regions(store: &dyn RegionStore, project: &mut Project) -> usize {
    let mut orphaned = 0;
    for subtitle in project.subtitles.iter_mut() {
        if subtitle.track(store) {
            orphaned += 1;
        }
    }
    if orphaned > 0 {
        tracing::debug!("{orphaned} regions were deleted by the host");
    }
    orphaned
}

/// Renames and recolours every live region from its subtitle, e.g. after a colour, link or
/// display setting changed.
pub fn refresh_regions(store: &mut dyn RegionStore, project: &Project) {
    for subtitle in &project.subtitles {
        let Some(region) = subtitle.region() else {
            continue;
        };
        if store.find_region(region).is_none() {
            continue;
        }

        let name = subtitle::region_name(
            &project.actors,
            &project.settings,
            &subtitle.actor,
            &subtitle.notes,
        );
        store.update_region(region, &name, region_colour(project, &subtitle.actor));
    }
}

/// Enables or disables an actor, orphaning or re-creating its regions. Returns false if the
/// actor does not exist or already was in that state.
pub fn set_actor_enabled(
    store: &mut dyn RegionStore,
    project: &mut Project,
    actor: &str,
    enabled: bool,
) -> bool {
    match project.actors.get_mut(actor) {
        Some(entry) if entry.enabled != enabled => entry.enabled = enabled,
        _ => return false,
    }

    if enabled {
        recreate_actor_regions(store, project, actor);
    } else {
        orphan_actor_regions(store, project, actor);
    }
    true
}

/// Flips an actor between enabled and disabled.
pub fn toggle_actor(store: &mut dyn RegionStore, project: &mut Project, actor: &str) {
    if let Some(enabled) = project.actors.get(actor).map(|a| a.enabled) {
        set_actor_enabled(store, project, actor, !enabled);
    }
}

/// Shows only `actor`. If `actor` is disabled, it is enabled and everyone else disabled. If it
/// is enabled alongside others, the others are disabled. If it already is the only enabled
/// actor, the selection is inverted.
pub fn solo_actor(store: &mut dyn RegionStore, project: &mut Project, actor: &str) {
    let Some(soloed_enabled) = project.actors.get(actor).map(|a| a.enabled) else {
        return;
    };
    let others_enabled = project
        .actors
        .iter()
        .any(|other| other.name != actor && other.enabled);

    let names: Vec<String> = project.actors.iter().map(|a| a.name.clone()).collect();
    for name in &names {
        let is_soloed = name == actor;
        let enabled = match (soloed_enabled, others_enabled) {
            (false, _) | (true, true) => is_soloed,
            (true, false) => !is_soloed,
        };
        set_actor_enabled(store, project, name, enabled);
    }
}

/// Enables every actor.
pub fn enable_all(store: &mut dyn RegionStore, project: &mut Project) {
    set_all_enabled(store, project, true);
}

/// Disables every actor.
pub fn disable_all(store: &mut dyn RegionStore, project: &mut Project) {
    set_all_enabled(store, project, false);
}

fn set_all_enabled(store: &mut dyn RegionStore, project: &mut Project, enabled: bool) {
    let names: Vec<String> = project.actors.iter().map(|a| a.name.clone()).collect();
    for name in &names {
        set_actor_enabled(store, project, name, enabled);
    }
}

/// Links an actor and pushes the new colour and names to the regions.
pub fn link_actor(store: &mut dyn RegionStore, project: &mut Project, actor: &str, linked: &str) {
    if project.actors.link(actor, linked) {
        refresh_regions(store, project);
    }
}

/// Unlinks an actor and pushes the restored colour and names to the regions.
pub fn unlink_actor(store: &mut dyn RegionStore, project: &mut Project, actor: &str) {
    if project.actors.unlink(actor) {
        refresh_regions(store, project);
    }
}

/// Gives an actor (or its whole link group) a custom colour and recolours the regions.
pub fn set_actor_colour(
    store: &mut dyn RegionStore,
    project: &mut Project,
    actor: &str,
    colour: Colour,
) {
    if project.actors.set_colour(actor, colour) {
        refresh_regions(store, project);
    }
}

/// Switches colour coding on or off.
pub fn set_coloured_regions(store: &mut dyn RegionStore, project: &mut Project, coloured: bool) {
    project.settings.coloured_regions = coloured;
    refresh_regions(store, project);
}

/// Switches the linked-name prefix in region names and merged text on or off.
pub fn set_actor_prefix(store: &mut dyn RegionStore, project: &mut Project, prefix: bool) {
    project.settings.actor_prefix = prefix;
    refresh_regions(store, project);
}

/// Removes actors no subtitle refers to. Returns the number removed.
pub fn sweep_stale_actors(project: &mut Project) -> usize {
    let subtitles = &project.subtitles;
    project
        .actors
        .retain_referenced(|name| subtitles.references_actor(name))
}

/// Deletes the regions of all bound subtitles and forgets all subtitles, actors and imported
/// roles.
pub fn clear_all(store: &mut dyn RegionStore, project: &mut Project, session: &mut Session) {
    for region in project.subtitles.iter().filter_map(RegionSubtitle::region) {
        store.delete_region(region);
    }

    project.subtitles.clear();
    project.actors.clear();
    project.imported_roles.clear();
    session.reset();
}

/// The text shown for several overlapping subtitles at once, one line per subtitle joined with
/// CRLF.
///
/// If the subtitles come from at least two different actors, or at least two of them have no
/// known actor, every line is prefixed with its actor (`?` when unknown). Otherwise only lines
/// with a known actor are prefixed.
#[must_use]
pub fn merged_display_text(project: &Project, overlaps: &[RegionId]) -> String {
    let subtitles: Vec<&RegionSubtitle> = overlaps
        .iter()
        .filter_map(|&region| project.subtitles.find(region))
        .collect();

    let unknown_count = subtitles.iter().filter(|s| !s.has_actor()).count();
    let several_actors = subtitles.first().is_some_and(|first| {
        subtitles
            .iter()
            .any(|s| speaker(&s.actor) != speaker(&first.actor))
    });
    let ambiguous = several_actors || unknown_count >= 2;

    subtitles
        .iter()
        .map(|subtitle| {
            if subtitle.has_actor() || ambiguous {
                let actor = if subtitle.has_actor() {
                    subtitle.actor.as_str()
                } else {
                    UNKNOWN_ACTOR
                };
                subtitle::display_line(&project.actors, &project.settings, actor, &subtitle.notes)
            } else {
                subtitle.notes.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Unassigned subtitles count as spoken by the unknown actor.
fn speaker(actor: &str) -> &str {
    if actor.is_empty() {
        UNKNOWN_ACTOR
    } else {
        actor
    }
}

/// One label per overlapping region, for choosing which one to edit: the actor's name, or the
/// region's number when there is no actor.
#[must_use]
pub fn overlap_labels(
    store: &dyn RegionStore,
    project: &Project,
    overlaps: &[RegionId],
) -> Vec<String> {
    overlaps
        .iter()
        .enumerate()
        .map(|(i, &region)| {
            match project.subtitles.find(region).map(|s| s.actor.as_str()) {
                Some(actor) if !actor.is_empty() => actor.to_owned(),
                _ => match store.find_region(region) {
                    Some(bounds) => format!("R{}", bounds.index),
                    None => format!("Region {}", i + 1),
                },
            }
        })
        .collect()
}

/// Result of [`Session::overlaps_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlaps {
    /// Subtitled regions containing the position, in the host's enumeration order.
    pub regions: Vec<RegionId>,

    /// Whether `regions` differs (in membership or order) from the previous query.
    pub changed: bool,
}

/// What the display should show after a [`Session::reconcile`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    pub overlaps_changed: bool,
    pub text: String,
}

/// Cursor-tracking state of one notes display. Reset on project switch and project load.
#[derive(Debug, Default)]
pub struct Session {
    last_position: Option<Time>,
    overlaps: Vec<RegionId>,
    selected: Option<RegionId>,
    text: String,
    internal_change: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything, as after switching projects. The next reconcile pass always
    /// refreshes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Makes the next reconcile pass run even if the cursor did not move.
    pub fn invalidate(&mut self) {
        self.last_position = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<RegionId> {
        self.selected
    }

    /// The subtitled regions found by the last query.
    #[must_use]
    pub fn overlaps(&self) -> &[RegionId] {
        &self.overlaps
    }

    /// The text last produced for the display.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Selects one of the current overlaps, e.g. from a combo box. Returns the subtitle's notes
    /// if `region` is among them.
    pub fn select<'a>(&mut self, project: &'a Project, region: RegionId) -> Option<&'a str> {
        if !self.overlaps.contains(&region) {
            return None;
        }
        self.selected = Some(region);
        let notes = project.subtitles.find(region).map(|s| s.notes.as_str())?;
        notes.clone_into(&mut self.text);
        Some(notes)
    }

    /// Called for every region change notification from the host. Returns whether a reconcile
    /// pass should be scheduled; changes made by [`Session::edit_current_text`] itself are
    /// swallowed once.
    pub fn regions_changed(&mut self) -> bool {
        if self.internal_change {
            self.internal_change = false;
            false
        } else {
            self.invalidate();
            true
        }
    }

    /// Finds the subtitled regions containing `position` and updates the selection: the
    /// previously selected region stays selected while it overlaps, otherwise the first one is
    /// selected.
    pub fn overlaps_at(
        &mut self,
        store: &dyn RegionStore,
        project: &Project,
        position: Time,
    ) -> Overlaps {
        let regions: Vec<RegionId> = store
            .regions_at(position)
            .into_iter()
            .filter(|&region| project.subtitles.contains(region))
            .collect();

        let changed = regions != self.overlaps;
        if changed {
            self.overlaps.clone_from(&regions);
            self.selected = if self.selected.is_some_and(|id| regions.contains(&id)) {
                self.selected
            } else {
                regions.first().copied()
            };
        }

        Overlaps { regions, changed }
    }

    /// The update pass run when the cursor moves or regions change. Returns `None` if nothing
    /// needs refreshing.
    ///
    /// Regions the host deleted are orphaned first. When the cursor enters a region that has no
    /// subtitle yet, an empty one is attached to it so that later edits have a record.
    ///
    /// The pass holds the session and the project mutably, so a host callback fired from inside
    /// it cannot start another one.
    pub fn reconcile(
        &mut self,
        store: &dyn RegionStore,
        project: &mut Project,
        position: Time,
    ) -> Option<Refresh> {
        if self.last_position == Some(position) {
            return None;
        }

        self.last_position = Some(position);
        track_regions(store, project);

        let hits = store.regions_at(position);
        let Some(&first_hit) = hits.first() else {
            if self.selected.is_none() && self.text.is_empty() {
                return None;
            }
            let overlaps_changed = !self.overlaps.is_empty();
            self.overlaps.clear();
            self.selected = None;
            self.text.clear();
            return Some(Refresh {
                overlaps_changed,
                text: String::new(),
            });
        };

        let Overlaps {
            regions,
            mut changed,
        } = self.overlaps_at(store, project, position);

        if regions.is_empty() {
            let (start, end) = store
                .find_region(first_hit)
                .map_or((position, position), |bounds| (bounds.start, bounds.end));
            project
                .subtitles
                .push(RegionSubtitle::new(first_hit, start, end, "", ""));
            self.overlaps = vec![first_hit];
            self.selected = Some(first_hit);
            changed = true;
        }

        self.text = if project.settings.locked && !regions.is_empty() {
            merged_display_text(project, &regions)
        } else {
            self.selected
                .and_then(|region| project.subtitles.find(region))
                .map(|subtitle| subtitle.notes.clone())
                .unwrap_or_default()
        };

        Some(Refresh {
            overlaps_changed: changed,
            text: self.text.clone(),
        })
    }

    /// Replaces the notes of the selected region's subtitle (creating the subtitle if needed)
    /// and renames the region accordingly, keeping its colour and timing. Returns false if no
    /// region is selected.
    pub fn edit_current_text(
        &mut self,
        store: &mut dyn RegionStore,
        project: &mut Project,
        text: &str,
    ) -> bool {
        let Some(region) = self.selected else {
            return false;
        };

        let info = store.region_info(region);
        let actor = match project.subtitles.find_mut(region) {
            Some(subtitle) => {
                text.clone_into(&mut subtitle.notes);
                subtitle.actor.clone()
            }
            None => {
                let (start, end) = info
                    .as_ref()
                    .map(|info| (info.start, info.end))
                    .unwrap_or_default();
                project
                    .subtitles
                    .push(RegionSubtitle::new(region, start, end, text, ""));
                String::new()
            }
        };
        text.clone_into(&mut self.text);

        if let Some(info) = info {
            let name = subtitle::region_name(&project.actors, &project.settings, &actor, text);
            self.internal_change = true;
            store.update_region(region, &name, info.colour);
        }
        true
    }
}
