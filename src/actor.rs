//! Actors: the named identities subtitles are attributed to.
//!
//! There are two collections. [`ActorSet`] holds the live actors, at most one per name, created
//! on first reference. [`ImportedRoles`] holds placeholders decoded from a role file, so that role
//! entries survive even while no subtitle references their name.

use indexmap::IndexMap;

use crate::colour::{self, Colour};
use crate::config::UNKNOWN_ACTOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,

    /// The assigned colour. For actors without a custom colour this is the generated one.
    /// `None` for the unknown actor.
    pub colour: Option<Colour>,

    pub enabled: bool,

    /// Whether `colour` was chosen explicitly (by the user or by a role file).
    pub has_custom_colour: bool,

    /// Name of the performer this actor is grouped under. Empty means unlinked.
    pub linked: String,
}

impl Actor {
    /// Creates an enabled, unlinked actor with its generated colour. The unknown actor gets
    /// no colour.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            colour: default_colour(name),
            enabled: true,
            has_custom_colour: false,
            linked: String::new(),
        }
    }

    #[must_use]
    pub fn is_linked(&self) -> bool {
        !self.linked.is_empty()
    }

    /// The colour this actor's regions are displayed with.
    ///
    /// A custom colour wins. Otherwise a linked actor borrows the generated colour of its link
    /// name, so that everyone sharing a link shares a colour. Otherwise the actor's own name
    /// decides.
    #[must_use]
    pub fn effective_colour(&self) -> Option<Colour> {
        if self.has_custom_colour {
            self.colour
        } else if self.is_linked() {
            Some(colour::colour_for(&self.linked))
        } else {
            default_colour(&self.name)
        }
    }

    /// Sets an explicit colour.
    pub fn set_custom_colour(&mut self, colour: Colour) {
        self.colour = Some(colour);
        self.has_custom_colour = true;
    }

    /// Clears the link and any custom colour, restoring the generated colour.
    pub fn reset_role(&mut self) {
        self.linked.clear();
        self.has_custom_colour = false;
        self.colour = default_colour(&self.name);
    }
}

fn default_colour(name: &str) -> Option<Colour> {
    if name == UNKNOWN_ACTOR {
        None
    } else {
        Some(colour::colour_for(name))
    }
}

/// The live actors of a project, keyed by name, in order of creation.
#[derive(Debug, Clone, Default)]
pub struct ActorSet {
    actors: IndexMap<String, Actor>,
}

impl ActorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.values_mut()
    }

    /// Returns the actor with the given name, creating it with default attributes if it does
    /// not exist yet.
    pub fn find_or_create(&mut self, name: &str) -> &mut Actor {
        self.actors
            .entry(name.to_owned())
            .or_insert_with(|| Actor::new(name))
    }

    /// Adds an actor, replacing any existing one with the same name.
    pub fn insert(&mut self, actor: Actor) {
        self.actors.insert(actor.name.clone(), actor);
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }

    /// Removes every actor for which `is_referenced` returns false. Returns the number of
    /// actors removed.
    pub fn retain_referenced(&mut self, is_referenced: impl Fn(&str) -> bool) -> usize {
        let before = self.actors.len();
        self.actors.retain(|name, _| is_referenced(name));
        before - self.actors.len()
    }

    /// Display colour of the named actor. Actors not in the set are shown in the host's
    /// default colour.
    #[must_use]
    pub fn effective_colour(&self, name: &str) -> Option<Colour> {
        self.actors.get(name).and_then(Actor::effective_colour)
    }

    /// The link name to show in front of `name`, if any.
    #[must_use]
    pub fn linked_name(&self, name: &str) -> Option<&str> {
        self.actors
            .get(name)
            .filter(|actor| actor.is_linked())
            .map(|actor| actor.linked.as_str())
    }

    /// Links an actor to `linked`. If another member of that link group already carries a
    /// custom colour, the actor adopts it. Returns false if the actor does not exist.
    pub fn link(&mut self, name: &str, linked: &str) -> bool {
        if !self.actors.contains_key(name) || linked.is_empty() {
            return false;
        }

        let inherited = self
            .actors
            .values()
            .find(|other| other.name != name && other.linked == linked && other.has_custom_colour)
            .and_then(|other| other.colour);

        let Some(actor) = self.actors.get_mut(name) else {
            return false;
        };
        linked.clone_into(&mut actor.linked);
        if let Some(colour) = inherited {
            actor.set_custom_colour(colour);
        }
        true
    }

    /// Clears an actor's link and custom colour. Returns false if the actor does not exist.
    pub fn unlink(&mut self, name: &str) -> bool {
        match self.actors.get_mut(name) {
            Some(actor) => {
                actor.reset_role();
                true
            }
            None => false,
        }
    }

    /// Gives an actor a custom colour. For a linked actor, the whole link group is recoloured.
    /// Returns false if the actor does not exist.
    pub fn set_colour(&mut self, name: &str, colour: Colour) -> bool {
        let Some(actor) = self.actors.get(name) else {
            return false;
        };

        if actor.is_linked() {
            let linked = actor.linked.clone();
            for member in self.actors.values_mut().filter(|a| a.linked == linked) {
                member.set_custom_colour(colour);
            }
        } else if let Some(actor) = self.actors.get_mut(name) {
            actor.set_custom_colour(colour);
        }
        true
    }

    /// Distinct link names in order of first appearance.
    #[must_use]
    pub fn link_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = vec![];
        for actor in self.actors.values().filter(|actor| actor.is_linked()) {
            if !names.contains(&actor.linked.as_str()) {
                names.push(&actor.linked);
            }
        }
        names
    }
}

/// Actors decoded from a role file, whether or not anything references them yet.
#[derive(Debug, Clone, Default)]
pub struct ImportedRoles {
    actors: IndexMap<String, Actor>,
}

impl ImportedRoles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Records a placeholder. A later record for the same name replaces the earlier one.
    pub fn record(&mut self, actor: Actor) {
        self.actors.insert(actor.name.clone(), actor);
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }
}
