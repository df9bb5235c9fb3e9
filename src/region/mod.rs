//! The interface to the host's timeline: time-ranged regions and point markers, owned by the host
//! and identified by host-assigned ids.

use std::fmt::{self, Display};

use crate::colour::Colour;

mod memory;

pub use memory::MemoryRegionStore;

/// A point on the timeline, in milliseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Time(pub i64);

impl Time {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Converts from seconds, rounding to the nearest millisecond.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * 1000.0).round() as i64)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Whole seconds, rounded half up.
    #[must_use]
    pub fn rounded_seconds(self) -> i64 {
        (self.0 + 500).div_euclid(1000)
    }

    /// Clock representation rounded to whole seconds: `H:MM:SS`, or `M:SS` when the hour
    /// component is zero.
    #[must_use]
    pub fn clock(self) -> Clock {
        Clock(self.rounded_seconds())
    }
}

/// See [`Time::clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock(i64);

impl Display for Clock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.max(0);
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            write!(formatter, "{hours}:{minutes:02}:{seconds:02}")
        } else {
            write!(formatter, "{minutes}:{seconds:02}")
        }
    }
}

/// Opaque host identity of a region or marker. Stays the same for the lifetime of the region;
/// a deleted and re-created region gets a new id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RegionId(pub i32);

impl Display for RegionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Has a start and an end.
    Region,

    /// A single point; `start == end`.
    Marker,
}

/// Everything the host knows about one region or marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    pub id: RegionId,
    pub kind: RegionKind,
    pub start: Time,
    pub end: Time,

    /// User-visible number, as shown on the ruler (`R3`, …).
    pub index: i32,

    pub name: String,

    /// `None` means the host's default colour.
    pub colour: Option<Colour>,
}

impl RegionInfo {
    #[must_use]
    pub fn is_region(&self) -> bool {
        self.kind == RegionKind::Region
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn contains(&self, position: Time) -> bool {
        self.start <= position && position <= self.end
    }

    #[must_use]
    pub fn bounds(&self) -> RegionBounds {
        RegionBounds {
            start: self.start,
            end: self.end,
            index: self.index,
        }
    }
}

/// Result of a lookup by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub start: Time,
    pub end: Time,
    pub index: i32,
}

/// Request to create a new region.
#[derive(Debug, Clone, Copy)]
pub struct NewRegion<'a> {
    pub start: Time,
    pub end: Time,
    pub name: &'a str,
    pub colour: Option<Colour>,

    /// Preferred user-visible number. The host may ignore it, e.g. if it is already taken.
    pub index_hint: Option<i32>,
}

/// The host's timeline store. All times are in milliseconds.
pub trait RegionStore {
    /// Creates a region and returns its id, or `None` if the host refused.
    fn create_region(&mut self, region: NewRegion<'_>) -> Option<RegionId>;

    /// Deletes the region or marker with the given id. Returns false if it did not exist.
    fn delete_region(&mut self, id: RegionId) -> bool;

    /// Looks up a region or marker by id.
    fn find_region(&self, id: RegionId) -> Option<RegionBounds>;

    /// Returns all regions and markers matching `predicate`, in the host's enumeration order.
    fn enumerate(&self, predicate: &dyn Fn(&RegionInfo) -> bool) -> Vec<RegionInfo>;

    /// Renames and recolours a region without touching its timing. Returns false if it did not
    /// exist.
    fn update_region(&mut self, id: RegionId, name: &str, colour: Option<Colour>) -> bool;

    /// Full information about one region or marker.
    fn region_info(&self, id: RegionId) -> Option<RegionInfo> {
        self.enumerate(&|info| info.id == id).into_iter().next()
    }

    /// Ids of all regions (not markers) with `start <= position <= end`, in enumeration order.
    fn regions_at(&self, position: Time) -> Vec<RegionId> {
        self.enumerate(&|info| info.is_region() && info.contains(position))
            .into_iter()
            .map(|info| info.id)
            .collect()
    }

    /// Positions of all markers, in enumeration order.
    fn marker_positions(&self) -> Vec<Time> {
        self.enumerate(&|info| info.kind == RegionKind::Marker)
            .into_iter()
            .map(|info| info.start)
            .collect()
    }
}
