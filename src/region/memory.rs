use std::fmt::Debug;
use std::ops::Range;

use super::{NewRegion, RegionBounds, RegionId, RegionInfo, RegionKind, RegionStore, Time};
use crate::colour::Colour;

/// In-memory [`RegionStore`], for headless use and tests.
///
/// Internally, a `MemoryRegionStore` is a combination of 2 data structures:
///  - an ordered hash map (`indexmap::IndexMap`) holding the region data, kept sorted in
///    enumeration order (start time, then markers before regions, then user-visible index);
///  - and an augmented AVL interval tree (`interavl::IntervalTree`) over the regions (not
///    markers) for logarithmic point queries.
///
/// Region bounds are inclusive on both ends, so a region `[start, end]` is indexed as the
/// half-open interval `start..end + 1ms`. Both ends of the interval carry the region's id, which
/// keeps the keys of regions with equal bounds apart.
pub struct MemoryRegionStore {
    regions: indexmap::IndexMap<RegionId, RegionInfo>,
    query_index: interavl::IntervalTree<(Time, RegionId), RegionId>,
    next_id: i32,
}

impl MemoryRegionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            regions: indexmap::IndexMap::default(),
            query_index: interavl::IntervalTree::default(),
            next_id: 1,
        }
    }

    /// Returns the number of regions and markers in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Full information about one region or marker.
    #[must_use]
    pub fn get(&self, id: RegionId) -> Option<&RegionInfo> {
        self.regions.get(&id)
    }

    /// Iterate over all regions and markers in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionInfo> {
        self.regions.values()
    }

    /// Add a point marker. Markers are not subtitled; the export formatter uses them to pick
    /// which subtitled regions to include.
    pub fn add_marker(&mut self, position: Time, name: &str) -> RegionId {
        let index = self.free_index(RegionKind::Marker, None);
        self.internal_insert(RegionInfo {
            id: RegionId(0),
            kind: RegionKind::Marker,
            start: position,
            end: position,
            index,
            name: name.to_owned(),
            colour: None,
        })
    }

    /// Move a region or marker, as the user would by dragging it on the timeline.
    /// Returns false if it did not exist.
    pub fn move_region(&mut self, id: RegionId, start: Time, end: Time) -> bool {
        let Some(mut info) = self.regions.shift_remove(&id) else {
            return false;
        };
        if info.is_region() {
            self.query_index.remove(&Self::interval(&info));
        }
        info.start = start;
        info.end = if info.is_region() { end } else { start };
        self.internal_place(info);
        debug_assert!(self.check_invariants());
        true
    }

    fn interval(info: &RegionInfo) -> Range<(Time, RegionId)> {
        (info.start, info.id)..(Time(info.end.0.max(info.start.0) + 1), info.id)
    }

    /// Overlaps exactly the intervals of regions containing `position`: the start sorts after
    /// every key at `position`, the end before every key at `position + 1ms`.
    fn stab(position: Time) -> Range<(Time, RegionId)> {
        (position, RegionId(i32::MAX))..(Time(position.0 + 1), RegionId(i32::MIN))
    }

    /// Picks the user-visible index for a new entry: the hint if it is free among entries of
    /// the same kind, otherwise one past the largest index in use.
    fn free_index(&self, kind: RegionKind, hint: Option<i32>) -> i32 {
        let mut used = self
            .regions
            .values()
            .filter(|info| info.kind == kind)
            .map(|info| info.index);

        match hint {
            Some(hint) if hint > 0 && !used.any(|index| index == hint) => hint,
            _ => {
                self.regions
                    .values()
                    .filter(|info| info.kind == kind)
                    .map(|info| info.index)
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        }
    }

    fn internal_insert(&mut self, mut info: RegionInfo) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        info.id = id;
        self.internal_place(info);
        debug_assert!(self.check_invariants());
        id
    }

    // Insert into the map and the query index, restoring enumeration order.
    fn internal_place(&mut self, info: RegionInfo) {
        if info.is_region() {
            let replaced = self.query_index.insert(Self::interval(&info), info.id);
            debug_assert!(replaced.is_none());
        }
        self.regions.insert(info.id, info);
        self.regions.sort_by(|_, a, _, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.is_region().cmp(&b.is_region()))
                .then_with(|| a.index.cmp(&b.index))
        });
    }

    fn check_invariants(&self) -> bool {
        let region_count = self.regions.values().filter(|info| info.is_region()).count();
        debug_assert_eq!(region_count, self.query_index.iter().count());

        for info in self.regions.values().filter(|info| info.is_region()) {
            debug_assert_eq!(self.query_index.get(&Self::interval(info)), Some(&info.id));
        }

        true
    }
}

impl RegionStore for MemoryRegionStore {
    fn create_region(&mut self, region: NewRegion<'_>) -> Option<RegionId> {
        if region.end < region.start {
            return None;
        }

        let index = self.free_index(RegionKind::Region, region.index_hint);
        Some(self.internal_insert(RegionInfo {
            id: RegionId(0),
            kind: RegionKind::Region,
            start: region.start,
            end: region.end,
            index,
            name: region.name.to_owned(),
            colour: region.colour,
        }))
    }

    fn delete_region(&mut self, id: RegionId) -> bool {
        let Some(info) = self.regions.shift_remove(&id) else {
            return false;
        };
        if info.is_region() {
            self.query_index.remove(&Self::interval(&info));
        }
        debug_assert!(self.check_invariants());
        true
    }

    fn find_region(&self, id: RegionId) -> Option<RegionBounds> {
        self.regions.get(&id).map(RegionInfo::bounds)
    }

    fn enumerate(&self, predicate: &dyn Fn(&RegionInfo) -> bool) -> Vec<RegionInfo> {
        self.regions
            .values()
            .filter(|info| predicate(info))
            .cloned()
            .collect()
    }

    fn update_region(&mut self, id: RegionId, name: &str, colour: Option<Colour>) -> bool {
        let Some(info) = self.regions.get_mut(&id) else {
            return false;
        };
        name.clone_into(&mut info.name);
        info.colour = colour;
        true
    }

    fn region_info(&self, id: RegionId) -> Option<RegionInfo> {
        self.regions.get(&id).cloned()
    }

    fn regions_at(&self, position: Time) -> Vec<RegionId> {
        let mut ids: Vec<(usize, RegionId)> = self
            .query_index
            .iter_overlaps(&Self::stab(position))
            .filter_map(|(_, &id)| self.regions.get_index_of(&id).map(|order| (order, id)))
            .collect();

        ids.sort_unstable_by_key(|(order, _)| *order);
        ids.into_iter().map(|(_, id)| id).collect()
    }
}

impl Default for MemoryRegionStore {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl Debug for MemoryRegionStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_list()
            .entries(self.regions.values())
            .finish()
    }
}
