//! Dependency closures grouped by display name

use crate::filter::FilterSpec;
use relo_asset::AssetId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Display name (file stem) to the assets sharing it
///
/// Names iterate in sorted order. Two different assets with the same stem
/// both stay under one name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyClosure {
    entries: BTreeMap<String, BTreeSet<AssetId>>,
}

impl DependencyClosure {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the asset's stem; false if already present
    pub fn insert(&mut self, id: AssetId) -> bool {
        self.entries
            .entry(id.stem().to_string())
            .or_default()
            .insert(id)
    }

    /// Union with `other`
    pub fn merge(&mut self, other: Self) {
        for (name, ids) in other.entries {
            self.entries.entry(name).or_default().extend(ids);
        }
    }

    /// Copy keeping only assets whose extension passes `filters`
    #[must_use]
    pub fn filtered(&self, filters: &FilterSpec) -> Self {
        let entries = self
            .entries
            .iter()
            .filter_map(|(name, ids)| {
                let kept: BTreeSet<AssetId> = ids
                    .iter()
                    .filter(|id| filters.should_display(&id.extension()))
                    .cloned()
                    .collect();
                (!kept.is_empty()).then(|| (name.clone(), kept))
            })
            .collect();
        Self { entries }
    }

    /// Number of display names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of assets across all names
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BTreeSet<AssetId>> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, id: &AssetId) -> bool {
        self.entries
            .get(id.stem())
            .is_some_and(|ids| ids.contains(id))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<AssetId>)> {
        self.entries.iter().map(|(name, ids)| (name.as_str(), ids))
    }

    /// Every asset, ordered by name then identifier
    pub fn assets(&self) -> impl Iterator<Item = &AssetId> {
        self.entries.values().flatten()
    }
}

impl FromIterator<AssetId> for DependencyClosure {
    fn from_iter<I: IntoIterator<Item = AssetId>>(iter: I) -> Self {
        let mut closure = Self::new();
        for id in iter {
            closure.insert(id);
        }
        closure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AssetId {
        AssetId::new(s).unwrap()
    }

    #[test]
    fn groups_by_stem() {
        let closure: DependencyClosure = [
            id("Assets/Hero.mat"),
            id("Assets/Tex/Hero.png"),
            id("Assets/Skin.png"),
            id("Assets/Hero.mat"),
        ]
        .into_iter()
        .collect();

        assert_eq!(closure.len(), 2);
        assert_eq!(closure.asset_count(), 3);
        assert_eq!(closure.get("Hero").unwrap().len(), 2);
        assert_eq!(closure.names().collect::<Vec<_>>(), vec!["Hero", "Skin"]);
        assert!(closure.contains(&id("Assets/Skin.png")));
    }

    #[test]
    fn filtered_drops_empty_names() {
        let closure: DependencyClosure = [
            id("Assets/Hero.mat"),
            id("Assets/Hero.png"),
            id("Assets/Skin.png"),
        ]
        .into_iter()
        .collect();

        let mats = closure.filtered(&FilterSpec::default().enable(".mat"));
        assert_eq!(mats.names().collect::<Vec<_>>(), vec!["Hero"]);
        assert_eq!(mats.asset_count(), 1);

        assert_eq!(closure.filtered(&FilterSpec::default()), closure);
    }

    #[test]
    fn merge_is_union() {
        let mut a: DependencyClosure = [id("A/Hero.mat")].into_iter().collect();
        let b: DependencyClosure = [id("B/Hero.mat"), id("A/Hero.mat")].into_iter().collect();
        a.merge(b);
        assert_eq!(a.get("Hero").unwrap().len(), 2);
    }
}
