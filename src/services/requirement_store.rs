//! Active requirement profile, named-profile registry and priority ranking.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use tracing::info;

use crate::models::{PriorityRanking, RankCriterion, RequirementProfile, Staged};

/// Result of [`RequirementProfileStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new name was added
    Created,
    /// An existing name was overwritten after confirmation
    Overwritten,
    /// Overwrite was declined; the registry is unchanged
    Cancelled,
}

/// Session-wide requirement state.
///
/// The active profile and the ranking are singletons that survive wall switches.
/// Saved profiles live for the session only.
#[derive(Debug, Clone)]
pub struct RequirementProfileStore {
    profile: Staged<RequirementProfile>,
    registry: IndexMap<String, RequirementProfile>,
    ranking: Staged<PriorityRanking>,
}

impl Default for RequirementProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RequirementProfileStore {
    /// Creates the store with the session default profile and the built-in registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_profile(RequirementProfile::default())
    }

    /// Creates the store with `profile` active and the built-in registry.
    #[must_use]
    pub fn with_profile(profile: RequirementProfile) -> Self {
        let registry = RequirementProfile::builtins()
            .into_iter()
            .map(|(name, p)| (name.to_string(), p))
            .collect();
        Self {
            profile: Staged::new(profile),
            registry,
            ranking: Staged::new(PriorityRanking::default()),
        }
    }

    /// Active profile.
    #[must_use]
    pub const fn active(&self) -> &RequirementProfile {
        self.profile.committed()
    }

    /// Pending draft profile.
    #[must_use]
    pub const fn draft(&self) -> &RequirementProfile {
        self.profile.draft()
    }

    /// Mutable draft profile.
    pub fn draft_mut(&mut self) -> &mut RequirementProfile {
        self.profile.draft_mut()
    }

    /// Records a pending edit without activating it.
    pub fn stage(&mut self, profile: RequirementProfile) {
        self.profile.stage(profile);
    }

    /// Returns true if the draft differs from the active profile.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.profile.is_dirty()
    }

    /// Discards the pending draft.
    pub fn reset_draft(&mut self) {
        self.profile.reset();
    }

    /// Replaces the active profile (and the draft).
    pub fn commit(&mut self, profile: RequirementProfile) {
        self.profile.replace(profile);
    }

    /// Promotes the draft. Returns true if the active profile changed.
    pub fn commit_draft(&mut self) -> bool {
        if !self.profile.is_dirty() {
            return false;
        }
        self.profile.apply();
        true
    }

    /// Saves `profile` under `name`.
    ///
    /// Overwriting an existing name asks `confirm_overwrite`; declining leaves
    /// the registry unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is blank.
    pub fn save<F>(
        &mut self,
        name: &str,
        profile: RequirementProfile,
        confirm_overwrite: F,
    ) -> Result<SaveOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        let name = name.trim();
        if name.is_empty() {
            bail!("Profile name cannot be empty");
        }

        let outcome = if self.registry.contains_key(name) {
            if !confirm_overwrite(name) {
                return Ok(SaveOutcome::Cancelled);
            }
            SaveOutcome::Overwritten
        } else {
            SaveOutcome::Created
        };

        self.registry.insert(name.to_string(), profile);
        info!("Saved requirement profile '{name}' ({outcome:?})");
        Ok(outcome)
    }

    /// Snapshot of the saved profile `name`. The caller commits it.
    ///
    /// # Errors
    ///
    /// Returns an error if no profile with that name exists.
    pub fn load(&self, name: &str) -> Result<RequirementProfile> {
        match self.registry.get(name) {
            Some(profile) => Ok(*profile),
            None => bail!("No saved profile named '{name}'"),
        }
    }

    /// Saved profile names in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.registry.keys().map(String::as_str).collect()
    }

    /// `(name, profile)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RequirementProfile)> {
        self.registry.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Committed ranking.
    #[must_use]
    pub const fn ranking(&self) -> &PriorityRanking {
        self.ranking.committed()
    }

    /// Draft ranking.
    #[must_use]
    pub const fn ranking_draft(&self) -> &PriorityRanking {
        self.ranking.draft()
    }

    /// Sets a rank in the draft ranking.
    ///
    /// # Errors
    ///
    /// Returns an error if `rank` is outside `1..=5`.
    pub fn set_rank(&mut self, criterion: RankCriterion, rank: u8) -> Result<()> {
        self.ranking.draft_mut().set_rank(criterion, rank)
    }

    /// Commits the draft ranking.
    pub fn commit_ranking(&mut self) -> PriorityRanking {
        *self.ranking.apply()
    }

    /// Reverts the draft ranking to the last committed one.
    pub fn reset_ranking(&mut self) {
        self.ranking.reset();
    }

    /// Returns true if the draft ranking has uncommitted edits.
    #[must_use]
    pub fn ranking_is_dirty(&self) -> bool {
        self.ranking.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CriterionField, Metric};

    #[test]
    fn test_builtins_listed_first() {
        let store = RequirementProfileStore::new();
        assert_eq!(store.list(), vec!["Default1", "Default2"]);
        assert_eq!(store.load("Default2").unwrap().thickness.threshold, 400.0);
    }

    #[test]
    fn test_save_new_and_order() {
        let mut store = RequirementProfileStore::new();
        let outcome = store
            .save("Passivhaus", RequirementProfile::default(), |_| false)
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Created);
        assert_eq!(store.list(), vec!["Default1", "Default2", "Passivhaus"]);
    }

    #[test]
    fn test_save_overwrite_requires_confirmation() {
        let mut store = RequirementProfileStore::new();
        let mut edited = RequirementProfile::default();
        edited.set_value(Metric::Price, CriterionField::Threshold, 200.0);

        let outcome = store.save("Default1", edited, |_| false).unwrap();
        assert_eq!(outcome, SaveOutcome::Cancelled);
        assert_eq!(store.load("Default1").unwrap().price.threshold, 350.0);

        let outcome = store.save("Default1", edited, |name| name == "Default1").unwrap();
        assert_eq!(outcome, SaveOutcome::Overwritten);
        assert_eq!(store.load("Default1").unwrap().price.threshold, 200.0);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_save_rejects_blank_name() {
        let mut store = RequirementProfileStore::new();
        assert!(store.save("   ", RequirementProfile::default(), |_| true).is_err());
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_load_does_not_activate() {
        let store = RequirementProfileStore::new();
        let loaded = store.load("Default1").unwrap();
        assert_eq!(loaded.u_value.threshold, 0.2);
        assert_eq!(store.active().u_value.threshold, 0.15);
        assert!(store.load("Missing").is_err());
    }

    #[test]
    fn test_draft_commit() {
        let mut store = RequirementProfileStore::new();
        store
            .draft_mut()
            .set_value(Metric::Thickness, CriterionField::Threshold, 400.0);
        assert!(store.is_dirty());
        assert_eq!(store.active().thickness.threshold, 350.0);

        assert!(store.commit_draft());
        assert_eq!(store.active().thickness.threshold, 400.0);
        assert!(!store.commit_draft());
    }

    #[test]
    fn test_ranking_staged() {
        let mut store = RequirementProfileStore::new();
        store.set_rank(RankCriterion::FireRating, 1).unwrap();
        assert!(store.ranking_is_dirty());
        assert_eq!(store.ranking().rank(RankCriterion::FireRating), 5);

        store.reset_ranking();
        assert_eq!(store.ranking_draft().rank(RankCriterion::FireRating), 5);

        store.set_rank(RankCriterion::Price, 4).unwrap();
        let committed = store.commit_ranking();
        assert_eq!(committed.rank(RankCriterion::Price), 4);
        assert!(!store.ranking_is_dirty());
        assert!(store.set_rank(RankCriterion::Price, 9).is_err());
    }
}
