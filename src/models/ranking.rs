//! Priority ranking of the five matching criteria.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Lowest (most important) rank.
pub const MIN_RANK: u8 = 1;
/// Highest (least important) rank.
pub const MAX_RANK: u8 = 5;

/// Criterion that can be ranked by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCriterion {
    /// Assembly thickness
    Thickness,
    /// Price
    Price,
    /// Thermal transmittance
    UValue,
    /// Acoustic insulation
    Acoustic,
    /// Fire rating
    FireRating,
}

impl RankCriterion {
    /// All criteria in display order.
    pub const ALL: [Self; 5] = [
        Self::Thickness,
        Self::Price,
        Self::UValue,
        Self::Acoustic,
        Self::FireRating,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Thickness => "Thickness",
            Self::Price => "Price",
            Self::UValue => "U-Value",
            Self::Acoustic => "Acoustic",
            Self::FireRating => "Fire Rating",
        }
    }
}

/// Rank (1 = highest priority) of each criterion.
///
/// Ranks are not required to be unique; ties are kept as entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRanking {
    /// Rank of thickness
    pub thickness: u8,
    /// Rank of price
    pub price: u8,
    /// Rank of u-value
    pub u_value: u8,
    /// Rank of acoustic performance
    pub acoustic: u8,
    /// Rank of fire rating
    pub fire_rating: u8,
}

impl Default for PriorityRanking {
    fn default() -> Self {
        Self {
            thickness: 1,
            price: 2,
            u_value: 3,
            acoustic: 4,
            fire_rating: 5,
        }
    }
}

impl PriorityRanking {
    /// Rank of `criterion`.
    #[must_use]
    pub const fn rank(&self, criterion: RankCriterion) -> u8 {
        match criterion {
            RankCriterion::Thickness => self.thickness,
            RankCriterion::Price => self.price,
            RankCriterion::UValue => self.u_value,
            RankCriterion::Acoustic => self.acoustic,
            RankCriterion::FireRating => self.fire_rating,
        }
    }

    /// Sets the rank of `criterion`.
    ///
    /// # Errors
    ///
    /// Returns an error if `rank` is outside `1..=5`.
    pub fn set_rank(&mut self, criterion: RankCriterion, rank: u8) -> Result<()> {
        if !(MIN_RANK..=MAX_RANK).contains(&rank) {
            anyhow::bail!(
                "Rank {rank} for {} is out of range ({MIN_RANK}-{MAX_RANK})",
                criterion.label()
            );
        }
        let slot = match criterion {
            RankCriterion::Thickness => &mut self.thickness,
            RankCriterion::Price => &mut self.price,
            RankCriterion::UValue => &mut self.u_value,
            RankCriterion::Acoustic => &mut self.acoustic,
            RankCriterion::FireRating => &mut self.fire_rating,
        };
        *slot = rank;
        Ok(())
    }

    /// Returns true if two or more criteria share a rank.
    #[must_use]
    pub fn has_ties(&self) -> bool {
        let mut seen = [false; MAX_RANK as usize + 1];
        RankCriterion::ALL.iter().any(|&c| {
            let rank = usize::from(self.rank(c));
            seen.get_mut(rank)
                .is_some_and(|slot| std::mem::replace(slot, true))
        })
    }

    /// `(criterion, rank)` pairs in display order.
    pub fn entries(&self) -> impl Iterator<Item = (RankCriterion, u8)> + '_ {
        RankCriterion::ALL.into_iter().map(|c| (c, self.rank(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranks_unique() {
        let ranking = PriorityRanking::default();
        assert!(!ranking.has_ties());
        assert_eq!(ranking.rank(RankCriterion::FireRating), 5);
    }

    #[test]
    fn test_duplicate_ranks_allowed() {
        let mut ranking = PriorityRanking::default();
        ranking.set_rank(RankCriterion::Acoustic, 1).unwrap();
        assert_eq!(ranking.rank(RankCriterion::Acoustic), 1);
        assert_eq!(ranking.rank(RankCriterion::Thickness), 1);
        assert!(ranking.has_ties());
    }

    #[test]
    fn test_rank_out_of_range() {
        let mut ranking = PriorityRanking::default();
        assert!(ranking.set_rank(RankCriterion::Price, 0).is_err());
        assert!(ranking.set_rank(RankCriterion::Price, 6).is_err());
        assert_eq!(ranking.rank(RankCriterion::Price), 2);
    }
}
