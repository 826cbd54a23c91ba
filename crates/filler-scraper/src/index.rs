//! Flat episode numbering.
//!
//! Filler lists number episodes continuously across the whole series while
//! the streaming site numbers them per season. [`EpisodeIndex`] converts the
//! former into the latter from the episode count of each season.

use shared::EpisodeCoordinate;

/// Mapping from flat episode id (1-based) to season and episode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeIndex {
    /// Coordinate of flat id `i + 1` at position `i`
    coordinates: Vec<EpisodeCoordinate>,
}

impl EpisodeIndex {
    /// Build the index from per-season episode counts, first season first
    ///
    /// Season `s` covers the flat ids right after those of season `s - 1`.
    /// A season with no episodes takes no ids but still advances the season
    /// number.
    pub fn build(per_season_counts: &[u32]) -> Self {
        let total: usize = per_season_counts.iter().map(|&c| c as usize).sum();
        let mut coordinates = Vec::with_capacity(total);

        for (season, &count) in (1u32..).zip(per_season_counts) {
            coordinates.extend((1..=count).map(|episode| EpisodeCoordinate { season, episode }));
        }

        Self { coordinates }
    }

    /// Coordinate of a flat id, if the id is inside the index
    pub fn get(&self, id: u32) -> Option<EpisodeCoordinate> {
        let position = usize::try_from(id.checked_sub(1)?).ok()?;
        self.coordinates.get(position).copied()
    }

    /// Look up an id given as text, as it appears in a filler list table
    pub fn resolve(&self, id: &str) -> Option<EpisodeCoordinate> {
        self.get(id.trim().parse().ok()?)
    }

    /// Number of mapped ids, equal to the sum of the season counts
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// All `(flat id, coordinate)` pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, EpisodeCoordinate)> + '_ {
        (1u32..).zip(self.coordinates.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn coord(season: u32, episode: u32) -> EpisodeCoordinate {
        EpisodeCoordinate { season, episode }
    }

    #[test]
    fn test_two_seasons() {
        let index = EpisodeIndex::build(&[2, 3]);

        assert_eq!(index.get(1), Some(coord(1, 1)));
        assert_eq!(index.get(2), Some(coord(1, 2)));
        assert_eq!(index.get(3), Some(coord(2, 1)));
        assert_eq!(index.get(4), Some(coord(2, 2)));
        assert_eq!(index.get(5), Some(coord(2, 3)));
        assert_eq!(index.get(0), None);
        assert_eq!(index.get(6), None);
    }

    #[test]
    fn test_empty_season_keeps_offsets() {
        let index = EpisodeIndex::build(&[1, 0, 2]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get(1), Some(coord(1, 1)));
        assert_eq!(index.get(2), Some(coord(3, 1)));
        assert_eq!(index.get(3), Some(coord(3, 2)));
    }

    #[test]
    fn test_no_seasons() {
        let index = EpisodeIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.get(1), None);
    }

    #[test]
    fn test_resolve_text_ids() {
        let index = EpisodeIndex::build(&[2, 3]);

        assert_eq!(index.resolve("4"), Some(coord(2, 2)));
        assert_eq!(index.resolve(" 5\n"), Some(coord(2, 3)));
        assert_eq!(index.resolve("6"), None);
        assert_eq!(index.resolve("-1"), None);
        assert_eq!(index.resolve("Special"), None);
    }

    #[test]
    fn test_domain_is_exactly_one_to_sum() {
        let samples: &[&[u32]] = &[
            &[],
            &[0],
            &[1],
            &[12, 0, 0, 7],
            &[24, 22, 26, 1, 0, 13],
            &[61, 52, 78, 31, 13, 15],
        ];

        for counts in samples {
            let index = EpisodeIndex::build(counts);
            let total: u32 = counts.iter().sum();

            assert_eq!(index.len(), total as usize);

            let ids: Vec<u32> = index.iter().map(|(id, _)| id).collect();
            assert_eq!(ids, (1..=total).collect::<Vec<_>>());
            assert_eq!(index.get(total + 1), None);

            let coordinates: HashSet<EpisodeCoordinate> =
                index.iter().map(|(_, c)| c).collect();
            assert_eq!(coordinates.len(), total as usize, "no id mapped twice");

            let seasons: Vec<u32> = index.iter().map(|(_, c)| c.season).collect();
            assert!(seasons.windows(2).all(|w| w[0] <= w[1]));

            for (season, &count) in (1u32..).zip(counts.iter()) {
                let in_season = index.iter().filter(|(_, c)| c.season == season).count();
                assert_eq!(in_season, count as usize);
            }
        }
    }
}
