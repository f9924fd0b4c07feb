//! # Selector Module
//!
//! Picks the photo to keep visible for a duplicate group.
//!
//! ## Ranking
//! 1. Higher `quality_score` first; every scored photo outranks every
//!    unscored one
//! 2. `filename` ascending
//! 3. `id` ascending
//!
//! The order is total, so re-running detection on the same records always
//! picks the same representative.

use crate::core::record::PhotoRecord;
use crate::error::SelectError;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Compare two records by how good a representative each would be
///
/// `Ordering::Less` means `a` ranks ahead of `b`.
pub fn compare_quality(a: &PhotoRecord, b: &PhotoRecord) -> Ordering {
    let by_score = match (a.score(), b.score()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_score
        .then_with(|| a.filename.cmp(&b.filename))
        .then_with(|| a.id.cmp(&b.id))
}

/// Best record among already-resolved group members
pub fn best_of<'a, I>(members: I) -> Option<&'a PhotoRecord>
where
    I: IntoIterator<Item = &'a PhotoRecord>,
{
    members.into_iter().min_by(|a, b| compare_quality(a, b))
}

/// Rank a group's members from best to worst
pub fn rank_members<'a>(
    member_ids: &[String],
    records: &'a [PhotoRecord],
) -> Result<Vec<&'a PhotoRecord>, SelectError> {
    if member_ids.is_empty() {
        return Err(SelectError::EmptyGroup);
    }

    let by_id: HashMap<&str, &PhotoRecord> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut members = member_ids
        .iter()
        .map(|id| {
            by_id
                .get(id.as_str())
                .copied()
                .ok_or_else(|| SelectError::UnknownRecord { id: id.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    members.sort_by(|a, b| compare_quality(a, b));
    Ok(members)
}

/// Choose the representative id for a group
///
/// All other members are the group's suppressed duplicates.
pub fn select_best(member_ids: &[String], records: &[PhotoRecord]) -> Result<String, SelectError> {
    let ranked = rank_members(member_ids, records)?;
    ranked
        .first()
        .map(|r| r.id.clone())
        .ok_or(SelectError::EmptyGroup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn highest_score_wins_and_unscored_never_beats_scored() {
        let records = vec![
            PhotoRecord::new("a", "a.jpg").with_quality_score(80.0),
            PhotoRecord::new("b", "0-first-by-name.jpg"),
            PhotoRecord::new("c", "c.jpg").with_quality_score(95.0),
        ];

        let best = select_best(&ids(&["a", "b", "c"]), &records).unwrap();
        assert_eq!(best, "c");

        let ranked = rank_members(&ids(&["a", "b", "c"]), &records).unwrap();
        assert_eq!(ranked.last().unwrap().id, "b");
    }

    #[test]
    fn unscored_ranks_below_zero_score() {
        let records = vec![
            PhotoRecord::new("a", "a.jpg"),
            PhotoRecord::new("b", "b.jpg").with_quality_score(0.0),
        ];
        assert_eq!(select_best(&ids(&["a", "b"]), &records).unwrap(), "b");
    }

    #[test]
    fn filename_breaks_ties() {
        let records = vec![
            PhotoRecord::new("x", "IMG_0002.jpg"),
            PhotoRecord::new("y", "IMG_0001.jpg"),
        ];
        assert_eq!(select_best(&ids(&["x", "y"]), &records).unwrap(), "y");

        let scored = vec![
            PhotoRecord::new("x", "IMG_0002.jpg").with_quality_score(70.0),
            PhotoRecord::new("y", "IMG_0001.jpg").with_quality_score(70.0),
        ];
        assert_eq!(select_best(&ids(&["x", "y"]), &scored).unwrap(), "y");
    }

    #[test]
    fn id_breaks_remaining_ties() {
        let records = vec![
            PhotoRecord::new("b", "same.jpg"),
            PhotoRecord::new("a", "same.jpg"),
        ];
        assert_eq!(select_best(&ids(&["b", "a"]), &records).unwrap(), "a");
    }

    #[test]
    fn selection_is_deterministic_regardless_of_member_order() {
        let records = vec![
            PhotoRecord::new("a", "a.jpg").with_quality_score(50.0),
            PhotoRecord::new("b", "b.jpg").with_quality_score(50.0),
            PhotoRecord::new("c", "c.jpg"),
        ];

        let first = select_best(&ids(&["c", "b", "a"]), &records).unwrap();
        let second = select_best(&ids(&["a", "c", "b"]), &records).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "a");
    }

    #[test]
    fn empty_group_is_an_error() {
        assert_eq!(select_best(&[], &[]), Err(SelectError::EmptyGroup));
    }

    #[test]
    fn unknown_member_is_an_error() {
        let records = vec![PhotoRecord::new("a", "a.jpg")];
        assert_eq!(
            select_best(&ids(&["a", "ghost"]), &records),
            Err(SelectError::UnknownRecord {
                id: "ghost".to_string()
            })
        );
    }

    #[test]
    fn best_of_resolved_members() {
        let a = PhotoRecord::new("a", "a.jpg").with_quality_score(10.0);
        let b = PhotoRecord::new("b", "b.jpg").with_quality_score(20.0);
        assert_eq!(best_of([&a, &b]).unwrap().id, "b");
        assert!(best_of(std::iter::empty::<&PhotoRecord>()).is_none());
    }
}
