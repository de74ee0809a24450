//! Lesson and container progress derived from raw result rows.
//!
//! Everything here is a pure function of its arguments: each call builds a
//! fresh structure and nothing is cached between calls.

use std::collections::HashMap;

use crate::model::{
    ContainerId, ContainerProgress, ContainerStatus, LessonCatalogEntry, LessonId, LessonResult,
    StatusFilter,
};

/// Best accuracy a lesson must reach to count as completed.
pub const COMPLETION_THRESHOLD: f64 = 0.95;

/// Best accuracy per lesson, in `[0, 1]`.
pub type BestAccuracy = HashMap<LessonId, f64>;

/// Returns true when `accuracy` meets the completion threshold.
#[must_use]
pub fn is_completed(accuracy: f64) -> bool {
    accuracy >= COMPLETION_THRESHOLD
}

/// Maximum accuracy per lesson across all of its result rows.
///
/// Rows without a positive total are skipped. Lessons with no usable row are
/// absent from the output.
#[must_use]
pub fn compute_best_accuracy<'a, I>(results: I) -> BestAccuracy
where
    I: IntoIterator<Item = &'a LessonResult>,
{
    let mut best = BestAccuracy::new();
    for result in results {
        let Some(accuracy) = result.accuracy() else {
            continue;
        };
        best.entry(result.lesson_id.clone())
            .and_modify(|current| {
                if accuracy > *current {
                    *current = accuracy;
                }
            })
            .or_insert(accuracy);
    }
    best
}

/// Groups catalog entries by container, in order of first appearance, and
/// summarizes each group.
///
/// A container is locked when any of its entries carries the catalog's lock
/// flag.
#[must_use]
pub fn compute_container_progress(
    lessons: &[LessonCatalogEntry],
    best_accuracy: &BestAccuracy,
) -> Vec<ContainerProgress> {
    let mut index: HashMap<&ContainerId, usize> = HashMap::new();
    let mut groups: Vec<(&ContainerId, Vec<&LessonId>, bool)> = Vec::new();

    for entry in lessons {
        let slot = *index.entry(&entry.container_id).or_insert_with(|| {
            groups.push((&entry.container_id, Vec::new(), false));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.1.push(&entry.lesson_id);
        group.2 |= entry.container_locked;
    }

    groups
        .into_iter()
        .map(|(container_id, lesson_ids, locked)| {
            summarize_container(container_id.clone(), lesson_ids, best_accuracy, locked)
        })
        .collect()
}

/// Summarizes a single container from its lesson ids.
///
/// An empty container is 0% and not started (unless locked).
#[must_use]
pub fn summarize_container<'a, I>(
    container_id: ContainerId,
    lesson_ids: I,
    best_accuracy: &BestAccuracy,
    locked: bool,
) -> ContainerProgress
where
    I: IntoIterator<Item = &'a LessonId>,
{
    let mut total_count = 0_usize;
    let mut completed_count = 0_usize;
    for lesson_id in lesson_ids {
        total_count += 1;
        let accuracy = best_accuracy.get(lesson_id).copied().unwrap_or(0.0);
        if is_completed(accuracy) {
            completed_count += 1;
        }
    }

    let status = if locked {
        ContainerStatus::Locked
    } else if total_count > 0 && completed_count == total_count {
        ContainerStatus::Completed
    } else if completed_count > 0 {
        ContainerStatus::InProgress
    } else {
        ContainerStatus::NotStarted
    };

    ContainerProgress {
        container_id,
        percent_complete: percent(completed_count, total_count),
        completed_count,
        total_count,
        status,
    }
}

/// Keeps the containers whose status matches `filter`.
#[must_use]
pub fn filter_by_status(
    progress: Vec<ContainerProgress>,
    filter: StatusFilter,
) -> Vec<ContainerProgress> {
    progress
        .into_iter()
        .filter(|p| filter.matches(p.status))
        .collect()
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
///
/// Integer arithmetic, so 1/8 gives 13 rather than whatever 12.5 becomes in
/// floating point.
#[must_use]
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    let rounded = (200 * part + whole) / (2 * whole);
    u8::try_from(rounded).unwrap_or(100)
}

/// `round(100 * ratio)` with halves rounded up, for ratios in `[0, 1]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent_of_ratio(ratio: f64) -> u8 {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 0;
    }
    let scaled = (ratio.min(1.0) * 100.0 + 0.5).floor();
    // scaled is within [0, 100] here
    scaled as u8
}
