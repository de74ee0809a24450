//! Dashboard reducers: points, levels, streaks and per-skill accuracy.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{LessonId, LessonResult, Level, PointsEntry, QuestionAttempt};
use crate::progress::{BestAccuracy, is_completed, percent, percent_of_ratio};

/// Longest streak we look back for.
pub const MAX_STREAK_DAYS: u32 = 365;

/// Skill accuracy at or above this is a strength.
pub const STRENGTH_THRESHOLD: f64 = 0.9;

/// Skill accuracy below this needs support.
pub const SUPPORT_THRESHOLD: f64 = 0.6;

/// Sum of ledger points. Rows without points count as zero.
#[must_use]
pub fn total_points<'a, I>(entries: I) -> i64
where
    I: IntoIterator<Item = &'a PointsEntry>,
{
    entries
        .into_iter()
        .fold(0_i64, |sum, e| sum.saturating_add(e.points.unwrap_or(0)))
}

/// Highest level whose requirement is met by `total`.
#[must_use]
pub fn current_level(levels: &[Level], total: i64) -> Option<&Level> {
    levels
        .iter()
        .filter(|l| l.required_points <= total)
        .max_by_key(|l| (l.required_points, l.level))
}

/// Start of the oldest day a streak ending `today` can reach.
///
/// Sessions before this instant never affect [`streak_days`].
#[must_use]
pub fn streak_window_start(today: NaiveDate) -> DateTime<Utc> {
    today
        .checked_sub_days(Days::new(u64::from(MAX_STREAK_DAYS - 1)))
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Consecutive days, ending `today`, with at least one session.
///
/// A day without a session ends the streak, so no session today means 0.
#[must_use]
pub fn streak_days<I>(session_times: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let days: HashSet<NaiveDate> = session_times.into_iter().map(|t| t.date_naive()).collect();

    let mut streak = 0;
    let mut day = today;
    while streak < MAX_STREAK_DAYS && days.contains(&day) {
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Headline numbers for a student's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_points: i64,
    pub lessons_completed: usize,
    pub lessons_in_progress: usize,
    pub total_lessons: usize,
    pub accuracy_percent: u8,
    pub progress_percent: u8,
    pub streak_days: u32,
}

impl DashboardStats {
    /// Builds stats from already-fetched rows.
    ///
    /// `class_lesson_count` is the number of lessons assigned to the student's
    /// class. When it is zero, the distinct lessons seen in `results` stand in.
    #[must_use]
    pub fn compute(
        best: &BestAccuracy,
        results: &[LessonResult],
        class_lesson_count: usize,
        total_points: i64,
        streak_days: u32,
    ) -> Self {
        let lessons_completed = best.values().filter(|a| is_completed(**a)).count();

        let accuracy_percent = if best.is_empty() {
            0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let mean = best.values().sum::<f64>() / best.len() as f64;
            percent_of_ratio(mean)
        };

        let total_lessons = if class_lesson_count > 0 {
            class_lesson_count
        } else {
            results
                .iter()
                .map(|r| &r.lesson_id)
                .collect::<HashSet<&LessonId>>()
                .len()
        };

        Self {
            total_points,
            lessons_completed,
            lessons_in_progress: total_lessons.saturating_sub(lessons_completed),
            total_lessons,
            accuracy_percent,
            progress_percent: percent(lessons_completed, total_lessons),
            streak_days,
        }
    }
}

//
// ─── SKILLS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillBand {
    Strength,
    Developing,
    NeedsSupport,
}

impl SkillBand {
    #[must_use]
    pub fn classify(accuracy: f64) -> Self {
        if accuracy >= STRENGTH_THRESHOLD {
            SkillBand::Strength
        } else if accuracy < SUPPORT_THRESHOLD {
            SkillBand::NeedsSupport
        } else {
            SkillBand::Developing
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkillBand::Strength => "strength",
            SkillBand::Developing => "developing",
            SkillBand::NeedsSupport => "needs-support",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillInsight {
    pub skill_tag: String,
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
    pub band: SkillBand,
}

/// Accuracy per skill tag, sorted by tag. Untagged attempts are skipped.
#[must_use]
pub fn skill_insights<'a, I>(attempts: I) -> Vec<SkillInsight>
where
    I: IntoIterator<Item = &'a QuestionAttempt>,
{
    let mut tally: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for attempt in attempts {
        let Some(tag) = attempt.skill_tag.as_deref() else {
            continue;
        };
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let (correct, total) = tally.entry(tag).or_insert((0, 0));
        *total = total.saturating_add(1);
        if attempt.is_correct {
            *correct = correct.saturating_add(1);
        }
    }

    tally
        .into_iter()
        .map(|(tag, (correct, total))| {
            let accuracy = f64::from(correct) / f64::from(total);
            SkillInsight {
                skill_tag: tag.to_owned(),
                correct,
                total,
                accuracy,
                band: SkillBand::classify(accuracy),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, StudentId};
    use crate::progress::compute_best_accuracy;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn points(values: &[Option<i64>]) -> Vec<PointsEntry> {
        values
            .iter()
            .map(|p| PointsEntry {
                student_id: StudentId::new("s1"),
                points: *p,
                source_type: "lesson".into(),
                created_at: fixed_now(),
            })
            .collect()
    }

    fn attempt(tag: Option<&str>, is_correct: bool) -> QuestionAttempt {
        QuestionAttempt {
            student_id: StudentId::new("s1"),
            question_id: QuestionId::new("q"),
            lesson_id: LessonId::new("L1"),
            skill_tag: tag.map(str::to_owned),
            is_correct,
            created_at: fixed_now(),
        }
    }

    #[test]
    fn total_points_treats_missing_as_zero() {
        assert_eq!(total_points(&points(&[Some(10), None, Some(5)])), 15);
        assert_eq!(total_points(&points(&[])), 0);
    }

    #[test]
    fn current_level_is_highest_reached() {
        let levels = vec![
            Level::new(1, 0, "Beginner"),
            Level::new(2, 100, "Explorer"),
            Level::new(3, 250, "Star"),
        ];
        assert_eq!(current_level(&levels, 120).map(|l| l.level), Some(2));
        assert_eq!(current_level(&levels, 250).map(|l| l.level), Some(3));
        assert_eq!(current_level(&levels[1..], 50), None);
    }

    #[test]
    fn streak_counts_back_from_today() {
        let now = fixed_now();
        let today = now.date_naive();
        let sessions = vec![
            now,
            now - Duration::hours(1),
            now - Duration::days(1),
            now - Duration::days(2),
            now - Duration::days(4),
        ];
        assert_eq!(streak_days(sessions, today), 3);
    }

    #[test]
    fn streak_is_zero_without_session_today() {
        let now = fixed_now();
        let sessions = vec![now - Duration::days(1)];
        assert_eq!(streak_days(sessions, now.date_naive()), 0);
    }

    #[test]
    fn streak_is_capped() {
        let now = fixed_now();
        let sessions: Vec<_> = (0..400).map(|d| now - Duration::days(d)).collect();
        assert_eq!(streak_days(sessions, now.date_naive()), MAX_STREAK_DAYS);
    }

    #[test]
    fn streak_window_covers_exactly_the_capped_days() {
        let now = fixed_now();
        let today = now.date_naive();
        let start = streak_window_start(today);

        assert_eq!(start.time(), NaiveTime::MIN);
        assert_eq!(
            (today - start.date_naive()).num_days() + 1,
            i64::from(MAX_STREAK_DAYS)
        );

        let inside: Vec<_> = (0..i64::from(MAX_STREAK_DAYS))
            .map(|d| now - Duration::days(d))
            .filter(|t| *t >= start)
            .collect();
        assert_eq!(streak_days(inside, today), MAX_STREAK_DAYS);
    }

    #[test]
    fn dashboard_stats_from_results() {
        let results = vec![
            LessonResult::new("A", 10, 10),
            LessonResult::new("B", 1, 2),
            LessonResult::new("C", 0, 0),
        ];
        let best = compute_best_accuracy(&results);
        let stats = DashboardStats::compute(&best, &results, 4, 30, 2);

        assert_eq!(stats.lessons_completed, 1);
        assert_eq!(stats.total_lessons, 4);
        assert_eq!(stats.lessons_in_progress, 3);
        assert_eq!(stats.accuracy_percent, 75);
        assert_eq!(stats.progress_percent, 25);
        assert_eq!(stats.total_points, 30);
        assert_eq!(stats.streak_days, 2);
    }

    #[test]
    fn dashboard_falls_back_to_result_lessons() {
        let results = vec![
            LessonResult::new("A", 10, 10),
            LessonResult::new("A", 5, 10),
            LessonResult::new("B", 0, 0),
        ];
        let best = compute_best_accuracy(&results);
        let stats = DashboardStats::compute(&best, &results, 0, 0, 0);
        assert_eq!(stats.total_lessons, 2);
        assert_eq!(stats.lessons_in_progress, 1);
        assert_eq!(stats.progress_percent, 50);
    }

    #[test]
    fn empty_dashboard_is_all_zero() {
        let stats = DashboardStats::compute(&BestAccuracy::new(), &[], 0, 0, 0);
        assert_eq!(stats.accuracy_percent, 0);
        assert_eq!(stats.progress_percent, 0);
        assert_eq!(stats.total_lessons, 0);
    }

    #[test]
    fn skill_bands_follow_thresholds() {
        assert_eq!(SkillBand::classify(0.9), SkillBand::Strength);
        assert_eq!(SkillBand::classify(0.89), SkillBand::Developing);
        assert_eq!(SkillBand::classify(0.6), SkillBand::Developing);
        assert_eq!(SkillBand::classify(0.59), SkillBand::NeedsSupport);
    }

    #[test]
    fn skill_insights_group_by_tag() {
        let mut attempts = Vec::new();
        for i in 0..10 {
            attempts.push(attempt(Some("fractions"), i < 9));
        }
        attempts.push(attempt(Some("division"), false));
        attempts.push(attempt(Some("division"), true));
        attempts.push(attempt(None, true));
        attempts.push(attempt(Some("  "), true));

        let insights = skill_insights(&attempts);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].skill_tag, "division");
        assert_eq!(insights[0].band, SkillBand::NeedsSupport);
        assert_eq!(insights[1].skill_tag, "fractions");
        assert_eq!(insights[1].correct, 9);
        assert_eq!(insights[1].band, SkillBand::Strength);
    }
}
