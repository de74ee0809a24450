use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ContainerId, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown container status: {0}")]
    UnknownStatus(String),

    #[error("unknown status filter: {0}")]
    UnknownFilter(String),
}

//
// ─── CATALOG ENTRY ─────────────────────────────────────────────────────────────
//

/// Links a lesson to the chapter or unit it belongs to.
///
/// `container_locked` is passed through from the external catalog untouched;
/// nothing in this crate decides whether a container is locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonCatalogEntry {
    pub lesson_id: LessonId,
    pub container_id: ContainerId,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub container_locked: bool,
}

impl LessonCatalogEntry {
    #[must_use]
    pub fn new(
        lesson_id: impl Into<LessonId>,
        container_id: impl Into<ContainerId>,
        display_order: i64,
    ) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            container_id: container_id.into(),
            display_order: Some(display_order),
            container_locked: false,
        }
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.container_locked = true;
        self
    }
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Classification of a container snapshot. Recomputed on every load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerStatus {
    NotStarted,
    InProgress,
    Completed,
    Locked,
}

impl ContainerStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerStatus::NotStarted => "not-started",
            ContainerStatus::InProgress => "in-progress",
            ContainerStatus::Completed => "completed",
            ContainerStatus::Locked => "locked",
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not-started" => Ok(Self::NotStarted),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "locked" => Ok(Self::Locked),
            other => Err(CatalogError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Which containers a progress view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ContainerStatus),
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, status: ContainerStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "all" {
            return Ok(Self::All);
        }
        s.parse::<ContainerStatus>()
            .map(Self::Only)
            .map_err(|_| CatalogError::UnknownFilter(s.trim().to_owned()))
    }
}

//
// ─── CONTAINER PROGRESS ────────────────────────────────────────────────────────
//

/// Derived completion of one chapter or unit. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerProgress {
    pub container_id: ContainerId,
    pub percent_complete: u8,
    pub completed_count: usize,
    pub total_count: usize,
    pub status: ContainerStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ContainerStatus::NotStarted,
            ContainerStatus::InProgress,
            ContainerStatus::Completed,
            ContainerStatus::Locked,
        ] {
            assert_eq!(status.as_str().parse::<ContainerStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "soon".parse::<ContainerStatus>().unwrap_err();
        assert_eq!(err, CatalogError::UnknownStatus("soon".into()));
    }

    #[test]
    fn filter_parses_all_and_specific() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "locked".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(ContainerStatus::Locked)
        );
        assert!(matches!(
            "bogus".parse::<StatusFilter>(),
            Err(CatalogError::UnknownFilter(_))
        ));
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&ContainerStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn catalog_entry_defaults_to_unlocked() {
        let entry: LessonCatalogEntry =
            serde_json::from_str(r#"{"lesson_id":"A","container_id":"C1"}"#).unwrap();
        assert!(!entry.container_locked);
        assert_eq!(entry.display_order, None);
    }
}
