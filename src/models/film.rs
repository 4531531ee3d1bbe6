use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::{FilmId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Running time in minutes.
    pub duration: i32,
    pub rate: i32,
    /// MPA rating reference; must exist in the closed rating table.
    pub mpa: Option<i32>,
    /// Genre references; each must exist in the closed genre table.
    #[serde(default)]
    pub genres: BTreeSet<i32>,
    /// Ids of users who like this film.
    #[serde(default)]
    pub likes: BTreeSet<UserId>,
}

/// A film as submitted for creation, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    #[serde(default)]
    pub rate: i32,
    pub mpa: Option<i32>,
    #[serde(default)]
    pub genres: BTreeSet<i32>,
}

impl FilmDraft {
    /// Materializes the draft into a stored record under a fresh id.
    /// The like set always starts empty.
    #[must_use]
    pub fn into_film(self, id: FilmId) -> Film {
        Film {
            id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            rate: self.rate,
            mpa: self.mpa,
            genres: self.genres,
            likes: BTreeSet::new(),
        }
    }
}

/// Entry in the closed MPA rating reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpaRating {
    pub id: i32,
    pub name: String,
}

/// Entry in the closed genre reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}
