pub mod film;
pub mod user;

pub use film::{Film, FilmDraft, Genre, MpaRating};
pub use user::{User, UserDraft};
