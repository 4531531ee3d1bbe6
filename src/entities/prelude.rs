pub use super::film_genres::Entity as FilmGenres;
pub use super::film_likes::Entity as FilmLikes;
pub use super::films::Entity as Films;
pub use super::friendships::Entity as Friendships;
pub use super::genres::Entity as Genres;
pub use super::mpa_ratings::Entity as MpaRatings;
pub use super::users::Entity as Users;
