pub mod film;
pub mod user;
