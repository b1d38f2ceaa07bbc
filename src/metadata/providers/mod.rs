//! Concrete metadata provider clients.

pub mod omdb;
pub mod tmdb;

pub use omdb::OmdbProvider;
pub use tmdb::TmdbProvider;
