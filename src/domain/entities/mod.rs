pub mod book;
pub mod favorite;
pub mod profile;

pub use book::Book;
pub use favorite::Favorite;
pub use profile::{Profile, ProfileSummary, ProfileWithEmail};
