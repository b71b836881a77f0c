pub mod favorites;
pub mod hall;
pub mod movie;
pub mod reviews;
pub mod service;
pub mod show;

pub use favorites::{Favorite, FavoriteStore};
pub use hall::{HallConfig, HallRow, InvalidConfiguration};
pub use movie::Movie;
pub use reviews::{Review, ReviewBoard, ReviewError};
pub use service::{CatalogError, CatalogService};
pub use show::{Show, ShowStatus};
