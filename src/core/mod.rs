pub mod dedup;
pub mod etl;
pub mod location;
pub mod normalize;
pub mod pipeline;
pub mod scorer;

pub use crate::domain::model::{Listing, RankedListings};
pub use crate::domain::ports::{ListingProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
