pub mod adapters;
pub mod config;
pub mod core;
pub mod demo;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{AppConfig, LocalStorage};

pub use core::{etl::EtlEngine, pipeline::HunterPipeline, scorer::score_listings};
pub use domain::model::{Listing, ScoredListing, ScoringWeights, SearchCriteria, Source, Tag};
pub use utils::error::{HunterError, Result};
