use crate::domain::model::{Listing, RankedListings, SearchCriteria, Source};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// One adapter per listing provider. Implementations swallow their own
/// failures and return an empty list instead.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    fn source(&self) -> Source;
    async fn fetch(&self, criteria: &SearchCriteria) -> Vec<Listing>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Listing>>;
    async fn transform(&self, listings: Vec<Listing>) -> Result<RankedListings>;
    async fn load(&self, ranked: RankedListings) -> Result<String>;
}
