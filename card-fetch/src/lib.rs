//! Random-card fetches against the public card-data API.
//!
//! The API itself is a black box returning card records; only the
//! request and decode plumbing lives here. Pack opening is a batch of
//! independent random draws, so the fetches run in parallel and a draw
//! that fails is simply dropped from the pack.

use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use card_error::Result;
use card_model::Card;

const CARD_API_BASE: &str = "https://api.scryfall.com";

/// Set restriction applied when the caller does not pick one.
pub const DEFAULT_SET_QUERY: &str = "e:spm";

pub struct CardFetcher {
    client: reqwest::Client,
    base: Url,
}

impl CardFetcher {
    pub fn new(base: Url) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("card-binder/0.1 (card collection demo)"),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { client, base })
    }

    /// Fetcher against the public card-data API.
    pub fn public_api() -> Result<Self> {
        Self::new(Url::parse(CARD_API_BASE)?)
    }

    fn random_card_url(&self, query: &str) -> Result<Url> {
        let mut url = self.base.join("cards/random")?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    /// One random card matching `query`.
    pub async fn fetch_random(&self, query: &str) -> Result<Card> {
        let url = self.random_card_url(query)?;
        let card = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Card>()
            .await?;
        Ok(card)
    }

    /// A pack of `size` random cards matching `query`, drawn in
    /// parallel. Failed draws are logged and skipped, so the returned
    /// pack may come back short.
    pub async fn fetch_pack(&self, size: usize, query: &str) -> Vec<Card> {
        let draws = (0..size).map(|_| self.fetch_random(query));
        futures::future::join_all(draws)
            .await
            .into_iter()
            .filter_map(|draw| match draw {
                Ok(card) => Some(card),
                Err(err) => {
                    log::warn!("fetch: dropping failed draw: {}", err);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_card_url_carries_the_query() {
        let fetcher = CardFetcher::public_api().unwrap();
        let url = fetcher.random_card_url(DEFAULT_SET_QUERY).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.scryfall.com/cards/random?q=e%3Aspm"
        );
    }

    #[test]
    fn test_random_card_url_against_custom_base() {
        let fetcher =
            CardFetcher::new(Url::parse("http://localhost:8080/").unwrap()).unwrap();
        let url = fetcher.random_card_url("rarity:mythic").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/cards/random?q=rarity%3Amythic"
        );
    }
}
