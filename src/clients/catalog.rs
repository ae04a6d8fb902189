// src/clients/catalog.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{error::AppError, models::movie::CatalogMovie};

/// Source of canonical title metadata used to materialize local movie rows.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Returns `Ok(None)` when the catalog does not know the title.
    /// Transport failures surface as `AppError::Upstream`.
    async fn fetch_movie(&self, movie_id: &str) -> Result<Option<CatalogMovie>, AppError>;
}

/// Catalog client speaking the OMDb lookup protocol (`GET /?i=<imdb id>`).
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::InternalServerError(format!("Invalid catalog URL: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn lookup_url(&self, movie_id: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("i", movie_id);
            if let Some(key) = &self.api_key {
                query.append_pair("apikey", key);
            }
        }
        url
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_movie(&self, movie_id: &str) -> Result<Option<CatalogMovie>, AppError> {
        let response = self
            .http
            .get(self.lookup_url(movie_id))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Catalog request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: OmdbTitle = response
            .error_for_status()
            .map_err(|e| AppError::Upstream(format!("Catalog returned an error: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Catalog response was malformed: {}", e)))?;

        Ok(body.into_movie(movie_id))
    }
}

/// Wire format of an OMDb title lookup. Absent values are reported as "N/A".
#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    rating: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

impl OmdbTitle {
    fn into_movie(self, movie_id: &str) -> Option<CatalogMovie> {
        if !self.response.eq_ignore_ascii_case("true") {
            return None;
        }
        let title = present(self.title)?;

        Some(CatalogMovie {
            id: movie_id.to_string(),
            title,
            // Series report ranges such as "2008–2013"; keep the first year.
            production_year: present(self.year)
                .and_then(|y| y.chars().take(4).collect::<String>().parse().ok()),
            external_rating: present(self.rating)
                .and_then(|r| r.parse::<f64>().ok())
                .filter(|r| (0.0..=10.0).contains(r)),
            poster_url: present(self.poster),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_found_title() {
        let body: OmdbTitle = serde_json::from_str(
            r#"{"Title":"Pulp Fiction","Year":"1994","imdbRating":"8.9",
                "Poster":"https://img.example/pf.jpg","Response":"True"}"#,
        )
        .unwrap();
        let movie = body.into_movie("tt0110912").unwrap();
        assert_eq!(movie.id, "tt0110912");
        assert_eq!(movie.title, "Pulp Fiction");
        assert_eq!(movie.production_year, Some(1994));
        assert_eq!(movie.external_rating, Some(8.9));
        assert_eq!(movie.poster_url.as_deref(), Some("https://img.example/pf.jpg"));
    }

    #[test]
    fn not_available_fields_become_none() {
        let body: OmdbTitle = serde_json::from_str(
            r#"{"Title":"Breaking Bad","Year":"2008–2013","imdbRating":"N/A",
                "Poster":"N/A","Response":"True"}"#,
        )
        .unwrap();
        let movie = body.into_movie("tt0903747").unwrap();
        assert_eq!(movie.production_year, Some(2008));
        assert_eq!(movie.external_rating, None);
        assert_eq!(movie.poster_url, None);
    }

    #[test]
    fn unknown_title_is_none() {
        let body: OmdbTitle =
            serde_json::from_str(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#).unwrap();
        assert!(body.into_movie("tt0000000").is_none());
    }

    #[test]
    fn lookup_url_carries_id_and_key() {
        let client =
            HttpCatalogClient::new("https://catalog.example/", Some("secret".into())).unwrap();
        let url = client.lookup_url("tt0110912");
        assert_eq!(url.as_str(), "https://catalog.example/?i=tt0110912&apikey=secret");
    }
}
