use serde::Deserialize;

const VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const FALLBACK_COVER_URL: &str = "/assets/images/notavailablebook.png";

/// Looks up cover thumbnails on the Google Books volumes API. Lookups are
/// best-effort: any failure falls back to a placeholder image so a reading
/// list can always be rendered.
#[derive(Clone)]
pub struct CoverClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct VolumesResponse {
    items: Option<Vec<Volume>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    image_links: Option<ImageLinks>,
}

#[derive(Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

impl CoverClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("GOOGLE_BOOKS_API_KEY").ok())
    }

    pub async fn cover_for_title(&self, title: &str) -> String {
        match self.lookup(title).await {
            Ok(Some(url)) => url,
            Ok(None) => FALLBACK_COVER_URL.to_string(),
            Err(e) => {
                tracing::warn!("cover lookup for {title:?} failed: {e}");
                FALLBACK_COVER_URL.to_string()
            }
        }
    }

    async fn lookup(&self, title: &str) -> reqwest::Result<Option<String>> {
        let mut query = vec![("q", format!("intitle:{title}"))];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self
            .http
            .get(VOLUMES_URL)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json::<VolumesResponse>()
            .await?;

        Ok(response
            .items
            .into_iter()
            .flatten()
            .next()
            .and_then(|v| v.volume_info.image_links)
            .and_then(|links| links.thumbnail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_is_read_from_first_volume() {
        let body = serde_json::json!({
            "items": [
                { "volumeInfo": { "imageLinks": { "thumbnail": "http://covers/one.jpg" } } },
                { "volumeInfo": { "imageLinks": { "thumbnail": "http://covers/two.jpg" } } }
            ]
        });
        let parsed: VolumesResponse = serde_json::from_value(body).unwrap();
        let thumbnail = parsed
            .items
            .into_iter()
            .flatten()
            .next()
            .and_then(|v| v.volume_info.image_links)
            .and_then(|links| links.thumbnail);
        assert_eq!(thumbnail.as_deref(), Some("http://covers/one.jpg"));
    }

    #[test]
    fn missing_items_yield_no_thumbnail() {
        let parsed: VolumesResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.items.is_none());
    }
}
