//! Notion database adapter.
//!
//! Each tracked game is one page in a Notion database. Properties are
//! addressed by name: `Name` (title), `AppID` (rich text), `URL`, `Price`,
//! `OriginalPrice`, `SalePercent` (stored as a fraction of 1), `OverallReview`
//! (rich text) and `Tags` (multi-select). The cover image is the page cover.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use steamwatch_core::{CatalogEntry, EntryUpdate, store_url};
use tracing::{info, warn};

use crate::{Page, RecordStore, StoreError};

const NOTION_VERSION: &str = "2022-06-28";

mod prop {
    pub const NAME: &str = "Name";
    pub const APP_ID: &str = "AppID";
    pub const URL: &str = "URL";
    pub const PRICE: &str = "Price";
    pub const ORIGINAL_PRICE: &str = "OriginalPrice";
    pub const SALE_PERCENT: &str = "SalePercent";
    pub const OVERALL_REVIEW: &str = "OverallReview";
    pub const TAGS: &str = "Tags";
}

/// Connection settings for a Notion database.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub token: String,
    pub database_id: String,
    /// API root, without trailing slash.
    pub base_url: String,
    /// Rich-text property that receives the recent-review label, if any.
    pub recent_review_property: Option<String>,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            database_id: String::new(),
            base_url: "https://api.notion.com".into(),
            recent_review_property: None,
        }
    }
}

/// [`RecordStore`] backed by a Notion database.
pub struct NotionStore {
    client: reqwest::Client,
    config: NotionConfig,
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<NotionPage>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct NotionPage {
    id: String,
    #[serde(default)]
    properties: HashMap<String, Value>,
    cover: Option<Value>,
}

impl NotionStore {
    pub fn new(mut config: NotionConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.config.base_url))
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    fn update_body(&self, update: &EntryUpdate) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert(prop::NAME.into(), json!({ "title": text(&update.title) }));
        properties.insert(prop::PRICE.into(), json!({ "number": update.price }));
        properties.insert(
            prop::ORIGINAL_PRICE.into(),
            json!({ "number": update.original_price }),
        );
        properties.insert(
            prop::SALE_PERCENT.into(),
            json!({ "number": update.sale_percent.map(|p| f64::from(p) / 100.0) }),
        );
        properties.insert(
            prop::OVERALL_REVIEW.into(),
            json!({ "rich_text": text(&update.overall_review) }),
        );
        if let (Some(name), Some(recent)) =
            (&self.config.recent_review_property, &update.recent_review)
        {
            properties.insert(name.clone(), json!({ "rich_text": text(recent) }));
        }

        let mut body = json!({ "properties": properties });
        if let Some(cover) = &update.cover_image {
            body["cover"] = json!({ "type": "external", "external": { "url": cover } });
        }
        body
    }
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn query_page(&self, cursor: Option<&str>) -> Result<Page, StoreError> {
        let path = format!("/v1/databases/{}/query", self.config.database_id);
        let body = match cursor {
            Some(c) => json!({ "start_cursor": c }),
            None => json!({}),
        };

        let resp = self
            .request(reqwest::Method::POST, &path)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse = serde_json::from_str(&resp.text().await?)?;
        let entries = parsed
            .results
            .into_iter()
            .filter_map(|page| {
                let entry = parse_entry(page);
                if entry.is_none() {
                    warn!("skipping Notion page without AppID");
                }
                entry
            })
            .collect();
        let next_cursor = if parsed.has_more {
            parsed.next_cursor
        } else {
            None
        };
        Ok(Page {
            entries,
            next_cursor,
        })
    }

    async fn update(&self, record_id: &str, update: &EntryUpdate) -> Result<(), StoreError> {
        let path = format!("/v1/pages/{record_id}");
        let resp = self
            .request(reqwest::Method::PATCH, &path)
            .json(&self.update_body(update))
            .send()
            .await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(record_id.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        info!(record_id, title = %update.title, "updated Notion page");
        Ok(())
    }
}

fn text(content: &str) -> Value {
    json!([{ "text": { "content": content } }])
}

/// Concatenated plain text of a title or rich-text property.
fn plain_text(property: Option<&Value>) -> Option<String> {
    let property = property?;
    let segments = property
        .get("title")
        .or_else(|| property.get("rich_text"))?
        .as_array()?;
    let joined: String = segments
        .iter()
        .filter_map(|s| s.get("plain_text").and_then(Value::as_str))
        .collect();
    (!joined.is_empty()).then_some(joined)
}

fn number(property: Option<&Value>) -> Option<f64> {
    property?.get("number")?.as_f64()
}

fn parse_entry(page: NotionPage) -> Option<CatalogEntry> {
    let props = &page.properties;
    let app_id = plain_text(props.get(prop::APP_ID))?;
    let tags: BTreeSet<String> = props
        .get(prop::TAGS)
        .and_then(|t| t.get("multi_select"))
        .and_then(Value::as_array)
        .map(|opts| {
            opts.iter()
                .filter_map(|o| o.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let cover_image = page.cover.as_ref().and_then(|c| {
        c.get("external")
            .or_else(|| c.get("file"))
            .and_then(|f| f.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    Some(CatalogEntry {
        store_url: props
            .get(prop::URL)
            .and_then(|u| u.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| store_url(&app_id)),
        title: plain_text(props.get(prop::NAME)).unwrap_or_default(),
        price: number(props.get(prop::PRICE)),
        original_price: number(props.get(prop::ORIGINAL_PRICE)),
        sale_percent: number(props.get(prop::SALE_PERCENT))
            .map(|fraction| (fraction * 100.0).round().clamp(0.0, 100.0) as u8),
        overall_review: plain_text(props.get(prop::OVERALL_REVIEW)),
        cover_image,
        tags,
        record_id: page.id,
        app_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list_all;
    use futures::TryStreamExt;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_json(id: &str, app_id: &str, sale: Option<f64>, tags: &[&str]) -> Value {
        json!({
            "object": "page",
            "id": id,
            "cover": { "type": "external", "external": { "url": "https://cdn.example/h.jpg" } },
            "properties": {
                "Name": { "type": "title", "title": [{ "plain_text": "Hollow Knight" }] },
                "AppID": { "type": "rich_text", "rich_text": [{ "plain_text": app_id }] },
                "URL": { "type": "url", "url": null },
                "Price": { "type": "number", "number": 1480 },
                "OriginalPrice": { "type": "number", "number": 1480 },
                "SalePercent": { "type": "number", "number": sale },
                "OverallReview": { "type": "rich_text", "rich_text": [] },
                "Tags": {
                    "type": "multi_select",
                    "multi_select": tags.iter().map(|t| json!({ "name": t })).collect::<Vec<_>>()
                }
            }
        })
    }

    fn store_for(server: &MockServer) -> NotionStore {
        NotionStore::new(NotionConfig {
            token: "secret".into(),
            database_id: "db1".into(),
            base_url: format!("{}/", server.uri()),
            recent_review_property: None,
        })
    }

    #[test]
    fn parses_page_properties() {
        let page: NotionPage =
            serde_json::from_value(page_json("p1", "367520", Some(0.5), &["非通知", "metroid"]))
                .unwrap();
        let entry = parse_entry(page).unwrap();
        assert_eq!(entry.record_id, "p1");
        assert_eq!(entry.app_id, "367520");
        assert_eq!(entry.title, "Hollow Knight");
        assert_eq!(entry.store_url, "https://store.steampowered.com/app/367520/");
        assert_eq!(entry.price, Some(1480.0));
        assert_eq!(entry.sale_percent, Some(50));
        assert_eq!(entry.cover_image.as_deref(), Some("https://cdn.example/h.jpg"));
        assert!(entry.overall_review.is_none());
        assert!(entry.is_suppressed());
    }

    #[test]
    fn page_without_app_id_is_skipped() {
        let mut raw = page_json("p1", "367520", None, &[]);
        raw["properties"]["AppID"]["rich_text"] = json!([]);
        let page: NotionPage = serde_json::from_value(raw).unwrap();
        assert!(parse_entry(page).is_none());
    }

    #[test]
    fn update_body_maps_fields() {
        let store = NotionStore::new(NotionConfig {
            recent_review_property: Some("RecentReview".into()),
            ..Default::default()
        });
        let body = store.update_body(&EntryUpdate {
            title: "Hollow Knight".into(),
            price: Some(740.0),
            original_price: Some(1480.0),
            sale_percent: Some(50),
            overall_review: "圧倒的に好評(97%)".into(),
            cover_image: None,
            recent_review: Some("非常に好評(94%)".into()),
        });
        assert_eq!(body["properties"]["SalePercent"]["number"], json!(0.5));
        assert_eq!(body["properties"]["Price"]["number"], json!(740.0));
        assert_eq!(
            body["properties"]["OverallReview"]["rich_text"][0]["text"]["content"],
            json!("圧倒的に好評(97%)")
        );
        assert_eq!(
            body["properties"]["RecentReview"]["rich_text"][0]["text"]["content"],
            json!("非常に好評(94%)")
        );
        assert!(body.get("cover").is_none());
    }

    #[test]
    fn update_body_nulls_missing_price() {
        let store = NotionStore::new(NotionConfig::default());
        let body = store.update_body(&EntryUpdate {
            title: "Silksong".into(),
            price: None,
            original_price: None,
            sale_percent: None,
            overall_review: "評価なし".into(),
            cover_image: Some("https://cdn.example/s.jpg".into()),
            recent_review: Some("ignored".into()),
        });
        assert!(body["properties"]["Price"]["number"].is_null());
        assert!(body["properties"]["SalePercent"]["number"].is_null());
        assert_eq!(body["cover"]["external"]["url"], json!("https://cdn.example/s.jpg"));
        assert_eq!(body["properties"].as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn walks_cursor_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db1/query"))
            .and(header("Notion-Version", NOTION_VERSION))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [page_json("p1", "1", None, &[]), page_json("p2", "2", None, &[])],
                "has_more": true,
                "next_cursor": "cursor-2"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db1/query"))
            .and(body_json(json!({ "start_cursor": "cursor-2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [page_json("p3", "3", Some(0.1), &[])],
                "has_more": false,
                "next_cursor": null
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let entries: Vec<CatalogEntry> = list_all(&store).try_collect().await.unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.app_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(entries[2].sale_percent, Some(10));
    }

    #[tokio::test]
    async fn listing_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db1/query"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let result = store.query_page(None).await;
        assert!(matches!(result, Err(StoreError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn update_patches_page() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/pages/p1"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p1" })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/v1/pages/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let update = EntryUpdate {
            title: "Hollow Knight".into(),
            price: Some(1480.0),
            original_price: Some(1480.0),
            sale_percent: Some(0),
            overall_review: "圧倒的に好評(97%)".into(),
            cover_image: None,
            recent_review: None,
        };
        store.update("p1", &update).await.unwrap();
        store.update("p1", &update).await.unwrap();

        let missing = store.update("gone", &update).await;
        assert!(matches!(missing, Err(StoreError::NotFound(id)) if id == "gone"));
    }
}
