//! WeChat official account draft upload.
//!
//! API: https://developers.weixin.qq.com/doc/offiaccount/Draft_Box/Add_draft.html

use inkpipe_core::config::WeChatCredentials;
use inkpipe_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub const DEFAULT_ENDPOINT: &str = "https://api.weixin.qq.com";

/// One article in a draft.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DraftArticle {
    pub title: String,
    pub author: String,
    pub digest: String,
    /// HTML body
    pub content: String,
    pub content_source_url: String,
    pub thumb_media_id: String,
    pub need_open_comment: u8,
    pub only_fans_can_comment: u8,
}

impl DraftArticle {
    /// Draft with comments open to everyone.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        thumb_media_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            thumb_media_id: thumb_media_id.into(),
            need_open_comment: 1,
            only_fans_can_comment: 0,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct DraftRequest<'a> {
    articles: [&'a DraftArticle; 1],
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DraftResponse {
    media_id: Option<String>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

fn describe_error(errcode: Option<i64>, errmsg: Option<String>) -> String {
    format!(
        "errcode {}: {}",
        errcode.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()),
        errmsg.unwrap_or_else(|| "no message".to_string())
    )
}

fn parse_token(body: &str) -> AppResult<String> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Backend(format!("Failed to parse WeChat token response: {}", e)))?;

    match parsed.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Backend(format!(
            "WeChat auth failed ({})",
            describe_error(parsed.errcode, parsed.errmsg)
        ))),
    }
}

fn parse_media_id(body: &str) -> AppResult<String> {
    let parsed: DraftResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Backend(format!("Failed to parse WeChat draft response: {}", e)))?;

    match parsed.media_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(AppError::Backend(format!(
            "WeChat draft upload failed ({})",
            describe_error(parsed.errcode, parsed.errmsg)
        ))),
    }
}

/// Client for the draft box API.
pub struct WeChatClient {
    base_url: String,
    app_id: String,
    app_secret: String,
    access_token: Mutex<Option<String>>,
    client: reqwest::Client,
}

impl WeChatClient {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_ENDPOINT, app_id, app_secret, reqwest::Client::new())
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            access_token: Mutex::new(None),
            client,
        }
    }

    pub fn from_credentials(credentials: &WeChatCredentials) -> Self {
        Self::with_base_url(
            credentials.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT),
            &credentials.app_id,
            &credentials.app_secret,
            reqwest::Client::new(),
        )
    }

    fn cached_token(&self) -> Option<String> {
        self.access_token.lock().ok().and_then(|t| t.clone())
    }

    /// Access token, fetched on first use and cached afterwards.
    pub async fn access_token(&self) -> AppResult<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let response = self
            .client
            .get(format!("{}/cgi-bin/token", self.base_url))
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to reach WeChat: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to read WeChat response: {}", e)))?;
        let token = parse_token(&body)?;

        tracing::info!("Obtained WeChat access token");
        if let Ok(mut cached) = self.access_token.lock() {
            *cached = Some(token.clone());
        }
        Ok(token)
    }

    /// Create a draft holding one article and return its media id.
    pub async fn upload_draft(&self, article: &DraftArticle) -> AppResult<String> {
        let token = self.access_token().await?;

        tracing::info!("Uploading draft '{}' to WeChat", article.title);
        let response = self
            .client
            .post(format!("{}/cgi-bin/draft/add", self.base_url))
            .query(&[("access_token", token.as_str())])
            .json(&DraftRequest {
                articles: [article],
            })
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to reach WeChat: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to read WeChat response: {}", e)))?;

        let media_id = parse_media_id(&body).map_err(|e| {
            tracing::error!("{}", e);
            e
        })?;
        tracing::info!("Draft uploaded, media id {}", media_id);
        Ok(media_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_payload_shape() {
        let article = DraftArticle::new("聚光灯效应", "<p>正文</p>", "thumb-1");
        let json = serde_json::to_string(&DraftRequest {
            articles: [&article],
        })
        .unwrap();

        // Non-ASCII is sent literally
        assert!(json.contains("聚光灯效应"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["articles"][0];
        assert_eq!(first["thumb_media_id"], "thumb-1");
        assert_eq!(first["need_open_comment"], 1);
        assert_eq!(first["only_fans_can_comment"], 0);
        assert_eq!(first["author"], "");
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(
            parse_token(r#"{"access_token":"ACCESS","expires_in":7200}"#).unwrap(),
            "ACCESS"
        );

        match parse_token(r#"{"errcode":40013,"errmsg":"invalid appid"}"#) {
            Err(AppError::Backend(msg)) => assert!(msg.contains("40013")),
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_media_id() {
        assert_eq!(
            parse_media_id(r#"{"media_id":"MEDIA_ID"}"#).unwrap(),
            "MEDIA_ID"
        );
        assert!(matches!(
            parse_media_id(r#"{"errcode":40007,"errmsg":"invalid media_id"}"#),
            Err(AppError::Backend(_))
        ));
        assert!(matches!(parse_media_id("<html>"), Err(AppError::Backend(_))));
    }

    #[test]
    fn test_from_credentials_uses_custom_endpoint() {
        let client = WeChatClient::from_credentials(&WeChatCredentials {
            app_id: "id".to_string(),
            app_secret: "secret".to_string(),
            thumb_media_id: "thumb".to_string(),
            endpoint: Some("http://localhost:9000/".to_string()),
        });
        assert_eq!(client.base_url, "http://localhost:9000");
        assert!(client.cached_token().is_none());
    }
}
