//! 認識バックエンドとの通信
//!
//! 認識・永続化サービス（FastAPI）への薄いHTTPクライアント。
//! リトライや再送はここでは行わない（必要なら呼び出し側の責務）。

use std::path::Path;
use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;

use card_sort_common::Card;

use crate::config::Config;
use crate::error::{CardSortError, Result};

/// 類似検索レスポンスの1グループ（切り出し画像ごと）
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarGroup {
    /// 切り出し元画像の参照パス
    pub img: String,
    /// スコア順のマッチ候補
    pub matches: Vec<SimilarMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarMatch {
    pub id: String,
    pub score: f32,
}

/// 保存済みセッションの1行: (行ID, カードID, 切り出し元画像, セッションID)
pub type SessionRow = (i64, String, String, String);

pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        Ok(Self {
            base_url: config.api_url().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// 写真をアップロードしてオブジェクトIDを得る
    pub async fn upload_image(&self, path: &Path) -> Result<String> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image.jpg".to_string());
        let bytes = tokio::fs::read(path).await?;

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;
        let form = multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(format!("{}/upload-image", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// アップロード済み画像の類似カードを検索する
    pub async fn find_similar(&self, object_id: &str) -> Result<Vec<SimilarGroup>> {
        let response = self
            .client
            .get(format!("{}/similar-from-image/{}", self.base_url, object_id))
            .send()
            .await
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// 確定したマッチをセッションに記録する
    pub async fn put_match(&self, card_id: &str, src: &str, session: &str) -> Result<()> {
        let response = self
            .client
            .put(format!("{}/match", self.base_url))
            .query(&[("id", card_id), ("src", src), ("session", session)])
            .send()
            .await
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        Self::check_status(&response)?;
        Ok(())
    }

    /// カード情報をIDでまとめて取得する（リクエスト順で返る）
    pub async fn get_cards(&self, ids: &[String]) -> Result<Vec<Card>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        let response = self
            .client
            .get(format!("{}/cards", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// 保存済みセッションの確定行を読み出す
    pub async fn load_session(&self, session_id: &str) -> Result<Vec<SessionRow>> {
        let response = self
            .client
            .get(format!("{}/session/{}", self.base_url, session_id))
            .send()
            .await
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// セッションID一覧（新しい順）
    pub async fn list_sessions(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/sessions", self.base_url))
            .send()
            .await
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        let rows: Vec<(String,)> = Self::parse_json(response).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// コレクション全体（確定済みカードの集約ビュー）
    pub async fn get_collection(&self) -> Result<Vec<Card>> {
        let response = self
            .client
            .get(format!("{}/collection", self.base_url))
            .send()
            .await
            .map_err(|e| CardSortError::ApiCall(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// 切り出し画像の閲覧URL（バックエンドは /tmp/ 配下のパスで返す）
    pub fn tmp_image_url(&self, img: &str) -> String {
        let name = img.strip_prefix("/tmp/").unwrap_or(img);
        format!("{}/tmp/images/{}", self.base_url, name)
    }

    fn check_status(response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(CardSortError::ApiCall(format!(
                "HTTPステータス {}",
                status
            )));
        }
        Ok(())
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        Self::check_status(&response)?;
        response
            .json()
            .await
            .map_err(|e| CardSortError::ApiParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> BackendClient {
        BackendClient {
            base_url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    #[test]
    fn test_tmp_image_url_strips_tmp_prefix() {
        let api = client("http://localhost:8001");
        assert_eq!(
            api.tmp_image_url("/tmp/crop0.jpg"),
            "http://localhost:8001/tmp/images/crop0.jpg"
        );
    }

    #[test]
    fn test_tmp_image_url_without_prefix() {
        let api = client("http://localhost:8001/");
        assert_eq!(
            api.tmp_image_url("crop1.jpg"),
            "http://localhost:8001/tmp/images/crop1.jpg"
        );
    }

    #[test]
    fn test_similar_group_deserialize() {
        let json = r#"[
            {"img": "/tmp/crop0.jpg", "matches": [{"id": "abc", "score": 0.12}]},
            {"img": "/tmp/crop1.jpg", "matches": []}
        ]"#;
        let groups: Vec<SimilarGroup> = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].matches[0].id, "abc");
        assert!(groups[1].matches.is_empty());
    }

    #[test]
    fn test_session_row_deserialize() {
        let json = r#"[[1, "card-a", "/tmp/crop0.jpg", "session-1"]]"#;
        let rows: Vec<SessionRow> = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(rows[0].1, "card-a");
        assert_eq!(rows[0].2, "/tmp/crop0.jpg");
    }
}
