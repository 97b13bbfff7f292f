//! 仕分けセッションの型定義
//!
//! CLIと共有される型:
//! - Card: 認識サービスが返すカード情報
//! - Candidate: 画像内の1検出領域（WAITING → CONFIRMED/DISCARDED）
//! - Upload: 撮影した1枚の写真とその候補列

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// 認識サービスが返すカード情報
///
/// バックエンドから返された後は不変。id/scoreは類似検索結果から
/// マージされるため、/cards レスポンス単体では空になりうる。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Card {
    pub id: String,

    /// 類似検索の距離スコア
    pub score: f32,

    pub name: String,

    /// Scryfallページへのリンク
    pub link: String,

    #[serde(rename = "set")]
    pub set_code: String,

    pub set_name: String,

    /// カード画像URL
    pub image: String,

    /// 市場価格（小数文字列、例 "1.25"）
    pub price: String,

    /// EDHREC順位（整数文字列、"0" = 順位なし）
    /// バックエンドは数値で返すことがあるため文字列へ寄せる
    #[serde(deserialize_with = "string_or_number")]
    pub edhrec: String,
}

/// 候補の状態
///
/// matchIdはCONFIRMEDにのみ存在する（構造で対を保証する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum CandidateStatus {
    #[serde(rename = "WAITING")]
    Waiting,

    #[serde(rename = "DISCARDED")]
    Discarded,

    #[serde(rename = "CONFIRMED")]
    Confirmed {
        #[serde(rename = "matchId")]
        match_id: String,
    },
}

impl Default for CandidateStatus {
    fn default() -> Self {
        CandidateStatus::Waiting
    }
}

/// 画像内の1検出領域に対する現在の推定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    /// スコア順のカード候補
    pub cards: Vec<Card>,

    /// 切り出し元画像の参照
    pub img: String,

    #[serde(flatten)]
    pub status: CandidateStatus,
}

impl Candidate {
    /// WAITING状態の新規候補を作る
    pub fn new(cards: Vec<Card>, img: impl Into<String>) -> Self {
        Self {
            cards,
            img: img.into(),
            status: CandidateStatus::Waiting,
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.status, CandidateStatus::Waiting)
    }

    /// CONFIRMEDの場合のみマッチIDを返す
    pub fn match_id(&self) -> Option<&str> {
        match &self.status {
            CandidateStatus::Confirmed { match_id } => Some(match_id),
            _ => None,
        }
    }
}

/// 撮影した1枚の写真
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: String,

    /// 元ファイルのパス
    pub file: PathBuf,

    /// 表示用のファイル名
    pub display_name: String,

    /// 検出された候補列（検出順）
    pub matches: Vec<Candidate>,

    /// 現在レビュー中の候補index（None = 未取得または消化済み）
    pub active: Option<usize>,
}

impl Upload {
    /// 未確定の候補数
    pub fn waiting_count(&self) -> usize {
        self.matches.iter().filter(|c| c.is_waiting()).count()
    }
}

/// 文字列・数値のどちらで来ても文字列として受ける
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::Text(s) => s,
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
    })
}
