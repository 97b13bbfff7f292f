use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardSortError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("バックエンド呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("バックエンドレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("セッションエラー: {0}")]
    Session(#[from] card_sort_common::Error),
}

pub type Result<T> = std::result::Result<T, CardSortError>;
