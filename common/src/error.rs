//! エラー型定義

use thiserror::Error;

/// セッション操作の共通エラー型
///
/// - NotFound: 参照先のアップロード/候補が現在のセッションに存在しない
///   （UI側の同期バグを示すため、握りつぶさず呼び出し元へ返す）
/// - InvalidState: 確定済み候補への再操作（重複イベント等）
#[derive(Error, Debug)]
pub enum Error {
    #[error("対象が見つかりません: {0}")]
    NotFound(String),

    #[error("状態が不正です: {0}")]
    InvalidState(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
