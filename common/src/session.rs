//! 仕分けセッションの状態管理
//!
//! セッションが進行中アップロードの唯一の保持者。グローバルには置かず、
//! 呼び出し側が所有してハンドラへ渡す（テストごとに独立構築できる）。
//!
//! 状態遷移の保証:
//! - 候補の状態は WAITING → CONFIRMED/DISCARDED の一方向のみ
//! - activeは常に前進し、確定済み候補へ自動で戻ることはない

use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Candidate, CandidateStatus, Upload};

/// 候補の確定方法
#[derive(Debug, Clone)]
pub enum Resolution {
    /// 選択したカードで確定（マッチIDはバックエンド登録後に決まる）
    Confirm { match_id: String },
    /// この候補を破棄
    Discard,
}

/// 進行中の仕分けセッション
///
/// アップロード列は追加のみ（セッション中に削除されることはない）。
#[derive(Debug, Clone)]
pub struct SortSession {
    session_id: String,
    uploads: Vec<Upload>,
}

impl SortSession {
    /// 新しいセッションIDで開始する
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            uploads: Vec::new(),
        }
    }

    /// 保存済みセッションを読み直す場合など、ID指定で開始する
    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            uploads: Vec::new(),
        }
    }

    /// セッションを破棄して新しいIDで始め直す
    pub fn start(&mut self) {
        self.session_id = Uuid::new_v4().to_string();
        self.uploads.clear();
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// 新しいアップロードを登録してIDを返す
    ///
    /// 候補は空で始まる。呼び出し側が画像をバックエンドへ送信し、
    /// 結果が届いたらattach_candidatesを呼ぶ。
    pub fn begin_upload(&mut self, file: PathBuf) -> String {
        let id = Uuid::new_v4().to_string();
        let display_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.uploads.push(Upload {
            id: id.clone(),
            file,
            display_name,
            matches: Vec::new(),
            active: None,
        });

        id
    }

    /// 認識結果の候補列をアップロードへ結びつける
    ///
    /// 既存の候補列は丸ごと置き換える（未確定のうちは再呼び出し可能）。
    /// いずれかの候補が確定済みになった後の再結びつけはInvalidState。
    pub fn attach_candidates(
        &mut self,
        upload_id: &str,
        mut candidates: Vec<Candidate>,
    ) -> Result<()> {
        let upload = self.upload_mut(upload_id)?;

        if upload.matches.iter().any(|c| !c.is_waiting()) {
            return Err(Error::InvalidState(format!(
                "確定済み候補を含むアップロードへは再結びつけできません: {}",
                upload_id
            )));
        }

        // 新しい候補は必ずWAITINGで入る
        for candidate in &mut candidates {
            candidate.status = CandidateStatus::Waiting;
        }

        upload.active = if candidates.is_empty() { None } else { Some(0) };
        upload.matches = candidates;

        Ok(())
    }

    /// 候補を確定または破棄し、activeを次のWAITING候補へ進める
    ///
    /// 確定済み候補への再操作はInvalidStateで失敗し、状態は変わらない。
    /// activeは解決した候補より後ろへしか動かない。
    pub fn resolve_candidate(
        &mut self,
        upload_id: &str,
        index: usize,
        resolution: Resolution,
    ) -> Result<()> {
        let upload = self.upload_mut(upload_id)?;

        let candidate = upload.matches.get_mut(index).ok_or_else(|| {
            Error::NotFound(format!("候補がありません: {} [{}]", upload_id, index))
        })?;

        if !candidate.is_waiting() {
            return Err(Error::InvalidState(format!(
                "候補はすでに解決済みです: {} [{}]",
                upload_id, index
            )));
        }

        candidate.status = match resolution {
            Resolution::Confirm { match_id } => CandidateStatus::Confirmed { match_id },
            Resolution::Discard => CandidateStatus::Discarded,
        };

        upload.active = upload
            .matches
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, c)| c.is_waiting())
            .map(|(i, _)| i);

        Ok(())
    }

    /// 現在レビュー対象の候補（消化済みならNone）
    pub fn current_candidate(&self, upload_id: &str) -> Result<Option<&Candidate>> {
        let upload = self.upload(upload_id)?;
        Ok(upload.active.and_then(|i| upload.matches.get(i)))
    }

    pub fn upload(&self, upload_id: &str) -> Result<&Upload> {
        self.uploads
            .iter()
            .find(|u| u.id == upload_id)
            .ok_or_else(|| Error::NotFound(format!("アップロードがありません: {}", upload_id)))
    }

    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    /// セッション全体の未確定候補数
    pub fn waiting_count(&self) -> usize {
        self.uploads.iter().map(|u| u.waiting_count()).sum()
    }

    fn upload_mut(&mut self, upload_id: &str) -> Result<&mut Upload> {
        self.uploads
            .iter_mut()
            .find(|u| u.id == upload_id)
            .ok_or_else(|| Error::NotFound(format!("アップロードがありません: {}", upload_id)))
    }
}

impl Default for SortSession {
    fn default() -> Self {
        Self::new()
    }
}
