//! 対話式仕分けワークフロー
//!
//! 流れ: フォルダスキャン → 写真ごとにアップロード+類似検索 →
//! 候補を1件ずつ確定/破棄 → 確定カードの保管先を集計。

use std::collections::HashMap;
use std::path::Path;

use dialoguer::Input;
use indicatif::ProgressBar;

use card_sort_common::{sort_card, Bin, Candidate, Card, Resolution, SortSession};

use crate::api::{BackendClient, SessionRow};
use crate::error::{CardSortError, Result};
use crate::scanner;

/// 保管先の表示順
const BIN_ORDER: &[Bin] = &[Bin::Binder, Bin::Sleeve, Bin::Edh, Bin::Bulk];

/// レビュー操作
enum ReviewAction {
    /// n番目のカードで確定（0始まり）
    Pick(usize),
    /// この候補を破棄
    Discard,
    /// 候補を再取得
    Refetch,
    /// 仕分けを終了
    Quit,
}

/// 遅延レスポンスの破棄用カウンタ
///
/// アップロードごとに単調増加のタグを発行し、最新タグ以外の
/// 結果はattach前に捨てる。古い類似検索結果が新しい結果を
/// 上書きしないための相関チェック。
#[derive(Debug, Default)]
struct FetchGuard {
    seq: HashMap<String, u64>,
}

impl FetchGuard {
    /// 新しい取得を開始し、そのタグを返す
    fn begin(&mut self, upload_id: &str) -> u64 {
        let seq = self.seq.entry(upload_id.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }

    /// タグが最新の取得のものか
    fn is_current(&self, upload_id: &str, tag: u64) -> bool {
        self.seq.get(upload_id).copied() == Some(tag)
    }
}

/// 写真1枚をアップロードして候補列を作る
///
/// 類似検索は切り出し領域ごとにID+スコアを返すだけなので、
/// /cards で本体を取得してスコアとマージする。
async fn fetch_candidates(api: &BackendClient, file: &Path) -> Result<Vec<Candidate>> {
    let object_id = api.upload_image(file).await?;
    let groups = api.find_similar(&object_id).await?;

    let mut candidates = Vec::new();

    for group in groups {
        let ids: Vec<String> = group.matches.iter().map(|m| m.id.clone()).collect();
        let mut cards = api.get_cards(&ids).await?;

        for (card, similar) in cards.iter_mut().zip(&group.matches) {
            card.id = similar.id.clone();
            card.score = similar.score;
        }

        candidates.push(Candidate::new(cards, group.img));
    }

    Ok(candidates)
}

/// 対話式仕分けの本体
pub async fn run_sort(
    api: &BackendClient,
    session: &mut SortSession,
    folder: &Path,
    verbose: bool,
) -> Result<()> {
    // 1. スキャン
    println!("[1/3] 写真をスキャン中...");
    let images = scanner::scan_folder(folder)?;
    if images.is_empty() {
        return Err(CardSortError::NoImagesFound(folder.display().to_string()));
    }
    println!("✔ {}枚の写真を検出\n", images.len());

    // 2. アップロード + 類似検索
    println!("[2/3] アップロードして候補を取得中...");
    let mut guard = FetchGuard::default();
    let mut upload_ids = Vec::new();

    let bar = ProgressBar::new(images.len() as u64);
    for image in &images {
        let upload_id = session.begin_upload(image.path.clone());
        let tag = guard.begin(&upload_id);

        let candidates = fetch_candidates(api, &image.path).await?;
        if guard.is_current(&upload_id, tag) {
            session.attach_candidates(&upload_id, candidates)?;
        }

        if verbose {
            let count = session.upload(&upload_id)?.matches.len();
            bar.println(format!("  {} → {}領域", image.file_name, count));
        }

        upload_ids.push(upload_id);
        bar.inc(1);
    }
    bar.finish_and_clear();
    println!("✔ 候補取得完了\n");

    // 3. レビュー
    println!("[3/3] 候補を確認してください");
    println!("---");
    println!("操作: [Enter/番号]確定 [s]破棄 [r]再取得 [q]終了");
    println!("---\n");

    let mut tally: HashMap<Bin, usize> = HashMap::new();
    let total = upload_ids.len();

    'uploads: for (count, upload_id) in upload_ids.iter().enumerate() {
        loop {
            let upload = session.upload(upload_id)?;
            let Some(index) = upload.active else {
                break;
            };
            let candidate = upload.matches[index].clone();
            let candidate_total = upload.matches.len();

            println!(
                "[{}/{}] {} - 候補 {}/{}",
                count + 1,
                total,
                upload.display_name,
                index + 1,
                candidate_total
            );
            println!("  切り出し画像: {}", api.tmp_image_url(&candidate.img));
            print_cards(&candidate.cards);

            match prompt_review_action(candidate.cards.len())? {
                ReviewAction::Pick(n) => {
                    let card = &candidate.cards[n];
                    api.put_match(&card.id, &candidate.img, session.session_id())
                        .await?;
                    session.resolve_candidate(
                        upload_id,
                        index,
                        Resolution::Confirm {
                            match_id: card.id.clone(),
                        },
                    )?;

                    let bin = sort_card(card);
                    *tally.entry(bin).or_insert(0) += 1;
                    println!("  → {} で確定 → 保管先 {}\n", card.name, bin);
                }
                ReviewAction::Discard => {
                    session.resolve_candidate(upload_id, index, Resolution::Discard)?;
                    println!("  → 破棄\n");
                }
                ReviewAction::Refetch => {
                    let file = session.upload(upload_id)?.file.clone();
                    let tag = guard.begin(upload_id);
                    let candidates = fetch_candidates(api, &file).await?;

                    if guard.is_current(upload_id, tag) {
                        match session.attach_candidates(upload_id, candidates) {
                            Ok(()) => println!("  → 候補を再取得しました\n"),
                            Err(e) => println!("  → 再取得できません: {}\n", e),
                        }
                    }
                }
                ReviewAction::Quit => {
                    println!("仕分けを中断します...\n");
                    break 'uploads;
                }
            }
        }
    }

    // 集計
    println!("仕分け結果:");
    for bin in BIN_ORDER {
        let n = tally.get(bin).copied().unwrap_or(0);
        println!("  {:6} {}枚", bin.label(), n);
    }
    println!("\nセッションID: {}", session.session_id());

    Ok(())
}

/// 候補カードの一覧表示（保管先の見込みつき）
fn print_cards(cards: &[Card]) {
    for (n, card) in cards.iter().enumerate() {
        println!(
            "   {}. {} ({}) €{} EDHREC:{} score:{:.3} [{}]",
            n + 1,
            card.name,
            card.set_code,
            card.price,
            card.edhrec,
            card.score,
            sort_card(card)
        );
    }
}

/// レビュー操作の入力
fn prompt_review_action(card_count: usize) -> Result<ReviewAction> {
    loop {
        let input: String = Input::new()
            .with_prompt("選択")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CardSortError::CliExecution(e.to_string()))?;

        let trimmed = input.trim();

        match trimmed {
            // Enterは先頭候補で確定
            "" if card_count > 0 => return Ok(ReviewAction::Pick(0)),
            "s" | "S" => return Ok(ReviewAction::Discard),
            "r" | "R" => return Ok(ReviewAction::Refetch),
            "q" | "Q" => return Ok(ReviewAction::Quit),
            _ => {
                if let Ok(n) = trimmed.parse::<usize>() {
                    if n >= 1 && n <= card_count {
                        return Ok(ReviewAction::Pick(n - 1));
                    }
                }
                println!("  1〜{}の番号か s/r/q を入力してください", card_count);
            }
        }
    }
}

/// 保存済みセッションの行を切り出し元画像ごとにまとめる
///
/// rowsとcardsは同じ順序で対応している前提（/cards はリクエスト順で返す）。
pub fn group_session_cards(rows: &[SessionRow], cards: &[Card]) -> Vec<(String, Vec<Card>)> {
    let mut groups: Vec<(String, Vec<Card>)> = Vec::new();

    for (row, card) in rows.iter().zip(cards) {
        let object_id = &row.2;
        match groups.iter_mut().find(|(id, _)| id == object_id) {
            Some((_, list)) => list.push(card.clone()),
            None => groups.push((object_id.clone(), vec![card.clone()])),
        }
    }

    groups
}

/// 保管先ごとの枚数（表示順で返す）
pub fn tally_bins(cards: &[Card]) -> Vec<(Bin, usize)> {
    let mut tally: HashMap<Bin, usize> = HashMap::new();
    for card in cards {
        *tally.entry(sort_card(card)).or_insert(0) += 1;
    }

    BIN_ORDER
        .iter()
        .map(|bin| (*bin, tally.get(bin).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_guard_drops_stale_tag() {
        let mut guard = FetchGuard::default();
        let first = guard.begin("u1");
        let second = guard.begin("u1");

        assert!(!guard.is_current("u1", first));
        assert!(guard.is_current("u1", second));
    }

    #[test]
    fn test_fetch_guard_tracks_uploads_separately() {
        let mut guard = FetchGuard::default();
        let tag_a = guard.begin("a");
        let tag_b = guard.begin("b");

        assert!(guard.is_current("a", tag_a));
        assert!(guard.is_current("b", tag_b));
        assert!(!guard.is_current("c", 1));
    }

    #[test]
    fn test_group_session_cards_preserves_order() {
        let rows: Vec<SessionRow> = vec![
            (1, "c1".into(), "obj-a".into(), "s".into()),
            (2, "c2".into(), "obj-b".into(), "s".into()),
            (3, "c3".into(), "obj-a".into(), "s".into()),
        ];
        let cards: Vec<Card> = ["One", "Two", "Three"]
            .iter()
            .map(|name| Card {
                name: name.to_string(),
                ..Default::default()
            })
            .collect();

        let groups = group_session_cards(&rows, &cards);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "obj-a");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[1].name, "Three");
        assert_eq!(groups[1].0, "obj-b");
    }

    #[test]
    fn test_tally_bins_in_display_order() {
        let cards = vec![
            Card {
                price: "15".into(),
                ..Default::default()
            },
            Card {
                price: "0.50".into(),
                edhrec: "100".into(),
                ..Default::default()
            },
            Card {
                price: "0.10".into(),
                edhrec: "0".into(),
                ..Default::default()
            },
        ];

        let tally = tally_bins(&cards);
        assert_eq!(tally[0], (Bin::Binder, 1));
        assert_eq!(tally[1], (Bin::Sleeve, 0));
        assert_eq!(tally[2], (Bin::Edh, 1));
        assert_eq!(tally[3], (Bin::Bulk, 1));
    }
}
