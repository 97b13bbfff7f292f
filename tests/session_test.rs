//! セッション状態遷移のテスト
//!
//! 順序保証（activeは前進のみ）と一方向の状態遷移を検証

use std::path::PathBuf;

use card_sort_common::{
    Candidate, CandidateStatus, Card, Error, Resolution, SortSession,
};

fn candidates(n: usize) -> Vec<Candidate> {
    (0..n)
        .map(|i| Candidate::new(vec![Card::default()], format!("/tmp/crop{}.jpg", i)))
        .collect()
}

/// WAITING候補を順に解決するとactiveは厳密に前進する
#[test]
fn test_active_strictly_advances() {
    let mut session = SortSession::new();
    let id = session.begin_upload(PathBuf::from("sheet.jpg"));
    session.attach_candidates(&id, candidates(4)).unwrap();

    let mut seen = Vec::new();
    while let Some(active) = session.upload(&id).unwrap().active {
        seen.push(active);
        session
            .resolve_candidate(&id, active, Resolution::Discard)
            .unwrap();
    }

    assert_eq!(seen, vec![0, 1, 2, 3]);
    assert!(session.current_candidate(&id).unwrap().is_none());
}

/// 解決済み候補への再操作はInvalidStateで失敗し、状態を変えない
#[test]
fn test_terminal_candidate_cannot_be_re_resolved() {
    let mut session = SortSession::new();
    let id = session.begin_upload(PathBuf::from("sheet.jpg"));
    session.attach_candidates(&id, candidates(2)).unwrap();

    session
        .resolve_candidate(&id, 0, Resolution::Confirm { match_id: "card-a".into() })
        .unwrap();

    for _ in 0..3 {
        let result = session.resolve_candidate(&id, 0, Resolution::Discard);
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    let upload = session.upload(&id).unwrap();
    assert_eq!(upload.matches[0].match_id(), Some("card-a"));
    assert_eq!(upload.active, Some(1));
}

/// CONFIRMEDのみマッチIDを持つ（各操作の後で常に成り立つ）
#[test]
fn test_match_id_pairing_invariant() {
    let mut session = SortSession::new();
    let id = session.begin_upload(PathBuf::from("sheet.jpg"));
    session.attach_candidates(&id, candidates(3)).unwrap();

    let check = |session: &SortSession| {
        for upload in session.uploads() {
            for candidate in &upload.matches {
                match &candidate.status {
                    CandidateStatus::Confirmed { match_id } => {
                        assert!(!match_id.is_empty())
                    }
                    _ => assert_eq!(candidate.match_id(), None),
                }
            }
        }
    };

    check(&session);
    session
        .resolve_candidate(&id, 0, Resolution::Confirm { match_id: "m0".into() })
        .unwrap();
    check(&session);
    session.resolve_candidate(&id, 1, Resolution::Discard).unwrap();
    check(&session);
}

/// 不明なアップロードIDへのattachはNotFoundで失敗し、列は変わらない
#[test]
fn test_attach_unknown_upload_leaves_session_unchanged() {
    let mut session = SortSession::new();
    let id = session.begin_upload(PathBuf::from("sheet.jpg"));
    session.attach_candidates(&id, candidates(2)).unwrap();

    let result = session.attach_candidates("unknown-id", candidates(5));
    assert!(matches!(result, Err(Error::NotFound(_))));

    assert_eq!(session.uploads().len(), 1);
    assert_eq!(session.uploads()[0].matches.len(), 2);
}

/// N件のアップロードは追加順のまま読み出せる
#[test]
fn test_uploads_round_trip_in_append_order() {
    let mut session = SortSession::new();
    let files: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{}.jpg", i))).collect();

    let ids: Vec<String> = files
        .iter()
        .map(|f| session.begin_upload(f.clone()))
        .collect();

    assert_eq!(session.uploads().len(), 5);
    for (i, upload) in session.uploads().iter().enumerate() {
        assert_eq!(upload.id, ids[i]);
        assert_eq!(upload.file, files[i]);
        assert_eq!(upload.display_name, format!("{}.jpg", i));
    }
}

/// あるアップロードの解決は他のアップロードに影響しない
#[test]
fn test_resolution_is_scoped_to_one_upload() {
    let mut session = SortSession::new();
    let id_a = session.begin_upload(PathBuf::from("a.jpg"));
    let id_b = session.begin_upload(PathBuf::from("b.jpg"));
    session.attach_candidates(&id_a, candidates(2)).unwrap();
    session.attach_candidates(&id_b, candidates(2)).unwrap();

    session
        .resolve_candidate(&id_b, 0, Resolution::Discard)
        .unwrap();

    assert_eq!(session.upload(&id_a).unwrap().active, Some(0));
    assert_eq!(session.upload(&id_b).unwrap().active, Some(1));
    assert_eq!(session.waiting_count(), 3);
}
