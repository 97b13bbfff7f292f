//! 確定カードの保管先判定
//!
//! 価格とEDHREC順位だけで4つの保管先に振り分ける純粋関数。
//! 判定順序が仕様: 価格判定が常に先、順位判定はその後。

use crate::types::Card;

/// 保管先
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bin {
    /// バルクストレージ行き
    Bulk,
    /// EDHで需要のあるカード
    Edh,
    /// スリーブ保管
    Sleeve,
    /// バインダー保管（高額カード）
    Binder,
}

impl Bin {
    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            Bin::Bulk => "BULK",
            Bin::Edh => "EDH",
            Bin::Sleeve => "SLEEVE",
            Bin::Binder => "BINDER",
        }
    }
}

impl std::fmt::Display for Bin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 価格文字列を数値化（不正値は0扱い）
pub fn parse_price(price: &str) -> f64 {
    price.trim().parse().unwrap_or(0.0)
}

/// EDHREC順位文字列を数値化（不正値は0 = 順位なし扱い）
pub fn parse_rank(rank: &str) -> i64 {
    rank.trim().parse().unwrap_or(0)
}

/// カードの保管先を判定する
///
/// - 0.98を超える価格ならSLEEVE、さらに10を超えればBINDER
/// - それ以外でEDHREC順位が2000位以内（0 = 順位なしを除く）ならEDH
/// - 残りはBULK
///
/// 価格がちょうど0.98の場合は順位判定へ落ちる（境界は排他）。
/// 高額かつ上位ランクのカードは常に価格側で振り分けられる。
pub fn sort_card(card: &Card) -> Bin {
    let price = parse_price(&card.price);
    let rank = parse_rank(&card.edhrec);

    if price > 0.98 {
        if price > 10.0 {
            return Bin::Binder;
        }
        return Bin::Sleeve;
    }

    if rank != 0 && rank < 2000 {
        return Bin::Edh;
    }

    Bin::Bulk
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(price: &str, edhrec: &str) -> Card {
        Card {
            price: price.to_string(),
            edhrec: edhrec.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_high_price_goes_to_binder() {
        assert_eq!(sort_card(&card("15", "500")), Bin::Binder);
    }

    #[test]
    fn test_mid_price_goes_to_sleeve() {
        // 上位ランクでも価格判定が先
        assert_eq!(sort_card(&card("2.00", "1")), Bin::Sleeve);
    }

    #[test]
    fn test_cheap_ranked_goes_to_edh() {
        assert_eq!(sort_card(&card("0.50", "1500")), Bin::Edh);
    }

    #[test]
    fn test_cheap_unranked_goes_to_bulk() {
        assert_eq!(sort_card(&card("0.50", "0")), Bin::Bulk);
    }

    #[test]
    fn test_price_boundary_is_exclusive() {
        // ちょうど0.98は順位判定へ落ちる
        assert_eq!(sort_card(&card("0.98", "1")), Bin::Edh);
    }

    #[test]
    fn test_rank_boundary_is_exclusive() {
        assert_eq!(sort_card(&card("0", "2000")), Bin::Bulk);
        assert_eq!(sort_card(&card("0", "1999")), Bin::Edh);
    }

    #[test]
    fn test_malformed_strings_degrade_to_zero() {
        // パース不能は0扱い（意図した寛容パース）
        assert_eq!(parse_price("n/a"), 0.0);
        assert_eq!(parse_rank(""), 0);
        assert_eq!(sort_card(&card("n/a", "garbage")), Bin::Bulk);
        assert_eq!(sort_card(&card("", "100")), Bin::Edh);
    }

    #[test]
    fn test_bin_label() {
        assert_eq!(Bin::Bulk.label(), "BULK");
        assert_eq!(Bin::Binder.to_string(), "BINDER");
    }
}
