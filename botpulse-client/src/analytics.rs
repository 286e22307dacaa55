//! Trade analytics: chart-ready aggregates derived from raw closed trades.
//!
//! Pure functions, no I/O, deterministic given the same trade sequence, and
//! total over any well-formed input (empty lists, all-null PnL, zero trade
//! counts all produce well-defined empty/zero outputs).
//!
//! Only the per-asset ranking and the PnL histogram are client-derived;
//! win/loss counts, win rate, profit factor and drawdown come from the
//! server and are never recomputed here.

use crate::types::{AssetPnl, ClosedTrade, HistogramBin, PerformanceStats, WinLossShare};
use indexmap::IndexMap;

/// Number of asset groups kept in the ranking chart
const RANKING_LIMIT: usize = 5;
/// Fixed histogram cardinality
const HISTOGRAM_BINS: usize = 10;

/// Rank base assets by net PnL, descending, truncated to the top 5.
///
/// Trades with `null` PnL are excluded (not counted as zero). Ties keep the
/// order in which the asset was first encountered in the trade sequence.
pub fn asset_pnl_ranking(trades: &[ClosedTrade]) -> Vec<AssetPnl> {
    let mut by_asset: IndexMap<&str, f64> = IndexMap::new();
    for trade in trades {
        if let Some(pnl) = trade.pnl {
            *by_asset.entry(trade.base_asset()).or_insert(0.0) += pnl;
        }
    }

    let mut ranking: Vec<AssetPnl> = by_asset
        .into_iter()
        .map(|(symbol, net_pnl)| AssetPnl {
            symbol: symbol.to_string(),
            net_pnl,
        })
        .collect();

    // Stable sort keeps first-encounter order between equal sums
    ranking.sort_by(|a, b| b.net_pnl.partial_cmp(&a.net_pnl).unwrap_or(std::cmp::Ordering::Equal));
    ranking.truncate(RANKING_LIMIT);
    ranking
}

/// Distribute non-null trade PnLs over 10 equal-width bins.
///
/// Returns an empty sequence when no trade carries a PnL (rendered as
/// "no data" rather than ten empty bins). Bounds are `floor(min)` and
/// `ceil(max)`; a zero-variance set falls back to `step = 1` so every value
/// lands in bin 0. Indices are clamped to `[0, 9]` to absorb floating-point
/// edge cases at the maximum boundary.
pub fn pnl_histogram(trades: &[ClosedTrade]) -> Vec<HistogramBin> {
    let pnls: Vec<f64> = trades.iter().filter_map(|t| t.pnl).collect();
    if pnls.is_empty() {
        return Vec::new();
    }

    let min = pnls.iter().copied().fold(f64::INFINITY, f64::min).floor();
    let max = pnls.iter().copied().fold(f64::NEG_INFINITY, f64::max).ceil();
    let step = {
        let raw = (max - min) / HISTOGRAM_BINS as f64;
        if raw == 0.0 {
            1.0
        } else {
            raw
        }
    };

    let mut bins: Vec<HistogramBin> = (0..HISTOGRAM_BINS)
        .map(|i| {
            let lower_bound = min + i as f64 * step;
            HistogramBin {
                lower_bound,
                label: format!("{:.1}", lower_bound),
                count: 0,
            }
        })
        .collect();

    for pnl in pnls {
        let index = (((pnl - min) / step).floor() as usize).min(HISTOGRAM_BINS - 1);
        bins[index].count += 1;
    }

    bins
}

/// Server-reported win/loss counts, passed through for the ratio chart.
pub fn win_loss_share(stats: &PerformanceStats) -> WinLossShare {
    WinLossShare {
        wins: stats.wins,
        losses: stats.losses,
    }
}

/// Win rate formatted for display, guarding the zero-trade case: renders
/// `0%` rather than `NaN` when the server had nothing to divide by.
pub fn win_rate_label(stats: &PerformanceStats) -> String {
    if stats.total_trades == 0 || !stats.win_rate.is_finite() {
        "0%".to_string()
    } else {
        format!("{:.0}%", stats.win_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trade(symbol: &str, pnl: Option<f64>) -> ClosedTrade {
        ClosedTrade {
            symbol: symbol.to_string(),
            pnl,
            closed_at: Utc::now(),
        }
    }

    #[test]
    fn test_ranking_groups_and_sorts_descending() {
        let trades = vec![
            trade("BTC/USDT", Some(100.0)),
            trade("BTC/USDT", Some(-40.0)),
            trade("ETH/USDT", Some(10.0)),
        ];

        let ranking = asset_pnl_ranking(&trades);
        assert_eq!(
            ranking,
            vec![
                AssetPnl {
                    symbol: "BTC".into(),
                    net_pnl: 60.0
                },
                AssetPnl {
                    symbol: "ETH".into(),
                    net_pnl: 10.0
                },
            ]
        );
    }

    #[test]
    fn test_ranking_truncates_to_top_five() {
        let trades: Vec<ClosedTrade> = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG"]
            .iter()
            .enumerate()
            .map(|(i, base)| trade(&format!("{}/USDT", base), Some(i as f64)))
            .collect();

        let ranking = asset_pnl_ranking(&trades);
        assert_eq!(ranking.len(), 5);
        assert_eq!(ranking[0].symbol, "GGG");
        assert_eq!(ranking[4].symbol, "CCC");
    }

    #[test]
    fn test_ranking_ties_keep_first_encounter_order() {
        let trades = vec![
            trade("SOL/USDT", Some(25.0)),
            trade("DOT/USDT", Some(25.0)),
            trade("ADA/USDT", Some(25.0)),
        ];

        let ranking = asset_pnl_ranking(&trades);
        let symbols: Vec<&str> = ranking.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SOL", "DOT", "ADA"]);
    }

    #[test]
    fn test_ranking_excludes_null_pnl() {
        let trades = vec![
            trade("BTC/USDT", None),
            trade("ETH/USDT", Some(5.0)),
            trade("BTC/USDT", Some(1.0)),
        ];

        let ranking = asset_pnl_ranking(&trades);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].symbol, "ETH");
        assert_eq!(ranking[1].net_pnl, 1.0);
    }

    #[test]
    fn test_histogram_has_ten_bins_summing_to_trade_count() {
        let trades: Vec<ClosedTrade> = [-55.2, -12.0, -3.7, 0.0, 4.1, 9.9, 15.0, 31.4, 48.8, 72.6]
            .iter()
            .map(|&pnl| trade("BTC/USDT", Some(pnl)))
            .collect();

        let bins = pnl_histogram(&trades);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), trades.len());
    }

    #[test]
    fn test_histogram_empty_and_all_null_inputs() {
        assert!(pnl_histogram(&[]).is_empty());

        let all_null = vec![trade("BTC/USDT", None), trade("ETH/USDT", None)];
        assert!(pnl_histogram(&all_null).is_empty());
    }

    #[test]
    fn test_histogram_degenerate_range_falls_back_to_unit_step() {
        let trades = vec![
            trade("BTC/USDT", Some(7.0)),
            trade("ETH/USDT", Some(7.0)),
            trade("SOL/USDT", Some(7.0)),
        ];

        let bins = pnl_histogram(&trades);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 3);
        assert!(bins[1..].iter().all(|b| b.count == 0));
        // step = 1 spacing on the labels
        assert_eq!(bins[0].label, "7.0");
        assert_eq!(bins[1].label, "8.0");
    }

    #[test]
    fn test_histogram_maximum_lands_in_last_bin() {
        let trades = vec![trade("BTC/USDT", Some(0.0)), trade("BTC/USDT", Some(10.0))];

        let bins = pnl_histogram(&trades);
        // max == ceil(10.0) would index bin 10 without the clamp
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins[0].count, 1);
    }

    #[test]
    fn test_histogram_labels_one_decimal_place() {
        let trades = vec![trade("BTC/USDT", Some(-1.4)), trade("BTC/USDT", Some(3.9))];

        let bins = pnl_histogram(&trades);
        // min = floor(-1.4) = -2, max = ceil(3.9) = 4, step = 0.6
        assert_eq!(bins[0].label, "-2.0");
        assert_eq!(bins[1].label, "-1.4");
    }

    #[test]
    fn test_win_rate_label_guards_zero_trades() {
        let empty = PerformanceStats::default();
        assert_eq!(win_rate_label(&empty), "0%");

        let nan_rate = PerformanceStats {
            total_trades: 4,
            win_rate: f64::NAN,
            ..Default::default()
        };
        assert_eq!(win_rate_label(&nan_rate), "0%");

        let normal = PerformanceStats {
            total_trades: 4,
            win_rate: 62.6,
            ..Default::default()
        };
        assert_eq!(win_rate_label(&normal), "63%");
    }

    #[test]
    fn test_win_loss_share_passes_server_counts_through() {
        let stats = PerformanceStats {
            wins: 8,
            losses: 3,
            total_trades: 11,
            ..Default::default()
        };
        assert_eq!(win_loss_share(&stats), WinLossShare { wins: 8, losses: 3 });
    }
}
