//! Dashboard rendering.
//!
//! Every widget is fed already-derived values: stats come straight from the
//! server payload, the ranking and histogram from the analytics functions.
//! Nothing here computes aggregates of its own.

use botpulse_client::{
    asset_pnl_ranking, pnl_histogram, win_loss_share, win_rate_label, DashboardSnapshot,
    Timeframe,
};
use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, TradeTab};

pub fn render(f: &mut Frame, app: &App, snapshot: &DashboardSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(14),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_stats_row(f, snapshot, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);
    render_equity_curve(f, snapshot, main[0]);
    render_trades_panel(f, app, snapshot, main[1]);

    let analytics = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[2]);
    render_asset_performance(f, snapshot, analytics[0]);
    render_win_loss_ratio(f, snapshot, analytics[1]);
    render_pnl_distribution(f, snapshot, analytics[2]);

    render_status_bar(f, app, snapshot, chunks[3]);
}

fn pnl_color(value: f64) -> Color {
    if value >= 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

fn stat_card<'a>(title: &'a str, value: String, color: Color) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(title, Style::default().fg(Color::Gray))),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
}

fn render_stats_row(f: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(area);

    let stats = &snapshot.stats;
    f.render_widget(
        stat_card(
            "NET PROFIT",
            format!("${:.2}", stats.total_pnl),
            pnl_color(stats.total_pnl),
        ),
        cells[0],
    );
    f.render_widget(
        stat_card(
            "PROFIT FACTOR",
            format!("{:.2}", stats.profit_factor),
            Color::Cyan,
        ),
        cells[1],
    );
    f.render_widget(
        stat_card("TRADES", format!("{}", stats.total_trades), Color::White),
        cells[2],
    );
    f.render_widget(
        stat_card("WIN RATE", win_rate_label(stats), Color::Yellow),
        cells[3],
    );
    f.render_widget(
        stat_card(
            "MAX DRAWDOWN",
            format!("{:.2}%", stats.max_drawdown),
            Color::Red,
        ),
        cells[4],
    );
}

fn render_equity_curve(f: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .title(" NET CUMULATIVE P&L ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    if snapshot.equity_history.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            if snapshot.refreshed {
                "No equity history"
            } else {
                "Loading dashboard..."
            },
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let points: Vec<(f64, f64)> = snapshot
        .equity_history
        .iter()
        .enumerate()
        .map(|(i, point)| (i as f64, point.equity))
        .collect();

    let (min_equity, max_equity) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), &(_, equity)| (min.min(equity), max.max(equity)),
    );
    // Pad degenerate flat curves so the line stays visible
    let pad = ((max_equity - min_equity) * 0.1).max(1.0);

    let datasets = vec![Dataset::default()
        .name("equity")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([min_equity - pad, max_equity + pad])
                .labels(vec![
                    Span::raw(format!("${:.0}", min_equity)),
                    Span::raw(format!("${:.0}", max_equity)),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(chart, area);
}

fn render_trades_panel(f: &mut Frame, app: &App, snapshot: &DashboardSnapshot, area: Rect) {
    let shown = match app.tab {
        TradeTab::Active => snapshot.active_trades.len(),
        TradeTab::History => snapshot.closed_trades.len(),
    };
    let title = format!(" TRADES [{}] ({}) ", app.tab.label(), shown);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let items: Vec<ListItem> = match app.tab {
        TradeTab::Active => {
            let mut open: Vec<_> = snapshot.active_trades.iter().collect();
            open.sort_by(|a, b| a.0.cmp(b.0));
            open.iter()
                .map(|(symbol, trade)| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("{:<12}", symbol),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("{:>+10.2}", trade.unrealized_pnl),
                            Style::default().fg(pnl_color(trade.unrealized_pnl)),
                        ),
                        Span::styled(
                            format!("  entry {:.2} now {:.2}", trade.entry, trade.current_price),
                            Style::default().fg(Color::Gray),
                        ),
                    ]))
                })
                .collect()
        }
        // Newest first, base asset only
        TradeTab::History => snapshot
            .closed_trades
            .iter()
            .rev()
            .map(|trade| {
                let (pnl_text, pnl_fg) = match trade.pnl {
                    Some(pnl) => (format!("{:>+10.2}", pnl), pnl_color(pnl)),
                    None => (format!("{:>10}", "--"), Color::DarkGray),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<8}", trade.base_asset()),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(pnl_text, Style::default().fg(pnl_fg)),
                    Span::styled(
                        format!("  {}", trade.closed_at.format("%Y-%m-%d %H:%M")),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect(),
    };

    if items.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            match app.tab {
                TradeTab::Active => "No active trades",
                TradeTab::History => "No trade history",
            },
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    f.render_widget(List::new(items).block(block), area);
}

fn render_asset_performance(f: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .title(" ASSET PERFORMANCE (TOP 5) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let ranking = asset_pnl_ranking(&snapshot.closed_trades);
    if ranking.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            "No closed trades",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let max_abs = ranking
        .iter()
        .map(|a| a.net_pnl.abs())
        .fold(f64::MIN_POSITIVE, f64::max);

    let lines: Vec<Line> = ranking
        .iter()
        .map(|asset| {
            let filled = ((asset.net_pnl.abs() / max_abs * 16.0) as usize).min(16);
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(16 - filled));
            Line::from(vec![
                Span::styled(
                    format!("{:<6}", asset.symbol),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(bar, Style::default().fg(pnl_color(asset.net_pnl))),
                Span::styled(
                    format!(" {:>+9.2}", asset.net_pnl),
                    Style::default().fg(pnl_color(asset.net_pnl)),
                ),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_win_loss_ratio(f: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .title(" WIN/LOSS RATIO ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let share = win_loss_share(&snapshot.stats);
    let total = share.wins + share.losses;
    let ratio = if total > 0 {
        share.wins as f64 / total as f64
    } else {
        0.0
    };

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(block.inner(area));
    f.render_widget(block, area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Red))
        .ratio(ratio)
        .label(win_rate_label(&snapshot.stats));
    f.render_widget(gauge, inner[0]);

    let counts = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} wins", share.wins),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  /  "),
        Span::styled(
            format!("{} losses", share.losses),
            Style::default().fg(Color::Red),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(counts, inner[1]);
}

fn render_pnl_distribution(f: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .title(" PNL DISTRIBUTION ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let bins = pnl_histogram(&snapshot.closed_trades);
    if bins.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            "No data",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let lines: Vec<Line> = bins
        .iter()
        .map(|bin| {
            let filled = bin.count * 16 / max_count;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(16 - filled));
            Line::from(vec![
                Span::styled(
                    format!("{:>8} ", bin.label),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(bar, Style::default().fg(Color::Blue)),
                Span::styled(format!(" {}", bin.count), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(f: &mut Frame, app: &App, snapshot: &DashboardSnapshot, area: Rect) {
    let selected = app.sync.timeframe();
    let mut spans = vec![Span::styled("timeframe: ", Style::default().fg(Color::Gray))];
    for timeframe in Timeframe::ALL {
        let style = if timeframe == selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", timeframe), style));
    }

    spans.push(Span::raw("  "));
    match snapshot.last_refresh {
        Some(at) => {
            let age = (Utc::now() - at).num_seconds().max(0);
            let freshness = if snapshot.consecutive_failures > 0 {
                Span::styled(
                    format!(
                        "stale {}s ({} failed refreshes)",
                        age, snapshot.consecutive_failures
                    ),
                    Style::default().fg(Color::Yellow),
                )
            } else {
                Span::styled(format!("refreshed {}s ago", age), Style::default().fg(Color::Green))
            };
            spans.push(freshness);
        }
        None => spans.push(Span::styled(
            "loading...",
            Style::default().fg(Color::DarkGray),
        )),
    }

    spans.push(Span::styled(
        "   [d/w/m/a] timeframe  [tab] trades  [q] quit",
        Style::default().fg(Color::DarkGray),
    ));

    let bar = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(bar, area);
}
