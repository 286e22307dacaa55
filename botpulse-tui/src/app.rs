//! Dashboard application state and key handling.

use botpulse_client::{SyncHandle, Timeframe};
use crossterm::event::KeyCode;

/// Which of the two already-fetched trade collections the panel shows.
///
/// Pure view state: switching never triggers a fetch and does not persist
/// across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradeTab {
    #[default]
    Active,
    History,
}

impl TradeTab {
    pub fn toggle(self) -> Self {
        match self {
            TradeTab::Active => TradeTab::History,
            TradeTab::History => TradeTab::Active,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeTab::Active => "Active",
            TradeTab::History => "History",
        }
    }
}

/// Timeframe bound to a filter key, if any.
pub fn timeframe_for_key(code: KeyCode) -> Option<Timeframe> {
    match code {
        KeyCode::Char('d') => Some(Timeframe::Daily),
        KeyCode::Char('w') => Some(Timeframe::Weekly),
        KeyCode::Char('m') => Some(Timeframe::Monthly),
        KeyCode::Char('a') => Some(Timeframe::All),
        _ => None,
    }
}

pub struct App {
    pub sync: SyncHandle,
    pub tab: TradeTab,
    pub should_quit: bool,
}

impl App {
    pub fn new(sync: SyncHandle) -> Self {
        Self {
            sync,
            tab: TradeTab::default(),
            should_quit: false,
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Char('t') => self.tab = self.tab.toggle(),
            code => {
                // Timeframe keys force an immediate full re-fetch through
                // the sync handle; everything else is ignored
                if let Some(timeframe) = timeframe_for_key(code) {
                    self.sync.set_timeframe(timeframe);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_tab_toggle() {
        assert_eq!(TradeTab::Active.toggle(), TradeTab::History);
        assert_eq!(TradeTab::History.toggle(), TradeTab::Active);
        assert_eq!(TradeTab::default(), TradeTab::Active);
    }

    #[test]
    fn test_timeframe_keys() {
        assert_eq!(timeframe_for_key(KeyCode::Char('d')), Some(Timeframe::Daily));
        assert_eq!(timeframe_for_key(KeyCode::Char('w')), Some(Timeframe::Weekly));
        assert_eq!(
            timeframe_for_key(KeyCode::Char('m')),
            Some(Timeframe::Monthly)
        );
        assert_eq!(timeframe_for_key(KeyCode::Char('a')), Some(Timeframe::All));
        assert_eq!(timeframe_for_key(KeyCode::Char('x')), None);
    }
}
