use super::ui::{self, StyleType};
use crate::AppContext;
use crate::core::currency::known_codes;
use crate::core::ranking::{PickerEntry, PickerKey, PickerOutcome, PickerSession, ScrollLock};
use anyhow::Result;
use console::{Key, Term, style};
use std::sync::Arc;
use tracing::debug;

const VISIBLE_ROWS: usize = 10;
const FAVORITE_KEY: char = '*';

/// Hides the cursor while the picker owns the terminal.
pub struct TerminalScrollLock {
    term: Term,
}

impl TerminalScrollLock {
    pub fn new(term: Term) -> Self {
        Self { term }
    }
}

impl ScrollLock for TerminalScrollLock {
    fn lock(&self) {
        let _ = self.term.hide_cursor();
    }

    fn unlock(&self) {
        let _ = self.term.show_cursor();
    }
}

/// Maps a terminal key to a navigation key.
pub fn navigation_key(key: &Key) -> Option<PickerKey> {
    match key {
        Key::ArrowDown | Key::Tab => Some(PickerKey::Next),
        Key::ArrowUp | Key::BackTab => Some(PickerKey::Prev),
        Key::Enter => Some(PickerKey::Confirm),
        Key::Escape => Some(PickerKey::Cancel),
        _ => None,
    }
}

/// First row of the visible window so the active entry stays in view.
fn window_start(active: usize, len: usize, rows: usize) -> usize {
    if len <= rows || active < rows {
        return 0;
    }
    (active + 1 - rows).min(len - rows)
}

fn entry_line(entry: &PickerEntry) -> String {
    let star = if entry.is_favorite { "★" } else { " " };
    let text = format!("{star} {}  {}", entry.code, entry.name);
    if entry.is_active {
        format!("{} {}", style(">").cyan().bold(), style(text).bold())
    } else {
        format!("  {text}")
    }
}

/// Renders the query prompt and the visible part of the ranked list.
pub fn render_lines(session: &PickerSession, rows: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        ui::style_text("Search:", StyleType::TotalLabel),
        session.query()
    )];

    let entries = session.entries();
    if entries.is_empty() {
        lines.push(ui::style_text("  No matching currencies", StyleType::Subtle));
    }

    let start = window_start(session.active_index(), entries.len(), rows);
    for entry in entries.iter().skip(start).take(rows) {
        if entry.divider_before {
            lines.push(ui::style_text("  ────────", StyleType::Subtle));
        }
        lines.push(entry_line(entry));
    }

    lines.push(ui::style_text(
        &format!("↑/↓ move  enter select  {FAVORITE_KEY} favorite  esc cancel"),
        StyleType::Subtle,
    ));
    lines
}

/// Interactive currency picker. Prints the chosen code on selection.
pub async fn run(ctx: &AppContext, query: Option<&str>) -> Result<()> {
    let snapshot = ctx.manager.get_rates(&ctx.config.base_currency).await;
    let candidates = if snapshot.has_data() {
        snapshot.rates.codes()
    } else {
        known_codes()
    };
    let mut favorites = ctx.favorites()?;

    let term = Term::stdout();
    let mut session = PickerSession::new(
        candidates,
        Arc::new(TerminalScrollLock::new(term.clone())),
    );
    session.open(favorites.favorites());
    if let Some(query) = query {
        session.set_query(query);
    }

    let mut drawn = 0;
    let outcome = loop {
        let lines = render_lines(&session, VISIBLE_ROWS);
        if drawn > 0 {
            term.clear_last_lines(drawn)?;
        }
        for line in &lines {
            term.write_line(line)?;
        }
        drawn = lines.len();

        let key = term.read_key()?;
        let outcome = match (navigation_key(&key), key) {
            (Some(nav), _) => session.handle(nav),
            (None, Key::Char(FAVORITE_KEY)) => {
                if let Some(code) = session.active().map(str::to_string) {
                    favorites.toggle_favorite(&code)?;
                    session.set_favorites(favorites.favorites());
                }
                PickerOutcome::Pending
            }
            (None, Key::Backspace) => {
                let mut query = session.query().to_string();
                query.pop();
                session.set_query(&query);
                PickerOutcome::Pending
            }
            (None, Key::Char(c)) if !c.is_control() => {
                let query = format!("{}{}", session.query(), c);
                session.set_query(&query);
                PickerOutcome::Pending
            }
            _ => PickerOutcome::Pending,
        };

        if outcome != PickerOutcome::Pending {
            break outcome;
        }
    };

    term.clear_last_lines(drawn)?;
    match outcome {
        PickerOutcome::Selected(code) => {
            debug!(code = %code, "Currency picked");
            println!("{code}");
        }
        _ => debug!("Picker cancelled"),
    }
    Ok(())
}
