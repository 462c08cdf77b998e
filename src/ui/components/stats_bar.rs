use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Live numbers for the run in progress.
pub struct RunSnapshot {
    pub wpm: u32,
    pub accuracy: u32,
    pub run_number: usize,
    pub runs_per_cycle: usize,
    pub cycle: u32,
}

pub struct StatsBar<'a> {
    snapshot: RunSnapshot,
    status: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatsBar<'a> {
    pub fn new(snapshot: RunSnapshot, status: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            snapshot,
            status,
            theme,
        }
    }
}

impl Widget for StatsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let accuracy_color = if self.snapshot.accuracy >= 95 {
            colors.success()
        } else if self.snapshot.accuracy >= 85 {
            colors.warning()
        } else {
            colors.error()
        };

        let mut spans = vec![
            Span::styled(
                " typecycle ",
                Style::default()
                    .fg(colors.header_bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} wpm", self.snapshot.wpm),
                Style::default().fg(colors.accent()),
            ),
            Span::styled(" \u{2022} ", Style::default().fg(colors.text_pending())),
            Span::styled(
                format!("{}%", self.snapshot.accuracy),
                Style::default().fg(accuracy_color),
            ),
            Span::styled(" \u{2022} ", Style::default().fg(colors.text_pending())),
            Span::styled(
                format!(
                    "Run {}/{}",
                    self.snapshot.run_number, self.snapshot.runs_per_cycle
                ),
                Style::default().fg(colors.header_fg()),
            ),
            Span::styled(" \u{2022} ", Style::default().fg(colors.text_pending())),
            Span::styled(
                format!("Cycle {}", self.snapshot.cycle),
                Style::default().fg(colors.header_fg()),
            ),
        ];
        if let Some(status) = self.status {
            spans.push(Span::styled(
                format!("  ({status})"),
                Style::default().fg(colors.warning()),
            ));
        }

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.header_bg()));

        Paragraph::new(Line::from(spans))
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_line() {
        let theme = Theme::default();
        let snapshot = RunSnapshot {
            wpm: 42,
            accuracy: 97,
            run_number: 2,
            runs_per_cycle: 3,
            cycle: 5,
        };
        let area = Rect::new(0, 0, 80, 3);
        let mut buf = Buffer::empty(area);
        StatsBar::new(snapshot, None, &theme).render(area, &mut buf);

        let row: String = (0..area.width).map(|x| buf[(x, 1)].symbol()).collect();
        assert!(row.contains("42 wpm \u{2022} 97% \u{2022} Run 2/3 \u{2022} Cycle 5"));
    }
}
