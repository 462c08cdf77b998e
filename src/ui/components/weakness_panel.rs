use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::bigram::BigramKey;
use crate::engine::coverage::Coverage;
use crate::engine::weakness::WeaknessEntry;
use crate::ui::theme::Theme;

pub struct WeaknessPanel<'a> {
    entries: &'a [WeaknessEntry],
    weak: &'a [BigramKey],
    coverage: Coverage,
    theme: &'a Theme,
}

impl<'a> WeaknessPanel<'a> {
    pub fn new(
        entries: &'a [WeaknessEntry],
        weak: &'a [BigramKey],
        coverage: Coverage,
        theme: &'a Theme,
    ) -> Self {
        Self {
            entries,
            weak,
            coverage,
            theme,
        }
    }
}

/// One row: ` 1. "th"  33% err (1/3)  +25% time`
pub fn format_entry(rank: usize, entry: &WeaknessEntry) -> String {
    format!(
        "{rank:>2}. \"{}\"  {:>3}% err ({}/{})  {:+}% time",
        entry.bigram,
        entry.error_percent(),
        entry.errors,
        entry.attempts,
        entry.timing_diff_percent()
    )
}

/// Lifetime row. Lifetime totals carry no timing baseline, so the average
/// transition time is shown instead of a diff.
pub fn format_lifetime_entry(rank: usize, entry: &WeaknessEntry) -> String {
    format!(
        "{rank:>2}. \"{}\"  {:>3}% err ({}/{})  avg {:.0}ms",
        entry.bigram,
        entry.error_percent(),
        entry.errors,
        entry.attempts,
        entry.avg_time_ms
    )
}

pub fn format_coverage(coverage: &Coverage) -> String {
    format!(
        "Coverage: {}/{} words ({}%)",
        coverage.words_with_weak_bigrams, coverage.total_words, coverage.percentage
    )
}

impl Widget for WeaknessPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines: Vec<Line> = Vec::new();

        if !self.entries.is_empty() {
            for (i, entry) in self.entries.iter().enumerate() {
                let color = if entry.error_rate > 0.0 {
                    colors.error()
                } else {
                    colors.warning()
                };
                lines.push(Line::from(Span::styled(
                    format_entry(i + 1, entry),
                    Style::default().fg(color),
                )));
            }
        } else if !self.weak.is_empty() {
            // Seeded from lifetime totals before the first cycle completes
            lines.push(Line::from(Span::styled(
                "From past sessions:",
                Style::default().fg(colors.text_pending()),
            )));
            let names: Vec<String> = self.weak.iter().map(|k| format!("\"{k}\"")).collect();
            lines.push(Line::from(Span::styled(
                names.join(" "),
                Style::default().fg(colors.weak_bigram()),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Finish a cycle to find weak bigrams",
                Style::default().fg(colors.text_pending()),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format_coverage(&self.coverage),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )));

        let block = Block::bordered()
            .title(" Weak bigrams ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(errors: u64, attempts: u64, timing_diff: f64) -> WeaknessEntry {
        WeaknessEntry {
            bigram: BigramKey::new('t', 'h'),
            weakness_score: 0.5,
            error_rate: errors as f64 / attempts as f64,
            avg_time_ms: 120.0,
            timing_diff,
            attempts,
            errors,
        }
    }

    #[test]
    fn entry_shows_signed_timing() {
        assert_eq!(format_entry(1, &entry(1, 3, 0.25)), " 1. \"th\"   33% err (1/3)  +25% time");
        assert_eq!(format_entry(10, &entry(0, 4, -0.1)), "10. \"th\"    0% err (0/4)  -10% time");
    }

    #[test]
    fn lifetime_entry_shows_average_time() {
        let row = format_lifetime_entry(2, &entry(3, 12, 0.0));
        assert_eq!(row, " 2. \"th\"   25% err (3/12)  avg 120ms");
        assert!(!row.contains("time"));
    }

    #[test]
    fn coverage_line() {
        let c = Coverage {
            total_words: 30,
            words_with_weak_bigrams: 12,
            percentage: 40,
        };
        assert_eq!(format_coverage(&c), "Coverage: 12/30 words (40%)");
    }
}
