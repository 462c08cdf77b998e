use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::bigram::BigramKey;
use crate::session::input::CharStatus;
use crate::session::typing::RunState;
use crate::ui::theme::Theme;

pub struct TypingArea<'a> {
    run: &'a RunState,
    weak: &'a [BigramKey],
    transitioning: bool,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(run: &'a RunState, weak: &'a [BigramKey], transitioning: bool, theme: &'a Theme) -> Self {
        Self {
            run,
            weak,
            transitioning,
            theme,
        }
    }
}

/// Block title: completion percentage and typo count, or a pause marker
/// between prompts.
fn title(run: &RunState, transitioning: bool) -> String {
    if transitioning {
        return " Next prompt... ".to_string();
    }
    let percent = (run.progress() * 100.0).round() as u32;
    match run.typo_count() {
        0 => format!(" Type \u{2022} {percent}% "),
        1 => format!(" Type \u{2022} {percent}% \u{2022} 1 typo "),
        n => format!(" Type \u{2022} {percent}% \u{2022} {n} typos "),
    }
}

/// Mark every target position that is part of a weak bigram.
fn weak_positions(target: &[char], weak: &[BigramKey]) -> Vec<bool> {
    let mut marks = vec![false; target.len()];
    if weak.is_empty() {
        return marks;
    }
    for i in 1..target.len() {
        let key = BigramKey::new(target[i - 1], target[i]).to_lowercase();
        if weak.contains(&key) {
            marks[i - 1] = true;
            marks[i] = true;
        }
    }
    marks
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let run = self.run;
        let marks = weak_positions(&run.target, self.weak);

        let spans: Vec<Span> = run
            .target
            .iter()
            .enumerate()
            .map(|(idx, &ch)| {
                if idx < run.cursor {
                    match &run.input[idx] {
                        CharStatus::Correct => {
                            Span::styled(ch.to_string(), Style::default().fg(colors.text_correct()))
                        }
                        // Show what was actually typed; a mistyped space stays visible as ·
                        CharStatus::Incorrect(actual) => {
                            let shown = if *actual == ' ' { '\u{00b7}' } else { *actual };
                            Span::styled(
                                shown.to_string(),
                                Style::default()
                                    .fg(colors.text_incorrect())
                                    .bg(colors.text_incorrect_bg())
                                    .add_modifier(Modifier::UNDERLINED),
                            )
                        }
                    }
                } else if idx == run.cursor && !self.transitioning {
                    Span::styled(
                        ch.to_string(),
                        Style::default()
                            .fg(colors.text_cursor_fg())
                            .bg(colors.text_cursor_bg()),
                    )
                } else if marks[idx] {
                    Span::styled(
                        ch.to_string(),
                        Style::default()
                            .fg(colors.weak_bigram())
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(ch.to_string(), Style::default().fg(colors.text_pending()))
                }
            })
            .collect();

        let block = Block::bordered()
            .title(title(run, self.transitioning))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().fg(colors.fg()).bg(colors.bg()));

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn marks_both_letters_of_weak_bigrams() {
        let marks = weak_positions(&chars("the cat"), &[BigramKey::new('h', 'e')]);
        assert_eq!(marks, vec![false, true, true, false, false, false, false]);
    }

    #[test]
    fn matching_ignores_case() {
        let marks = weak_positions(&chars("THE"), &[BigramKey::new('t', 'h')]);
        assert_eq!(marks, vec![true, true, false]);
    }

    #[test]
    fn no_weak_list_marks_nothing() {
        assert!(weak_positions(&chars("abc"), &[]).iter().all(|m| !m));
    }

    #[test]
    fn title_tracks_progress_and_typos() {
        let mut run = RunState::new("abcd");
        assert_eq!(title(&run, false), " Type \u{2022} 0% ");
        let now = std::time::Instant::now();
        crate::session::input::process_char_at(&mut run, 'a', now);
        crate::session::input::process_char_at(&mut run, 'x', now);
        assert_eq!(title(&run, false), " Type \u{2022} 50% \u{2022} 1 typo ");
        crate::session::input::process_char_at(&mut run, 'y', now);
        assert_eq!(title(&run, false), " Type \u{2022} 75% \u{2022} 2 typos ");
        assert_eq!(title(&run, true), " Next prompt... ");
    }

    #[test]
    fn renders_prompt_text() {
        let run = RunState::new("ab");
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        TypingArea::new(&run, &[], false, &theme).render(area, &mut buf);
        assert_eq!(buf[(1, 1)].symbol(), "a");
        assert_eq!(buf[(2, 1)].symbol(), "b");
    }
}
