use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::Theme;
use crate::game::GameState;

/// Supplemental values displayed by the HUD row.
#[derive(Debug, Clone)]
pub struct HudInfo<'a> {
    /// Best leaderboard score, shown for comparison.
    pub best_score: u32,
    /// Player name, or the watched bot with its position in the list.
    pub label: String,
    pub spectating: bool,
    pub theme: &'a Theme,
}

/// Renders the one-line HUD and returns the remaining play area above it.
#[must_use]
pub fn render_hud(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &GameState,
    info: &HudInfo<'_>,
) -> Rect {
    let [play_area, hud_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(score_line(state, info)).alignment(Alignment::Left),
        hud_area,
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            info.label.as_str(),
            Style::new().fg(info.theme.hud_label),
        )))
        .alignment(Alignment::Right),
        hud_area,
    );

    play_area
}

fn score_line<'a>(state: &GameState, info: &HudInfo<'a>) -> Line<'a> {
    let value = Style::new().fg(info.theme.hud_score);
    let label = Style::new().fg(info.theme.hud_label);

    Line::from(vec![
        Span::styled("score ", label),
        Span::styled(state.score.to_string(), value),
        Span::styled("  len ", label),
        Span::styled(state.snake.len().to_string(), value),
        Span::styled("  best ", label),
        Span::styled(info.best_score.max(state.score).to_string(), value),
    ])
}

#[cfg(test)]
mod tests {
    use crate::config::{GridSize, THEME_CLASSIC};
    use crate::game::GameState;

    use super::{HudInfo, score_line};

    #[test]
    fn best_score_never_trails_the_live_score() {
        let state = GameState {
            score: 90,
            ..GameState::initial(GridSize::default())
        };
        let info = HudInfo {
            best_score: 40,
            label: "ada".to_owned(),
            spectating: false,
            theme: &THEME_CLASSIC,
        };

        let text: String = score_line(&state, &info)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();

        assert_eq!(text, "score 90  len 3  best 90");
    }
}
