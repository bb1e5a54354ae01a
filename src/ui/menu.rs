use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

/// Popup size as a share of the board area, in percent.
#[derive(Debug, Clone, Copy)]
struct CardSize {
    width: u16,
    height: u16,
}

/// A bordered popup with a bold heading and centered body lines.
struct Card<'a> {
    title: &'a str,
    heading: &'a str,
    accent: Color,
    size: CardSize,
    body: Vec<Line<'a>>,
}

impl Card<'_> {
    fn render(self, frame: &mut Frame<'_>, area: Rect) {
        let popup = centered(area, self.size);
        frame.render_widget(Clear, popup);

        let mut lines = Vec::with_capacity(self.body.len() + 2);
        lines.push(Line::styled(
            self.heading,
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::default());
        lines.extend(self.body);

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::bordered().title(format!(" {} ", self.title))),
            popup,
        );
    }
}

pub fn render_start_menu(frame: &mut Frame<'_>, area: Rect, best_score: u32, spectating: bool) {
    let hint = if spectating {
        "[Tab] Next session"
    } else {
        "Arrows/WASD to steer"
    };

    Card {
        title: "start",
        heading: "SNAKE",
        accent: Color::Green,
        size: CardSize { width: 80, height: 50 },
        body: vec![
            Line::from(format!("Best score: {best_score}")),
            Line::default(),
            Line::from("[Enter] Start"),
            Line::from(hint),
            Line::from("[Q] Quit"),
        ],
    }
    .render(frame, area);
}

pub fn render_pause_menu(frame: &mut Frame<'_>, area: Rect) {
    Card {
        title: "pause",
        heading: "PAUSED",
        accent: Color::Yellow,
        size: CardSize { width: 60, height: 30 },
        body: vec![Line::from("[Space]/[P] Resume"), Line::from("[Q] Quit")],
    }
    .render(frame, area);
}

/// Shown when the local player's snake collides. `best_score` already
/// includes this game once it has been submitted.
pub fn render_game_over_menu(frame: &mut Frame<'_>, area: Rect, score: u32, best_score: u32) {
    let mut body = vec![Line::from(format!("Final score: {score}"))];
    if score > 0 && score >= best_score {
        body.push(Line::styled(
            "New best score!",
            Style::default().fg(Color::Yellow),
        ));
    }
    body.push(Line::default());
    body.push(Line::from("[Enter] Play again  [Q] Quit"));

    Card {
        title: "game over",
        heading: "GAME OVER",
        accent: Color::Red,
        size: CardSize { width: 70, height: 40 },
        body,
    }
    .render(frame, area);
}

/// Shown over a watched session whose bot has crashed.
pub fn render_game_ended_menu(frame: &mut Frame<'_>, area: Rect, score: u32) {
    Card {
        title: "spectating",
        heading: "GAME ENDED",
        accent: Color::Magenta,
        size: CardSize { width: 70, height: 35 },
        body: vec![
            Line::from(format!("Final score: {score}")),
            Line::default(),
            Line::from("[Enter] Restart  [Tab] Next"),
        ],
    }
    .render(frame, area);
}

fn centered(area: Rect, size: CardSize) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(size.height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(size.width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::{CardSize, centered};

    #[test]
    fn popup_is_centered_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered(area, CardSize { width: 60, height: 50 });

        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 10);
    }
}
