use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Block;

use crate::config::{CELL_WIDTH, GLYPH_CELL, GLYPH_FOOD, GridSize, Theme};
use crate::driver::Controller;
use crate::game::{GameState, GameStatus};
use crate::snake::Position;
use crate::ui::hud::{HudInfo, render_hud};
use crate::ui::menu::{
    render_game_ended_menu, render_game_over_menu, render_pause_menu, render_start_menu,
};

/// Popup drawn over the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Overlay {
    None,
    Start,
    Paused,
    /// Human game over.
    GameOver,
    /// Spectated session finished.
    Ended,
}

impl Overlay {
    /// Picks the popup for the driver's current situation.
    #[must_use]
    pub fn for_state(playing: bool, state: &GameState, controller: Controller) -> Self {
        if !playing {
            return Self::Start;
        }

        match (state.status, controller) {
            (GameStatus::Running, _) => Self::None,
            (GameStatus::Paused, _) => Self::Paused,
            (GameStatus::GameOver, Controller::Human) => Self::GameOver,
            (GameStatus::GameOver, Controller::Heuristic) => Self::Ended,
        }
    }
}

/// Renders the full game frame from immutable state.
pub fn render(
    frame: &mut Frame<'_>,
    state: &GameState,
    bounds: GridSize,
    overlay: Overlay,
    hud_info: &HudInfo<'_>,
) {
    let theme = hud_info.theme;
    let area = board_area(frame.area(), bounds);
    let play_area = render_hud(frame, area, state, hud_info);

    let block = Block::bordered().border_style(Style::new().fg(theme.border_fg));
    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_food(frame, inner, bounds, state.food, theme);
    render_snake(frame, inner, bounds, state, theme);

    match overlay {
        Overlay::None => {}
        Overlay::Start => render_start_menu(
            frame,
            play_area,
            hud_info.best_score,
            hud_info.spectating,
        ),
        Overlay::Paused => render_pause_menu(frame, play_area),
        Overlay::GameOver => {
            render_game_over_menu(frame, play_area, state.score, hud_info.best_score);
        }
        Overlay::Ended => render_game_ended_menu(frame, play_area, state.score),
    }
}

/// Centres the board plus its one-line HUD horizontally at the top.
fn board_area(area: Rect, bounds: GridSize) -> Rect {
    let width = bounds.width.saturating_mul(CELL_WIDTH).saturating_add(2);
    let height = bounds.height.saturating_add(3);

    let [_, column, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [rows, _] =
        Layout::vertical([Constraint::Length(height), Constraint::Fill(1)]).areas(column);
    rows
}

fn render_food(
    frame: &mut Frame<'_>,
    inner: Rect,
    bounds: GridSize,
    food: Position,
    theme: &Theme,
) {
    let Some((x, y)) = logical_to_terminal(inner, bounds, food) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, GLYPH_FOOD, Style::new().fg(theme.food));
}

fn render_snake(
    frame: &mut Frame<'_>,
    inner: Rect,
    bounds: GridSize,
    state: &GameState,
    theme: &Theme,
) {
    let tail_index = state.snake.len() - 1;

    let buffer = frame.buffer_mut();
    // Tail first so the head wins when cells overlap.
    for (index, segment) in state.snake.segments().enumerate().rev() {
        let Some((x, y)) = logical_to_terminal(inner, bounds, *segment) else {
            continue;
        };

        let style = if index == 0 {
            let color = if state.is_game_over() {
                theme.crashed
            } else {
                theme.snake_head
            };
            Style::new().fg(color).add_modifier(Modifier::BOLD)
        } else if index == tail_index {
            Style::new().fg(theme.snake_tail)
        } else {
            Style::new().fg(theme.snake_body)
        };

        buffer.set_string(x, y, GLYPH_CELL, style);
    }
}

fn logical_to_terminal(inner: Rect, bounds: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?.checked_mul(CELL_WIDTH)?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use crate::config::GridSize;
    use crate::driver::Controller;
    use crate::game::{GameState, GameStatus};
    use crate::snake::Position;

    use super::{Overlay, logical_to_terminal};

    #[test]
    fn cells_are_two_columns_wide() {
        let inner = Rect::new(1, 1, 40, 20);
        let bounds = GridSize::default();

        assert_eq!(logical_to_terminal(inner, bounds, Position::new(0, 0)), Some((1, 1)));
        assert_eq!(logical_to_terminal(inner, bounds, Position::new(3, 2)), Some((7, 3)));
        assert_eq!(logical_to_terminal(inner, bounds, Position::new(20, 0)), None);
    }

    #[test]
    fn cells_outside_a_cramped_terminal_are_skipped() {
        let inner = Rect::new(0, 0, 10, 5);

        assert_eq!(
            logical_to_terminal(inner, GridSize::default(), Position::new(10, 2)),
            None
        );
    }

    #[test]
    fn overlay_follows_status_and_controller() {
        let running = GameState::initial(GridSize::default());
        let over = GameState {
            status: GameStatus::GameOver,
            ..running.clone()
        };

        assert_eq!(Overlay::for_state(false, &running, Controller::Human), Overlay::Start);
        assert_eq!(Overlay::for_state(true, &running, Controller::Human), Overlay::None);
        assert_eq!(
            Overlay::for_state(true, &running.with_pause_toggled(), Controller::Human),
            Overlay::Paused
        );
        assert_eq!(Overlay::for_state(true, &over, Controller::Human), Overlay::GameOver);
        assert_eq!(Overlay::for_state(true, &over, Controller::Heuristic), Overlay::Ended);
    }
}
