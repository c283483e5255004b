use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::game::Action;
use crate::puzzle::Move;
use crate::render::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetCursor(usize),
    /// Select `position` and tap it.
    Tap(usize),
    Dispatch(Action),
    Redraw,
    Quit,
    Ignore,
}

pub fn command_for(event: &Event, cursor: usize, grid: usize, layout: Option<&Layout>) -> Command {
    match event {
        Event::Key(key) => command_for_key(key, cursor, grid),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => layout
            .and_then(|layout| layout.hit(*column, *row))
            .map_or(Command::Ignore, Command::Tap),
        Event::Resize(..) => Command::Redraw,
        _ => Command::Ignore,
    }
}

fn command_for_key(key: &KeyEvent, cursor: usize, grid: usize) -> Command {
    if key.kind == KeyEventKind::Release {
        return Command::Ignore;
    }

    let (row, col) = (cursor / grid, cursor % grid);
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,

        KeyCode::Up | KeyCode::Char('k') if row > 0 => Command::SetCursor(cursor - grid),
        KeyCode::Down | KeyCode::Char('j') if row + 1 < grid => Command::SetCursor(cursor + grid),
        KeyCode::Left | KeyCode::Char('h') if col > 0 => Command::SetCursor(cursor - 1),
        KeyCode::Right | KeyCode::Char('l') if col + 1 < grid => Command::SetCursor(cursor + 1),

        KeyCode::Enter | KeyCode::Char(' ') => Command::Tap(cursor),

        KeyCode::Char('w') => Command::Dispatch(Action::Slide(Move::Up)),
        KeyCode::Char('s') => Command::Dispatch(Action::Slide(Move::Down)),
        KeyCode::Char('a') => Command::Dispatch(Action::Slide(Move::Left)),
        KeyCode::Char('d') => Command::Dispatch(Action::Slide(Move::Right)),

        KeyCode::Char('r') => Command::Dispatch(Action::Shuffle),
        KeyCode::Char('n') => Command::Dispatch(Action::AdvanceLevel),
        _ => Command::Ignore,
    }
}
