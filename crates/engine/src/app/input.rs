use crate::sim::Control;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
}

const ACTION_COUNT: usize = 3;

/// Held/released state per action. Jump is edge-triggered: it turns into a
/// jump request once per press and is then consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
    jump_pressed_edge: bool,
}

impl ActionStates {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        if action == InputAction::Jump && is_down && !self.is_down(action) {
            self.jump_pressed_edge = true;
        }
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    /// Control vector for the next tick. Opposing directions cancel out.
    pub fn take_control(&mut self) -> Control {
        let left = self.is_down(InputAction::MoveLeft);
        let right = self.is_down(InputAction::MoveRight);
        let x = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let jump = std::mem::take(&mut self.jump_pressed_edge);
        Control::new(x, jump)
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_directions_cancel() {
        let mut actions = ActionStates::default();
        actions.set(InputAction::MoveLeft, true);
        assert_eq!(actions.take_control().x, -1.0);

        actions.set(InputAction::MoveRight, true);
        assert_eq!(actions.take_control().x, 0.0);

        actions.set(InputAction::MoveLeft, false);
        assert_eq!(actions.take_control().x, 1.0);
    }

    #[test]
    fn jump_is_edge_triggered_for_single_tick() {
        let mut actions = ActionStates::default();
        actions.set(InputAction::Jump, true);

        assert!(actions.take_control().wants_jump());
        assert!(!actions.take_control().wants_jump());

        actions.set(InputAction::Jump, true);
        assert!(!actions.take_control().wants_jump());

        actions.set(InputAction::Jump, false);
        actions.set(InputAction::Jump, true);
        assert!(actions.take_control().wants_jump());
    }
}
