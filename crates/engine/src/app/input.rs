/// Logical buttons a platformer scene reads each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    /// Confirms a text prompt.
    Submit,
    Quit,
}

impl InputAction {
    const fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Held-button set packed into one byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates(u8);

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        if is_down {
            self.0 |= action.mask();
        } else {
            self.0 &= !action.mask();
        }
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.0 & action.mask() != 0
    }
}
