#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Block,
    CameraUp,
    CameraDown,
    CameraLeft,
    CameraRight,
    FastCamera,
    NextTileType,
    PrevTileType,
    NextVariant,
    PrevVariant,
    ToggleSelection,
    Autotile,
    Fill,
    PlaceEnemySpawn,
    PlaceGrassAnchor,
    PlacePlayerSpawn,
    PlaceNote,
    Save,
    SwitchScene,
    Quit,
}

const ACTION_COUNT: usize = 23;

/// Held state plus a one-tick pressed edge for every action. The collector
/// sets edges; snapshots consume them.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set_down(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn set_pressed(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_pressed(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Block => 3,
            InputAction::CameraUp => 4,
            InputAction::CameraDown => 5,
            InputAction::CameraLeft => 6,
            InputAction::CameraRight => 7,
            InputAction::FastCamera => 8,
            InputAction::NextTileType => 9,
            InputAction::PrevTileType => 10,
            InputAction::NextVariant => 11,
            InputAction::PrevVariant => 12,
            InputAction::ToggleSelection => 13,
            InputAction::Autotile => 14,
            InputAction::Fill => 15,
            InputAction::PlaceEnemySpawn => 16,
            InputAction::PlaceGrassAnchor => 17,
            InputAction::PlacePlayerSpawn => 18,
            InputAction::PlaceNote => 19,
            InputAction::Save => 20,
            InputAction::SwitchScene => 21,
            InputAction::Quit => 22,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_down_records_pressed_edge_only_on_transition() {
        let mut states = ActionStates::default();

        states.set_down(InputAction::Jump, true);
        assert!(states.is_down(InputAction::Jump));
        assert!(states.was_pressed(InputAction::Jump));

        states.clear_pressed();
        states.set_down(InputAction::Jump, true);
        assert!(states.is_down(InputAction::Jump));
        assert!(!states.was_pressed(InputAction::Jump));

        states.set_down(InputAction::Jump, false);
        states.set_down(InputAction::Jump, true);
        assert!(states.was_pressed(InputAction::Jump));
    }

    #[test]
    fn actions_do_not_alias() {
        let mut states = ActionStates::default();
        states.set_down(InputAction::MoveLeft, true);
        assert!(states.is_down(InputAction::MoveLeft));
        assert!(!states.is_down(InputAction::MoveRight));
        assert!(!states.was_pressed(InputAction::Save));
    }
}
