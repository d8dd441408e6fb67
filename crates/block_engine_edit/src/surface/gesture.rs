use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Interaction state of a surface.
///
/// ```text
/// Idle --begin_gesture--> Interacting --end_gesture--> CommittingGesture --> Idle
///                              |
///                              +------cancel_gesture-----------------------> Idle
/// ```
///
/// While `Interacting`, layout reports only update the live snapshot. Exactly one
/// history commit is issued for the whole gesture, while `CommittingGesture`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GestureState {
    #[default]
    Idle,
    Interacting(GestureKind),
    CommittingGesture(GestureKind),
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub fn is_interacting(&self) -> bool {
        matches!(self, GestureState::Interacting(_))
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureState::Idle => write!(f, "idle"),
            GestureState::Interacting(kind) => write!(f, "interacting ({kind:?})"),
            GestureState::CommittingGesture(kind) => write!(f, "committing ({kind:?})"),
        }
    }
}
