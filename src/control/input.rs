use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operator input
// ---------------------------------------------------------------------------

/// Discrete events from the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    TogglePause,
    ToggleThrust,
    /// Brake held (`true`) or released.
    Brake(bool),
    /// Let-up held (`true`) or released.
    LetUp(bool),
    RemoveFrontTether,
    RemoveRearTether,
    FastForwardUp,
    FastForwardDown,
    AmplitudeUp,
    AmplitudeDown,
}

/// Flags the force hooks read, frozen once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub thrust: bool,
    pub brake: bool,
    pub let_up: bool,
}

impl InputState {
    /// Fold a body-level event into the snapshot. Returns `false` for
    /// events that are not about the bodies (pause, tethers, pacing).
    pub fn apply(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::ToggleThrust => self.thrust = !self.thrust,
            InputEvent::Brake(held) => self.brake = held,
            InputEvent::LetUp(held) => self.let_up = held,
            _ => return false,
        }
        true
    }

    /// Change to the wing's effective pitch, radians. Brake wins when both
    /// brake and let-up are held.
    pub fn pitch_adjustment(&self, brake_angle: f64) -> f64 {
        if self.brake {
            -brake_angle
        } else if self.let_up {
            brake_angle
        } else {
            0.0
        }
    }
}

/// An event delivered at the start of a given frame, for headless runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledInput {
    pub frame: u64,
    pub event: InputEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brake_takes_priority_over_let_up() {
        let mut input = InputState::default();
        assert_eq!(input.pitch_adjustment(0.2), 0.0);
        input.apply(InputEvent::LetUp(true));
        assert_eq!(input.pitch_adjustment(0.2), 0.2);
        input.apply(InputEvent::Brake(true));
        assert_eq!(input.pitch_adjustment(0.2), -0.2);
        input.apply(InputEvent::Brake(false));
        assert_eq!(input.pitch_adjustment(0.2), 0.2);
    }

    #[test]
    fn thrust_toggles_and_loop_events_pass_through() {
        let mut input = InputState::default();
        assert!(input.apply(InputEvent::ToggleThrust));
        assert!(input.thrust);
        assert!(input.apply(InputEvent::ToggleThrust));
        assert!(!input.thrust);
        assert!(!input.apply(InputEvent::TogglePause));
        assert!(!input.apply(InputEvent::RemoveFrontTether));
    }

    #[test]
    fn scheduled_input_from_yaml() {
        let events: Vec<ScheduledInput> = serde_yaml::from_str(
            "- { frame: 10, event: toggle_thrust }\n- { frame: 20, event: { brake: true } }\n",
        )
        .unwrap();
        assert_eq!(events[0].event, InputEvent::ToggleThrust);
        assert_eq!(events[1].event, InputEvent::Brake(true));
    }
}
