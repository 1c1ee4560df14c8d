use std::fmt;

use rust_fsm::state_machine;

/*
 * Lobby: players join and pick a mode
 * Countdown: auto-start clock running, joins still allowed
 * Active: timed turns, no joins
 * Finished: winner resolved or session cancelled
 */
state_machine! {
    derive(Debug, Clone, Copy, PartialEq, Eq)
    pub SessionFsm(Lobby)

    Lobby => {
        StartCountdown => Countdown,
        Activate => Active,
        Cancel => Finished,
    },
    Countdown => {
        StartCountdown => Countdown,
        PauseCountdown => Lobby,
        Activate => Active,
        Cancel => Finished,
    },
    Active => {
        LastPlayerStanding => Finished,
        Cancel => Finished,
    }
}

impl fmt::Display for SessionFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
