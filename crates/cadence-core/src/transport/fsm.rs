//! Transport state machine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    None,
    /// Playback started from stopped.
    Started,
    /// Playback was already running and starts over from step 0.
    Restarted,
    Stopped,
}

#[derive(Debug, Default)]
pub struct TransportFsm {
    state: PlaybackState,
}

impl TransportFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn transition(&mut self, event: TransportEvent) -> TransitionResult {
        match (event, self.state) {
            (TransportEvent::Start, PlaybackState::Stopped) => {
                self.state = PlaybackState::Running;
                TransitionResult::Started
            }
            (TransportEvent::Start, PlaybackState::Running) => TransitionResult::Restarted,
            (TransportEvent::Stop, PlaybackState::Running) => {
                self.state = PlaybackState::Stopped;
                TransitionResult::Stopped
            }
            (TransportEvent::Stop, PlaybackState::Stopped) => TransitionResult::None,
        }
    }
}
