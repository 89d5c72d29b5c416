pub mod timing;

pub(crate) mod clock;
pub(crate) mod fsm;
pub(crate) mod lookahead;
pub(crate) mod sequencer;

pub use clock::{AudioClock, ManualClock, SystemClock};
pub use fsm::{PlaybackState, TransitionResult, TransportEvent, TransportFsm};
pub use lookahead::{dispatch_step, LookaheadScheduler, ScheduledStep};
pub use sequencer::{Sequencer, StepObserver};
