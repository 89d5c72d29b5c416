//! CadenceEngine that coordinates the scheduler, synthesizer and recorder.

use crate::Result;
use cadence_core::{AudioClip, StepObserver, Sequencer, Track};
use cadence_midi::MidiExport;
use cadence_sampler::Recorder;
use std::sync::Arc;

#[cfg(feature = "audio")]
use cadence_synth::AudioOutput;
#[cfg(feature = "audio")]
use parking_lot::Mutex;

/// Main engine: one per host, passed around by reference.
///
/// Owns the step sequencer, the voice sink it plays into (normally the
/// built-in synthesizer on the default output device) and the recorder.
/// Dropping the engine stops playback, releases the input device and closes
/// the output stream.
///
/// # Example
///
/// ```ignore
/// use cadence::prelude::*;
///
/// let engine = CadenceEngine::builder().build()?;
/// let project = Project::demo();
///
/// engine.set_tracks(project.tracks().to_vec());
/// engine.set_observer(|step| println!("step {step}"));
/// engine.start()?;
///
/// let midi = engine.export_midi()?;
/// ```
pub struct CadenceEngine {
    sequencer: Sequencer,
    recorder: Recorder,

    /// Output stream; `None` when a custom voice sink was supplied
    #[cfg(feature = "audio")]
    output: Mutex<Option<AudioOutput>>,
}

impl CadenceEngine {
    pub fn builder() -> crate::CadenceEngineBuilder {
        crate::CadenceEngineBuilder::default()
    }

    pub(crate) fn from_parts(
        sequencer: Sequencer,
        recorder: Recorder,
        #[cfg(feature = "audio")] output: Option<AudioOutput>,
    ) -> Self {
        Self {
            sequencer,
            recorder,
            #[cfg(feature = "audio")]
            output: Mutex::new(output),
        }
    }

    // Transport

    /// Start playback from step 0. Restarts the bar if already playing.
    pub fn start(&self) -> Result<()> {
        Ok(self.sequencer.start()?)
    }

    /// Stop playback. Notes already sounding ring out.
    pub fn stop(&self) {
        self.sequencer.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    pub fn set_tempo(&self, bpm: f64) -> Result<()> {
        Ok(self.sequencer.set_tempo(bpm)?)
    }

    pub fn tempo(&self) -> f64 {
        self.sequencer.tempo()
    }

    // Arrangement

    /// Replace the arrangement being played.
    pub fn set_tracks(&self, tracks: Vec<Track>) {
        self.sequencer.set_tracks(tracks);
    }

    pub fn tracks(&self) -> Arc<Vec<Track>> {
        self.sequencer.tracks()
    }

    /// Register the audible-step callback, replacing any previous one.
    ///
    /// Called from a background thread when each step is heard.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.sequencer.set_observer(Arc::new(observer) as StepObserver);
    }

    pub fn clear_observer(&self) {
        self.sequencer.clear_observer();
    }

    // Recording

    pub fn start_recording(&self) -> Result<()> {
        Ok(self.recorder.start_recording()?)
    }

    /// Stop recording and return the clip; empty if nothing was recording.
    pub fn stop_recording(&self) -> Result<AudioClip> {
        Ok(self.recorder.stop_recording()?)
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    // Export

    /// Current arrangement as a Standard MIDI File.
    ///
    /// Independent of playback state. Save it as
    /// [`cadence_midi::MIDI_FILE_NAME`].
    pub fn export_midi(&self) -> Result<Vec<u8>> {
        Ok(MidiExport::new(self.tempo()).write(&self.tracks())?)
    }

    // Output

    /// Sample rate of the output device, if one is open.
    pub fn sample_rate(&self) -> Option<f64> {
        #[cfg(feature = "audio")]
        {
            self.output.lock().as_ref().map(AudioOutput::sample_rate)
        }
        #[cfg(not(feature = "audio"))]
        {
            None
        }
    }

    pub fn output_device_name(&self) -> Option<String> {
        #[cfg(feature = "audio")]
        {
            self.output
                .lock()
                .as_ref()
                .map(|output| output.device_name().to_string())
        }
        #[cfg(not(feature = "audio"))]
        {
            None
        }
    }

    #[cfg(feature = "audio")]
    pub fn list_output_devices() -> Result<Vec<String>> {
        Ok(AudioOutput::list_devices()?)
    }
}

impl Drop for CadenceEngine {
    fn drop(&mut self) {
        self.sequencer.stop();
        tracing::debug!("engine shut down");
    }
}
