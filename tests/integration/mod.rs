mod engine;
mod midi_export;
mod recording;
mod scheduler;
