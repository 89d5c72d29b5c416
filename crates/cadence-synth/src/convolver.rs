//! Uniformly partitioned FFT convolution (overlap-save).
//!
//! The impulse response is cut into blocks of `B` samples, each transformed
//! once at construction. Input is collected in blocks of `B`; every full
//! block is transformed, pushed onto a frequency-domain delay line and
//! multiplied against all partitions. Output lags input by one block.

use crate::impulse::ImpulseResponse;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Partition size used by the shared reverb.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

const ZERO: Complex<f32> = Complex { re: 0.0, im: 0.0 };

pub struct PartitionedConvolver {
    block_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    /// Spectra of the impulse response blocks, pre-scaled by 1/(2B).
    partitions: Vec<Vec<Complex<f32>>>,
    /// Spectra of recent input windows; `fdl[head]` is the newest.
    fdl: Vec<Vec<Complex<f32>>>,
    head: usize,
    /// Previous input block followed by the block being collected.
    window: Vec<f32>,
    fill: usize,
    output: Vec<f32>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    silent_blocks: usize,
}

impl PartitionedConvolver {
    pub fn new(impulse: &[f32], block_size: usize) -> Self {
        let block_size = block_size.max(1);
        let fft_len = block_size * 2;

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![ZERO; scratch_len];

        let scale = 1.0 / fft_len as f32;
        let partitions: Vec<Vec<Complex<f32>>> = impulse
            .chunks(block_size)
            .map(|chunk| {
                let mut spectrum = vec![ZERO; fft_len];
                for (bin, sample) in spectrum.iter_mut().zip(chunk) {
                    *bin = Complex::new(sample * scale, 0.0);
                }
                forward.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        Self {
            block_size,
            forward,
            inverse,
            fdl: vec![vec![ZERO; fft_len]; partitions.len()],
            partitions,
            head: 0,
            window: vec![0.0; fft_len],
            fill: 0,
            output: vec![0.0; block_size],
            accum: vec![ZERO; fft_len],
            scratch,
            silent_blocks: 0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Samples of delay between input and output.
    pub fn latency(&self) -> usize {
        self.block_size
    }

    /// Feed one input sample, get the output sample `latency()` behind it.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let out = self.output[self.fill];
        self.window[self.block_size + self.fill] = input;
        self.fill += 1;
        if self.fill == self.block_size {
            self.process_block();
            self.fill = 0;
        }
        out
    }

    fn process_block(&mut self) {
        let b = self.block_size;
        let p = self.partitions.len();
        if p == 0 {
            self.output.fill(0.0);
            return;
        }

        if self.window[b..].iter().all(|s| *s == 0.0) {
            self.silent_blocks = self.silent_blocks.saturating_add(1);
        } else {
            self.silent_blocks = 0;
        }
        // After p + 1 silent blocks the delay line holds only zeros.
        if self.silent_blocks > p + 1 {
            self.output.fill(0.0);
            self.window.copy_within(b.., 0);
            return;
        }

        self.head = (self.head + p - 1) % p;
        let newest = &mut self.fdl[self.head];
        for (bin, sample) in newest.iter_mut().zip(&self.window) {
            *bin = Complex::new(*sample, 0.0);
        }
        self.forward.process_with_scratch(newest, &mut self.scratch);

        self.accum.fill(ZERO);
        for (i, partition) in self.partitions.iter().enumerate() {
            let input = &self.fdl[(self.head + i) % p];
            for ((acc, x), h) in self.accum.iter_mut().zip(input).zip(partition) {
                *acc += x * h;
            }
        }
        self.inverse
            .process_with_scratch(&mut self.accum, &mut self.scratch);

        for (out, y) in self.output.iter_mut().zip(&self.accum[b..]) {
            *out = y.re;
        }
        self.window.copy_within(b.., 0);
    }

    /// Clear all state, keeping the impulse response.
    pub fn reset(&mut self) {
        for spectrum in &mut self.fdl {
            spectrum.fill(ZERO);
        }
        self.window.fill(0.0);
        self.output.fill(0.0);
        self.fill = 0;
        self.head = 0;
        self.silent_blocks = 0;
    }
}

/// Stereo convolution reverb: left input through the left response, right
/// through the right.
pub struct ConvolutionReverb {
    left: PartitionedConvolver,
    right: PartitionedConvolver,
}

impl ConvolutionReverb {
    pub fn new(impulse: &ImpulseResponse) -> Self {
        Self::with_block_size(impulse, DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(impulse: &ImpulseResponse, block_size: usize) -> Self {
        let gain = impulse.normalization_gain();
        let scaled = |channel: &[f32]| -> Vec<f32> { channel.iter().map(|s| s * gain).collect() };
        Self {
            left: PartitionedConvolver::new(&scaled(impulse.left()), block_size),
            right: PartitionedConvolver::new(&scaled(impulse.right()), block_size),
        }
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.left.process(left), self.right.process(right))
    }

    pub fn latency(&self) -> usize {
        self.left.latency()
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
