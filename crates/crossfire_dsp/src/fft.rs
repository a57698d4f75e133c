//! FFT Spectrum Analyzer
//!
//! Feeds the visualizer a small set of log-spaced magnitude bins.
//!
//! # Architecture
//!
//! The analyzer is owned by the audio thread. `push_samples` fills a fixed
//! FIFO; each time a full window lands it is latched into a pending
//! snapshot and the ready flag is set. If the previous snapshot was never
//! transformed it is replaced, so the newest completed window wins.
//!
//! `produce_fft_data` runs once per block outside the per-sample loop: Hann
//! window, forward FFT with preallocated scratch, log-bin resampling. The
//! bins are published through a triple buffer; the UI thread reads the
//! newest complete snapshot from [`SpectrumReader`] without ever blocking
//! the writer.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use triple_buffer::TripleBuffer;

use crate::error::{check_sample_rate, DspError};

/// log2 of the FFT window
pub const FFT_ORDER: usize = 11;

/// FFT window size: 2048 samples, ~46 ms at 44.1kHz
pub const FFT_SIZE: usize = 1 << FFT_ORDER;

/// Number of log-spaced output bins
pub const NUM_BINS: usize = 20;

/// Level reported for silent bins (dB)
pub const FLOOR_DB: f32 = -100.0;

/// Lowest analysed frequency (Hz)
pub const MIN_ANALYSIS_HZ: f32 = 20.0;

/// One frame of display bins in dB, 0 dB = full-scale sine
pub type SpectrumBins = [f32; NUM_BINS];

fn hann_window(n: usize, size: usize) -> f32 {
    0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / (size - 1) as f32).cos())
}

/// UI-side handle onto the published spectrum
pub struct SpectrumReader {
    output: triple_buffer::Output<SpectrumBins>,
}

impl SpectrumReader {
    /// Newest complete snapshot (floor-filled until the first transform)
    pub fn get_spectrum_bins(&mut self) -> SpectrumBins {
        *self.output.read()
    }

    /// Whether a snapshot has been published since the last read
    pub fn has_update(&self) -> bool {
        self.output.updated()
    }
}

/// Windowed FFT over a fixed-size FIFO, resampled onto [`NUM_BINS`] bins
pub struct SpectrumAnalyzer {
    fifo: Vec<f32>,
    fifo_index: usize,
    pending: Vec<f32>,
    block_ready: bool,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Linear FFT bin range `[start, end)` for each output bin
    ranges: [(usize, usize); NUM_BINS],
    /// Output bin edges in Hz (NUM_BINS + 1 values)
    edges_hz: [f32; NUM_BINS + 1],
    sample_rate: f32,
    publisher: triple_buffer::Input<SpectrumBins>,
}

impl SpectrumAnalyzer {
    /// Create the analyzer and the reader handle for the visualizer
    pub fn new(sample_rate: f32) -> Result<(Self, SpectrumReader), DspError> {
        let sample_rate = check_sample_rate(sample_rate)?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let scratch_len = fft.get_inplace_scratch_len();

        let (publisher, output) = TripleBuffer::new(&[FLOOR_DB; NUM_BINS]).split();

        let mut analyzer = Self {
            fifo: vec![0.0; FFT_SIZE],
            fifo_index: 0,
            pending: vec![0.0; FFT_SIZE],
            block_ready: false,
            window: (0..FFT_SIZE).map(|i| hann_window(i, FFT_SIZE)).collect(),
            fft,
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            ranges: [(1, 2); NUM_BINS],
            edges_hz: [0.0; NUM_BINS + 1],
            sample_rate,
            publisher,
        };
        analyzer.compute_bin_layout();

        Ok((analyzer, SpectrumReader { output }))
    }

    /// Re-derive the bin layout for a new sample rate and clear the FIFO
    ///
    /// The reader is handed a floor-level frame so it never shows bins laid
    /// out for the previous rate.
    pub fn prepare(&mut self, sample_rate: f32) -> Result<(), DspError> {
        self.sample_rate = check_sample_rate(sample_rate)?;
        self.compute_bin_layout();
        self.reset();
        self.publisher.write([FLOOR_DB; NUM_BINS]);
        Ok(())
    }

    fn compute_bin_layout(&mut self) {
        let nyquist = self.sample_rate * 0.5;
        let low = MIN_ANALYSIS_HZ.min(nyquist * 0.5);
        let span = nyquist / low;

        for (k, edge) in self.edges_hz.iter_mut().enumerate() {
            *edge = low * span.powf(k as f32 / NUM_BINS as f32);
        }

        let hz_to_bin = FFT_SIZE as f32 / self.sample_rate;
        let last = FFT_SIZE / 2;
        for (i, range) in self.ranges.iter_mut().enumerate() {
            // A linear bin belongs to the band holding its centre frequency
            let start = ((self.edges_hz[i] * hz_to_bin).ceil() as usize).clamp(1, last);
            let end = ((self.edges_hz[i + 1] * hz_to_bin).ceil() as usize)
                .clamp(start + 1, last + 1);
            *range = (start, end);
        }
    }

    /// Append one mono sample
    ///
    /// # Real-time Safety
    /// No allocations, no locks. Latching a full window is one fixed-size copy.
    #[inline]
    pub fn push_sample(&mut self, sample: f32) {
        self.fifo[self.fifo_index] = sample;
        self.fifo_index += 1;

        if self.fifo_index == FFT_SIZE {
            self.pending.copy_from_slice(&self.fifo);
            self.block_ready = true;
            self.fifo_index = 0;
        }
    }

    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.push_sample(sample);
        }
    }

    /// Whether a latched window is waiting for a transform
    pub fn is_ready(&self) -> bool {
        self.block_ready
    }

    /// Transform the pending window if one is ready
    ///
    /// Publishes the bins to the reader and returns them; `None` when no
    /// new window has completed since the last call. Allocation-free.
    pub fn produce_fft_data(&mut self) -> Option<SpectrumBins> {
        if !self.block_ready {
            return None;
        }

        for ((slot, &sample), &w) in self
            .buffer
            .iter_mut()
            .zip(self.pending.iter())
            .zip(self.window.iter())
        {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // Hann-windowed full-scale sine peaks at N/4. Each output bin reads
        // the strongest linear bin in its range so wide bins keep the level.
        let reference = FFT_SIZE as f32 / 4.0;
        let mut bins = [FLOOR_DB; NUM_BINS];
        for (bin, &(start, end)) in bins.iter_mut().zip(self.ranges.iter()) {
            let peak = self.buffer[start..end]
                .iter()
                .map(|c| c.norm())
                .fold(0.0_f32, f32::max);
            let db = 20.0 * (peak / reference).max(1e-10).log10();
            *bin = db.max(FLOOR_DB);
        }

        self.block_ready = false;
        self.publisher.write(bins);
        Some(bins)
    }

    /// Output bin whose frequency range contains `frequency`
    pub fn band_for_frequency(&self, frequency: f32) -> usize {
        self.edges_hz[1..]
            .iter()
            .position(|&edge| frequency < edge)
            .unwrap_or(NUM_BINS - 1)
    }

    /// Bin edges in Hz, lowest first
    pub fn bin_edges_hz(&self) -> &[f32; NUM_BINS + 1] {
        &self.edges_hz
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Drop buffered audio and any pending window
    pub fn reset(&mut self) {
        self.fifo.fill(0.0);
        self.fifo_index = 0;
        self.block_ready = false;
    }
}
