//! Parameter Store
//!
//! The eight host-automatable controls, stored as lock-free atomics so the
//! audio thread can snapshot them once per block while the UI thread writes.
//!
//! Each value lives in an `AtomicU32` holding the f32 bits. Writers clamp to
//! the parameter's range before storing, so a reader can never observe an
//! out-of-range value.

use std::sync::atomic::{AtomicU32, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Identifier of each control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    BandsplitFrequency,
    CompLowIntensity,
    CompHighIntensity,
    DistLowIntensity,
    DistHighIntensity,
    CompressorSpeed,
    DistortionType,
    ToneFilterCutoff,
}

impl ParamId {
    pub const COUNT: usize = 8;

    pub const ALL: [ParamId; Self::COUNT] = [
        Self::BandsplitFrequency,
        Self::CompLowIntensity,
        Self::CompHighIntensity,
        Self::DistLowIntensity,
        Self::DistHighIntensity,
        Self::CompressorSpeed,
        Self::DistortionType,
        Self::ToneFilterCutoff,
    ];

    /// Stable string id used by hosts and the UI
    pub fn as_str(self) -> &'static str {
        self.spec().id
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.as_str() == name)
    }

    pub fn spec(self) -> &'static ParameterSpec {
        &PARAMETER_SPECS[self as usize]
    }
}

/// Range, default and host-facing normalisation of one control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Snapping interval for normalised writes (0 = continuous)
    pub step: f32,
    /// `normalized = proportion^skew`; below 1 gives the low end more travel
    pub skew: f32,
}

impl ParameterSpec {
    /// Clamp into range; NaN falls back to the default
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    pub fn snap(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        if self.step > 0.0 {
            let steps = ((value - self.min) / self.step).round();
            self.clamp(self.min + steps * self.step)
        } else {
            value
        }
    }

    pub fn to_normalized(&self, value: f32) -> f32 {
        let proportion = (self.clamp(value) - self.min) / (self.max - self.min);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    pub fn from_normalized(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_nan() {
            self.to_normalized(self.default)
        } else {
            normalized.clamp(0.0, 1.0)
        };
        let proportion = if self.skew == 1.0 || normalized <= 0.0 {
            normalized
        } else {
            (normalized.ln() / self.skew).exp()
        };
        self.snap(self.min + (self.max - self.min) * proportion)
    }
}

const fn intensity(id: &'static str, name: &'static str) -> ParameterSpec {
    ParameterSpec {
        id,
        name,
        min: 0.0,
        max: 1.0,
        default: 0.0,
        step: 0.05,
        skew: 0.75,
    }
}

const fn selector(id: &'static str, name: &'static str) -> ParameterSpec {
    ParameterSpec {
        id,
        name,
        min: 0.0,
        max: 1.0,
        default: 0.3,
        step: 0.01,
        skew: 1.0,
    }
}

/// Parameter layout, indexed by `ParamId as usize`
pub static PARAMETER_SPECS: [ParameterSpec; ParamId::COUNT] = [
    ParameterSpec {
        id: "bandsplit_frequency",
        name: "Band Split Frequency",
        min: 20.0,
        max: 20000.0,
        default: 750.0,
        step: 1.0,
        skew: 0.25,
    },
    intensity("compLowIntensity", "Low Compression"),
    intensity("compHighIntensity", "High Compression"),
    intensity("distLowIntensity", "Low Distortion"),
    intensity("distHighIntensity", "High Distortion"),
    selector("compressorSpeed", "Compressor Speed"),
    selector("distortionType", "Distortion Type"),
    ParameterSpec {
        id: "toneFilterCutoff",
        name: "Tone",
        min: 20.0,
        max: 20000.0,
        default: 20000.0,
        step: 1.0,
        skew: 0.25,
    },
];

/// Pending changes a subscriber may hold before new ones are dropped
pub const LISTENER_CAPACITY: usize = 256;

/// Notification sent to subscribers after every write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub id: ParamId,
    pub value: f32,
}

/// Shared parameter values between the UI/host thread and the audio thread
pub struct ParameterStore {
    /// f32 bits per parameter
    /// Rust pattern: AtomicF32 doesn't exist, so we use bit-casting
    values: [AtomicU32; ParamId::COUNT],
    /// Touched only from the control side, never from the audio thread
    listeners: Mutex<Vec<Sender<ParamChange>>>,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicU32::new(PARAMETER_SPECS[i].default.to_bits())),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Lock-free read; safe on the audio thread
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id as usize].load(Ordering::Relaxed))
    }

    /// Clamp and store a plain value, returning what was stored
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let value = id.spec().clamp(value);
        let previous =
            f32::from_bits(self.values[id as usize].swap(value.to_bits(), Ordering::Relaxed));

        if id == ParamId::BandsplitFrequency && previous != value {
            debug!("Band split frequency updated: {} Hz", value);
        }

        self.notify(ParamChange { id, value });
        value
    }

    /// Store a host-normalised 0-1 value (skewed and step-snapped)
    pub fn set_normalized(&self, id: ParamId, normalized: f32) -> f32 {
        self.set(id, id.spec().from_normalized(normalized))
    }

    pub fn get_normalized(&self, id: ParamId) -> f32 {
        id.spec().to_normalized(self.get(id))
    }

    pub fn get_by_name(&self, name: &str) -> EngineResult<f32> {
        let id = Self::lookup(name)?;
        Ok(self.get(id))
    }

    pub fn set_by_name(&self, name: &str, value: f32) -> EngineResult<f32> {
        let id = Self::lookup(name)?;
        Ok(self.set(id, value))
    }

    fn lookup(name: &str) -> EngineResult<ParamId> {
        ParamId::from_name(name).ok_or_else(|| EngineError::UnknownParameter(name.to_string()))
    }

    pub fn reset_to_defaults(&self) {
        for id in ParamId::ALL {
            self.set(id, id.spec().default);
        }
    }

    /// Receive a [`ParamChange`] for every subsequent write
    ///
    /// Dropping the receiver unsubscribes on the next write. A listener
    /// that falls [`LISTENER_CAPACITY`] changes behind misses newer ones
    /// until it drains.
    pub fn subscribe(&self) -> Receiver<ParamChange> {
        let (sender, receiver) = bounded(LISTENER_CAPACITY);
        self.listeners.lock().push(sender);
        receiver
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn notify(&self, change: ParamChange) {
        self.listeners
            .lock()
            .retain(|listener| match listener.try_send(change) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => {
                    debug!("Dropping parameter listener with closed channel");
                    false
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = ParameterStore::new();
        assert_eq!(store.get(ParamId::BandsplitFrequency), 750.0);
        assert_eq!(store.get(ParamId::CompLowIntensity), 0.0);
        assert_eq!(store.get(ParamId::DistHighIntensity), 0.0);
        assert_eq!(store.get(ParamId::CompressorSpeed), 0.3);
        assert_eq!(store.get(ParamId::DistortionType), 0.3);
        assert_eq!(store.get(ParamId::ToneFilterCutoff), 20000.0);
    }

    #[test]
    fn test_ids_round_trip_through_names() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::from_name(id.as_str()), Some(id));
            assert_eq!(id.spec().id, id.as_str());
        }
        assert_eq!(ParamId::from_name("nope"), None);
    }

    #[test]
    fn test_set_clamps_into_range() {
        let store = ParameterStore::new();
        assert_eq!(store.set(ParamId::BandsplitFrequency, 5.0), 20.0);
        assert_eq!(store.set(ParamId::BandsplitFrequency, 1.0e6), 20000.0);
        assert_eq!(store.set(ParamId::CompLowIntensity, 1.5), 1.0);
        assert_eq!(store.set(ParamId::CompLowIntensity, -0.2), 0.0);
        assert_eq!(store.set(ParamId::DistortionType, f32::NAN), 0.3);
        assert_eq!(store.get(ParamId::DistortionType), 0.3);
    }

    #[test]
    fn test_name_access() {
        let store = ParameterStore::new();
        assert_eq!(store.set_by_name("compHighIntensity", 0.4).unwrap(), 0.4);
        assert_eq!(store.get_by_name("compHighIntensity").unwrap(), 0.4);
        assert!(matches!(
            store.get_by_name("wetDry"),
            Err(EngineError::UnknownParameter(_))
        ));
        assert!(store.set_by_name("", 1.0).is_err());
    }

    #[test]
    fn test_skewed_normalisation() {
        let spec = ParamId::BandsplitFrequency.spec();
        assert_eq!(spec.to_normalized(20.0), 0.0);
        assert_eq!(spec.to_normalized(20000.0), 1.0);
        // Skew 0.25 gives the low end most of the travel
        assert!(spec.from_normalized(0.5) < 2000.0);

        for value in [20.0, 100.0, 750.0, 5000.0, 20000.0] {
            let back = spec.from_normalized(spec.to_normalized(value));
            assert!((back - value).abs() <= 1.0, "{} came back as {}", value, back);
        }
    }

    #[test]
    fn test_normalized_writes_snap_to_step() {
        let store = ParameterStore::new();
        let stored = store.set_normalized(ParamId::DistLowIntensity, 0.5);
        let steps = stored / 0.05;
        assert!((steps - steps.round()).abs() < 1e-4, "{} is off-grid", stored);
        assert!((store.get_normalized(ParamId::DistLowIntensity) - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_reset_to_defaults() {
        let store = ParameterStore::new();
        store.set(ParamId::ToneFilterCutoff, 400.0);
        store.set(ParamId::CompressorSpeed, 0.9);
        store.reset_to_defaults();
        for id in ParamId::ALL {
            assert_eq!(store.get(id), id.spec().default);
        }
    }

    #[test]
    fn test_subscribers_receive_changes() {
        let store = ParameterStore::new();
        let rx = store.subscribe();
        store.set(ParamId::BandsplitFrequency, 1200.0);

        let change = rx.try_recv().unwrap();
        assert_eq!(change.id, ParamId::BandsplitFrequency);
        assert_eq!(change.value, 1200.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stalled_subscriber_is_bounded() {
        let store = ParameterStore::new();
        let rx = store.subscribe();
        for step in 0..LISTENER_CAPACITY * 2 {
            store.set(ParamId::ToneFilterCutoff, 1000.0 + step as f32);
        }
        assert_eq!(rx.len(), LISTENER_CAPACITY);
        assert_eq!(store.listener_count(), 1, "Full listener was pruned");

        // Oldest changes are kept; the overflow is dropped
        assert_eq!(rx.try_recv().unwrap().value, 1000.0);
        let drained = rx.try_iter().count();
        assert_eq!(drained, LISTENER_CAPACITY - 1);

        store.set(ParamId::ToneFilterCutoff, 5000.0);
        assert_eq!(rx.try_recv().unwrap().value, 5000.0);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let store = ParameterStore::new();
        let kept = store.subscribe();
        let dropped = store.subscribe();
        assert_eq!(store.listener_count(), 2);

        drop(dropped);
        store.set(ParamId::CompLowIntensity, 0.5);
        assert_eq!(store.listener_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn test_concurrent_reads_see_valid_values() {
        use std::sync::Arc;

        let store = Arc::new(ParameterStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..10_000 {
                    store.set(ParamId::CompHighIntensity, (i % 100) as f32 / 50.0);
                }
            })
        };

        for _ in 0..10_000 {
            let value = store.get(ParamId::CompHighIntensity);
            assert!((0.0..=1.0).contains(&value));
        }
        writer.join().unwrap();
    }
}
