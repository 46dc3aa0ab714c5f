//! Core trait for BRKGA.

/// Error a [`Decoder`] may return for a chromosome it cannot evaluate.
///
/// Any such failure aborts the whole batch it belongs to.
pub type DecodeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Decoder trait for BRKGA.
///
/// This is the **only** trait a user must implement to use BRKGA.
/// It maps a random-key chromosome (a slice of `f64` in `[0, 1)`)
/// to a fitness value. Lower fitness is better (minimization).
///
/// The engine may call `decode` from several worker threads at once when
/// `max_workers > 1`, so implementations must not rely on shared mutable
/// state across calls.
///
/// # Examples
///
/// ```
/// use u_brkga::brkga::{DecodeError, Decoder};
///
/// struct KnapsackDecoder { weights: Vec<f64>, values: Vec<f64>, capacity: f64 }
///
/// impl Decoder for KnapsackDecoder {
///     fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
///         // keys[i] > 0.5 means include item i
///         let (total_w, total_v) = keys.iter().enumerate()
///             .filter(|(_, &k)| k > 0.5)
///             .fold((0.0, 0.0), |(w, v), (i, _)| (w + self.weights[i], v + self.values[i]));
///         Ok(if total_w > self.capacity { f64::INFINITY } else { -total_v })
///     }
/// }
/// ```
///
/// # References
///
/// Bean (1994), Goncalves & Resende (2011)
pub trait Decoder: Sync {
    /// Decodes a random-key chromosome and returns its fitness.
    ///
    /// # Arguments
    /// * `keys` - A read-only view of one chromosome.
    ///   Length equals [`super::BrkgaConfig::chromosome_length`].
    fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError>;
}

impl<D: Decoder + ?Sized> Decoder for &D {
    fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
        (**self).decode(keys)
    }
}
