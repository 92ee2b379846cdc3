/// Construction-time settings of a [`Platform`](crate::Platform).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Preload the hex digit glyphs at the bottom of memory.
    pub load_font: bool,

    /// Fixed seed for the random number generator used by `CXNN`.
    /// When `None`, the generator is seeded from system entropy.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            load_font: true,
            rng_seed: None,
        }
    }
}
