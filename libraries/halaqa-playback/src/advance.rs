//! Track-advance policy
//!
//! Sequential mode walks the catalog as a cycle. Shuffle mode picks
//! uniformly among the other items so the same item never plays twice in a
//! row. "Previous" is always sequential, even with shuffle on.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of shuffle picks
///
/// Boxed inside the controller so tests can inject a seeded generator.
pub trait IndexPicker: Send {
    /// Pick an index in `[0, len)`, never `exclude` when `len > 1`
    fn pick(&mut self, len: usize, exclude: Option<usize>) -> usize;
}

/// Uniform random picker
#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    /// Picker seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic picker
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexPicker for RandomPicker {
    fn pick(&mut self, len: usize, exclude: Option<usize>) -> usize {
        if len <= 1 {
            return 0;
        }

        match exclude {
            Some(skip) if skip < len => {
                // Draw from the len-1 other slots and step over the excluded one
                let drawn = self.rng.gen_range(0..len - 1);
                if drawn >= skip {
                    drawn + 1
                } else {
                    drawn
                }
            }
            _ => self.rng.gen_range(0..len),
        }
    }
}

/// Index that follows `current`
///
/// Returns `None` for an empty catalog. With nothing current, sequential mode
/// starts at 0.
pub fn next_index(
    current: Option<usize>,
    len: usize,
    shuffle: bool,
    picker: &mut dyn IndexPicker,
) -> Option<usize> {
    if len == 0 {
        return None;
    }

    if shuffle {
        return Some(picker.pick(len, current));
    }

    Some(match current {
        Some(index) => (index + 1) % len,
        None => 0,
    })
}

/// Index before `current`, wrapping to the last item
pub fn previous_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    Some(match current {
        Some(index) => (index.min(len - 1) + len - 1) % len,
        None => len - 1,
    })
}
