use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses among fixed phrase variants (closing prompts, follow-ups, fallbacks).
///
/// Injected so replies can be made fully deterministic in tests and replays.
pub trait PhrasePicker: Send + Sync {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick_index(&self, len: usize) -> usize;
}

pub fn pick<'a, T>(picker: &dyn PhrasePicker, options: &'a [T]) -> Option<&'a T> {
    if options.is_empty() {
        return None;
    }
    let index = picker.pick_index(options.len()).min(options.len() - 1);
    options.get(index)
}

pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }
}

impl PhrasePicker for SeededPicker {
    fn pick_index(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len.max(1)),
            Err(poisoned) => poisoned.into_inner().gen_range(0..len.max(1)),
        }
    }
}

/// Always picks the first variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstPhrasePicker;

impl PhrasePicker for FirstPhrasePicker {
    fn pick_index(&self, _len: usize) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{pick, FirstPhrasePicker, PhrasePicker, SeededPicker};

    const OPTIONS: [&str; 5] = ["a", "b", "c", "d", "e"];

    #[test]
    fn same_seed_yields_same_sequence() {
        let left = SeededPicker::new(7);
        let right = SeededPicker::new(7);
        let left_picks: Vec<usize> = (0..16).map(|_| left.pick_index(OPTIONS.len())).collect();
        let right_picks: Vec<usize> = (0..16).map(|_| right.pick_index(OPTIONS.len())).collect();
        assert_eq!(left_picks, right_picks);
        assert!(left_picks.iter().all(|index| *index < OPTIONS.len()));
    }

    #[test]
    fn first_picker_is_stable() {
        assert_eq!(pick(&FirstPhrasePicker, &OPTIONS), Some(&"a"));
        assert_eq!(pick::<&str>(&FirstPhrasePicker, &[]), None);
    }
}
