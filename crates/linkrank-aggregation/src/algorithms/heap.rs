/// Swap sequence of Heap's algorithm.
///
/// Applying every yielded swap, in order, to any array of length `n` walks it
/// through all `n!` orderings, starting from (and not repeating) the initial
/// one. Each step differs from the previous ordering by exactly one swap.
#[derive(Clone, Debug)]
pub struct HeapSwaps {
    counters: Vec<usize>,
    level: usize,
}

impl HeapSwaps {
    pub fn new(n: usize) -> Self {
        Self {
            counters: vec![0; n],
            level: 0,
        }
    }
}

impl Iterator for HeapSwaps {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        while self.level < self.counters.len() {
            let i = self.level;
            if self.counters[i] < i {
                let swap = if i % 2 == 0 {
                    (0, i)
                } else {
                    (self.counters[i], i)
                };
                self.counters[i] += 1;
                self.level = 0;
                return Some(swap);
            }
            self.counters[i] = 0;
            self.level += 1;
        }
        None
    }
}

/// `n!`, or `None` on `u64` overflow
pub fn factorial(n: usize) -> Option<u64> {
    (1..=n as u64).try_fold(1u64, |acc, k| acc.checked_mul(k))
}
