use std::cell::Cell;
use std::rc::Rc;

pub const RNG_SEED: u64 = 0x5432_1012_3454_3210;

#[derive(Clone, Default)]
pub struct DropCounter {
    drops: Rc<Cell<usize>>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_droppable<T>(&self, value: T) -> Droppable<T> {
        Droppable {
            value,
            counter: self.clone(),
        }
    }

    pub fn dropped(&self) -> usize {
        self.drops.get()
    }
}

#[derive(Clone, Debug)]
pub struct Droppable<T> {
    pub value: T,
    counter: DropCounter,
}

impl core::fmt::Debug for DropCounter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DropCounter({})", self.dropped())
    }
}

impl<T: PartialEq> PartialEq for Droppable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Drop for Droppable<T> {
    fn drop(&mut self) {
        let count = self.counter.drops.get();
        self.counter.drops.set(count + 1);
    }
}

/// Shared budget of clones; the clone that exhausts it panics instead.
#[derive(Clone)]
pub struct CloneBudget {
    remaining: Rc<Cell<usize>>,
}

impl CloneBudget {
    /// Permits `n` successful clones; clone number `n + 1` panics.
    pub fn new(n: usize) -> Self {
        CloneBudget {
            remaining: Rc::new(Cell::new(n)),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn set(&self, n: usize) {
        self.remaining.set(n);
    }
}

/// An element whose `Clone` fails once the shared budget runs out.
#[derive(Debug)]
pub struct Fragile {
    pub value: Droppable<u32>,
    budget: CloneBudget,
}

impl Fragile {
    pub fn new(value: u32, drops: &DropCounter, budget: &CloneBudget) -> Self {
        Fragile {
            value: drops.new_droppable(value),
            budget: budget.clone(),
        }
    }
}

impl core::fmt::Debug for CloneBudget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CloneBudget({})", self.remaining.get())
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        let left = self.budget.remaining.get();
        if left == 0 {
            panic!("clone budget exhausted");
        }
        self.budget.remaining.set(left - 1);

        Fragile {
            value: self.value.clone(),
            budget: self.budget.clone(),
        }
    }
}

impl PartialEq for Fragile {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Runs `f`, expecting it to panic.
pub fn expect_panic<F: FnOnce()>(f: F) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
    assert!(result.is_err(), "operation was expected to panic");
}
