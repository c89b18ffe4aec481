#![cfg(feature = "unstable")]
#![feature(test)]

extern crate std;
extern crate test;

trait Sequence<T> {
    fn new() -> Self;
    fn push(&mut self, value: T);
    fn insert(&mut self, index: usize, value: T);
    fn erase(&mut self, index: usize);
    fn len(&self) -> usize;
}

macro_rules! pushes {
    ($fnn:ident, $ty:ty, $n:expr) => {
        #[bench]
        fn $fnn(b: &mut Bencher) {
            let mut rng = SmallRng::seed_from_u64(0x5432_1012_3454_3210);
            b.iter(|| {
                let mut seq = <$ty as Sequence<u32>>::new();
                for _ in 0..$n {
                    seq.push(rng.next_u32());
                }
                seq
            })
        }
    };
}

macro_rules! insertions {
    ($fnn:ident, $ty:ty, $n:expr) => {
        #[bench]
        fn $fnn(b: &mut Bencher) {
            let mut rng = SmallRng::seed_from_u64(0x5432_1012_3454_3210);
            b.iter(|| {
                let mut seq = <$ty as Sequence<u32>>::new();
                for _ in 0..$n {
                    let at = rng.gen_range(0..=seq.len());
                    seq.insert(at, rng.next_u32());
                }
                seq
            })
        }
    };
}

macro_rules! erasures {
    ($fnn:ident, $ty:ty, $n:expr) => {
        #[bench]
        fn $fnn(b: &mut Bencher) {
            let mut rng = SmallRng::seed_from_u64(0x5432_1012_3454_3210);
            let mut full = <$ty as Sequence<u32>>::new();
            for _ in 0..$n {
                full.push(rng.next_u32());
            }

            b.iter(|| {
                let mut seq = full.clone();
                while seq.len() > 0 {
                    let at = rng.gen_range(0..seq.len());
                    seq.erase(at);
                }
                seq
            })
        }
    };
}

mod relovec_dyn_array {
    use super::Sequence;
    use relovec::DynArray;
    use test::Bencher;
    use rand::{rngs::SmallRng, Rng, RngCore, SeedableRng};

    impl<T> Sequence<T> for DynArray<T> {
        fn new() -> Self {
            DynArray::new()
        }

        fn push(&mut self, value: T) {
            DynArray::push(self, value);
        }

        fn insert(&mut self, index: usize, value: T) {
            DynArray::insert(self, index, value);
        }

        fn erase(&mut self, index: usize) {
            DynArray::erase(self, index);
        }

        fn len(&self) -> usize {
            DynArray::len(self)
        }
    }

    pushes!(dyn_array_16_pushes, DynArray<u32>, 16);
    pushes!(dyn_array_256_pushes, DynArray<u32>, 256);
    pushes!(dyn_array_4096_pushes, DynArray<u32>, 4096);

    insertions!(dyn_array_16_inserts, DynArray<u32>, 16);
    insertions!(dyn_array_256_inserts, DynArray<u32>, 256);
    insertions!(dyn_array_1024_inserts, DynArray<u32>, 1024);

    erasures!(dyn_array_16_erasures, DynArray<u32>, 16);
    erasures!(dyn_array_256_erasures, DynArray<u32>, 256);
    erasures!(dyn_array_1024_erasures, DynArray<u32>, 1024);
}

mod std_vec {
    use super::Sequence;
    use std::vec::Vec as StdVec;
    use test::Bencher;
    use rand::{rngs::SmallRng, Rng, RngCore, SeedableRng};

    impl<T> Sequence<T> for StdVec<T> {
        fn new() -> Self {
            StdVec::new()
        }

        fn push(&mut self, value: T) {
            StdVec::push(self, value);
        }

        fn insert(&mut self, index: usize, value: T) {
            StdVec::insert(self, index, value);
        }

        fn erase(&mut self, index: usize) {
            StdVec::remove(self, index);
        }

        fn len(&self) -> usize {
            StdVec::len(self)
        }
    }

    pushes!(std_vec_16_pushes, StdVec<u32>, 16);
    pushes!(std_vec_256_pushes, StdVec<u32>, 256);
    pushes!(std_vec_4096_pushes, StdVec<u32>, 4096);

    insertions!(std_vec_16_inserts, StdVec<u32>, 16);
    insertions!(std_vec_256_inserts, StdVec<u32>, 256);
    insertions!(std_vec_1024_inserts, StdVec<u32>, 1024);

    erasures!(std_vec_16_erasures, StdVec<u32>, 16);
    erasures!(std_vec_256_erasures, StdVec<u32>, 256);
    erasures!(std_vec_1024_erasures, StdVec<u32>, 1024);
}
