use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indexes used to fit the model.
///
/// `n_test = ceil(test_size * n)`; the remaining rows, taken from a seeded
/// shuffle, form the training set. Returned ascending.
pub fn train_indices(n: usize, test_size: f64, seed: u64) -> Vec<usize> {
    let n_train = train_size(n, test_size);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut train: Vec<usize> = indices.into_iter().take(n_train).collect();
    train.sort_unstable();
    train
}

pub fn train_size(n: usize, test_size: f64) -> usize {
    let n_test = ((test_size * n as f64).ceil() as usize).min(n);
    n - n_test
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_ceil_of_test_share() {
        assert_eq!(train_indices(100, 0.9, 101).len(), 10);
        assert_eq!(train_indices(25, 0.9, 101).len(), 2);
        assert_eq!(train_indices(5, 0.0, 101).len(), 5);
        assert!(train_indices(0, 0.9, 101).is_empty());
    }

    #[test]
    fn same_seed_same_split() {
        assert_eq!(train_indices(200, 0.9, 101), train_indices(200, 0.9, 101));
    }

    #[test]
    fn indices_are_unique_and_in_range() {
        let train = train_indices(50, 0.5, 7);
        assert_eq!(train.len(), 25);
        assert!(train.windows(2).all(|w| w[0] < w[1]));
        assert!(train.iter().all(|i| *i < 50));
    }
}
