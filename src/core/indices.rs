use hashbrown::HashMap;

/// Maps a key to positions in the append-only borrow record log.
pub type VecIndex<K> = HashMap<K, Vec<usize>>;
