/// Maximum number of APIs sent in one upload request.
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Splits `entities` into contiguous, order-preserving chunks of at most
/// `max_size` items. Empty input yields no chunks.
///
/// # Panics
/// If `max_size` is zero.
pub fn split<T>(entities: &[T], max_size: usize) -> Vec<&[T]> {
    assert!(max_size > 0, "chunk size must be greater than zero");
    entities.chunks(max_size).collect()
}
