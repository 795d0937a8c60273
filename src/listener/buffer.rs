use super::types::PooledBuffer;

// ============================================================================
// Pooled buffer release
// ============================================================================

/// Owns a pooled buffer until it is released, and frees it on drop otherwise.
///
/// The buffer is freed exactly once on every exit path, including unwinding.
pub(crate) struct PooledGuard<B: PooledBuffer> {
    buffer: Option<B>,
}

impl<B: PooledBuffer> PooledGuard<B> {
    pub(crate) fn new(buffer: B) -> Self {
        PooledGuard { buffer: Some(buffer) }
    }

    /// Merges all segments into one contiguous, independently owned byte vector.
    pub(crate) fn to_merged_vec(&self) -> Vec<u8> {
        match &self.buffer {
            Some(buffer) => merge_segments(buffer.segments()),
            None => Vec::new(),
        }
    }

    pub(crate) fn release(mut self) {
        self.free_once();
    }

    fn free_once(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            buffer.free();
        }
    }
}

impl<B: PooledBuffer> Drop for PooledGuard<B> {
    fn drop(&mut self) {
        self.free_once();
    }
}

/// Copies the payload out of `buffer`, then frees it. The buffer is never touched afterwards.
pub(crate) fn copy_and_release<B: PooledBuffer>(buffer: B) -> Vec<u8> {
    let guard = PooledGuard::new(buffer);
    let data = guard.to_merged_vec();
    guard.release();
    data
}

#[inline]
pub(crate) fn merge_segments<S: AsRef<[u8]>>(segments: &[S]) -> Vec<u8> {
    let total = segments.iter().map(|s| s.as_ref().len()).sum();
    let mut merged = Vec::with_capacity(total);
    for segment in segments {
        merged.extend_from_slice(segment.as_ref());
    }
    merged
}
