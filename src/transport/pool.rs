use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use crate::error::{S9Result, S9ChannelError};
use crate::listener::PooledBuffer;
use super::options::DriverOptions;

// ============================================================================
// SegmentPool - Reusable storage for inbound binary payloads
// ============================================================================

/// A bounded free list of byte segments shared by the channels of one driver.
///
/// Cloning yields another handle to the same pool.
#[derive(Debug, Clone)]
pub struct SegmentPool {
    segment_size: usize,
    free_tx: Sender<Vec<u8>>,
    free_rx: Receiver<Vec<u8>>,
}

impl SegmentPool {
    /// Creates a pool of segments of `segment_size` bytes keeping up to `capacity` freed segments.
    /// Both must be greater than zero
    pub fn new(segment_size: usize, capacity: usize) -> S9Result<Self> {
        if segment_size == 0 {
            return Err(S9ChannelError::InvalidConfiguration("Segment size cannot be zero".to_string()));
        }
        if capacity == 0 {
            return Err(S9ChannelError::InvalidConfiguration("Pool capacity cannot be zero".to_string()));
        }
        Ok(Self::with_sizes(segment_size, capacity))
    }

    /// Builds the pool from options whose sizes were validated when set.
    pub(crate) fn from_options(options: &DriverOptions) -> Self {
        Self::with_sizes(options.segment_size, options.pool_capacity)
    }

    fn with_sizes(segment_size: usize, capacity: usize) -> Self {
        let (free_tx, free_rx) = bounded(capacity);
        SegmentPool {
            segment_size,
            free_tx,
            free_rx,
        }
    }

    #[inline]
    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Number of freed segments ready for reuse.
    #[inline]
    pub fn available(&self) -> usize {
        self.free_rx.len()
    }

    /// Copies `data` into pooled segments of at most `segment_size` bytes each.
    pub fn fill(&self, data: &[u8]) -> PooledSegments {
        let segments = data
            .chunks(self.segment_size)
            .map(|chunk| {
                let mut segment = self.acquire();
                segment.extend_from_slice(chunk);
                segment
            })
            .collect();
        PooledSegments {
            segments,
            free_tx: self.free_tx.clone(),
        }
    }

    fn acquire(&self) -> Vec<u8> {
        match self.free_rx.try_recv() {
            Ok(segment) => segment,
            Err(_) => Vec::with_capacity(self.segment_size),
        }
    }
}

/// Binary payload held in segments borrowed from a [`SegmentPool`].
#[derive(Debug)]
pub struct PooledSegments {
    segments: Vec<Vec<u8>>,
    free_tx: Sender<Vec<u8>>,
}

impl PooledSegments {
    pub fn total_len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

impl PooledBuffer for PooledSegments {
    type Segment = Vec<u8>;

    fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    fn free(self) {
        for mut segment in self.segments {
            segment.clear();
            match self.free_tx.try_send(segment) {
                Ok(()) => {},
                // Pool is at capacity, surplus segments are dropped
                Err(TrySendError::Full(_)) => {},
                Err(TrySendError::Disconnected(_)) => {
                    tracing::trace!("Segment pool dropped before segment was freed");
                }
            }
        }
    }
}
