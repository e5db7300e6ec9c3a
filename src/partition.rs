//! Splits a known file size across sender threads and, within each thread's
//! range, across fixed-size chunks.

use crate::Error;

/// A contiguous byte range of the file owned by one sender thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadRange {
    pub thread_id: usize,
    pub start_offset: u64,
    pub len: u64,
}

/// One chunk the partitioning plan calls for: its absolute offset (its Chunk
/// ID) and its payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunk_id: u64,
    pub payload_size: u32,
}

/// Divides `file_size` bytes across `n_threads` contiguous ranges: every
/// thread but the last gets `round(file_size / n_threads)` bytes, and the
/// last absorbs whatever remainder keeps the union exactly `[0, file_size)`.
pub fn partition_ranges(file_size: u64, n_threads: usize) -> Result<Vec<ThreadRange>, Error> {
    if n_threads == 0 {
        return Err(Error::BadPartition(file_size, n_threads));
    }

    let share = round_div(file_size, n_threads as u64);
    let mut ranges = Vec::with_capacity(n_threads);

    for thread_id in 0..n_threads.saturating_sub(1) {
        ranges.push(ThreadRange {
            thread_id,
            start_offset: thread_id as u64 * share,
            len: share,
        });
    }

    let last_id = n_threads - 1;
    let consumed = last_id as u64 * share;
    let remaining = file_size.saturating_sub(consumed);
    ranges.push(ThreadRange {
        thread_id: last_id,
        start_offset: consumed,
        len: remaining,
    });

    Ok(ranges)
}

/// Nearest-integer division with ties rounded to even, matching Python 3's
/// `round()` semantics used by the share computation this mirrors: an exact
/// `.5` tie rounds toward whichever neighbor is even, not always up.
fn round_div(numerator: u64, denominator: u64) -> u64 {
    let q = numerator / denominator;
    let r = numerator % denominator;
    let twice_r = r * 2;
    match twice_r.cmp(&denominator) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal if q % 2 == 0 => q,
        std::cmp::Ordering::Equal => q + 1,
    }
}

/// Walks a thread's range in `chunk_size` steps; the last chunk absorbs the
/// remainder, possibly shorter than `chunk_size`. A zero-length range yields
/// no chunks at all.
pub fn plan_chunks_for_range(range: &ThreadRange, chunk_size: u32) -> Vec<ChunkPlan> {
    if range.len == 0 {
        return Vec::new();
    }

    let chunk_size = chunk_size as u64;
    let mut chunks = Vec::with_capacity(((range.len + chunk_size - 1) / chunk_size) as usize);

    let mut offset = range.start_offset;
    let end = range.start_offset + range.len;
    while offset < end {
        let remaining = end - offset;
        let size = remaining.min(chunk_size) as u32;
        chunks.push(ChunkPlan {
            chunk_id: offset,
            payload_size: size,
        });
        offset += size as u64;
    }

    chunks
}

/// The true, fully reconciled set of chunks this session will ever send,
/// across every thread's range, in ascending offset order. This is what
/// seeds the Timer Table: it is always the true chunk walk, never a
/// precomputed count, so the table can never hold an entry for a chunk
/// that's never emitted or vice versa.
pub fn full_plan(file_size: u64, n_threads: usize, chunk_size: u32) -> Result<Vec<ChunkPlan>, Error> {
    let ranges = partition_ranges(file_size, n_threads)?;
    let mut plan = Vec::new();
    for range in &ranges {
        plan.extend(plan_chunks_for_range(range, chunk_size));
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split_covers_whole_file() {
        let ranges = partition_ranges(16, 2).unwrap();
        assert_eq!(
            ranges,
            vec![
                ThreadRange { thread_id: 0, start_offset: 0, len: 8 },
                ThreadRange { thread_id: 1, start_offset: 8, len: 8 },
            ]
        );
    }

    #[test]
    fn uneven_split_f15_n2() {
        // F=15, N=2 -> share = round(15/2): 7.5 is an exact tie, and 7 is
        // odd, so it rounds up to the even neighbor, 8.
        let ranges = partition_ranges(15, 2).unwrap();
        assert_eq!(ranges[0], ThreadRange { thread_id: 0, start_offset: 0, len: 8 });
        assert_eq!(ranges[1], ThreadRange { thread_id: 1, start_offset: 8, len: 7 });

        let plan = full_plan(15, 2, 4).unwrap();
        assert_eq!(
            plan,
            vec![
                ChunkPlan { chunk_id: 0, payload_size: 4 },
                ChunkPlan { chunk_id: 4, payload_size: 4 },
                ChunkPlan { chunk_id: 8, payload_size: 4 },
                ChunkPlan { chunk_id: 12, payload_size: 3 },
            ]
        );

        let covered: u64 = plan.iter().map(|c| c.payload_size as u64).sum();
        assert_eq!(covered, 15);
    }

    #[test]
    fn chunk_plan_exactly_covers_every_range() {
        for file_size in [0u64, 1, 4, 15, 16, 17, 1000, 12345] {
            for n in [1usize, 2, 3, 7] {
                let plan = full_plan(file_size, n, 4).unwrap();
                let covered: u64 = plan.iter().map(|c| c.payload_size as u64).sum();
                assert_eq!(covered, file_size, "file_size={file_size} n={n}");

                // Chunk ids are strictly increasing and each offset is where
                // the previous chunk left off: the intervals tile [0, F).
                let mut expected_next = 0u64;
                for chunk in &plan {
                    assert_eq!(chunk.chunk_id, expected_next);
                    expected_next = chunk.chunk_id + chunk.payload_size as u64;
                }
                assert_eq!(expected_next, file_size);
            }
        }
    }

    #[test]
    fn share_rounds_exact_ties_to_even() {
        // F=10, N=4 -> share = round(10/4) = round(2.5): 2 is even, so the
        // tie rounds down to 2, not up to 3.
        let ranges = partition_ranges(10, 4).unwrap();
        assert_eq!(ranges[0].len, 2);
        assert_eq!(ranges[1].len, 2);
        assert_eq!(ranges[2].len, 2);
        // Last thread absorbs the remainder: 10 - 3*2 = 4.
        assert_eq!(ranges[3].len, 4);
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(partition_ranges(10, 0).is_err());
    }
}
