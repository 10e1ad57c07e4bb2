// Round-robin cursor arithmetic. The pointer itself lives in the store
// (see `AllocationTx::read_pointer`); these helpers only do the math.

use crate::Error;

/// Position in the pending list for this pointer value. Euclidean so a
/// hand-edited negative pointer still lands in range.
pub fn select_index(pointer: i64, pending_count: usize) -> Result<usize, Error> {
    if pending_count == 0 {
        return Err(Error::Internal("select_index called on an empty pool".to_string()));
    }
    Ok(pointer.rem_euclid(pending_count as i64) as usize)
}

/// Next pointer value: `(pointer + 1) mod pool_size`.
pub fn advance(pointer: i64, pool_size: usize) -> Result<i64, Error> {
    if pool_size == 0 {
        return Err(Error::Internal("rotation pointer advanced with an empty pool".to_string()));
    }
    Ok(pointer.wrapping_add(1).rem_euclid(pool_size as i64))
}
