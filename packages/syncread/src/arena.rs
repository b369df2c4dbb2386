//! Fixed-capacity byte store backing one channel.

use crate::error::TransferFault;
use bytes::{Buf, BufMut};


// zero-initialized byte store whose capacity never changes after construction.
//
// all offset arithmetic for a channel's buffer goes through here. `clamp` is the single place the
// truncation policy lives; the copy operations reject any range that does not lie entirely within
// the store.
pub(crate) struct Arena {
    bytes: Box<[u8]>,
}

impl Arena {
    // allocate and zero the store.
    pub(crate) fn new(capacity: usize) -> Self {
        Arena {
            bytes: vec![0; capacity].into_boxed_slice(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    // number of the `count` bytes starting at `offset` which lie within capacity. bytes past
    // capacity are dropped, never an error.
    pub(crate) fn clamp(&self, offset: usize, count: usize) -> usize {
        count.min(self.capacity().saturating_sub(offset))
    }

    // copy `count` bytes starting at `offset` out to `dst`.
    //
    // faults without writing anything to `dst` if `dst` can not take `count` bytes or the range
    // exceeds capacity.
    pub(crate) fn copy_out(
        &self,
        offset: usize,
        count: usize,
        dst: &mut dyn BufMut,
    ) -> Result<(), TransferFault> {
        if count == 0 {
            return Ok(());
        }
        if dst.remaining_mut() < count {
            return Err(TransferFault);
        }
        let src = self.range(offset, count)?;
        dst.put_slice(src);
        Ok(())
    }

    // copy `count` bytes from `src` into the store starting at `offset`.
    //
    // faults without touching the store or advancing `src` if `src` holds fewer than `count`
    // bytes or the range exceeds capacity.
    pub(crate) fn copy_in(
        &mut self,
        offset: usize,
        count: usize,
        src: &mut dyn Buf,
    ) -> Result<(), TransferFault> {
        if count == 0 {
            return Ok(());
        }
        if src.remaining() < count {
            return Err(TransferFault);
        }
        let dst = self.range_mut(offset, count)?;
        src.copy_to_slice(dst);
        Ok(())
    }

    fn range(&self, offset: usize, count: usize) -> Result<&[u8], TransferFault> {
        let end = offset.checked_add(count).ok_or(TransferFault)?;
        self.bytes.get(offset..end).ok_or(TransferFault)
    }

    fn range_mut(&mut self, offset: usize, count: usize) -> Result<&mut [u8], TransferFault> {
        let end = offset.checked_add(count).ok_or(TransferFault)?;
        self.bytes.get_mut(offset..end).ok_or(TransferFault)
    }
}
