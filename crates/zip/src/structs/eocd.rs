#![allow(unused)]

use memchr::memmem;
use winnow::binary::{le_u16, le_u32};
use winnow::prelude::*;
use winnow::token::take;

/// End of Central Directory record.
///
/// See: <https://en.wikipedia.org/wiki/ZIP_(file_format)#End_of_central_directory_record_(EOCD)>
#[derive(Debug)]
pub(crate) struct EndOfCentralDirectory {
    pub(crate) disk_number: u16,
    pub(crate) disk_with_central_dir: u16,
    pub(crate) entries_on_this_disk: u16,
    pub(crate) total_entries: u16,
    pub(crate) central_dir_size: u32,
    pub(crate) central_dir_offset: u32,
    pub(crate) comment_length: u16,
}

impl EndOfCentralDirectory {
    const MAGIC: u32 = 0x06054b50;

    /// Maximum size of the trailing comment we search through; the EoCD record itself
    /// is fixed at 22 bytes, so the comment plus signature fits in a 64 KiB window.
    const MAX_COMMENT_SIZE: usize = 0xffff;

    /// Find the offset of the EoCD signature by scanning backward from the end
    /// of the buffer, bounded by `window` bytes.
    pub(crate) fn find_eocd(input: &[u8], window: usize) -> Option<usize> {
        let search_start = input.len().saturating_sub(window.min(Self::MAX_COMMENT_SIZE) + 22);
        let haystack = &input[search_start..];

        memmem::rfind(haystack, &Self::MAGIC.to_le_bytes()).map(|pos| search_start + pos)
    }

    #[inline(always)]
    pub(crate) fn parse(input: &mut &[u8]) -> ModalResult<EndOfCentralDirectory> {
        let (
            _,
            disk_number,
            disk_with_central_dir,
            entries_on_this_disk,
            total_entries,
            central_dir_size,
            central_dir_offset,
            comment_length,
        ) = (
            le_u32.verify(|magic| *magic == Self::MAGIC),
            le_u16,
            le_u16,
            le_u16,
            le_u16,
            le_u32,
            le_u32,
            le_u16,
        )
            .parse_next(input)?;

        Ok(EndOfCentralDirectory {
            disk_number,
            disk_with_central_dir,
            entries_on_this_disk,
            total_entries,
            central_dir_size,
            central_dir_offset,
            comment_length,
        })
    }
}
