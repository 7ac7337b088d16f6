use bitflags::bitflags;
use log::warn;
use winnow::binary::{le_u8, le_u16, le_u32};
use winnow::combinator::repeat;
use winnow::error::{ErrMode, Needed};
use winnow::prelude::*;
use winnow::token::take;

use crate::structs::common::ResChunkHeader;

bitflags! {
    #[derive(Debug)]
    pub(crate) struct StringType: u32 {
        const Sorted = 1 << 0;
        const Utf8 = 1 << 8;
    }
}

#[derive(Debug)]
pub(crate) struct ResStringPoolHeader {
    pub(crate) header: ResChunkHeader,
    pub(crate) string_count: u32,
    pub(crate) style_count: u32,
    pub(crate) flags: u32,
    pub(crate) strings_start: u32,
    pub(crate) styles_start: u32,
}

impl ResStringPoolHeader {
    pub(crate) fn parse(input: &mut &[u8]) -> ModalResult<ResStringPoolHeader> {
        let header = ResChunkHeader::parse(input)?;
        let (string_count, style_count, flags, strings_start, styles_start) =
            (le_u32, le_u32, le_u32, le_u32, le_u32).parse_next(input)?;

        Ok(ResStringPoolHeader {
            header,
            string_count,
            style_count,
            flags,
            strings_start,
            styles_start,
        })
    }

    #[inline]
    pub(crate) fn is_sorted(&self) -> bool {
        StringType::from_bits_truncate(self.flags).contains(StringType::Sorted)
    }

    #[inline]
    pub(crate) fn is_utf8(&self) -> bool {
        StringType::from_bits_truncate(self.flags).contains(StringType::Utf8)
    }
}

/// Decoded string pool chunk (`ResStringPool`): the interned string table
/// shared by an AXML document or an ARSC resource table.
///
/// See: https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=308
#[derive(Debug)]
pub(crate) struct StringPool {
    pub(crate) header: ResStringPoolHeader,
    pub(crate) string_offsets: Vec<u32>,
    pub(crate) style_offsets: Vec<u32>,
    pub(crate) strings: Vec<String>,

    pub(crate) invalid_string_count: bool,
}

impl StringPool {
    pub(crate) fn parse(input: &mut &[u8]) -> ModalResult<StringPool> {
        let mut string_header = ResStringPoolHeader::parse(input)?;

        let mut invalid_string_count = false;
        let calculated_string_count =
            (string_header.strings_start - (string_header.style_count * 4 + 28)) / 4;

        if calculated_string_count != string_header.string_count {
            string_header.string_count = calculated_string_count;
            invalid_string_count = true;
        }

        let string_offsets =
            repeat(string_header.string_count as usize, le_u32).parse_next(input)?;

        let style_offsets = repeat(string_header.style_count as usize, le_u32).parse_next(input)?;

        let strings = Self::parse_strings(input, &string_header, &string_offsets)?;

        Ok(StringPool {
            header: string_header,
            string_offsets,
            style_offsets,
            strings,
            invalid_string_count,
        })
    }

    fn parse_strings(
        input: &mut &[u8],
        string_header: &ResStringPoolHeader,
        string_offsets: &[u32],
    ) -> ModalResult<Vec<String>> {
        let string_pool_size = (string_header.header.size - string_header.strings_start) as usize;

        // take just the string chunk, malware tampers with trailing data
        let (slice, rest) = input
            .split_at_checked(string_pool_size)
            .ok_or_else(|| ErrMode::Incomplete(Needed::Unknown))?;
        *input = rest;

        let is_utf8 = string_header.is_utf8();
        let mut strings = Vec::with_capacity(string_header.string_count as usize);

        for &offset in string_offsets {
            let Some(entry) = slice.get(offset as usize..) else {
                warn!("string pool offset {offset} out of bounds");
                continue;
            };

            match Self::parse_string(&mut &*entry, is_utf8) {
                Ok(s) => strings.push(s),
                Err(_) => warn!("failed to decode string at offset {offset}"),
            }
        }

        Ok(strings)
    }

    /// Variable-length string length prefix shared by the UTF-8 and UTF-16
    /// encodings: if the high bit of the first unit is set, the length
    /// spans two units, with the high bit masked off.
    fn decode_length_u8(input: &mut &[u8]) -> ModalResult<u32> {
        let first = le_u8(input)?;
        if first & 0x80 != 0 {
            let second = le_u8(input)?;
            Ok((((first & 0x7f) as u32) << 8) | second as u32)
        } else {
            Ok(first as u32)
        }
    }

    fn decode_length_u16(input: &mut &[u8]) -> ModalResult<u32> {
        let first = le_u16(input)?;
        if first & 0x8000 != 0 {
            let second = le_u16(input)?;
            Ok((((first & 0x7fff) as u32) << 16) | second as u32)
        } else {
            Ok(first as u32)
        }
    }

    fn parse_string(input: &mut &[u8], is_utf8: bool) -> ModalResult<String> {
        let string = if !is_utf8 {
            let char_len = Self::decode_length_u16(input)? as usize;
            let content = take(char_len * 2).parse_next(input)?;
            // NUL terminator
            let _ = le_u16(input)?;

            Self::read_utf16(content, char_len)
        } else {
            // UTF-8 pool strings carry two length prefixes: the UTF-16
            // character count, then the UTF-8 byte count actually on disk.
            let _char_len = Self::decode_length_u8(input)?;
            let byte_len = Self::decode_length_u8(input)? as usize;

            let content = take(byte_len).parse_next(input)?;
            // NUL terminator
            let _ = le_u8(input)?;

            String::from_utf8_lossy(content).to_string()
        };

        Ok(string)
    }

    fn read_utf16(slice: &[u8], size: usize) -> String {
        std::char::decode_utf16(
            slice
                .chunks_exact(2)
                .take(size)
                .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]])),
        )
        .collect::<Result<String, _>>()
        .unwrap_or_default()
    }

    pub(crate) fn get(&self, idx: u32) -> Option<&String> {
        self.strings.get(idx as usize)
    }

    /// Index of `value` within this pool, if present.
    pub(crate) fn position(&self, value: &str) -> Option<usize> {
        self.strings.iter().position(|s| s == value)
    }
}
