use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::SignedData;
use der::{Decode, Encode};
use flate2::Decompress;
use flate2::FlushDecompress;
use flate2::Status;
use log::warn;
use std::collections::HashMap;
use winnow::binary::le_u32;
use winnow::binary::le_u64;
use winnow::combinator::repeat;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take;

use crate::errors::CertificateError;
use crate::signature::CertificateInfo;
use crate::signature::Signature;
use crate::{
    errors::{FileCompressionType, ZipError},
    structs::{
        central_directory::CentralDirectory, eocd::EndOfCentralDirectory,
        local_file_header::LocalFileHeader,
    },
};

/// Represents a parsed ZIP archive, providing read-only random access to its entries.
pub struct ZipEntry {
    input: Vec<u8>,
    eocd: EndOfCentralDirectory,
    central_directory: CentralDirectory,
    local_headers: HashMap<String, LocalFileHeader>,
}

/// Implementation of common methods
impl ZipEntry {
    /// Search window (in bytes) used when scanning backward for the EoCD signature.
    ///
    /// Bounded by the maximum possible ZIP comment length (64 KiB).
    const EOCD_SEARCH_WINDOW: usize = 0xffff;

    pub fn new(input: Vec<u8>) -> Result<ZipEntry, ZipError> {
        // perform basic sanity check
        if !input.starts_with(b"PK\x03\x04") {
            return Err(ZipError::InvalidHeader);
        }

        let eocd_offset = EndOfCentralDirectory::find_eocd(&input, Self::EOCD_SEARCH_WINDOW)
            .ok_or(ZipError::NotFoundEOCD)?;

        let eocd = EndOfCentralDirectory::parse(&mut &input[eocd_offset..])
            .map_err(|_| ZipError::ParseError)?;

        let central_directory =
            CentralDirectory::parse(&input, &eocd).map_err(|_| ZipError::ParseError)?;

        let local_headers = central_directory
            .entries
            .iter()
            .filter_map(|(filename, entry)| {
                LocalFileHeader::parse(&input, entry.local_header_offset as usize)
                    .ok()
                    .map(|header| (filename.clone(), header))
            })
            .collect();

        Ok(ZipEntry {
            input,
            eocd,
            central_directory,
            local_headers,
        })
    }

    /// Get list of the filenames from zip archive
    pub fn namelist(&self) -> impl Iterator<Item = &String> {
        self.central_directory.entries.keys()
    }

    /// Read a file from the archive, tolerating the BadPack tamper technique
    /// where the local and central-directory headers disagree on size.
    pub fn read(&self, filename: &str) -> Result<(Vec<u8>, FileCompressionType), ZipError> {
        let local_header = self
            .local_headers
            .get(filename)
            .ok_or(ZipError::FileNotFound)?;

        let central_directory_entry = self
            .central_directory
            .entries
            .get(filename)
            .ok_or(ZipError::FileNotFound)?;

        let (compressed_size, uncompressed_size) =
            if local_header.compressed_size == 0 || local_header.uncompressed_size == 0 {
                (
                    central_directory_entry.compressed_size as usize,
                    central_directory_entry.uncompressed_size as usize,
                )
            } else {
                (
                    local_header.compressed_size as usize,
                    local_header.uncompressed_size as usize,
                )
            };

        let offset = central_directory_entry.local_header_offset as usize + local_header.size();
        let get_slice = |start: usize, end: usize| self.input.get(start..end).ok_or(ZipError::EOF);

        match (
            local_header.compression_method,
            compressed_size == uncompressed_size,
        ) {
            (0, _) => {
                let slice = get_slice(offset, offset + uncompressed_size)?;
                Ok((slice.to_vec(), FileCompressionType::Stored))
            }
            (8, _) => {
                let compressed_data = get_slice(offset, offset + compressed_size)?;
                let mut uncompressed_data = Vec::with_capacity(uncompressed_size);

                Decompress::new(false)
                    .decompress_vec(
                        compressed_data,
                        &mut uncompressed_data,
                        FlushDecompress::Finish,
                    )
                    .map_err(|_| ZipError::DecompressionError)?;

                Ok((uncompressed_data, FileCompressionType::Deflated))
            }
            (_, true) => {
                let slice = get_slice(offset, offset + uncompressed_size)?;
                Ok((slice.to_vec(), FileCompressionType::StoredTampered))
            }
            (_, false) => {
                let compressed_data = get_slice(offset, offset + compressed_size)?;
                let mut uncompressed_data = Vec::with_capacity(uncompressed_size);
                let mut decompressor = Decompress::new(false);

                let status = decompressor.decompress_vec(
                    compressed_data,
                    &mut uncompressed_data,
                    FlushDecompress::Finish,
                );

                let is_valid = decompressor.total_in() == compressed_data.len() as u64;
                match status {
                    Ok(Status::Ok) | Ok(Status::StreamEnd) if is_valid => {
                        Ok((uncompressed_data, FileCompressionType::DeflatedTampered))
                    }
                    _ => {
                        let slice = get_slice(offset, offset + uncompressed_size)?;
                        Ok((slice.to_vec(), FileCompressionType::StoredTampered))
                    }
                }
            }
        }
    }

    /// Check every entry's decompressed bytes against its declared CRC32.
    ///
    /// A single failure is reported as `Broken` without identifying the
    /// offending entry, per the documented contract.
    pub fn test_integrity(&self) -> Result<(), ZipError> {
        for (filename, central_entry) in &self.central_directory.entries {
            let (data, _) = self.read(filename)?;
            if crc32fast::hash(&data) != central_entry.crc32 {
                return Err(ZipError::ParseError);
            }
        }
        Ok(())
    }
}

/// Implementation for locating and extracting signing certificates.
impl ZipEntry {
    const APK_SIGNATURE_MAGIC: &[u8] = b"APK Sig Block 42";
    const SIGNATURE_V2_MAGIC: u32 = 0x7109871a;
    const SIGNATURE_V3_MAGIC: u32 = 0xf05368c0;

    /// Source stamp block, preserved but not interpreted.
    const SOURCE_STAMP_BLOCK_ID: u32 = 0x6dff800d;

    /// Verity padding block, preserved but not interpreted.
    ///
    /// More info: <https://android.googlesource.com/platform/tools/apksig/+/refs/heads/master/src/main/java/com/android/apksig/internal/apk/ApkSigningBlockUtils.java#100>
    const VERITY_PADDING_BLOCK_ID: u32 = 0x42726577;

    /// Signing block id for SDK dependency block, preserved but not interpreted.
    const DEPENDENCY_INFO_BLOCK_ID: u32 = 0x504b4453;

    /// Attribute id indicating whether a newer signature scheme was stripped,
    /// preserved but not interpreted.
    const STRIPPING_PROTECTION_ATTR_ID: u32 = 0xbeeff00d;

    /// Entry names matching `META-INF/*.{RSA,EC,DSA}`, in archive order.
    fn v1_signature_files(&self) -> Vec<&String> {
        self.namelist()
            .filter(|name| {
                name.starts_with("META-INF/")
                    && (name.ends_with(".DSA") || name.ends_with(".EC") || name.ends_with(".RSA"))
            })
            .collect()
    }

    /// Cheap presence check for a v1 (JAR) signature - just scans entry names,
    /// no PKCS#7 decode.
    pub fn has_v1_signature(&self) -> bool {
        !self.v1_signature_files().is_empty()
    }

    /// Enumerate every `META-INF/*.{RSA,EC,DSA}` entry, DER-decode its PKCS#7
    /// SignedData envelope and flatten all embedded certificates, each enriched
    /// into a [`CertificateInfo`].
    pub fn get_certificates_v1(&self) -> Result<Vec<Signature>, CertificateError> {
        let signature_files = self.v1_signature_files();
        if signature_files.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = Vec::with_capacity(signature_files.len());
        for signature_file in signature_files {
            let (data, _) = self
                .read(signature_file)
                .map_err(CertificateError::ZipError)?;

            let der_certificates = Self::extract_pkcs7_certificate_der(&data)?;
            if der_certificates.is_empty() {
                continue;
            }

            let certificates = der_certificates
                .iter()
                .map(|der| CertificateInfo::from_der(der))
                .collect::<Result<Vec<_>, _>>()?;

            result.push(Signature::V1(certificates));
        }

        Ok(result)
    }

    /// Raw DER bytes of every v1 (JAR) certificate, independent of the
    /// [`CertificateInfo`] enrichment [`ZipEntry::get_certificates_v1`] builds on top.
    pub fn get_certificates_der_v1(&self) -> Result<Vec<Vec<u8>>, CertificateError> {
        let mut result = Vec::new();
        for signature_file in self.v1_signature_files() {
            let (data, _) = self
                .read(signature_file)
                .map_err(CertificateError::ZipError)?;
            result.extend(Self::extract_pkcs7_certificate_der(&data)?);
        }

        Ok(result)
    }

    /// Walk a DER-encoded PKCS#7 SignedData envelope and return every
    /// embedded X.509 certificate as raw DER bytes.
    ///
    /// Per the design notes, this is a proper ASN.1 DER walk (RFC 5652)
    /// rather than a byte-level `A0`-tag-stripping heuristic.
    fn extract_pkcs7_certificate_der(der_bytes: &[u8]) -> Result<Vec<Vec<u8>>, CertificateError> {
        let content_info = ContentInfo::from_der(der_bytes)?;
        let signed_data: SignedData = content_info
            .content
            .decode_as()
            .map_err(|_| CertificateError::ParseError)?;

        let certificate_set = match signed_data.certificates {
            Some(set) => set,
            None => return Ok(Vec::new()),
        };

        let mut certificates = Vec::new();
        for choice in certificate_set.0.iter() {
            if let CertificateChoices::Certificate(certificate) = choice {
                let der = certificate
                    .to_der()
                    .map_err(|e| CertificateError::DerError(e.into()))?;
                certificates.push(der);
            }
        }

        Ok(certificates)
    }

    /// Locate the APK Signing Block's raw key-value pair stream, per §4.4
    /// steps 1-3. Returns `Ok(None)` when there's no signing block at all -
    /// absence isn't an error, just an unsigned (or v1-only) archive. A
    /// present-but-inconsistent block (size prefix/suffix mismatch, §4.4 step 3)
    /// is still surfaced as `Err(InvalidFormat)`.
    fn signing_block_pairs(&self) -> Result<Option<&[u8]>, CertificateError> {
        let offset = self.eocd.central_dir_offset as usize;
        let Some(mut slice) = self.input.get(offset.saturating_sub(24)..offset) else {
            return Ok(None);
        };

        let parsed: Result<(u64, &[u8]), _> = (
            le_u64::<&[u8], ContextError>,
            take(16usize).verify(|magic: &[u8]| magic == Self::APK_SIGNATURE_MAGIC),
        )
            .parse_next(&mut slice);
        let Ok((size_of_block, _)) = parsed else {
            return Ok(None);
        };

        let Some(mut prefix_slice) = self.input.get(
            offset.saturating_sub((size_of_block + 8) as usize)..offset.saturating_sub(24),
        ) else {
            return Ok(None);
        };

        let size_of_block_start = le_u64::<&[u8], ContextError>
            .parse_next(&mut prefix_slice)
            .map_err(|_| CertificateError::ParseError)?;

        if size_of_block != size_of_block_start {
            return Err(CertificateError::InvalidFormat(
                size_of_block_start,
                size_of_block,
            ));
        }

        Ok(Some(prefix_slice))
    }

    /// Cheap presence check for a v2 signing block - scans pair ids only, no
    /// certificate decode. Any parse failure (including a tampered block) is
    /// reported as "not signed", per §7's "signing block absent -> not an error".
    pub fn has_v2_signature(&self) -> bool {
        let Ok(Some(mut pairs)) = self.signing_block_pairs() else {
            return false;
        };

        while pairs.len() >= 12 {
            let Ok((size, id)) =
                (le_u64::<&[u8], ContextError>, le_u32::<&[u8], ContextError>).parse_next(&mut pairs)
            else {
                break;
            };

            if id == Self::SIGNATURE_V2_MAGIC {
                return true;
            }

            let Ok(_) = take(size.saturating_sub(4)).parse_next(&mut pairs) else {
                break;
            };
        }

        false
    }

    /// Locate and parse the APK Signing Block's v2 entry, per §4.4, enriching
    /// each certificate into a [`CertificateInfo`].
    pub fn get_certificates_v2(&self) -> Result<Vec<Signature>, CertificateError> {
        let Some(mut slice) = self.signing_block_pairs()? else {
            return Ok(Vec::new());
        };

        let blocks: Vec<Signature> = repeat(0.., Self::parse_apk_signatures())
            .parse_next(&mut slice)
            .map_err(|_| CertificateError::ParseError)?;

        let filtered: Vec<Signature> = blocks
            .into_iter()
            .filter(|signature| *signature != Signature::Unknown)
            .collect();

        Ok(filtered)
    }

    /// Raw DER bytes of every v2 certificate, independent of the
    /// [`CertificateInfo`] enrichment [`ZipEntry::get_certificates_v2`] builds
    /// on top.
    pub fn get_certificates_der_v2(&self) -> Result<Vec<Vec<u8>>, CertificateError> {
        let Some(mut slice) = self.signing_block_pairs()? else {
            return Ok(Vec::new());
        };

        let mut certificates = Vec::new();
        while !slice.is_empty() {
            let (size, id) = (le_u64::<&[u8], ContextError>, le_u32::<&[u8], ContextError>)
                .parse_next(&mut slice)
                .map_err(|_| CertificateError::ParseError)?;

            if id != Self::SIGNATURE_V2_MAGIC {
                take(size.saturating_sub(4))
                    .parse_next(&mut slice)
                    .map_err(|_| CertificateError::ParseError)?;
                continue;
            }

            let signers_length = le_u32::<&[u8], ContextError>
                .parse_next(&mut slice)
                .map_err(|_| CertificateError::ParseError)?;
            let mut signers_bytes = take(signers_length)
                .parse_next(&mut slice)
                .map_err(|_| CertificateError::ParseError)?;

            while !signers_bytes.is_empty() {
                let signer_length = le_u32::<&[u8], ContextError>
                    .parse_next(&mut signers_bytes)
                    .map_err(|_| CertificateError::ParseError)?;
                let mut signer_body = take(signer_length)
                    .parse_next(&mut signers_bytes)
                    .map_err(|_| CertificateError::ParseError)?;

                let signed_data_length = le_u32::<&[u8], ContextError>
                    .parse_next(&mut signer_body)
                    .map_err(|_| CertificateError::ParseError)?;
                let signed_data = take(signed_data_length)
                    .parse_next(&mut signer_body)
                    .map_err(|_| CertificateError::ParseError)?;

                match Self::parse_signed_data_certificate_der(signed_data) {
                    Ok(certs) => certificates.extend(certs),
                    Err(e) => warn!("failed to parse v2 signer signed_data: {e}"),
                }
            }
        }

        Ok(certificates)
    }

    fn parse_digest<'a>() -> impl Parser<&'a [u8], (u32, &'a [u8]), ContextError> {
        move |input: &mut &'a [u8]| {
            let _digest_length = le_u32.parse_next(input)?;
            let signature_algorithm_id = le_u32.parse_next(input)?;
            let digest_data_length = le_u32.parse_next(input)?;
            let digest = take(digest_data_length).parse_next(input)?;

            Ok((signature_algorithm_id, digest))
        }
    }

    fn parse_certificate_bytes<'a>() -> impl Parser<&'a [u8], &'a [u8], ContextError> {
        move |input: &mut &'a [u8]| {
            let certificate_length = le_u32.parse_next(input)?;
            take(certificate_length).parse_next(input)
        }
    }

    fn parse_attributes<'a>() -> impl Parser<&'a [u8], (u32, &'a [u8]), ContextError> {
        move |input: &mut &'a [u8]| {
            let attribute_length = le_u32.parse_next(input)?;
            let id = le_u32.parse_next(input)?;
            let value = take(attribute_length.saturating_sub(4)).parse_next(input)?;

            Ok((id, value))
        }
    }

    fn parse_signatures<'a>() -> impl Parser<&'a [u8], (u32, &'a [u8]), ContextError> {
        move |input: &mut &'a [u8]| {
            let _revision = le_u32.parse_next(input)?;
            let signature_algorithm_id = le_u32.parse_next(input)?;
            let signature_data_length = le_u32.parse_next(input)?;
            let signature = take(signature_data_length).parse_next(input)?;

            Ok((signature_algorithm_id, signature))
        }
    }

    /// Parse the `signed_data` blob of a single signer, extracting the raw DER
    /// bytes of its certificates.
    ///
    /// `signed_data` layout: `digests_size:u32, digests, certs_size:u32, certs, attrs_size:u32, attrs`.
    fn parse_signed_data_certificate_der(signed_data: &[u8]) -> Result<Vec<Vec<u8>>, CertificateError> {
        let mut input = signed_data;

        let digests_length = le_u32::<&[u8], ContextError>
            .parse_next(&mut input)
            .map_err(|_| CertificateError::ParseError)?;
        let mut digest_bytes = take(digests_length)
            .parse_next(&mut input)
            .map_err(|_| CertificateError::ParseError)?;
        let _digests: Vec<(u32, &[u8])> = repeat(0.., Self::parse_digest())
            .parse_next(&mut digest_bytes)
            .map_err(|_| CertificateError::ParseError)?;

        let certificates_length = le_u32::<&[u8], ContextError>
            .parse_next(&mut input)
            .map_err(|_| CertificateError::ParseError)?;
        let mut certificates_bytes = take(certificates_length)
            .parse_next(&mut input)
            .map_err(|_| CertificateError::ParseError)?;
        let raw_certificates: Vec<&[u8]> = repeat(0.., Self::parse_certificate_bytes())
            .parse_next(&mut certificates_bytes)
            .map_err(|_| CertificateError::ParseError)?;

        let attributes_length = le_u32::<&[u8], ContextError>
            .parse_next(&mut input)
            .map_err(|_| CertificateError::ParseError)?;
        let mut attributes_bytes = take(attributes_length)
            .parse_next(&mut input)
            .map_err(|_| CertificateError::ParseError)?;
        let _attributes: Vec<(u32, &[u8])> = repeat(0.., Self::parse_attributes())
            .parse_next(&mut attributes_bytes)
            .map_err(|_| CertificateError::ParseError)?;

        Ok(raw_certificates.iter().map(|der| der.to_vec()).collect())
    }

    /// Same as [`ZipEntry::parse_signed_data_certificate_der`], enriched into
    /// [`CertificateInfo`] - used by [`ZipEntry::get_certificates_v2`].
    fn parse_signed_data_certificates(signed_data: &[u8]) -> Result<Vec<CertificateInfo>, CertificateError> {
        Self::parse_signed_data_certificate_der(signed_data)?
            .iter()
            .map(|der| CertificateInfo::from_der(der))
            .collect()
    }

    fn parse_apk_signatures<'a>() -> impl Parser<&'a [u8], Signature, ContextError> {
        move |input: &mut &'a [u8]| {
            let (size, id) = (le_u64, le_u32).parse_next(input)?;

            match id {
                Self::SIGNATURE_V2_MAGIC => {
                    let signers_length = le_u32.parse_next(input)?;
                    let mut signers_bytes = take(signers_length).parse_next(input)?;

                    let mut certificates = Vec::new();
                    while !signers_bytes.is_empty() {
                        let signer_length = le_u32.parse_next(&mut signers_bytes)?;
                        let mut signer_body = take(signer_length).parse_next(&mut signers_bytes)?;

                        let signed_data_length = le_u32.parse_next(&mut signer_body)?;
                        let signed_data = take(signed_data_length).parse_next(&mut signer_body)?;

                        // the remainder of signer_body (signatures, public key) is not needed to
                        // enumerate certificates, and signers_bytes already advanced past it
                        match Self::parse_signed_data_certificates(signed_data) {
                            Ok(certs) => certificates.extend(certs),
                            Err(e) => warn!("failed to parse v2 signer signed_data: {e}"),
                        }
                    }

                    Ok(Signature::V2(certificates))
                }
                Self::SIGNATURE_V3_MAGIC => {
                    warn!("got v3 signature block (not parsed, out of scope) - 0x{id:08x}");
                    let _ = take(size.saturating_sub(4)).parse_next(input)?;

                    Ok(Signature::V3)
                }
                Self::SOURCE_STAMP_BLOCK_ID
                | Self::VERITY_PADDING_BLOCK_ID
                | Self::DEPENDENCY_INFO_BLOCK_ID
                | Self::STRIPPING_PROTECTION_ATTR_ID => {
                    let _ = take(size.saturating_sub(4)).parse_next(input)?;
                    Ok(Signature::Unknown)
                }
                _ => {
                    warn!("got unknown signing block id, skipping - 0x{id:08x}");
                    let _ = take(size.saturating_sub(4)).parse_next(input)?;

                    Ok(Signature::Unknown)
                }
            }
        }
    }
}
