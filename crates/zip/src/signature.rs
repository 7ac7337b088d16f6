use der::Decode;
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;
use x509_cert::Certificate;

use crate::errors::CertificateError;

/// Describe used signature scheme in APK
///
/// Basic overview: <https://source.android.com/docs/security/features/apksigning>
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// Default signature scheme based on JAR signing
    ///
    /// See: <https://source.android.com/docs/security/features/apksigning/v2#v1-verification>
    V1(Vec<CertificateInfo>),

    /// APK signature scheme v2
    ///
    /// See: <https://source.android.com/docs/security/features/apksigning/v2>
    V2(Vec<CertificateInfo>),

    /// APK signature scheme v3
    ///
    /// See: <https://source.android.com/docs/security/features/apksigning/v3>
    ///
    /// Detected but not parsed further; out of scope.
    V3,

    /// Got something that we don't know, preserved but not interpreted
    Unknown,
}

impl Signature {
    pub fn name(&self) -> String {
        match self {
            Signature::V1(_) => "v1".to_owned(),
            Signature::V2(_) => "v2".to_owned(),
            Signature::V3 => "v3".to_owned(),
            Signature::Unknown => "unknown".to_owned(),
        }
    }
}

/// Represents detailed information about an APK signing certificate.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CertificateInfo {
    /// The serial number of the certificate.
    pub serial_number: String,

    /// The subject of the certificate (typically the entity that signed the APK).
    pub subject: String,

    /// The date and time when the certificate becomes valid.
    pub valid_from: String,

    /// The date and time when the certificate expires.
    pub valid_until: String,

    /// The type of signature algorithm used (e.g., RSA, ECDSA).
    pub signature_type: String,

    /// MD5 fingerprint of the certificate.
    pub md5_fingerprint: String,

    /// SHA-1 fingerprint of the certificate.
    pub sha1_fingerprint: String,

    /// SHA-256 fingerprint of the certificate.
    pub sha256_fingerprint: String,

    /// The raw DER bytes of the certificate, as extracted from the archive.
    pub der: Vec<u8>,
}

impl CertificateInfo {
    /// Decode a DER-encoded X.509 certificate and compute its fingerprints.
    ///
    /// Grounded in the corpus's `get_certificate_info`, but walks the certificate
    /// with a pure ASN.1 decoder instead of linking a full X.509 library for it.
    pub fn from_der(der: &[u8]) -> Result<CertificateInfo, CertificateError> {
        let certificate = Certificate::from_der(der)?;
        let tbs = &certificate.tbs_certificate;

        let serial_number = const_hex::encode(tbs.serial_number.as_bytes());
        let subject = tbs.subject.to_string();
        let valid_from = tbs.validity.not_before.to_string();
        let valid_until = tbs.validity.not_after.to_string();
        let signature_type = tbs.signature.oid.to_string();

        let md5_fingerprint = const_hex::encode(Md5::digest(der));
        let sha1_fingerprint = const_hex::encode(Sha1::digest(der));
        let sha256_fingerprint = const_hex::encode(Sha256::digest(der));

        Ok(CertificateInfo {
            serial_number,
            subject,
            valid_from,
            valid_until,
            signature_type,
            md5_fingerprint,
            sha1_fingerprint,
            sha256_fingerprint,
            der: der.to_vec(),
        })
    }
}

/// Representation of signature algorithm
///
/// More info: <https://source.android.com/docs/security/features/apksigning/v2#signature-algorithm-ids>
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// RSASSA-PSS with SHA2-256 digest, SHA2-256 MGF1, 32 bytes of salt, trailer: 0xbc
    RsassaPssSha256 = 0x0101,

    /// RSASSA-PSS with SHA2-512 digest, SHA2-512 MGF1, 64 bytes of salt, trailer: 0xbc
    RsassaPssSha512 = 0x0102,

    /// RSASSA-PKCS1-v1_5 with SHA2-256 digest (deterministic signatures)
    RsassaPkcs1v15Sha256 = 0x0103,

    /// RSASSA-PKCS1-v1_5 with SHA2-512 digest (deterministic signatures)
    RsassaPkcs1v15Sha512 = 0x0104,

    /// ECDSA with SHA2-256 digest
    EcdsaSha256 = 0x0201,

    /// ECDSA with SHA2-512 digest
    EcdsaSha512 = 0x0202,

    /// DSA with SHA2-256 digest
    DsaSha256 = 0x0301,
}
