use md5::{Digest, Md5};

const SIGN_MASK: u64 = 0x7FFF_FFFF_FFFF_FFFF;

/// Derives a Mihon source id the same way Mihon's `HttpSource` does:
/// MD5 of `"{lowercase name}/{lang}/{version}"`, first 8 bytes read as a
/// big-endian integer, sign bit cleared.
pub fn derive_source_id(name: &str, lang: &str, revision: i32) -> i64 {
    let key = format!("{}/{}/{}", name.to_lowercase(), lang, revision);
    let digest = Md5::digest(key.as_bytes());

    let value = digest
        .iter()
        .take(8)
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

    (value & SIGN_MASK) as i64
}
