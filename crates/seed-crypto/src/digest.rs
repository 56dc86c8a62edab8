use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256, Sha512};

/// Hex-encoded SHA-512 digest.
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// Hex-encoded SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// The hash certified for a seed: SHA-256 over the JSON text of its
/// embedding, detection confidence, and quality grade.
///
/// The text is laid out exactly as the nursery tooling writes it (fields in
/// that order, `", "` and `": "` separators, shortest round-trip floats with
/// a trailing `.0`, ASCII-only strings), so fingerprints agree across
/// deployments. A missing confidence or quality is hashed as `null`.
pub fn seed_fingerprint(
    embedding: &[f32],
    confidence: Option<f64>,
    quality: Option<&str>,
) -> String {
    #[derive(Serialize)]
    struct SeedDigestInput<'a> {
        embedding: Vec<f64>,
        confidence: Option<f64>,
        quality: Option<&'a str>,
    }

    let input = SeedDigestInput {
        embedding: embedding.iter().map(|v| f64::from(*v)).collect(),
        confidence,
        quality,
    };
    let mut text = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut text, SpacedFormatter);
    // writing into a Vec cannot fail
    if input.serialize(&mut serializer).is_err() {
        text.clear();
    }
    sha256_hex(&text)
}

/// `serde_json` formatter producing the spaced, ASCII-escaped layout.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(float_repr(value).as_bytes())
    }

    fn write_f32<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        self.write_f64(writer, f64::from(value))
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Shortest round-trip decimal, positional for decimal exponents in
/// `-4..16` and scientific (`1e-05`, `1.5e+16`) outside it.
///
/// Only called with finite values: `serde_json` writes NaN and infinities as
/// `null` before reaching the formatter.
fn float_repr(value: f64) -> String {
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let point = exponent + 1;

    if !(-4 < point && point <= 16) {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{lead}{fraction}e{exp_sign}{:02}", exponent.abs());
    }

    let body = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let point = point as usize;
        if point >= digits.len() {
            format!("{digits}{}.0", "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(&sha512_hex(b"seed")[..6], "7cf2e5");
        assert_eq!(sha512_hex(b"").len(), 128);
    }

    #[test]
    fn fingerprint_matches_nursery_tooling() {
        // sha256 of `{"embedding": [0.25, -1.0, 3.5], "confidence": 0.91, "quality": "good"}`
        assert_eq!(
            seed_fingerprint(&[0.25, -1.0, 3.5], Some(0.91), Some("good")),
            "b82fa4ef21b8c5cca56b3ec73448592a5eef1655030a519d8dc5b037f30892d5"
        );
    }

    #[test]
    fn fingerprint_hashes_missing_fields_as_null() {
        assert_eq!(
            seed_fingerprint(&[], None, None),
            sha256_hex(br#"{"embedding": [], "confidence": null, "quality": null}"#)
        );
    }

    #[test]
    fn fingerprint_escapes_non_ascii() {
        assert_eq!(
            seed_fingerprint(&[1.0], Some(0.5), Some("caf\u{e9}")),
            sha256_hex(br#"{"embedding": [1.0], "confidence": 0.5, "quality": "caf\u00e9"}"#)
        );
    }

    #[test]
    fn fingerprint_covers_every_input() {
        let base = seed_fingerprint(&[1.0], Some(0.5), Some("good"));
        assert_ne!(base, seed_fingerprint(&[1.5], Some(0.5), Some("good")));
        assert_ne!(base, seed_fingerprint(&[1.0], Some(0.6), Some("good")));
        assert_ne!(base, seed_fingerprint(&[1.0], Some(0.5), None));
        assert_ne!(base, seed_fingerprint(&[1.0], None, Some("good")));
    }

    #[test]
    fn float_layout() {
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(-0.0), "-0.0");
        assert_eq!(float_repr(0.91), "0.91");
        assert_eq!(float_repr(123.456), "123.456");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(0.00001), "1e-05");
        assert_eq!(float_repr(-1.5e-7), "-1.5e-07");
        assert_eq!(float_repr(1e15), "1000000000000000.0");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1.25e100), "1.25e+100");
        assert_eq!(float_repr(f64::from(0.1f32)), "0.10000000149011612");
    }
}
