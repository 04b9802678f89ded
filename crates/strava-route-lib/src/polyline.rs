//! Encoded polyline codec
//!
//! Implements Google's encoded polyline algorithm format at a precision of 1e5.
//! Each coordinate is stored as a latitude delta followed by a longitude delta;
//! every delta is zig-zag encoded and split into 5-bit groups, least significant
//! first, with bit `0x20` marking that another group follows. Groups are offset by
//! 63 so that they land in the printable ASCII range `'?'..='~'`.
//!
//! All accumulation happens on integers. The division by the precision factor is
//! applied only when a coordinate is emitted, so decoding is bit-exact and
//! deterministic.

use crate::{DecodeError, Result};
use geo::{Coord, LineString};

/// Ordered sequence of coordinates (`x` = longitude, `y` = latitude)
pub type DecodedPath = LineString<f64>;

/// Fixed-point scale of the encoding (5 decimal places)
pub const PRECISION: f64 = 1e5;

/// Offset added to every 5-bit group to make it printable
const CHAR_OFFSET: u8 = 63;

/// Continuation flag within a group
const CONTINUATION_BIT: i64 = 0x20;

/// Payload mask within a group
const GROUP_MASK: i64 = 0x1f;

/// Longest accepted value: 7 groups (35 bits) covers any WGS84 delta with room to spare
const MAX_SHIFT: u32 = 35;

/// Cursor over the encoded bytes
struct Reader<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.position >= self.text.len()
    }

    /// Read one zig-zag encoded signed value
    fn next_value(&mut self) -> Result<i64> {
        let start = self.position;
        let bytes = self.text.as_bytes();
        let mut result: i64 = 0;
        let mut shift: u32 = 0;

        loop {
            let Some(&byte) = bytes.get(self.position) else {
                return Err(DecodeError::Truncated { position: start });
            };

            if !(CHAR_OFFSET..=b'~').contains(&byte) {
                // Every byte consumed so far was ASCII, so this is a char boundary
                let character = self.text[self.position..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(DecodeError::InvalidCharacter {
                    position: self.position,
                    character,
                });
            }

            if shift >= MAX_SHIFT {
                return Err(DecodeError::Overflow { position: start });
            }

            let group = i64::from(byte - CHAR_OFFSET);
            result |= (group & GROUP_MASK) << shift;
            shift += 5;
            self.position += 1;

            if group & CONTINUATION_BIT == 0 {
                break;
            }
        }

        Ok(if result & 1 != 0 {
            !(result >> 1)
        } else {
            result >> 1
        })
    }
}

/// Decode an encoded polyline into a path of `(longitude, latitude)` coordinates
///
/// An empty string decodes to an empty path. Input that ends in the middle of a
/// value (including a latitude without its longitude) is rejected with
/// [`DecodeError::Truncated`] instead of being read past its end.
pub fn decode(encoded: &str) -> Result<DecodedPath> {
    #[cfg(feature = "profiling")]
    profiling::scope!("polyline::decode");

    let mut reader = Reader::new(encoded);
    // Every coordinate takes at least two bytes
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(encoded.len() / 2);
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while !reader.is_at_end() {
        lat += reader.next_value()?;
        lng += reader.next_value()?;
        coords.push(Coord {
            x: lng as f64 / PRECISION,
            y: lat as f64 / PRECISION,
        });
    }

    Ok(LineString::new(coords))
}

/// Encode a path of `(longitude, latitude)` coordinates as a polyline string
///
/// Coordinates are rounded to the nearest 1e-5 degree, so
/// `decode(&encode(path))` reproduces `path` within that tolerance.
pub fn encode(path: &DecodedPath) -> String {
    #[cfg(feature = "profiling")]
    profiling::scope!("polyline::encode");

    let mut out = String::with_capacity(path.0.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for coord in path.coords() {
        let lat = (coord.y * PRECISION).round() as i64;
        let lng = (coord.x * PRECISION).round() as i64;
        write_value(lat - prev_lat, &mut out);
        write_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn write_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };

    while value >= CONTINUATION_BIT {
        let group = (CONTINUATION_BIT | (value & GROUP_MASK)) as u8;
        out.push(char::from(group + CHAR_OFFSET));
        value >>= 5;
    }
    out.push(char::from(value as u8 + CHAR_OFFSET));
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: Coord<f64>, lng: f64, lat: f64) {
        assert!(
            (actual.x - lng).abs() < 1e-5 && (actual.y - lat).abs() < 1e-5,
            "expected ({lng}, {lat}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn test_empty_string_is_empty_path() {
        let path = decode("").unwrap();
        assert!(path.0.is_empty());
    }

    #[test]
    fn test_reference_vector() {
        let path = decode(REFERENCE).unwrap();

        assert_eq!(path.0.len(), 3);
        assert_close(path.0[0], -120.2, 38.5);
        assert_close(path.0[1], -120.95, 40.7);
        assert_close(path.0[2], -126.453, 43.252);
    }

    #[test]
    fn test_reference_vector_reencodes_identically() {
        let path = decode(REFERENCE).unwrap();
        assert_eq!(encode(&path), REFERENCE);
    }

    #[test]
    fn test_single_continuation_byte_is_truncated() {
        // '_' carries the continuation bit and nothing follows it
        assert_eq!(decode("_"), Err(DecodeError::Truncated { position: 0 }));
    }

    #[test]
    fn test_latitude_without_longitude_is_truncated() {
        // "_p~iF" is a complete latitude value for 38.5
        assert_eq!(decode("_p~iF"), Err(DecodeError::Truncated { position: 5 }));
    }

    #[test]
    fn test_truncated_tail_of_valid_input() {
        let cut = &REFERENCE[..REFERENCE.len() - 1];
        assert!(matches!(decode(cut), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            decode("_p~iF ps|U"),
            Err(DecodeError::InvalidCharacter {
                position: 5,
                character: ' '
            })
        );
    }

    #[test]
    fn test_non_ascii_character_is_reported_whole() {
        assert_eq!(
            decode("??é"),
            Err(DecodeError::InvalidCharacter {
                position: 2,
                character: 'é'
            })
        );
    }

    #[test]
    fn test_overlong_value_overflows() {
        // '~' is the largest group and always continues
        assert_eq!(
            decode("~~~~~~~~?"),
            Err(DecodeError::Overflow { position: 0 })
        );
    }

    #[test]
    fn test_zero_deltas_repeat_previous_point() {
        // "??" is a pair of zero deltas
        let path = decode("_p~iF~ps|U??").unwrap();
        assert_eq!(path.0.len(), 2);
        assert_eq!(path.0[0], path.0[1]);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let first = decode(REFERENCE).unwrap();
        let second = decode(REFERENCE).unwrap();
        for (a, b) in first.coords().zip(second.coords()) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
    }

    #[test]
    fn test_encode_empty_path() {
        assert_eq!(encode(&LineString::new(vec![])), "");
    }

    #[test]
    fn test_roundtrip_extreme_coordinates() {
        let path = LineString::from(vec![
            (180.0, 90.0),
            (-180.0, -90.0),
            (0.00001, -0.00001),
            (-179.99999, 89.99999),
        ]);

        let decoded = decode(&encode(&path)).unwrap();

        assert_eq!(decoded.0.len(), path.0.len());
        for (original, back) in path.coords().zip(decoded.coords()) {
            assert_close(*back, original.x, original.y);
        }
    }
}
