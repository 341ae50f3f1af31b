#![allow(unsafe_code)]

//! Conversions from raw foreign values to Rust values.

use std::ffi::CStr;

use libc::{c_char, c_int, c_void};

use crate::error::Result;
use crate::types::{SensorReading, SensorReadingType};

/// Decode a NUL-terminated string as UTF-8. Null decodes to `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub(crate) unsafe fn decode_c_string(ptr: *const c_char) -> Result<Option<String>> {
    if ptr.is_null() {
        return Ok(None);
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let text = unsafe { CStr::from_ptr(ptr) }.to_str()?;
    Ok(Some(text.to_owned()))
}

/// Decode the reading pointer according to its type code.
///
/// Never fails: a code without a decoder yields
/// [`SensorReading::Unrecognized`], a null pointer yields `None`.
///
/// # Safety
/// `ptr` must be null or point to at least as many readable bytes as
/// `reading_type` implies (1, 4 or 8).
pub(crate) unsafe fn decode_reading(
    reading_type: c_int,
    ptr: *const c_void,
) -> Option<SensorReading> {
    if ptr.is_null() {
        return None;
    }
    let reading = match SensorReadingType::from_raw(reading_type) {
        // SAFETY (all arms): size implied by the type code, unaligned reads.
        Ok(SensorReadingType::UnsignedInteger8Bool) => {
            SensorReading::Bool(unsafe { ptr.cast::<u8>().read() } != 0)
        }
        Ok(SensorReadingType::UnsignedInteger32) => {
            SensorReading::Unsigned32(unsafe { ptr.cast::<u32>().read_unaligned() })
        }
        Ok(SensorReadingType::Double) => {
            SensorReading::Double(unsafe { ptr.cast::<f64>().read_unaligned() })
        }
        Ok(SensorReadingType::Unknown) | Err(_) => SensorReading::Unrecognized(reading_type),
    };
    Some(reading)
}

/// Decode a null-terminated array of NUL-terminated strings, in order.
///
/// # Safety
/// `ptr` must be null or point to an array of string pointers terminated by
/// a null entry, every entry valid for the duration of the call.
pub(crate) unsafe fn decode_bitmask_strings(ptr: *const *const c_char) -> Result<Vec<String>> {
    let mut out = Vec::new();
    if ptr.is_null() {
        return Ok(out);
    }
    let mut index = 0;
    loop {
        // SAFETY: the array is terminated, so every index up to the
        // terminator is in bounds.
        let entry = unsafe { *ptr.add(index) };
        if entry.is_null() {
            break;
        }
        if let Some(text) = unsafe { decode_c_string(entry) }? {
            out.push(text);
        }
        index += 1;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::ptr;

    use proptest::prelude::*;

    use super::*;
    use crate::error::Error;

    fn reading_of<T>(reading_type: SensorReadingType, value: &T) -> Option<SensorReading> {
        unsafe { decode_reading(reading_type.as_raw(), (value as *const T).cast()) }
    }

    #[test]
    fn reading_dispatches_on_type_code() {
        assert_eq!(
            reading_of(SensorReadingType::UnsignedInteger8Bool, &1u8),
            Some(SensorReading::Bool(true))
        );
        assert_eq!(
            reading_of(SensorReadingType::UnsignedInteger8Bool, &0u8),
            Some(SensorReading::Bool(false))
        );
        assert_eq!(
            reading_of(SensorReadingType::UnsignedInteger32, &3_000u32),
            Some(SensorReading::Unsigned32(3_000))
        );
        assert_eq!(
            reading_of(SensorReadingType::Double, &42.5f64),
            Some(SensorReading::Double(42.5))
        );
    }

    #[test]
    fn unhandled_reading_type_yields_placeholder() {
        let raw = 0u64;
        assert_eq!(
            reading_of(SensorReadingType::Unknown, &raw),
            Some(SensorReading::Unrecognized(3))
        );
        let decoded = unsafe { decode_reading(17, (&raw as *const u64).cast()) };
        assert_eq!(decoded, Some(SensorReading::Unrecognized(17)));
    }

    #[test]
    fn double_is_read_from_unaligned_storage() {
        let mut bytes = [0u8; 9];
        bytes[1..].copy_from_slice(&1.25f64.to_ne_bytes());
        let decoded = unsafe {
            decode_reading(
                SensorReadingType::Double.as_raw(),
                bytes.as_ptr().add(1).cast(),
            )
        };
        assert_eq!(decoded, Some(SensorReading::Double(1.25)));
    }

    #[test]
    fn bitmask_strings_stop_at_terminator() {
        let owned: Vec<CString> = ["Device Present", "Predictive Failure"]
            .iter()
            .map(|s| CString::new(*s).expect("cstring"))
            .collect();
        let mut array: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();
        array.push(ptr::null());

        let decoded = unsafe { decode_bitmask_strings(array.as_ptr()) }.expect("decode");
        assert_eq!(decoded, vec!["Device Present", "Predictive Failure"]);
    }

    #[test]
    fn null_bitmask_array_is_empty() {
        let decoded = unsafe { decode_bitmask_strings(ptr::null()) }.expect("decode");
        assert!(decoded.is_empty());

        let only_terminator: [*const c_char; 1] = [ptr::null()];
        let decoded = unsafe { decode_bitmask_strings(only_terminator.as_ptr()) }.expect("decode");
        assert!(decoded.is_empty());
    }

    #[test]
    fn invalid_utf8_is_a_decoding_error() {
        let bytes = b"\xffbad\0";
        let err = unsafe { decode_c_string(bytes.as_ptr().cast()) }.expect_err("expected error");
        assert!(matches!(err, Error::Decoding(_)));
        assert_eq!(unsafe { decode_c_string(ptr::null()) }.expect("null"), None);
    }

    proptest! {
        #[test]
        fn null_reading_is_absent_for_any_type(code in any::<i32>()) {
            prop_assert_eq!(unsafe { decode_reading(code, ptr::null()) }, None);
        }

        #[test]
        fn reading_variant_matches_type(code in 0i32..4, bits in any::<u64>()) {
            let decoded = unsafe { decode_reading(code, (&bits as *const u64).cast()) };
            let matches = match (code, decoded) {
                (0, Some(SensorReading::Bool(_))) => true,
                (1, Some(SensorReading::Unsigned32(_))) => true,
                (2, Some(SensorReading::Double(_))) => true,
                (3, Some(SensorReading::Unrecognized(3))) => true,
                _ => false,
            };
            prop_assert!(matches);
        }

        #[test]
        fn bitmask_strings_keep_order_and_length(
            entries in proptest::collection::vec("[a-zA-Z0-9 ]{0,24}", 0..8)
        ) {
            let owned: Vec<CString> = entries
                .iter()
                .map(|s| CString::new(s.as_str()).expect("cstring"))
                .collect();
            let mut array: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();
            array.push(ptr::null());

            let decoded = unsafe { decode_bitmask_strings(array.as_ptr()) }.expect("decode");
            prop_assert_eq!(decoded, entries);
        }
    }
}
