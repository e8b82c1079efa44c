/*
MIT License

Copyright (c) 2026 The tar-lookup developers

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
//! Typed views of the fixed-width ASCII fields embedded in a `ustar` header:
//! optionally NUL-terminated strings and NUL/space-padded numbers.

use core::fmt::{Debug, Formatter};
use core::str::{from_utf8, Utf8Error};

/// Base type for strings embedded in a tar header. The length depends on the
/// context. The content is expected to be UTF-8/ASCII, which is verified by
/// getters such as [`TarFormatString::as_str`].
///
/// The contents are either:
/// 1. a fully populated string with no NUL termination, or
/// 2. a partially populated string where the unused bytes are zero.
#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct TarFormatString<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> TarFormatString<N> {
    /// Constructor.
    ///
    /// # Panics
    /// Panics if `N` is zero, i.e., the underlying array has no length.
    #[must_use]
    pub const fn new(bytes: [u8; N]) -> Self {
        assert!(N > 0, "array should have at least one element");
        Self { bytes }
    }

    /// True if the string is empty (ignoring NUL bytes).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes[0] == 0
    }

    /// Returns the length of the payload in bytes. This is either the full
    /// capacity `N` or the data until the first NUL byte.
    #[must_use]
    pub fn size(&self) -> usize {
        memchr::memchr(0, &self.bytes).unwrap_or(N)
    }

    /// Returns the payload as raw bytes, without the terminating NUL and
    /// anything behind it.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[0..self.size()]
    }

    /// Returns a str ref without terminating or intermediate NUL bytes. The
    /// string is truncated at the first NUL byte, in case not the full length
    /// was used.
    ///
    /// # Errors
    /// Returns a [`Utf8Error`] error for invalid strings.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        from_utf8(self.as_bytes())
    }
}

impl<const N: usize> Debug for TarFormatString<N> {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(
            f,
            "str='{:?}',byte_usage={}/{}",
            from_utf8(self.as_bytes()),
            self.size(),
            N
        )
    }
}

/// A number of radix `R` stored as fixed-width ASCII. Conforming archives
/// NUL-pad the field; historic tar implementations also pad with spaces on
/// either side, which is tolerated here.
#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct TarFormatNumber<const N: usize, const R: u32>(TarFormatString<N>);

/// An octal number in a fixed-width field.
pub type TarFormatOctal<const N: usize> = TarFormatNumber<N, 8>;

/// A decimal number in a fixed-width field.
pub type TarFormatDecimal<const N: usize> = TarFormatNumber<N, 10>;

impl<const N: usize, const R: u32> TarFormatNumber<N, R> {
    /// Constructor.
    #[must_use]
    pub const fn new(bytes: [u8; N]) -> Self {
        Self(TarFormatString::new(bytes))
    }

    /// Interprets the underlying field as a number of the specified type
    /// using radix `R`. The field is cut at the first NUL byte and stripped
    /// of surrounding ASCII spaces; an entirely empty field counts as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the remaining characters are no valid digits for
    /// radix `R`. Malformed fields never panic; the caller decides how to
    /// react.
    pub fn as_number<T>(&self) -> Result<T, T::FromStrRadixErr>
    where
        T: num_traits::Num,
    {
        let str = self.0.as_str().unwrap_or_default();
        let str = str.trim_matches(' ');
        if str.is_empty() {
            return Ok(T::zero());
        }
        T::from_str_radix(str, R)
    }

    /// Returns the underlying [`TarFormatString`].
    #[must_use]
    pub const fn as_inner(&self) -> &TarFormatString<N> {
        &self.0
    }
}

impl<const N: usize, const R: u32> Debug for TarFormatNumber<N, R> {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self.as_number::<u64>() {
            Err(msg) => write!(f, "{} [{:?}]", msg, self.0.as_bytes()),
            Ok(val) => write!(f, "{} [{:?}]", val, self.0.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tar_format_string_tests {
    use super::TarFormatString;

    use core::mem::size_of_val;

    #[test]
    fn test_empty_string() {
        let empty = TarFormatString::new([0]);
        assert_eq!(size_of_val(&empty), 1);
        assert!(empty.is_empty());
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.as_bytes(), b"");
        assert_eq!(empty.as_str(), Ok(""));
    }

    #[test]
    fn test_full_string_without_terminator() {
        let s = TarFormatString::new([b'A', b'B', b'C']);
        assert_eq!(size_of_val(&s), 3);
        assert!(!s.is_empty());
        assert_eq!(s.size(), 3);
        assert_eq!(s.as_str(), Ok("ABC"));
    }

    #[test]
    fn test_string_cut_at_first_nul() {
        let s = TarFormatString::new([b'A', 0, b'B']);
        assert_eq!(size_of_val(&s), 3);
        assert!(!s.is_empty());
        assert_eq!(s.size(), 1);
        assert_eq!(s.as_bytes(), b"A");
        assert_eq!(s.as_str(), Ok("A"));
    }

    #[test]
    fn test_non_utf8_is_an_error_not_a_panic() {
        let s = TarFormatString::new([0xff, 0xfe, 0]);
        assert!(s.as_str().is_err());
        assert_eq!(s.as_bytes(), &[0xff, 0xfe]);
    }
}

#[cfg(test)]
mod tar_format_number_tests {
    use super::{TarFormatDecimal, TarFormatNumber, TarFormatOctal};

    #[test]
    fn test_octal_with_nul_padding() {
        let num = TarFormatOctal::<12>::new(*b"00000000013\0");
        assert_eq!(num.as_number::<u64>(), Ok(11));
    }

    #[test]
    fn test_trailing_space_is_ignored() {
        let num = TarFormatNumber::<5, 10>::new([b'0', b'1', b'0', b' ', 0]);
        assert_eq!(num.as_number::<u64>(), Ok(10));
    }

    #[test]
    fn test_leading_space_is_ignored() {
        // historic checksum fields look like "  5342\0 "
        let num = TarFormatOctal::<8>::new(*b"  5342\0 ");
        assert_eq!(num.as_number::<u32>(), Ok(0o5342));
    }

    #[test]
    fn test_empty_field_counts_as_zero() {
        let num = TarFormatOctal::<8>::new([0; 8]);
        assert_eq!(num.as_number::<u64>(), Ok(0));
        let num = TarFormatDecimal::<8>::new(*b"        ");
        assert_eq!(num.as_number::<u64>(), Ok(0));
    }

    #[test]
    fn test_malformed_digits_are_an_error() {
        let num = TarFormatOctal::<8>::new(*b"00zz00\0 ");
        assert!(num.as_number::<u64>().is_err());
    }
}
