//! The decoding cursor: a slice of the mangled input that remembers where in
//! the full input it starts.

use std::fmt;
use std::ops::{RangeFrom, RangeTo};

/// A borrowed tail (or window) of the mangled input along with the absolute
/// index of its first byte. Parsing functions take an `IndexStr` and return
/// the unconsumed remainder, so the cursor only ever moves forward.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IndexStr<'a> {
    idx: usize,
    string: &'a [u8],
}

impl<'a> IndexStr<'a> {
    /// Construct a new `IndexStr` at index 0 of the given bytes.
    #[inline]
    pub fn new(string: &'a [u8]) -> IndexStr<'a> {
        IndexStr { idx: 0, string }
    }

    /// Return the length of the string.
    #[inline]
    pub fn len(&self) -> usize {
        self.string.len()
    }

    /// Return true if the string is empty, false otherwise.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }

    /// Absolute index of this string's first byte within the original input.
    #[inline]
    pub fn index(&self) -> usize {
        self.idx
    }

    /// The first byte, if any.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.string.first().cloned()
    }

    /// The second byte, if any.
    #[inline]
    pub fn peek_second(&self) -> Option<u8> {
        self.string.get(1).cloned()
    }

    /// Does the string start with `prefix`?
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.string.starts_with(prefix)
    }

    /// Split the string in two at the given index, resulting in the tuple where
    /// the first item has range `[0, idx)`, and the second has range `[idx,
    /// len)`.
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    pub fn split_at(&self, idx: usize) -> (IndexStr<'a>, IndexStr<'a>) {
        (self.range_to(..idx), self.range_from(idx..))
    }

    /// The same as `split_at`, but returns `None` rather than panicking
    /// when the index is out of bounds.
    #[inline]
    pub fn try_split_at(&self, idx: usize) -> Option<(IndexStr<'a>, IndexStr<'a>)> {
        if idx > self.len() {
            None
        } else {
            Some(self.split_at(idx))
        }
    }

    /// Pop the first byte off the string, returning it along with the rest.
    #[inline]
    pub fn next(&self) -> Option<(u8, IndexStr<'a>)> {
        self.peek().map(|c| (c, self.range_from(1..)))
    }
}

/// # Range Methods
///
/// `std::ops::Index` *must* return a reference, so we can't implement
/// `Index<Range<usize>>` to return a new `IndexStr`. These plain methods do
/// the job instead.
///
/// All of these methods panic on an out-of-bounds index.
impl<'a> IndexStr<'a> {
    /// Take the given `start..` range of the underlying string and return a new
    /// `IndexStr`.
    #[inline]
    pub fn range_from(&self, idx: RangeFrom<usize>) -> IndexStr<'a> {
        IndexStr {
            idx: self.idx + idx.start,
            string: &self.string[idx],
        }
    }

    /// Take the given `..end` range of the underlying string and return a new
    /// `IndexStr`.
    #[inline]
    pub fn range_to(&self, idx: RangeTo<usize>) -> IndexStr<'a> {
        IndexStr {
            idx: self.idx,
            string: &self.string[idx],
        }
    }
}

impl<'a> AsRef<[u8]> for IndexStr<'a> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.string
    }
}

impl<'a> From<&'a [u8]> for IndexStr<'a> {
    fn from(s: &[u8]) -> IndexStr {
        IndexStr::new(s)
    }
}

impl<'a> From<IndexStr<'a>> for &'a [u8] {
    fn from(s: IndexStr<'a>) -> &'a [u8] {
        s.string
    }
}

impl<'a, 'b> PartialEq<&'a [u8]> for IndexStr<'b> {
    fn eq(&self, rhs: &&[u8]) -> bool {
        self.string == *rhs
    }
}

impl<'a> fmt::Debug for IndexStr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IndexStr {{ idx: {}, string: \"{}\" }}",
            self.idx,
            String::from_utf8_lossy(self.string)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::IndexStr;

    #[test]
    fn split_keeps_absolute_index() {
        let s = IndexStr::new(b"_ZN3fooE");
        let (head, tail) = s.split_at(2);
        assert_eq!(head, &b"_Z"[..]);
        assert_eq!(head.index(), 0);
        assert_eq!(tail, &b"N3fooE"[..]);
        assert_eq!(tail.index(), 2);

        let (_, tail) = tail.split_at(1);
        assert_eq!(tail.index(), 3);
        assert_eq!(tail.peek(), Some(b'3'));
        assert_eq!(tail.peek_second(), Some(b'f'));
    }

    #[test]
    fn try_split_at_out_of_bounds() {
        let s = IndexStr::new(b"ab");
        assert!(s.try_split_at(3).is_none());
        let (head, tail) = s.try_split_at(2).unwrap();
        assert_eq!(head, &b"ab"[..]);
        assert!(tail.is_empty());
        assert_eq!(tail.index(), 2);
    }

    #[test]
    fn next_pops_one_byte() {
        let s = IndexStr::new(b"xy");
        let (c, tail) = s.next().unwrap();
        assert_eq!(c, b'x');
        assert_eq!(tail, &b"y"[..]);
        assert!(IndexStr::new(b"").next().is_none());
    }
}
