//! This crate decodes C++ "mangled" linker symbol names into a Rust value
//! describing what the name refers to: a function, a variable, a virtual
//! table, a type, and so on. Rendering that value produces the
//! human-readable C++ declaration that debuggers, profilers and `c++filt`
//! show.
//!
//! C++ requires the compiler to choose names for linker symbols consistently
//! across compilation units, so that two compilation units that have seen the
//! same declarations can pair up definitions in one unit with references in
//! another.  Almost all platforms other than Microsoft Windows follow the
//! [Itanium C++ ABI][itanium]'s rules for this.
//!
//! [itanium]: https://itanium-cxx-abi.github.io/cxx-abi/abi.html#mangling
//!
//! For example, suppose a C++ compilation unit has the definition:
//!
//! ```c++
//! namespace space {
//!   int foo(int x, int y) { return x+y; }
//! }
//! ```
//!
//! The Itanium C++ ABI specifies that the linker symbol for that function must
//! be named `_ZN5space3fooEii`. This crate decodes that name into an
//! `ast::Node` tree, and renders the tree as `space::foo(int, int)`:
//!
//! ```
//! assert_eq!(
//!     cxxfilt::demangle("_ZN5space3fooEii", true).unwrap(),
//!     "space::foo(int, int)"
//! );
//! ```
//!
//! The decoder is self-contained: it does not call into any platform C++
//! runtime, keeps no global state, and every call is independent of every
//! other, so it may be used from any number of threads at once.

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(unsafe_code)]
// Clippy stuff.
#![allow(unknown_lints)]
#![allow(clippy::inline_always)]

#[macro_use]
mod logging;

#[cfg(test)]
#[macro_use]
mod testing;

pub mod ast;
mod demangle;
pub mod error;
mod index_str;
mod parse;
mod subs;

pub use crate::demangle::{render, render_with_options};
pub use crate::error::{Error, Result};

use crate::parse::Start;
use std::fmt;

/// Options to control the parsing process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    recursion_limit: Option<u32>,
}

impl ParseOptions {
    /// Construct a new `ParseOptions` with the default values.
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the limit on recursion depth during the parsing phase. A low
    /// limit will cause valid symbols to be rejected, but a high limit may
    /// allow pathological symbols to overflow the stack during parsing.
    /// The default value is 96, which will not overflow the stack even in
    /// a debug build. A limit of zero rejects every symbol.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = Some(limit);
        self
    }
}

/// Options to control the demangling process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DemangleOptions {
    no_params: bool,
    no_return_type: bool,
    hide_expression_literal_types: bool,
}

impl DemangleOptions {
    /// Construct a new `DemangleOptions` with the default values.
    pub fn new() -> Self {
        Default::default()
    }

    /// Do not display function arguments, nor the return type that goes
    /// with them.
    pub fn no_params(mut self) -> Self {
        self.no_params = true;
        self
    }

    /// Do not display the function return type.
    pub fn no_return_type(mut self) -> Self {
        self.no_return_type = true;
        self
    }

    /// Hide type annotations in template value parameters.
    /// These are not needed to distinguish template instances
    /// so this can make it easier to match user-provided
    /// template instance names.
    pub fn hide_expression_literal_types(mut self) -> Self {
        self.hide_expression_literal_types = true;
        self
    }
}

/// Where decoding of `input` starts: mangled names with the external prefix
/// (or Darwin's extra underscore), types otherwise.
fn start_of(input: &[u8]) -> Start {
    if input.starts_with(b"_Z") || input.starts_with(b"__Z") {
        Start::MangledName
    } else {
        Start::Type
    }
}

/// Decode `data` into an AST with the default options.
///
/// Input with the `_Z` prefix is decoded as a mangled name. Other input is
/// passed through as an `ast::Node::Plain` when `external_only` is set, and
/// decoded as a `<type>` otherwise, the way platform demanglers treat
/// "internal" names.
///
/// ```
/// use cxxfilt::ast::Node;
///
/// assert_eq!(cxxfilt::decode(b"main", true), Ok(Node::Plain("main".into())));
/// assert_eq!(
///     cxxfilt::render(&cxxfilt::decode(b"N3foo12BarExceptionE", false).unwrap()),
///     "foo::BarException"
/// );
/// ```
pub fn decode(data: &[u8], external_only: bool) -> Result<ast::Node> {
    decode_with_options(data, external_only, &ParseOptions::default())
}

/// Decode `data` into an AST. See `decode`.
pub fn decode_with_options(
    data: &[u8],
    external_only: bool,
    options: &ParseOptions,
) -> Result<ast::Node> {
    if data.starts_with(b"_Z") {
        return parse::parse_all(data, Start::MangledName, options);
    }
    if external_only {
        return Ok(ast::Node::Plain(String::from_utf8_lossy(data).into_owned()));
    }
    parse::parse_all(data, start_of(data), options)
}

/// Demangle `text`.
///
/// With `external_only`, text that does not start with `_Z` is returned
/// unchanged.
///
/// ```
/// assert_eq!(cxxfilt::demangle("main", true).unwrap(), "main");
/// assert_eq!(cxxfilt::demangle("a", false).unwrap(), "signed char");
/// assert!(cxxfilt::demangle("main", false).is_err());
/// ```
pub fn demangle(text: &str, external_only: bool) -> Result<String> {
    ItaniumDemangler::new().demangle(text, external_only)
}

/// Demangle raw symbol bytes, which need not be valid UTF-8.
///
/// With `external_only`, input that does not start with `_Z` is returned
/// byte for byte.
pub fn demangle_bytes(data: &[u8], external_only: bool) -> Result<Vec<u8>> {
    ItaniumDemangler::new().demangle_bytes(data, external_only)
}

/// A demangling scheme.
///
/// Each mangling grammar is its own implementation of this trait.
pub trait Demangler {
    /// Demangle raw symbol bytes. With `external_only`, input that is not a
    /// mangled name of this scheme is returned unchanged.
    fn demangle_bytes(&self, data: &[u8], external_only: bool) -> Result<Vec<u8>>;

    /// Demangle `text`. With `external_only`, text that is not a mangled
    /// name of this scheme is returned unchanged.
    fn demangle(&self, text: &str, external_only: bool) -> Result<String> {
        let bytes = self.demangle_bytes(text.as_bytes(), external_only)?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}

/// The Itanium C++ ABI demangler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItaniumDemangler {
    parse_options: ParseOptions,
    demangle_options: DemangleOptions,
}

impl ItaniumDemangler {
    /// Construct a demangler with the default options.
    pub fn new() -> Self {
        Default::default()
    }

    /// Use `options` when parsing.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Use `options` when rendering.
    pub fn with_demangle_options(mut self, options: DemangleOptions) -> Self {
        self.demangle_options = options;
        self
    }
}

impl Demangler for ItaniumDemangler {
    fn demangle_bytes(&self, data: &[u8], external_only: bool) -> Result<Vec<u8>> {
        if external_only && !data.starts_with(b"_Z") {
            return Ok(data.to_vec());
        }
        let node = decode_with_options(data, external_only, &self.parse_options)?;
        Ok(render_with_options(&node, &self.demangle_options).into_bytes())
    }
}

/// A `Symbol` which owns the underlying storage for the mangled name.
pub type OwnedSymbol = Symbol<Vec<u8>>;

/// A `Symbol` which borrows the underlying storage for the mangled name.
pub type BorrowedSymbol<'a> = Symbol<&'a [u8]>;

/// A mangled symbol that has been parsed into an AST.
///
/// This is generic over some storage type `T` which can be either owned or
/// borrowed. See the `OwnedSymbol` and `BorrowedSymbol` type aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol<T> {
    raw: T,
    parsed: ast::Node,
}

impl<T> Symbol<T>
where
    T: AsRef<[u8]>,
{
    /// Given some raw storage, parse the mangled symbol from it with the default
    /// options.
    ///
    /// Input without the `_Z` prefix is parsed as a type.
    ///
    /// ```
    /// use cxxfilt::Symbol;
    /// use std::string::ToString;
    ///
    /// // First, something easy :)
    ///
    /// let mangled = b"_ZN5space3fooEibc";
    ///
    /// let sym = Symbol::new(&mangled[..])
    ///     .expect("Could not parse mangled symbol!");
    ///
    /// let demangled = sym.to_string();
    /// assert_eq!(demangled, "space::foo(int, bool, char)");
    ///
    /// // Now let's try something a little more complicated!
    ///
    /// let mangled =
    ///     b"__Z28JS_GetPropertyDescriptorByIdP9JSContextN2JS6HandleIP8JSObjectEENS2_I4jsidEENS1_13MutableHandleINS1_18PropertyDescriptorEEE";
    ///
    /// let sym = Symbol::new(&mangled[..])
    ///     .expect("Could not parse mangled symbol!");
    ///
    /// let demangled = sym.to_string();
    /// assert_eq!(
    ///     demangled,
    ///     "JS_GetPropertyDescriptorById(JSContext*, JS::Handle<JSObject*>, JS::Handle<jsid>, JS::MutableHandle<JS::PropertyDescriptor>)"
    /// );
    /// ```
    #[inline]
    pub fn new(raw: T) -> Result<Symbol<T>> {
        Self::new_with_options(raw, &Default::default())
    }

    /// Given some raw storage, parse the mangled symbol from it.
    ///
    /// ```
    /// use cxxfilt::{ParseOptions, Symbol};
    /// use std::string::ToString;
    ///
    /// let mangled = b"_ZN5space3fooEibc";
    ///
    /// let parse_options = ParseOptions::default()
    ///     .recursion_limit(1024);
    ///
    /// let sym = Symbol::new_with_options(&mangled[..], &parse_options)
    ///     .expect("Could not parse mangled symbol!");
    ///
    /// let demangled = sym.to_string();
    /// assert_eq!(demangled, "space::foo(int, bool, char)");
    /// ```
    pub fn new_with_options(raw: T, options: &ParseOptions) -> Result<Symbol<T>> {
        let parsed = {
            let input = raw.as_ref();
            parse::parse_all(input, start_of(input), options)?
        };

        let symbol = Symbol { raw, parsed };

        log!(
            "Successfully parsed '{}' as

AST = {:#?}",
            String::from_utf8_lossy(symbol.raw.as_ref()),
            symbol.parsed
        );

        Ok(symbol)
    }

    /// The decoded AST.
    pub fn ast(&self) -> &ast::Node {
        &self.parsed
    }

    /// The raw bytes this symbol was parsed from.
    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_ref()
    }

    /// Demangle the symbol and return it as a String.
    ///
    /// Unlike the `ToString` implementation, this function allows options to
    /// be specified.
    ///
    /// ```
    /// use cxxfilt::{DemangleOptions, Symbol};
    /// use std::string::ToString;
    ///
    /// let mangled = b"_ZN5space3fooEibc";
    ///
    /// let sym = Symbol::new(&mangled[..])
    ///     .expect("Could not parse mangled symbol!");
    ///
    /// let demangled = sym.to_string();
    /// let options = DemangleOptions::default();
    /// let demangled_again = sym.demangle(&options);
    /// assert_eq!(demangled_again, demangled);
    ///
    /// let options = DemangleOptions::default().no_params();
    /// assert_eq!(sym.demangle(&options), "space::foo");
    /// ```
    pub fn demangle(&self, options: &DemangleOptions) -> String {
        render_with_options(&self.parsed, options)
    }
}

impl<'a, T> Symbol<&'a T>
where
    T: AsRef<[u8]> + ?Sized,
{
    /// Parse a mangled symbol from input and return it and the trailing tail of
    /// bytes that come after the symbol, with the default options.
    ///
    /// While `Symbol::new` will return an error if there is unexpected trailing
    /// bytes, `with_tail` simply returns the trailing bytes along with the
    /// parsed symbol.
    ///
    /// ```
    /// use cxxfilt::BorrowedSymbol;
    /// use std::string::ToString;
    ///
    /// let mangled = b"_ZN5space3fooEibc and some trailing junk";
    ///
    /// let (sym, tail) = BorrowedSymbol::with_tail(&mangled[..])
    ///     .expect("Could not parse mangled symbol!");
    ///
    /// assert_eq!(tail, b" and some trailing junk");
    ///
    /// let demangled = sym.to_string();
    /// assert_eq!(demangled, "space::foo(int, bool, char)");
    /// ```
    #[inline]
    pub fn with_tail(input: &'a T) -> Result<(BorrowedSymbol<'a>, &'a [u8])> {
        Self::with_tail_and_options(input, &Default::default())
    }

    /// Parse a mangled symbol from input and return it and the trailing tail of
    /// bytes that come after the symbol.
    ///
    /// While `Symbol::new_with_options` will return an error if there is
    /// unexpected trailing bytes, `with_tail_and_options` simply returns the
    /// trailing bytes along with the parsed symbol.
    pub fn with_tail_and_options(
        input: &'a T,
        options: &ParseOptions,
    ) -> Result<(BorrowedSymbol<'a>, &'a [u8])> {
        let raw = input.as_ref();
        let (parsed, tail) = parse::parse_prefix(raw, start_of(raw), options)?;
        let consumed = raw.len() - tail.len();

        let symbol = Symbol {
            raw: &raw[..consumed],
            parsed,
        };

        log!(
            "Successfully parsed '{}' as

AST = {:#?}",
            String::from_utf8_lossy(symbol.raw),
            symbol.parsed
        );

        Ok((symbol, tail.into()))
    }
}

impl<T> fmt::Display for Symbol<T>
where
    T: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render(&self.parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decode, demangle, demangle_bytes, BorrowedSymbol, DemangleOptions, Demangler,
        ItaniumDemangler, ParseOptions, Symbol,
    };
    use crate::ast::Node;
    use crate::error::Error;

    #[test]
    fn external_only_passes_plain_text_through() {
        assert_eq!(decode(b"main", true), Ok(Node::Plain("main".into())));
        assert_eq!(demangle("main", true), Ok("main".to_string()));
        assert_eq!(demangle_bytes(b"\xffmain", true), Ok(b"\xffmain".to_vec()));
        assert_eq!(demangle("__Z3foov", true), Ok("__Z3foov".to_string()));
    }

    #[test]
    fn internal_names_decode_as_types() {
        assert_eq!(demangle("a", false), Ok("signed char".to_string()));
        assert_eq!(
            demangle("N3foo12BarExceptionE", false),
            Ok("foo::BarException".to_string())
        );
        assert_eq!(
            demangle("main", false),
            Err(Error::InvalidMangledName { offset: 1 })
        );
        assert_eq!(demangle("__Z3foov", false), Ok("foo()".to_string()));
    }

    #[test]
    fn trailing_text_is_an_error() {
        assert_eq!(
            demangle("_Z3foovjunk", true),
            Err(Error::InvalidMangledName { offset: 7 })
        );
        let (sym, tail) = BorrowedSymbol::with_tail(&b"_Z3foov junk"[..]).unwrap();
        assert_eq!(sym.as_bytes(), b"_Z3foov");
        assert_eq!(tail, b" junk");
    }

    #[test]
    fn demangler_carries_its_options() {
        let demangler = ItaniumDemangler::new()
            .with_demangle_options(DemangleOptions::new().no_params())
            .with_parse_options(ParseOptions::new().recursion_limit(64));
        assert_eq!(
            demangler.demangle("_ZN5space3fooEibc", true),
            Ok("space::foo".to_string())
        );

        let strict = ItaniumDemangler::new().with_parse_options(ParseOptions::new().recursion_limit(0));
        assert_eq!(
            strict.demangle("_Z3foov", true),
            Err(Error::RecursionLimitExceeded)
        );
    }

    #[test]
    fn symbols_keep_their_ast() {
        let sym = Symbol::new(b"_Z3foov".to_vec()).unwrap();
        assert_eq!(sym.to_string(), "foo()");
        assert!(matches!(*sym.ast(), Node::Function(_)));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn public_types_are_send_and_sync() {
        assert_send_sync::<Node>();
        assert_send_sync::<BorrowedSymbol<'static>>();
        assert_send_sync::<ParseOptions>();
        assert_send_sync::<DemangleOptions>();
        assert_send_sync::<ItaniumDemangler>();
    }
}
