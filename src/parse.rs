//! Decoding of mangled names into `ast::Node` trees.
//!
//! This is a predictive recursive descent parser with one function per
//! grammar production. One or two bytes of lookahead always select the
//! alternative, so there is no backtracking and the first violation of the
//! grammar is reported immediately, with the offset at which it happened.
//!
//! Back references are resolved while parsing: `S_` clones the component
//! recorded in the `SubstitutionTable`, and `T_` clones the argument from the
//! innermost template-argument frame kept by the `ParseContext`. Expanding
//! references this way is charged against a node budget so that small inputs
//! cannot produce huge trees.

use crate::ast::{
    BuiltinType, CallOffset, CastKind, CvQualifiers, Dimension, Expression, Function,
    FunctionType, Node, OperatorName, RefQualifier, SpecialName, WellKnownComponent,
};
use crate::error::{Error, Result};
use crate::index_str::IndexStr;
use crate::subs::SubstitutionTable;
use crate::ParseOptions;
use std::cell::{Cell, RefCell};

macro_rules! try_begin_parse {
    ($ctx:expr) => {
        let _auto_check_recursion = AutoParseRecursion::new($ctx)?;
    };
}

/// The recursion limit used when `ParseOptions` does not set one.
pub const DEFAULT_RECURSION_LIMIT: u32 = 96;

const BASE_EXPANSION_BUDGET: usize = 4096;
const EXPANSION_BUDGET_PER_BYTE: usize = 64;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
struct ParseContextState {
    // The current recursion level. Should always be less than or equal to the
    // maximum.
    recursion_level: u32,
    // Nodes added to the tree so far by expanding back references.
    expanded_weight: usize,
    // Whether or not we are currently parsing the parameters of a lambda.
    in_lambda_signature: bool,
    // Whether or not we are currently parsing the type of a conversion
    // operator.
    in_conversion_type: bool,
}

/// Common context needed when parsing.
#[derive(Debug)]
pub struct ParseContext {
    // Maximum amount of recursive parsing calls we will allow. If this is too
    // large, we can blow the stack.
    max_recursion: u32,
    // Maximum number of nodes that back reference expansion may add.
    max_expanded_weight: usize,
    // Mutable state within the `ParseContext`.
    state: Cell<ParseContextState>,
    // One template argument list per enclosing `<encoding>`.
    template_frames: RefCell<Vec<Vec<Node>>>,
}

impl ParseContext {
    /// Construct a new `ParseContext` for decoding an input of `input_len`
    /// bytes.
    pub fn new(options: &ParseOptions, input_len: usize) -> ParseContext {
        ParseContext {
            max_recursion: options.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT),
            max_expanded_weight: input_len
                .saturating_mul(EXPANSION_BUDGET_PER_BYTE)
                .saturating_add(BASE_EXPANSION_BUDGET),
            state: Cell::new(ParseContextState::default()),
            template_frames: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    fn enter_recursion(&self) -> Result<()> {
        let mut state = self.state.get();
        let new_recursion_level = state.recursion_level + 1;

        if new_recursion_level >= self.max_recursion {
            log!("Hit too much recursion at level {}", self.max_recursion);
            Err(Error::RecursionLimitExceeded)
        } else {
            state.recursion_level = new_recursion_level;
            self.state.set(state);
            Ok(())
        }
    }

    #[inline]
    fn exit_recursion(&self) {
        let mut state = self.state.get();
        debug_assert!(state.recursion_level >= 1);
        state.recursion_level -= 1;
        self.state.set(state);
    }

    /// Check that a tree of the given depth, hung at the current nesting
    /// level, stays within the recursion limit.
    fn check_depth(&self, depth: usize) -> Result<()> {
        let level = self.state.get().recursion_level as usize;
        if level.saturating_add(depth) >= self.max_recursion as usize {
            log!("Tree of depth {} at level {} is too deep", depth, level);
            Err(Error::RecursionLimitExceeded)
        } else {
            Ok(())
        }
    }

    /// Account for copying a back referenced tree into the result.
    fn charge_expansion(&self, weight: usize, depth: usize) -> Result<()> {
        self.check_depth(depth)?;
        let mut state = self.state.get();
        state.expanded_weight = state.expanded_weight.saturating_add(weight);
        if state.expanded_weight > self.max_expanded_weight {
            log!(
                "Back references expanded to {} nodes, over the budget of {}",
                state.expanded_weight,
                self.max_expanded_weight
            );
            return Err(Error::RecursionLimitExceeded);
        }
        self.state.set(state);
        Ok(())
    }

    #[inline]
    fn in_lambda_signature(&self) -> bool {
        self.state.get().in_lambda_signature
    }

    fn set_in_lambda_signature(&self, in_lambda_signature: bool) -> bool {
        let mut state = self.state.get();
        let previously = state.in_lambda_signature;
        state.in_lambda_signature = in_lambda_signature;
        self.state.set(state);
        previously
    }

    #[inline]
    fn in_conversion_type(&self) -> bool {
        self.state.get().in_conversion_type
    }

    fn set_in_conversion_type(&self, in_conversion_type: bool) -> bool {
        let mut state = self.state.get();
        let previously = state.in_conversion_type;
        state.in_conversion_type = in_conversion_type;
        self.state.set(state);
        previously
    }

    /// Push an empty template argument frame, popped again when the returned
    /// guard is dropped.
    pub(crate) fn push_template_frame(&self) -> AutoTemplateFrame<'_> {
        self.template_frames.borrow_mut().push(Vec::new());
        AutoTemplateFrame(self)
    }

    /// Replace the innermost frame's arguments.
    pub(crate) fn set_template_args(&self, args: &[Node]) {
        if let Some(frame) = self.template_frames.borrow_mut().last_mut() {
            log!("Template frame set to {:?}", args);
            *frame = args.to_vec();
        }
    }

    fn template_arg(&self, idx: usize) -> Option<Node> {
        self.template_frames
            .borrow()
            .last()
            .and_then(|frame| frame.get(idx).cloned())
    }

    fn template_args(&self) -> Vec<Node> {
        self.template_frames
            .borrow()
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

/// Does `node` hold template parameters with no argument bound to them,
/// outside of lambda signatures?
fn has_unbound_params(node: &Node) -> bool {
    match *node {
        Node::TemplateParam(_) => true,
        Node::Closure { .. } => false,
        _ => {
            let mut found = false;
            node.for_each_child(&mut |child| found = found || has_unbound_params(child));
            found
        }
    }
}

/// Replace the unbound template parameters in `node` with the matching
/// entries of `args`. Parameters past the end of `args`, and those of lambda
/// signatures, are left alone.
fn bind_template_params(ctx: &ParseContext, node: &mut Node, args: &[Node]) -> Result<()> {
    match *node {
        Node::TemplateParam(idx) => {
            if let Some(arg) = args.get(idx) {
                ctx.charge_expansion(arg.weight(), arg.depth())?;
                *node = arg.clone();
            }
            Ok(())
        }
        Node::Closure { .. } => Ok(()),
        _ => {
            let mut result = Ok(());
            node.for_each_child_mut(&mut |child| {
                if result.is_ok() {
                    result = bind_template_params(ctx, child, args);
                }
            });
            result
        }
    }
}

/// An RAII type to automatically check the recursion level against the
/// maximum. If the maximum has been crossed, return an error. Otherwise,
/// increment the level upon construction, and decrement it upon destruction.
struct AutoParseRecursion<'a>(&'a ParseContext);

impl<'a> AutoParseRecursion<'a> {
    #[inline]
    fn new(ctx: &'a ParseContext) -> Result<AutoParseRecursion<'a>> {
        ctx.enter_recursion()?;
        Ok(AutoParseRecursion(ctx))
    }
}

impl<'a> Drop for AutoParseRecursion<'a> {
    #[inline]
    fn drop(&mut self) {
        self.0.exit_recursion();
    }
}

/// Pops the template argument frame it was created with.
pub(crate) struct AutoTemplateFrame<'a>(&'a ParseContext);

impl<'a> Drop for AutoTemplateFrame<'a> {
    fn drop(&mut self) {
        self.0.template_frames.borrow_mut().pop();
    }
}

/// A trait for the fixed-shape productions that can be parsed from an
/// `IndexStr`, returning the parsed `Self` value and the rest of the input
/// that has not been consumed.
#[doc(hidden)]
pub trait Parse: Sized {
    /// Parse the `Self` value from `input` and return it, updating the
    /// substitution table as needed.
    fn parse<'b>(
        ctx: &ParseContext,
        subs: &mut SubstitutionTable,
        input: IndexStr<'b>,
    ) -> Result<(Self, IndexStr<'b>)>;
}

/// Where decoding of a whole input starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Start {
    /// `_Z <encoding>` (or `__Z <encoding>`), with optional clone suffixes.
    MangledName,
    /// A bare `<type>`, as used for names without the external prefix.
    Type,
}

/// Decode a prefix of `input`, returning the tree and the unconsumed tail.
pub(crate) fn parse_prefix<'b>(
    input: &'b [u8],
    start: Start,
    options: &ParseOptions,
) -> Result<(Node, IndexStr<'b>)> {
    let ctx = ParseContext::new(options, input.len());
    let mut subs = SubstitutionTable::new();
    let input = IndexStr::new(input);
    let result = match start {
        Start::MangledName => parse_mangled_name(&ctx, &mut subs, input),
        Start::Type => parse_type(&ctx, &mut subs, input),
    };
    log!("Final {:?}", subs);
    result
}

/// Decode all of `input`. Trailing bytes are an error.
pub(crate) fn parse_all(input: &[u8], start: Start, options: &ParseOptions) -> Result<Node> {
    let (node, tail) = parse_prefix(input, start, options)?;
    if !tail.is_empty() {
        return Err(Error::InvalidMangledName {
            offset: tail.index(),
        });
    }
    Ok(node)
}

#[inline]
fn unexpected_end(input: IndexStr) -> Error {
    Error::InvalidMangledName {
        offset: input.index() + input.len(),
    }
}

#[inline]
fn unexpected_text(input: IndexStr) -> Error {
    if input.is_empty() {
        unexpected_end(input)
    } else {
        Error::InvalidMangledName {
            offset: input.index(),
        }
    }
}

#[inline]
fn unsupported(input: IndexStr) -> Error {
    log!("Unsupported construct at {}", input.index());
    Error::UnsupportedConstruct {
        offset: input.index(),
    }
}

fn consume<'a>(expected: &[u8], input: IndexStr<'a>) -> Result<IndexStr<'a>> {
    match input.try_split_at(expected.len()) {
        Some((head, tail)) if head == expected => Ok(tail),
        Some(_) => Err(unexpected_text(input)),
        None => Err(unexpected_end(input)),
    }
}

/// The number of leading bytes of `input` that satisfy `pred`.
fn leading<F>(input: IndexStr, pred: F) -> usize
where
    F: Fn(u8) -> bool,
{
    input.as_ref().iter().take_while(|&&c| pred(c)).count()
}

fn is_digit_in_base(c: u8, base: u32) -> bool {
    match base {
        10 => c.is_ascii_digit(),
        36 => c.is_ascii_digit() || c.is_ascii_uppercase(),
        _ => (c as char).is_digit(base),
    }
}

/// Parse a number with the given `base`. Do not allow negative numbers
/// (prefixed with an 'n' instead of a '-') if `allow_signed` is false.
fn parse_number(base: u32, allow_signed: bool, mut input: IndexStr) -> Result<(isize, IndexStr)> {
    if input.is_empty() {
        return Err(unexpected_end(input));
    }

    let num_is_negative = if allow_signed && input.peek() == Some(b'n') {
        input = input.range_from(1..);

        if input.is_empty() {
            return Err(unexpected_end(input));
        }

        true
    } else {
        false
    };

    let num_numeric = leading(input, |c| is_digit_in_base(c, base));
    if num_numeric == 0 {
        return Err(unexpected_text(input));
    }

    let (head, tail) = input.split_at(num_numeric);
    let head = head.as_ref();

    if num_numeric > 1 && head[0] == b'0' {
        // "<number>s appearing in mangled names never have leading zeroes,
        // except for the value zero, represented as '0'."
        return Err(unexpected_text(input));
    }

    let head = std::str::from_utf8(head).map_err(|_| unexpected_text(input))?;
    let mut number = isize::from_str_radix(head, base).map_err(|_| unexpected_text(input))?;
    if num_is_negative {
        number = -number;
    }

    Ok((number, tail))
}

/// A non-negative `<number>`.
fn parse_count(input: IndexStr) -> Result<(usize, IndexStr)> {
    let (number, tail) = parse_number(10, false, input)?;
    Ok((number as usize, tail))
}

/// `[<number>] _`, as used by closures, unnamed types and default arguments:
/// `_` is 1, `<n> _` is `n + 2`.
fn parse_nonnegative_index(input: IndexStr) -> Result<(usize, IndexStr)> {
    if input.peek() == Some(b'_') {
        return Ok((1, input.range_from(1..)));
    }
    let (number, tail) = parse_count(input)?;
    let tail = consume(b"_", tail)?;
    Ok((number + 2, tail))
}

/// Parse a `<seq-id>`.
///
/// ```text
/// <seq-id> ::= <0-9A-Z> <0-9A-Z>*
/// ```
fn parse_seq_id(input: IndexStr) -> Result<(usize, IndexStr)> {
    let (number, tail) = parse_number(36, false, input)?;
    Ok((number as usize, tail))
}

/// Parse a `<discriminator>` if there is one; discriminators only tell apart
/// same-named local entities and are not printed.
///
/// ```text
/// <discriminator> := _ <non-negative number>      # when number < 10
///                 := __ <non-negative number> _   # when number >= 10
/// ```
fn parse_discriminator(input: IndexStr) -> Result<IndexStr> {
    if input.peek() != Some(b'_') {
        return Ok(input);
    }
    let tail = input.range_from(1..);
    if tail.peek() == Some(b'_') {
        let (_, tail) = parse_count(tail.range_from(1..))?;
        consume(b"_", tail)
    } else {
        let (_, tail) = parse_count(tail)?;
        Ok(tail)
    }
}

/// The `<mangled-name>` starting production.
///
/// ```text
/// <mangled-name> ::= _Z <encoding> [<clone-suffix>]*
/// ```
///
/// Darwin prepends an extra underscore, which is accepted too.
fn parse_mangled_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("MangledName", input);
    try_begin_parse!(ctx);

    let tail = if input.starts_with(b"__Z") {
        input.range_from(3..)
    } else {
        consume(b"_Z", input)?
    };

    let (encoding, mut tail) = parse_encoding(ctx, subs, tail)?;

    // A `.` that does not start a clone suffix is left in the tail.
    let mut suffixes = Vec::new();
    while tail.peek() == Some(b'.') {
        match parse_clone_suffix(tail) {
            Ok((suffix, rest)) => {
                suffixes.push(suffix);
                tail = rest;
            }
            Err(_) => break,
        }
    }

    if suffixes.is_empty() {
        Ok((encoding, tail))
    } else {
        Ok((
            Node::CloneSuffix {
                encoding: Box::new(encoding),
                suffixes,
            },
            tail,
        ))
    }
}

/// A GCC or LLVM clone suffix, like `.constprop.0`, `.isra.1`, `.cold` or
/// `.part.2`.
///
/// ```text
/// <clone-suffix> ::= . <identifier> [. <number>]*
///                ::= . <number> [. <number>]*
/// ```
fn parse_clone_suffix(input: IndexStr) -> Result<(String, IndexStr)> {
    log_parse!("CloneSuffix", input);

    let tail = consume(b".", input)?;
    let mut len = leading(tail, |c| c.is_ascii_lowercase() || c == b'_');
    if len == 0 {
        len = leading(tail, |c| c.is_ascii_digit());
    }
    if len == 0 {
        return Err(unexpected_text(tail));
    }

    let mut end = 1 + len;
    loop {
        let rest = input.range_from(end..);
        if rest.peek() != Some(b'.') {
            break;
        }
        let digits = leading(rest.range_from(1..), |c| c.is_ascii_digit());
        if digits == 0 {
            break;
        }
        end += 1 + digits;
    }

    let (suffix, tail) = input.split_at(end);
    Ok((String::from_utf8_lossy(suffix.as_ref()).into_owned(), tail))
}

/// Can the encoding of a function end here? True at the end of the input,
/// the end of a local name's scope, and before anything that cannot start a
/// `<type>`, such as a clone suffix or text following the symbol.
fn is_end_of_encoding(input: IndexStr) -> bool {
    match input.peek() {
        None | Some(b'E') => true,
        Some(c) => !c.is_ascii_alphanumeric(),
    }
}

/// The `<encoding>` production.
///
/// ```text
/// <encoding> ::= <function name> <bare-function-type>
///            ::= <data name>
///            ::= <special-name>
/// ```
fn parse_encoding<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("Encoding", input);
    try_begin_parse!(ctx);

    match input.peek() {
        None => return Err(unexpected_end(input)),
        Some(b'G') | Some(b'T') => {
            let (special, tail) = parse_special_name(ctx, subs, input)?;
            return Ok((Node::Special(special), tail));
        }
        _ => {}
    }

    let _frame = ctx.push_template_frame();
    let (name, info, tail) = parse_name(ctx, subs, input, true)?;

    if is_end_of_encoding(tail) {
        return Ok((name, tail));
    }

    if tail.starts_with(b"Ua9enable_ifI") {
        return Err(unsupported(tail));
    }

    let (ret, tail) = if info.ends_with_template_args && !info.ctor_dtor_conversion {
        let (ret, tail) = parse_type(ctx, subs, tail)?;
        (Some(Box::new(ret)), tail)
    } else {
        (None, tail)
    };

    let (params, tail) = parse_bare_function_params(ctx, subs, tail)?;

    Ok((
        Node::Function(Function {
            name: Box::new(name),
            ret,
            params,
            cv: info.cv,
            ref_qualifier: info.ref_qualifier,
        }),
        tail,
    ))
}

/// The parameter types of a `<bare-function-type>`: a lone `v` means no
/// parameters.
fn parse_bare_function_params<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Vec<Node>, IndexStr<'b>)> {
    log_parse!("BareFunctionType", input);
    try_begin_parse!(ctx);

    if input.peek() == Some(b'v') {
        return Ok((Vec::new(), input.range_from(1..)));
    }

    let mut params = Vec::new();
    let mut tail = input;
    loop {
        let (param, rest) = parse_type(ctx, subs, tail)?;
        params.push(param);
        tail = rest;
        if is_end_of_encoding(tail) {
            return Ok((params, tail));
        }
    }
}

/// The `<special-name>` production.
///
/// ```text
/// <special-name> ::= TV <type>    # virtual table
///                ::= TT <type>    # VTT structure (construction vtable index)
///                ::= TI <type>    # typeinfo structure
///                ::= TS <type>    # typeinfo name (null-terminated byte string)
///                ::= TC <type> <number> _ <type>  # construction vtable
///                ::= TW <object name>             # thread-local wrapper
///                ::= TH <object name>             # thread-local initialization
///                ::= TA <template-arg>            # template parameter object
///                ::= T <call-offset> <base encoding>
///                ::= Tc <call-offset> <call-offset> <base encoding>
///                ::= GV <object name>             # guard variable
///                ::= GR <object name> [<seq-id>] _
///                ::= GA <encoding>                # hidden alias
///                ::= GTt <encoding>               # transaction clone
///                ::= GTn <encoding>               # non-transaction clone
/// ```
fn parse_special_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(SpecialName, IndexStr<'b>)> {
    log_parse!("SpecialName", input);
    try_begin_parse!(ctx);

    let (head, tail) = match input.try_split_at(2) {
        Some(split) => split,
        None => return Err(unexpected_end(input)),
    };

    match head.as_ref() {
        b"TV" => {
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            Ok((SpecialName::VirtualTable(Box::new(ty)), tail))
        }
        b"TT" => {
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            Ok((SpecialName::Vtt(Box::new(ty)), tail))
        }
        b"TI" => {
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            Ok((SpecialName::Typeinfo(Box::new(ty)), tail))
        }
        b"TS" => {
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            Ok((SpecialName::TypeinfoName(Box::new(ty)), tail))
        }
        b"TC" => {
            let (derived, tail) = parse_type(ctx, subs, tail)?;
            let (offset, tail) = parse_number(10, true, tail)?;
            let tail = consume(b"_", tail)?;
            let (base, tail) = parse_type(ctx, subs, tail)?;
            Ok((
                SpecialName::ConstructionVtable {
                    derived: Box::new(derived),
                    offset,
                    base: Box::new(base),
                },
                tail,
            ))
        }
        b"TW" => {
            let (name, _, tail) = parse_name(ctx, subs, tail, false)?;
            Ok((SpecialName::TlsWrapper(Box::new(name)), tail))
        }
        b"TH" => {
            let (name, _, tail) = parse_name(ctx, subs, tail, false)?;
            Ok((SpecialName::TlsInit(Box::new(name)), tail))
        }
        b"TA" => {
            let (arg, tail) = parse_template_arg(ctx, subs, tail)?;
            Ok((SpecialName::TemplateParamObject(Box::new(arg)), tail))
        }
        b"Th" | b"Tv" => {
            let (this_adjustment, tail) = CallOffset::parse(ctx, subs, input.range_from(1..))?;
            let (target, tail) = parse_encoding(ctx, subs, tail)?;
            Ok((
                SpecialName::Thunk {
                    this_adjustment,
                    target: Box::new(target),
                },
                tail,
            ))
        }
        b"Tc" => {
            let (this_adjustment, tail) = CallOffset::parse(ctx, subs, tail)?;
            let (result_adjustment, tail) = CallOffset::parse(ctx, subs, tail)?;
            let (target, tail) = parse_encoding(ctx, subs, tail)?;
            Ok((
                SpecialName::CovariantThunk {
                    this_adjustment,
                    result_adjustment,
                    target: Box::new(target),
                },
                tail,
            ))
        }
        b"GV" => {
            let (name, _, tail) = parse_name(ctx, subs, tail, false)?;
            Ok((SpecialName::GuardVariable(Box::new(name)), tail))
        }
        b"GR" => {
            let (name, _, tail) = parse_name(ctx, subs, tail, false)?;
            let (index, tail) = if tail.peek() == Some(b'_') {
                (0, tail)
            } else {
                let (id, tail) = parse_seq_id(tail)?;
                (id + 1, tail)
            };
            let tail = consume(b"_", tail)?;
            Ok((
                SpecialName::ReferenceTemporary {
                    name: Box::new(name),
                    index,
                },
                tail,
            ))
        }
        b"GA" => {
            let (encoding, tail) = parse_encoding(ctx, subs, tail)?;
            Ok((SpecialName::HiddenAlias(Box::new(encoding)), tail))
        }
        b"GT" => match tail.peek() {
            Some(b't') => {
                let (encoding, tail) = parse_encoding(ctx, subs, tail.range_from(1..))?;
                Ok((SpecialName::TransactionClone(Box::new(encoding)), tail))
            }
            Some(b'n') => {
                let (encoding, tail) = parse_encoding(ctx, subs, tail.range_from(1..))?;
                Ok((SpecialName::NonTransactionClone(Box::new(encoding)), tail))
            }
            _ => Err(unexpected_text(tail)),
        },
        _ => Err(unexpected_text(input)),
    }
}

impl Parse for CallOffset {
    /// ```text
    /// <call-offset> ::= h <nv-offset> _
    ///               ::= v <v-offset> _
    ///
    /// <nv-offset> ::= <offset number>
    /// <v-offset>  ::= <offset number> _ <virtual offset number>
    /// ```
    fn parse<'b>(
        ctx: &ParseContext,
        _subs: &mut SubstitutionTable,
        input: IndexStr<'b>,
    ) -> Result<(CallOffset, IndexStr<'b>)> {
        log_parse!("CallOffset", input);
        try_begin_parse!(ctx);

        match input.peek() {
            Some(b'h') => {
                let (offset, tail) = parse_number(10, true, input.range_from(1..))?;
                let tail = consume(b"_", tail)?;
                Ok((CallOffset::NonVirtual(offset), tail))
            }
            Some(b'v') => {
                let (offset, tail) = parse_number(10, true, input.range_from(1..))?;
                let tail = consume(b"_", tail)?;
                let (virtual_offset, tail) = parse_number(10, true, tail)?;
                let tail = consume(b"_", tail)?;
                Ok((CallOffset::Virtual(offset, virtual_offset), tail))
            }
            _ => Err(unexpected_text(input)),
        }
    }
}

impl Parse for CvQualifiers {
    fn parse<'b>(
        _ctx: &ParseContext,
        _subs: &mut SubstitutionTable,
        input: IndexStr<'b>,
    ) -> Result<(CvQualifiers, IndexStr<'b>)> {
        let mut quals = CvQualifiers::default();
        let mut tail = input;
        if tail.peek() == Some(b'r') {
            quals.restrict = true;
            tail = tail.range_from(1..);
        }
        if tail.peek() == Some(b'V') {
            quals.volatile = true;
            tail = tail.range_from(1..);
        }
        if tail.peek() == Some(b'K') {
            quals.const_ = true;
            tail = tail.range_from(1..);
        }
        Ok((quals, tail))
    }
}

/// What the encoding needs to know about the name it starts with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct NameInfo {
    /// `this` qualifiers of a member function, from a `<nested-name>`.
    cv: CvQualifiers,
    /// Ref-qualifier of a member function, from a `<nested-name>`.
    ref_qualifier: Option<RefQualifier>,
    /// The name's last component has template arguments, so a function
    /// encoding mangles its return type.
    ends_with_template_args: bool,
    /// The name's last component is a constructor, destructor or conversion
    /// operator, which never have a mangled return type.
    ctor_dtor_conversion: bool,
}

/// The `<name>` production. Template arguments of a name parsed at
/// `name_level` (the encoding's own name) become the innermost template
/// frame.
///
/// ```text
/// <name> ::= <nested-name>
///        ::= <unscoped-name>
///        ::= <unscoped-template-name> <template-args>
///        ::= <local-name>
///
/// <unscoped-template-name> ::= <unscoped-name>
///                          ::= <substitution>
/// ```
fn parse_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
    name_level: bool,
) -> Result<(Node, NameInfo, IndexStr<'b>)> {
    log_parse!("Name", input);
    try_begin_parse!(ctx);

    match input.peek() {
        None => Err(unexpected_end(input)),
        Some(b'N') => parse_nested_name(ctx, subs, input, name_level),
        Some(b'Z') => parse_local_name(ctx, subs, input, name_level),
        Some(b'S') if input.peek_second() != Some(b't') => {
            let (name, tail) = parse_substitution(ctx, subs, input)?;
            if tail.peek() != Some(b'I') {
                return Err(unexpected_text(tail));
            }
            let (args, tail) = parse_template_args(ctx, subs, tail, name_level)?;
            let info = NameInfo {
                ends_with_template_args: true,
                ..NameInfo::default()
            };
            Ok((
                Node::Template {
                    name: Box::new(name),
                    args,
                },
                info,
                tail,
            ))
        }
        _ => {
            let mut info = NameInfo::default();
            let (name, tail) = parse_unscoped_name(ctx, subs, input, &mut info)?;
            if tail.peek() != Some(b'I') {
                return Ok((name, info, tail));
            }
            subs.insert(name.clone());
            let (args, tail) = parse_template_args(ctx, subs, tail, name_level)?;
            let mut name = name;
            if info.ctor_dtor_conversion {
                bind_template_params(ctx, &mut name, &args)?;
            }
            info.ends_with_template_args = true;
            Ok((
                Node::Template {
                    name: Box::new(name),
                    args,
                },
                info,
                tail,
            ))
        }
    }
}

/// The `<unscoped-name>` production. The `L` of internal linkage names is
/// skipped.
///
/// ```text
/// <unscoped-name> ::= [L] <unqualified-name>
///                 ::= St [L] <unqualified-name>   # ::std::
/// ```
fn parse_unscoped_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
    info: &mut NameInfo,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("UnscopedName", input);
    try_begin_parse!(ctx);

    let (in_std, tail) = if input.starts_with(b"St") {
        (true, input.range_from(2..))
    } else {
        (false, input)
    };
    let tail = if tail.peek() == Some(b'L') {
        tail.range_from(1..)
    } else {
        tail
    };

    let (name, tail) = parse_unqualified_name(ctx, subs, tail, None, info)?;
    if in_std {
        Ok((std_qualified(name), tail))
    } else {
        Ok((name, tail))
    }
}

fn std_qualified(name: Node) -> Node {
    Node::Nested {
        prefix: Box::new(Node::WellKnown {
            component: WellKnownComponent::Std,
            expanded: false,
        }),
        name: Box::new(name),
    }
}

/// The `<nested-name>` production. Every prefix is added to the substitution
/// table as it is completed; the complete name is not.
///
/// ```text
/// <nested-name> ::= N [<CV-qualifiers>] [<ref-qualifier>] <prefix> <unqualified-name> E
///               ::= N [<CV-qualifiers>] [<ref-qualifier>] <template-prefix> <template-args> E
///
/// <prefix> ::= <unqualified-name>
///          ::= <prefix> <unqualified-name>
///          ::= <template-prefix> <template-args>
///          ::= <template-param>
///          ::= <decltype>
///          ::= <prefix> <data-member-prefix>
///          ::= <substitution>
/// ```
fn parse_nested_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
    name_level: bool,
) -> Result<(Node, NameInfo, IndexStr<'b>)> {
    log_parse!("NestedName", input);
    try_begin_parse!(ctx);

    let tail = consume(b"N", input)?;
    let (cv, mut tail) = CvQualifiers::parse(ctx, subs, tail)?;
    let mut info = NameInfo {
        cv,
        ..NameInfo::default()
    };
    match tail.peek() {
        Some(b'R') => {
            info.ref_qualifier = Some(RefQualifier::LValueRef);
            tail = tail.range_from(1..);
        }
        Some(b'O') => {
            info.ref_qualifier = Some(RefQualifier::RValueRef);
            tail = tail.range_from(1..);
        }
        _ => {}
    }

    let mut so_far: Option<Node> = None;
    let mut last_was_pushed = false;

    loop {
        let component_start = tail;
        match tail.peek() {
            None => return Err(unexpected_end(tail)),
            Some(b'E') => {
                tail = tail.range_from(1..);
                break;
            }
            Some(b'L') => {
                tail = tail.range_from(1..);
                continue;
            }
            Some(b'M') => {
                if so_far.is_none() {
                    return Err(unexpected_text(tail));
                }
                tail = tail.range_from(1..);
                continue;
            }
            Some(b'S') => {
                if so_far.is_some() {
                    return Err(unexpected_text(tail));
                }
                if tail.peek_second() == Some(b't') {
                    so_far = Some(Node::WellKnown {
                        component: WellKnownComponent::Std,
                        expanded: false,
                    });
                    tail = tail.range_from(2..);
                } else {
                    let (sub, rest) = parse_substitution(ctx, subs, tail)?;
                    let sub = match sub {
                        Node::WellKnown { component, .. }
                            if matches!(rest.peek(), Some(b'C') | Some(b'D')) =>
                        {
                            Node::WellKnown {
                                component,
                                expanded: true,
                            }
                        }
                        sub => sub,
                    };
                    so_far = Some(sub);
                    tail = rest;
                }
                last_was_pushed = false;
                info.ends_with_template_args = false;
                continue;
            }
            Some(b'T') => {
                if so_far.is_some() {
                    return Err(unexpected_text(tail));
                }
                let (param, rest) = parse_template_param(ctx, subs, tail)?;
                so_far = Some(param);
                tail = rest;
                info.ends_with_template_args = false;
            }
            Some(b'D') if matches!(tail.peek_second(), Some(b't') | Some(b'T')) => {
                if so_far.is_some() {
                    return Err(unexpected_text(tail));
                }
                let (decltype, rest) = parse_decltype(ctx, subs, tail)?;
                so_far = Some(decltype);
                tail = rest;
                info.ends_with_template_args = false;
            }
            Some(b'I') => {
                let name = match so_far.take() {
                    Some(name) if !info.ends_with_template_args => name,
                    _ => return Err(unexpected_text(tail)),
                };
                let (args, rest) = parse_template_args(ctx, subs, tail, name_level)?;
                let mut name = name;
                if info.ctor_dtor_conversion {
                    bind_template_params(ctx, &mut name, &args)?;
                }
                so_far = Some(Node::Template {
                    name: Box::new(name),
                    args,
                });
                tail = rest;
                info.ends_with_template_args = true;
            }
            Some(_) => {
                let mut component_info = NameInfo::default();
                let (name, rest) =
                    parse_unqualified_name(ctx, subs, tail, so_far.as_ref(), &mut component_info)?;
                so_far = Some(match so_far.take() {
                    Some(prefix) => Node::Nested {
                        prefix: Box::new(prefix),
                        name: Box::new(name),
                    },
                    None => name,
                });
                tail = rest;
                info.ends_with_template_args = false;
                info.ctor_dtor_conversion = component_info.ctor_dtor_conversion;
            }
        }

        if let Some(ref component) = so_far {
            if let Err(e) = ctx.check_depth(component.depth()) {
                log!("Nested name too deep at {}", component_start.index());
                return Err(e);
            }
            subs.insert(component.clone());
            last_was_pushed = true;
        }
    }

    let name = match so_far {
        Some(name) => name,
        None => return Err(unexpected_text(input)),
    };
    if last_was_pushed {
        subs.pop();
    }
    Ok((name, info, tail))
}

/// The `<local-name>` production.
///
/// ```text
/// <local-name> := Z <function encoding> E <entity name> [<discriminator>]
///              := Z <function encoding> E s [<discriminator>]
///              := Z <function encoding> Ed [ <parameter number> ] _ <entity name>
/// ```
fn parse_local_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
    name_level: bool,
) -> Result<(Node, NameInfo, IndexStr<'b>)> {
    log_parse!("LocalName", input);
    try_begin_parse!(ctx);

    let tail = consume(b"Z", input)?;
    let (encoding, tail) = parse_encoding(ctx, subs, tail)?;
    let tail = consume(b"E", tail)?;

    let (entity, info, tail) = match tail.peek() {
        Some(b's') => {
            let tail = parse_discriminator(tail.range_from(1..))?;
            (Node::StringLiteral, NameInfo::default(), tail)
        }
        Some(b'd') => {
            let (number, tail) = parse_nonnegative_index(tail.range_from(1..))?;
            let (name, info, tail) = parse_name(ctx, subs, tail, name_level)?;
            let entity = Node::Nested {
                prefix: Box::new(Node::DefaultArg(number)),
                name: Box::new(name),
            };
            (entity, info, tail)
        }
        _ => {
            let (name, info, tail) = parse_name(ctx, subs, tail, name_level)?;
            let tail = parse_discriminator(tail)?;
            (name, info, tail)
        }
    };

    Ok((
        Node::Local {
            encoding: Box::new(encoding),
            entity: Box::new(entity),
        },
        info,
        tail,
    ))
}

/// The `<unqualified-name>` production, followed by any ABI tags. `scope`
/// is the enclosing prefix, which names constructors and destructors.
///
/// ```text
/// <unqualified-name> ::= <operator-name> [<abi-tags>]
///                    ::= <ctor-dtor-name>
///                    ::= <source-name>
///                    ::= <unnamed-type-name>
///                    ::= DC <source-name>+ E  # structured binding declaration
///
/// <abi-tags> ::= <abi-tag> [<abi-tags>]
/// <abi-tag> ::= B <source-name>
/// ```
fn parse_unqualified_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
    scope: Option<&Node>,
    info: &mut NameInfo,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("UnqualifiedName", input);
    try_begin_parse!(ctx);

    let (mut name, mut tail) = match input.peek() {
        None => return Err(unexpected_end(input)),
        Some(b'0'..=b'9') => {
            let (ident, tail) = parse_source_name(input)?;
            (Node::Identifier(ident), tail)
        }
        Some(b'U') => match input.peek_second() {
            Some(b't') => {
                let (number, tail) = parse_nonnegative_index(input.range_from(2..))?;
                (Node::UnnamedType(number), tail)
            }
            Some(b'l') => parse_closure_type(ctx, subs, input)?,
            _ => return Err(unexpected_text(input)),
        },
        Some(b'C') => {
            let mut tail = input.range_from(1..);
            let inheriting = tail.peek() == Some(b'I');
            if inheriting {
                tail = tail.range_from(1..);
            }
            match tail.peek() {
                Some(b'1'..=b'5') => tail = tail.range_from(1..),
                _ => return Err(unexpected_text(tail)),
            }
            if inheriting {
                let (_, rest) = parse_type(ctx, subs, tail)?;
                tail = rest;
            }
            let class = scope.and_then(leaf_name).ok_or_else(|| unexpected_text(input))?;
            info.ctor_dtor_conversion = true;
            (Node::Ctor(Box::new(class)), tail)
        }
        Some(b'D') => match input.peek_second() {
            Some(b'0') | Some(b'1') | Some(b'2') | Some(b'4') | Some(b'5') => {
                let class = scope.and_then(leaf_name).ok_or_else(|| unexpected_text(input))?;
                info.ctor_dtor_conversion = true;
                (Node::Dtor(Box::new(class)), input.range_from(2..))
            }
            Some(b'C') => {
                let mut tail = input.range_from(2..);
                let mut names = Vec::new();
                while tail.peek() != Some(b'E') {
                    let (ident, rest) = parse_source_name(tail)?;
                    names.push(ident);
                    tail = rest;
                }
                if names.is_empty() {
                    return Err(unexpected_text(tail));
                }
                (Node::StructuredBinding(names), tail.range_from(1..))
            }
            _ => return Err(unexpected_text(input)),
        },
        Some(b'a'..=b'z') => parse_operator_name(ctx, subs, input, info)?,
        Some(_) => return Err(unexpected_text(input)),
    };

    while tail.peek() == Some(b'B') {
        let (tag, rest) = parse_source_name(tail.range_from(1..))?;
        name = Node::AbiTagged {
            name: Box::new(name),
            tag,
        };
        tail = rest;
    }

    Ok((name, tail))
}

/// The unqualified class name that names the constructors and destructors
/// of `scope`.
fn leaf_name(scope: &Node) -> Option<Node> {
    match *scope {
        Node::Identifier(_) | Node::UnnamedType(_) | Node::Closure { .. } => Some(scope.clone()),
        Node::Nested { ref name, .. } => leaf_name(name),
        Node::Template { ref name, .. } => leaf_name(name),
        Node::AbiTagged { ref name, .. } => leaf_name(name),
        Node::Local { ref entity, .. } => leaf_name(entity),
        Node::WellKnown { component, .. } => component
            .leaf_name()
            .map(|leaf| Node::Identifier(leaf.to_string())),
        _ => None,
    }
}

/// The `<source-name>` production.
///
/// ```text
/// <source-name> ::= <positive length number> <identifier>
/// ```
fn parse_source_name(input: IndexStr) -> Result<(String, IndexStr)> {
    log_parse!("SourceName", input);

    let (len, tail) = parse_count(input)?;
    if len == 0 {
        return Err(unexpected_text(input));
    }
    let (ident, tail) = match tail.try_split_at(len) {
        Some(split) => split,
        None => return Err(unexpected_end(tail)),
    };

    let ident = ident.as_ref();
    if is_anonymous_namespace(ident) {
        return Ok(("(anonymous namespace)".to_string(), tail));
    }
    Ok((String::from_utf8_lossy(ident).into_owned(), tail))
}

/// `_GLOBAL__N_1` and friends, the GCC and Clang names of anonymous
/// namespaces.
fn is_anonymous_namespace(ident: &[u8]) -> bool {
    ident.len() > 9
        && ident.starts_with(b"_GLOBAL_")
        && matches!(ident[8], b'.' | b'_' | b'$')
        && ident[9] == b'N'
}

/// The `<operator-name>` production.
///
/// ```text
/// <operator-name> ::= <simple operator>
///                 ::= cv <type>               # (cast)
///                 ::= li <source-name>        # operator ""
///                 ::= v <digit> <source-name> # vendor extended operator
/// ```
fn parse_operator_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
    info: &mut NameInfo,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("OperatorName", input);
    try_begin_parse!(ctx);

    if input.starts_with(b"cv") {
        let previously = ctx.set_in_conversion_type(true);
        let parsed = parse_type(ctx, subs, input.range_from(2..));
        ctx.set_in_conversion_type(previously);
        let (mut ty, tail) = parsed?;

        // The template arguments of a conversion operator template come
        // after its type, and bind its parameters once they are parsed.
        if tail.peek() != Some(b'I') && has_unbound_params(&ty) {
            bind_template_params(ctx, &mut ty, &ctx.template_args())?;
            if has_unbound_params(&ty) {
                return Err(Error::InvalidMangledName {
                    offset: input.index() + 2,
                });
            }
        }
        info.ctor_dtor_conversion = true;
        return Ok((Node::ConversionOperator(Box::new(ty)), tail));
    }

    if input.starts_with(b"li") {
        let (name, tail) = parse_source_name(input.range_from(2..))?;
        return Ok((Node::LiteralOperator(name), tail));
    }

    if input.peek() == Some(b'v') && input.peek_second().map_or(false, |c| c.is_ascii_digit()) {
        let (name, tail) = parse_source_name(input.range_from(2..))?;
        return Ok((Node::VendorOperator(name), tail));
    }

    let (op, tail) = OperatorName::parse(ctx, subs, input)?;
    Ok((Node::Operator(op), tail))
}

/// The `<closure-type-name>` production.
///
/// ```text
/// <closure-type-name> ::= Ul <lambda-sig> E [ <nonnegative number> ] _
///
/// <lambda-sig> ::= <parameter type>+  # or "v" if the lambda has no parameters
/// ```
fn parse_closure_type<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("ClosureTypeName", input);
    try_begin_parse!(ctx);

    let tail = consume(b"Ul", input)?;
    let previously = ctx.set_in_lambda_signature(true);
    let params = parse_lambda_params(ctx, subs, tail);
    ctx.set_in_lambda_signature(previously);
    let (params, tail) = params?;

    let tail = consume(b"E", tail)?;
    let (number, tail) = parse_nonnegative_index(tail)?;
    Ok((Node::Closure { params, number }, tail))
}

fn parse_lambda_params<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Vec<Node>, IndexStr<'b>)> {
    if input.starts_with(b"vE") {
        return Ok((Vec::new(), input.range_from(1..)));
    }

    let mut params = Vec::new();
    let mut tail = input;
    while tail.peek() != Some(b'E') {
        let (param, rest) = parse_type(ctx, subs, tail)?;
        params.push(param);
        tail = rest;
    }
    if params.is_empty() {
        return Err(unexpected_text(tail));
    }
    Ok((params, tail))
}

/// The `<substitution>` production: a back reference into the substitution
/// table, or one of the well-known `std` abbreviations.
///
/// ```text
/// <substitution> ::= S_
///                ::= S <seq-id> _
///                ::= St | Sa | Sb | Ss | Si | So | Sd
/// ```
fn parse_substitution<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("Substitution", input);
    try_begin_parse!(ctx);

    let tail = consume(b"S", input)?;
    match tail.peek() {
        None => Err(unexpected_end(tail)),
        Some(b'a') | Some(b'b') | Some(b's') | Some(b'i') | Some(b'o') | Some(b'd')
        | Some(b't') => {
            let (component, tail) = WellKnownComponent::parse(ctx, subs, input)?;
            Ok((
                Node::WellKnown {
                    component,
                    expanded: false,
                },
                tail,
            ))
        }
        Some(_) => {
            let (idx, tail) = if tail.peek() == Some(b'_') {
                (0, tail)
            } else {
                let (id, tail) = parse_seq_id(tail)?;
                (id + 1, tail)
            };
            let tail = consume(b"_", tail)?;

            let entry = subs.get(idx).ok_or(Error::InvalidMangledName {
                offset: input.index(),
            })?;
            ctx.charge_expansion(entry.weight(), entry.depth())?;
            let mut node = entry.node().clone();
            let binding = !ctx.in_lambda_signature() && !ctx.in_conversion_type();
            if binding && has_unbound_params(&node) {
                bind_template_params(ctx, &mut node, &ctx.template_args())?;
            }
            Ok((node, tail))
        }
    }
}

/// The `<template-param>` production, resolved against the innermost
/// template argument frame.
///
/// ```text
/// <template-param> ::= T_ # first template parameter
///                  ::= T <parameter-2 non-negative number> _
/// ```
fn parse_template_param<'b>(
    ctx: &ParseContext,
    _subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("TemplateParam", input);
    try_begin_parse!(ctx);

    let tail = consume(b"T", input)?;
    if tail.peek() == Some(b'L') {
        return Err(unsupported(input));
    }
    let (idx, tail) = if tail.peek() == Some(b'_') {
        (0, tail)
    } else {
        let (number, tail) = parse_count(tail)?;
        (number + 1, tail)
    };
    let tail = consume(b"_", tail)?;

    if ctx.in_lambda_signature() || ctx.in_conversion_type() {
        return Ok((Node::TemplateParam(idx), tail));
    }

    match ctx.template_arg(idx) {
        Some(arg) => {
            ctx.charge_expansion(arg.weight(), arg.depth())?;
            Ok((arg, tail))
        }
        None => Err(Error::InvalidMangledName {
            offset: input.index(),
        }),
    }
}

/// The `<template-args>` production.
///
/// ```text
/// <template-args> ::= I <template-arg>+ E
/// ```
fn parse_template_args<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
    name_level: bool,
) -> Result<(Vec<Node>, IndexStr<'b>)> {
    log_parse!("TemplateArgs", input);
    try_begin_parse!(ctx);

    let mut tail = consume(b"I", input)?;
    let mut args = Vec::new();
    while tail.peek() != Some(b'E') {
        let (arg, rest) = parse_template_arg(ctx, subs, tail)?;
        args.push(arg);
        tail = rest;
    }

    if name_level {
        ctx.set_template_args(&args);
    }
    Ok((args, tail.range_from(1..)))
}

/// The `<template-arg>` production.
///
/// ```text
/// <template-arg> ::= <type>                # type or template
///                ::= X <expression> E      # expression
///                ::= <expr-primary>        # simple expressions
///                ::= J <template-arg>* E   # argument pack
///                ::= LZ <encoding> E       # extension
/// ```
fn parse_template_arg<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("TemplateArg", input);
    try_begin_parse!(ctx);

    match input.peek() {
        None => Err(unexpected_end(input)),
        Some(b'X') => {
            let (expr, tail) = parse_expression(ctx, subs, input.range_from(1..))?;
            let tail = consume(b"E", tail)?;
            Ok((expr, tail))
        }
        Some(b'J') => {
            let mut tail = input.range_from(1..);
            let mut items = Vec::new();
            while tail.peek() != Some(b'E') {
                let (item, rest) = parse_template_arg(ctx, subs, tail)?;
                items.push(item);
                tail = rest;
            }
            Ok((Node::Pack(items), tail.range_from(1..)))
        }
        Some(b'L') if input.peek_second() == Some(b'Z') => {
            let (encoding, tail) = parse_encoding(ctx, subs, input.range_from(2..))?;
            let tail = consume(b"E", tail)?;
            Ok((encoding, tail))
        }
        Some(b'L') => parse_expr_primary(ctx, subs, input),
        Some(_) => parse_type(ctx, subs, input),
    }
}

/// The `<type>` production. Every type other than builtins and bare back
/// references is added to the substitution table.
///
/// ```text
/// <type> ::= <builtin-type>
///        ::= <qualified-type>
///        ::= <function-type>
///        ::= <class-enum-type>
///        ::= <array-type>
///        ::= <vector-type>
///        ::= <pointer-to-member-type>
///        ::= <template-param>
///        ::= <template-template-param> <template-args>
///        ::= <decltype>
///        ::= P <type>        # pointer
///        ::= R <type>        # l-value reference
///        ::= O <type>        # r-value reference (C++11)
///        ::= C <type>        # complex pair (C99)
///        ::= G <type>        # imaginary (C99)
///        ::= <substitution>  # See Compression below
///        ::= Dp <type>       # pack expansion (C++11)
/// ```
fn parse_type<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("Type", input);
    try_begin_parse!(ctx);

    let (ty, tail) = match input.peek() {
        None => return Err(unexpected_end(input)),
        Some(b'v') | Some(b'w') | Some(b'b') | Some(b'c') | Some(b'a') | Some(b'h')
        | Some(b's') | Some(b't') | Some(b'i') | Some(b'j') | Some(b'l') | Some(b'm')
        | Some(b'x') | Some(b'y') | Some(b'n') | Some(b'o') | Some(b'f') | Some(b'd')
        | Some(b'e') | Some(b'g') | Some(b'z') => {
            let (builtin, tail) = BuiltinType::parse(ctx, subs, input)?;
            return Ok((Node::Builtin(builtin), tail));
        }
        Some(b'u') => {
            let (name, tail) = parse_source_name(input.range_from(1..))?;
            (Node::VendorType(name), tail)
        }
        Some(b'D') => match input.peek_second() {
            Some(b'd') | Some(b'e') | Some(b'f') | Some(b'h') | Some(b'i') | Some(b's')
            | Some(b'u') | Some(b'a') | Some(b'c') | Some(b'n') => {
                let (builtin, tail) = BuiltinType::parse(ctx, subs, input)?;
                return Ok((Node::Builtin(builtin), tail));
            }
            Some(b'F') => {
                let (bits, tail) = parse_count(input.range_from(2..))?;
                let tail = consume(b"_", tail)?;
                return Ok((Node::VendorType(format!("_Float{}", bits)), tail));
            }
            Some(b't') | Some(b'T') => parse_decltype(ctx, subs, input)?,
            Some(b'v') => parse_vector_type(ctx, subs, input)?,
            Some(b'p') => {
                let (inner, tail) = parse_type(ctx, subs, input.range_from(2..))?;
                (Node::PackExpansion(Box::new(inner)), tail)
            }
            Some(b'o') | Some(b'x') => parse_function_type(ctx, subs, input)?,
            Some(b'O') | Some(b'w') | Some(b'k') | Some(b'K') | Some(b'B') | Some(b'U') => {
                return Err(unsupported(input));
            }
            _ => return Err(unexpected_text(input)),
        },
        Some(b'r') | Some(b'V') | Some(b'K') => {
            let (quals, after) = CvQualifiers::parse(ctx, subs, input)?;
            let is_function = after.peek() == Some(b'F')
                || (after.peek() == Some(b'D')
                    && matches!(
                        after.peek_second(),
                        Some(b'o') | Some(b'O') | Some(b'w') | Some(b'x')
                    ));
            if is_function {
                parse_function_type(ctx, subs, input)?
            } else {
                let (inner, tail) = parse_type(ctx, subs, after)?;
                (
                    Node::Qualified {
                        quals,
                        inner: Box::new(inner),
                    },
                    tail,
                )
            }
        }
        Some(b'U') => {
            let (qualifier, tail) = parse_source_name(input.range_from(1..))?;
            let (args, tail) = if tail.peek() == Some(b'I') {
                parse_template_args(ctx, subs, tail, false)?
            } else {
                (Vec::new(), tail)
            };
            let (inner, tail) = parse_type(ctx, subs, tail)?;
            (
                Node::VendorQualified {
                    qualifier,
                    args,
                    inner: Box::new(inner),
                },
                tail,
            )
        }
        Some(b'F') => parse_function_type(ctx, subs, input)?,
        Some(b'A') => parse_array_type(ctx, subs, input)?,
        Some(b'M') => {
            let (class, tail) = parse_type(ctx, subs, input.range_from(1..))?;
            let (member, tail) = parse_type(ctx, subs, tail)?;
            (
                Node::PointerToMember {
                    class: Box::new(class),
                    member: Box::new(member),
                },
                tail,
            )
        }
        Some(b'T') => match input.peek_second() {
            Some(b's') | Some(b'u') | Some(b'e') => {
                let keyword = match input.peek_second() {
                    Some(b's') => "struct",
                    Some(b'u') => "union",
                    _ => "enum",
                };
                let (name, _, tail) = parse_name(ctx, subs, input.range_from(2..), false)?;
                (
                    Node::Elaborated {
                        keyword,
                        name: Box::new(name),
                    },
                    tail,
                )
            }
            Some(b'y') | Some(b'n') | Some(b't') | Some(b'p') => return Err(unsupported(input)),
            _ => {
                let (param, tail) = parse_template_param(ctx, subs, input)?;
                if tail.peek() != Some(b'I') {
                    (param, tail)
                } else {
                    // A template template parameter. In the type of a
                    // conversion operator template the arguments belong to
                    // the operator instead, unless a second list follows.
                    let checkpoint = subs.len();
                    subs.insert(param.clone());
                    let (args, rest) = parse_template_args(ctx, subs, tail, false)?;
                    if ctx.in_conversion_type() && rest.peek() != Some(b'I') {
                        subs.truncate(checkpoint);
                        (param, tail)
                    } else {
                        (
                            Node::Template {
                                name: Box::new(param),
                                args,
                            },
                            rest,
                        )
                    }
                }
            }
        },
        Some(b'P') => {
            let (inner, tail) = parse_type(ctx, subs, input.range_from(1..))?;
            (Node::Pointer(Box::new(inner)), tail)
        }
        Some(b'R') => {
            let (inner, tail) = parse_type(ctx, subs, input.range_from(1..))?;
            (make_reference(RefQualifier::LValueRef, inner), tail)
        }
        Some(b'O') => {
            let (inner, tail) = parse_type(ctx, subs, input.range_from(1..))?;
            (make_reference(RefQualifier::RValueRef, inner), tail)
        }
        Some(b'C') => {
            let (inner, tail) = parse_type(ctx, subs, input.range_from(1..))?;
            (Node::Complex(Box::new(inner)), tail)
        }
        Some(b'G') => {
            let (inner, tail) = parse_type(ctx, subs, input.range_from(1..))?;
            (Node::Imaginary(Box::new(inner)), tail)
        }
        Some(b'S') if input.peek_second() != Some(b't') => {
            let (sub, tail) = parse_substitution(ctx, subs, input)?;
            if tail.peek() != Some(b'I') {
                return Ok((sub, tail));
            }
            let (args, tail) = parse_template_args(ctx, subs, tail, false)?;
            (
                Node::Template {
                    name: Box::new(sub),
                    args,
                },
                tail,
            )
        }
        Some(b'S') | Some(b'N') | Some(b'Z') | Some(b'0'..=b'9') => {
            let (name, _, tail) = parse_name(ctx, subs, input, false)?;
            (name, tail)
        }
        Some(_) => return Err(unexpected_text(input)),
    };

    subs.insert(ty.clone());
    Ok((ty, tail))
}

/// Build a reference type, collapsing references to references the way
/// template instantiation does: `& &`, `& &&` and `&& &` are `&`, and
/// `&& &&` is `&&`.
fn make_reference(kind: RefQualifier, inner: Node) -> Node {
    match inner {
        Node::Reference {
            kind: inner_kind,
            inner,
        } => {
            let kind = if kind == RefQualifier::RValueRef && inner_kind == RefQualifier::RValueRef {
                RefQualifier::RValueRef
            } else {
                RefQualifier::LValueRef
            };
            Node::Reference { kind, inner }
        }
        inner => Node::Reference {
            kind,
            inner: Box::new(inner),
        },
    }
}

/// The `<function-type>` production.
///
/// ```text
/// <function-type> ::= [<CV-qualifiers>] [<exception-spec>] [Dx] F [Y] <bare-function-type> [<ref-qualifier>] E
///
/// <exception-spec> ::= Do                # non-throwing exception-specification
/// ```
fn parse_function_type<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("FunctionType", input);
    try_begin_parse!(ctx);

    let (cv, mut tail) = CvQualifiers::parse(ctx, subs, input)?;

    let mut noexcept = false;
    if tail.starts_with(b"Do") {
        noexcept = true;
        tail = tail.range_from(2..);
    } else if tail.starts_with(b"DO") || tail.starts_with(b"Dw") {
        return Err(unsupported(tail));
    }

    // transaction_safe
    if tail.starts_with(b"Dx") {
        tail = tail.range_from(2..);
    }

    let tail = consume(b"F", tail)?;
    // extern "C"
    let tail = if tail.peek() == Some(b'Y') {
        tail.range_from(1..)
    } else {
        tail
    };

    let (ret, tail) = parse_type(ctx, subs, tail)?;

    // A lone `v` is an empty parameter list.
    let mut tail = if tail.starts_with(b"vE") || tail.starts_with(b"vRE") || tail.starts_with(b"vOE")
    {
        tail.range_from(1..)
    } else {
        tail
    };

    let mut params = Vec::new();
    let mut ref_qualifier = None;
    loop {
        if tail.starts_with(b"E") {
            tail = tail.range_from(1..);
            break;
        }
        if tail.starts_with(b"RE") {
            ref_qualifier = Some(RefQualifier::LValueRef);
            tail = tail.range_from(2..);
            break;
        }
        if tail.starts_with(b"OE") {
            ref_qualifier = Some(RefQualifier::RValueRef);
            tail = tail.range_from(2..);
            break;
        }
        let (param, rest) = parse_type(ctx, subs, tail)?;
        params.push(param);
        tail = rest;
    }

    Ok((
        Node::FunctionType(FunctionType {
            ret: Box::new(ret),
            params,
            cv,
            ref_qualifier,
            noexcept,
        }),
        tail,
    ))
}

/// An array bound or vector size: a number, an expression, or nothing,
/// followed by `_`.
fn parse_dimension<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Dimension, IndexStr<'b>)> {
    match input.peek() {
        Some(b'_') => Ok((Dimension::Unknown, input.range_from(1..))),
        Some(b'0'..=b'9') => {
            let (number, tail) = parse_count(input)?;
            let tail = consume(b"_", tail)?;
            Ok((Dimension::Number(number), tail))
        }
        _ => {
            let (expr, tail) = parse_expression(ctx, subs, input)?;
            let tail = consume(b"_", tail)?;
            Ok((Dimension::Expression(Box::new(expr)), tail))
        }
    }
}

/// The `<array-type>` production.
///
/// ```text
/// <array-type> ::= A <positive dimension number> _ <element type>
///              ::= A [<dimension expression>] _ <element type>
/// ```
fn parse_array_type<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("ArrayType", input);
    try_begin_parse!(ctx);

    let tail = consume(b"A", input)?;
    let (dimension, tail) = parse_dimension(ctx, subs, tail)?;
    let (element, tail) = parse_type(ctx, subs, tail)?;
    Ok((
        Node::Array {
            dimension,
            element: Box::new(element),
        },
        tail,
    ))
}

/// The `<vector-type>` production.
///
/// ```text
/// <vector-type> ::= Dv <number> _ <type>
///               ::= Dv _ <expression> _ <type>
/// ```
fn parse_vector_type<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("VectorType", input);
    try_begin_parse!(ctx);

    let tail = consume(b"Dv", input)?;
    let (dimension, tail) = if tail.peek() == Some(b'_') {
        let (expr, tail) = parse_expression(ctx, subs, tail.range_from(1..))?;
        let tail = consume(b"_", tail)?;
        (Dimension::Expression(Box::new(expr)), tail)
    } else {
        parse_dimension(ctx, subs, tail)?
    };
    let (element, tail) = parse_type(ctx, subs, tail)?;
    Ok((
        Node::Vector {
            dimension,
            element: Box::new(element),
        },
        tail,
    ))
}

/// The `<decltype>` production.
///
/// ```text
/// <decltype> ::= Dt <expression> E
///            ::= DT <expression> E
/// ```
fn parse_decltype<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("Decltype", input);
    try_begin_parse!(ctx);

    let tail = if input.starts_with(b"Dt") || input.starts_with(b"DT") {
        input.range_from(2..)
    } else {
        return Err(unexpected_text(input));
    };
    let (expr, tail) = parse_expression(ctx, subs, tail)?;
    let tail = consume(b"E", tail)?;
    Ok((Node::Decltype(Box::new(expr)), tail))
}

/// The `<expr-primary>` production.
///
/// ```text
/// <expr-primary> ::= L <type> <value number> E        # integer literal
///                ::= L <type> <value float> E         # floating literal
///                ::= L <string type> E                # string literal
///                ::= L <nullptr type> E               # nullptr literal (i.e., "LDnE")
///                ::= L <type> <real-part float> _ <imag-part float> E
///                ::= L <mangled-name> E               # external name
/// ```
fn parse_expr_primary<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("ExprPrimary", input);
    try_begin_parse!(ctx);

    let tail = consume(b"L", input)?;

    if tail.starts_with(b"_Z") || tail.starts_with(b"Z") {
        let skip = if tail.peek() == Some(b'_') { 2 } else { 1 };
        let (encoding, tail) = parse_encoding(ctx, subs, tail.range_from(skip..))?;
        let tail = consume(b"E", tail)?;
        return Ok((encoding, tail));
    }

    if tail.starts_with(b"DnE") {
        return Ok((Node::Nullptr, tail.range_from(3..)));
    }
    if tail.starts_with(b"Dn0E") {
        return Ok((Node::Nullptr, tail.range_from(4..)));
    }

    let (ty, tail) = parse_type(ctx, subs, tail)?;
    let len = leading(tail, |c| c != b'E');
    let (value, tail) = tail.split_at(len);
    let tail = consume(b"E", tail)?;

    let value = value.as_ref();
    let value = match value.split_first() {
        Some((&b'n', rest)) => format!("-{}", String::from_utf8_lossy(rest)),
        _ => String::from_utf8_lossy(value).into_owned(),
    };

    Ok((
        Node::Literal {
            ty: Box::new(ty),
            value,
        },
        tail,
    ))
}

/// Expressions up to a closing `E`.
fn parse_expressions_until_end<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Vec<Node>, IndexStr<'b>)> {
    let mut exprs = Vec::new();
    let mut tail = input;
    while tail.peek() != Some(b'E') {
        let (expr, rest) = parse_expression(ctx, subs, tail)?;
        exprs.push(expr);
        tail = rest;
    }
    Ok((exprs, tail.range_from(1..)))
}

fn expr(expression: Expression) -> Node {
    Node::Expression(Box::new(expression))
}

/// The `<expression>` production.
///
/// ```text
/// <expression> ::= <unary operator-name> <expression>
///              ::= <binary operator-name> <expression> <expression>
///              ::= <ternary operator-name> <expression> <expression> <expression>
///              ::= pp_ <expression>                             # prefix ++
///              ::= mm_ <expression>                             # prefix --
///              ::= cl <expression>+ E                           # expression (expr-list), call
///              ::= cv <type> <expression>                       # type (expression), conversion with one argument
///              ::= cv <type> _ <expression>* E                  # type (expr-list), conversion with other than one argument
///              ::= tl <type> <braced-expression>* E             # type {expr-list}, conversion with braced-init-list argument
///              ::= il <braced-expression>* E                    # {expr-list}, braced-init-list in any other context
///              ::= [gs] dl <expression>                         # delete expression
///              ::= [gs] da <expression>                         # delete[] expression
///              ::= dc <type> <expression>                       # dynamic_cast<type> (expression)
///              ::= sc <type> <expression>                       # static_cast<type> (expression)
///              ::= cc <type> <expression>                       # const_cast<type> (expression)
///              ::= rc <type> <expression>                       # reinterpret_cast<type> (expression)
///              ::= ti <type>                                    # typeid (type)
///              ::= te <expression>                              # typeid (expression)
///              ::= st <type>                                    # sizeof (type)
///              ::= sz <expression>                              # sizeof (expression)
///              ::= at <type>                                    # alignof (type)
///              ::= az <expression>                              # alignof (expression)
///              ::= nx <expression>                              # noexcept (expression)
///              ::= <template-param>
///              ::= <function-param>
///              ::= dt <expression> <unresolved-name>            # expr.name
///              ::= pt <expression> <unresolved-name>            # expr->name
///              ::= ds <expression> <expression>                 # expr.*expr
///              ::= sZ <template-param>                          # sizeof...(T), size of a template parameter pack
///              ::= sZ <function-param>                          # sizeof...(parameter), size of a function parameter pack
///              ::= sP <template-arg>* E                         # sizeof...(T), size of a captured template parameter pack from an alias template
///              ::= sp <expression>                              # expression..., pack expansion
///              ::= tw <expression>                              # throw expression
///              ::= tr                                           # throw with no operand (rethrow)
///              ::= <unresolved-name>                            # f(p), N::f(p), ::f(p),
///                                                               # freestanding dependent name (e.g., T::x),
///                                                               # objectless nonstatic member reference
///              ::= <expr-primary>
/// ```
fn parse_expression<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("Expression", input);
    try_begin_parse!(ctx);

    match input.peek() {
        None => return Err(unexpected_end(input)),
        Some(b'L') => return parse_expr_primary(ctx, subs, input),
        Some(b'T') => return parse_template_param(ctx, subs, input),
        Some(b'0'..=b'9') => return parse_unresolved_name(ctx, subs, input),
        Some(b'u') => return Err(unsupported(input)),
        _ => {}
    }

    let (head, tail) = match input.try_split_at(2) {
        Some(split) => split,
        None => return Err(unexpected_end(input)),
    };

    match head.as_ref() {
        b"fp" | b"fL" => parse_function_param(ctx, subs, input),
        b"gs" => match tail.try_split_at(2).map(|(head, _)| head) {
            Some(op) if op == &b"dl"[..] || op == &b"da"[..] => {
                let (operand, rest) = parse_expression(ctx, subs, tail.range_from(2..))?;
                Ok((
                    expr(Expression::Delete {
                        global: true,
                        array: op == &b"da"[..],
                        operand: Box::new(operand),
                    }),
                    rest,
                ))
            }
            Some(op) if op == &b"nw"[..] || op == &b"na"[..] => Err(unsupported(input)),
            _ => parse_unresolved_name(ctx, subs, input),
        },
        b"sr" | b"on" | b"dn" => parse_unresolved_name(ctx, subs, input),
        b"st" | b"at" | b"ti" => {
            let keyword = match head.as_ref() {
                b"st" => "sizeof",
                b"at" => "alignof",
                _ => "typeid",
            };
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            Ok((expr(Expression::Keyword(keyword, Box::new(ty))), tail))
        }
        b"sz" | b"az" | b"te" | b"nx" => {
            let keyword = match head.as_ref() {
                b"sz" => "sizeof",
                b"az" => "alignof",
                b"te" => "typeid",
                _ => "noexcept",
            };
            let (operand, tail) = parse_expression(ctx, subs, tail)?;
            Ok((expr(Expression::Keyword(keyword, Box::new(operand))), tail))
        }
        b"sZ" => {
            let (pack, tail) = match tail.peek() {
                Some(b'T') => parse_template_param(ctx, subs, tail)?,
                _ => parse_function_param(ctx, subs, tail)?,
            };
            match pack {
                Node::Pack(ref items) => Ok((expr(Expression::PackSize(items.len())), tail)),
                pack => Ok((expr(Expression::SizeofPack(Box::new(pack))), tail)),
            }
        }
        b"sP" => {
            let mut tail = tail;
            let mut items = Vec::new();
            while tail.peek() != Some(b'E') {
                let (item, rest) = parse_template_arg(ctx, subs, tail)?;
                items.push(item);
                tail = rest;
            }
            Ok((
                expr(Expression::SizeofPack(Box::new(Node::Pack(items)))),
                tail.range_from(1..),
            ))
        }
        b"sp" => {
            let (inner, tail) = parse_expression(ctx, subs, tail)?;
            Ok((Node::PackExpansion(Box::new(inner)), tail))
        }
        b"tw" => {
            let (operand, tail) = parse_expression(ctx, subs, tail)?;
            Ok((expr(Expression::Throw(Some(Box::new(operand)))), tail))
        }
        b"tr" => Ok((expr(Expression::Throw(None)), tail)),
        b"dt" | b"pt" => {
            let (object, tail) = parse_expression(ctx, subs, tail)?;
            let (member, tail) = parse_unresolved_name(ctx, subs, tail)?;
            let op = if head == &b"dt"[..] { "." } else { "->" };
            Ok((
                expr(Expression::Member(Box::new(object), op, Box::new(member))),
                tail,
            ))
        }
        b"ds" => {
            let (object, tail) = parse_expression(ctx, subs, tail)?;
            let (member, tail) = parse_expression(ctx, subs, tail)?;
            Ok((
                expr(Expression::Member(Box::new(object), ".*", Box::new(member))),
                tail,
            ))
        }
        b"cl" => {
            let (callee, tail) = parse_expression(ctx, subs, tail)?;
            let (args, tail) = parse_expressions_until_end(ctx, subs, tail)?;
            Ok((expr(Expression::Call(Box::new(callee), args)), tail))
        }
        b"cv" => {
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            if tail.peek() == Some(b'_') {
                let (args, tail) = parse_expressions_until_end(ctx, subs, tail.range_from(1..))?;
                Ok((expr(Expression::ConversionList(Box::new(ty), args)), tail))
            } else {
                let (operand, tail) = parse_expression(ctx, subs, tail)?;
                Ok((
                    expr(Expression::Cast(
                        CastKind::Conversion,
                        Box::new(ty),
                        Box::new(operand),
                    )),
                    tail,
                ))
            }
        }
        b"sc" | b"dc" | b"rc" | b"cc" => {
            let kind = match head.as_ref() {
                b"sc" => CastKind::Static,
                b"dc" => CastKind::Dynamic,
                b"rc" => CastKind::Reinterpret,
                _ => CastKind::Const,
            };
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            let (operand, tail) = parse_expression(ctx, subs, tail)?;
            Ok((
                expr(Expression::Cast(kind, Box::new(ty), Box::new(operand))),
                tail,
            ))
        }
        b"il" => {
            let (items, tail) = parse_expressions_until_end(ctx, subs, tail)?;
            Ok((expr(Expression::InitList(None, items)), tail))
        }
        b"tl" => {
            let (ty, tail) = parse_type(ctx, subs, tail)?;
            let (items, tail) = parse_expressions_until_end(ctx, subs, tail)?;
            Ok((expr(Expression::InitList(Some(Box::new(ty)), items)), tail))
        }
        b"dl" | b"da" => {
            let (operand, tail) = parse_expression(ctx, subs, tail)?;
            Ok((
                expr(Expression::Delete {
                    global: false,
                    array: head == &b"da"[..],
                    operand: Box::new(operand),
                }),
                tail,
            ))
        }
        b"nw" | b"na" | b"rq" | b"rQ" => Err(unsupported(input)),
        b"pp" | b"mm" => {
            let op = if head == &b"pp"[..] {
                OperatorName::PostInc
            } else {
                OperatorName::PostDec
            };
            if tail.peek() == Some(b'_') {
                let (operand, tail) = parse_expression(ctx, subs, tail.range_from(1..))?;
                Ok((expr(Expression::Unary(op, Box::new(operand))), tail))
            } else {
                let (operand, tail) = parse_expression(ctx, subs, tail)?;
                Ok((expr(Expression::Postfix(op, Box::new(operand))), tail))
            }
        }
        b"ix" => {
            let (object, tail) = parse_expression(ctx, subs, tail)?;
            let (index, tail) = parse_expression(ctx, subs, tail)?;
            Ok((expr(Expression::Index(Box::new(object), Box::new(index))), tail))
        }
        b"qu" => {
            let (condition, tail) = parse_expression(ctx, subs, tail)?;
            let (consequent, tail) = parse_expression(ctx, subs, tail)?;
            let (alternative, tail) = parse_expression(ctx, subs, tail)?;
            Ok((
                expr(Expression::Ternary(
                    Box::new(condition),
                    Box::new(consequent),
                    Box::new(alternative),
                )),
                tail,
            ))
        }
        _ => {
            let (op, tail) = OperatorName::parse(ctx, subs, input)?;
            match op.arity() {
                crate::ast::Arity::Unary => {
                    let (operand, tail) = parse_expression(ctx, subs, tail)?;
                    Ok((expr(Expression::Unary(op, Box::new(operand))), tail))
                }
                crate::ast::Arity::Binary => {
                    let (lhs, tail) = parse_expression(ctx, subs, tail)?;
                    let (rhs, tail) = parse_expression(ctx, subs, tail)?;
                    Ok((
                        expr(Expression::Binary(op, Box::new(lhs), Box::new(rhs))),
                        tail,
                    ))
                }
                _ => Err(unexpected_text(input)),
            }
        }
    }
}

/// The `<function-param>` production.
///
/// ```text
/// <function-param> ::= fp <top-level CV-qualifiers> _
///                  ::= fp <top-level CV-qualifiers> <parameter-2 non-negative number> _
///                  ::= fL <L-1 non-negative number> p <top-level CV-qualifiers> _
///                  ::= fL <L-1 non-negative number> p <top-level CV-qualifiers> <parameter-2 non-negative number> _
/// ```
fn parse_function_param<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("FunctionParam", input);
    try_begin_parse!(ctx);

    let tail = if input.starts_with(b"fp") {
        input.range_from(2..)
    } else {
        let tail = consume(b"fL", input)?;
        let (_, tail) = parse_count(tail)?;
        consume(b"p", tail)?
    };
    let (_, tail) = CvQualifiers::parse(ctx, subs, tail)?;
    let (number, tail) = parse_nonnegative_index(tail)?;
    Ok((Node::FunctionParam(number), tail))
}

/// The `<unresolved-name>` production.
///
/// ```text
/// <unresolved-name> ::= [gs] <base-unresolved-name>
///                   ::= sr <unresolved-type> <base-unresolved-name>
///                   ::= srN <unresolved-type> <unresolved-qualifier-level>+ E <base-unresolved-name>
///                   ::= [gs] sr <unresolved-qualifier-level>+ E <base-unresolved-name>
///
/// <unresolved-qualifier-level> ::= <simple-id>
/// ```
fn parse_unresolved_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("UnresolvedName", input);
    try_begin_parse!(ctx);

    let (global, tail) = if input.starts_with(b"gs") {
        (true, input.range_from(2..))
    } else {
        (false, input)
    };

    let (name, tail) = if tail.starts_with(b"srN") {
        let (ty, tail) = parse_unresolved_type(ctx, subs, tail.range_from(3..))?;
        let (mut so_far, mut tail) = if tail.peek() == Some(b'I') {
            let (args, tail) = parse_template_args(ctx, subs, tail, false)?;
            (
                Node::Template {
                    name: Box::new(ty),
                    args,
                },
                tail,
            )
        } else {
            (ty, tail)
        };
        while tail.peek() != Some(b'E') {
            let (level, rest) = parse_simple_id(ctx, subs, tail)?;
            so_far = nest(ctx, so_far, level)?;
            tail = rest;
        }
        let (base, tail) = parse_base_unresolved_name(ctx, subs, tail.range_from(1..))?;
        (nest(ctx, so_far, base)?, tail)
    } else if tail.starts_with(b"sr") {
        let tail = tail.range_from(2..);
        if tail.peek().map_or(false, |c| c.is_ascii_digit()) {
            let (mut so_far, mut tail) = parse_simple_id(ctx, subs, tail)?;
            while tail.peek() != Some(b'E') {
                let (level, rest) = parse_simple_id(ctx, subs, tail)?;
                so_far = nest(ctx, so_far, level)?;
                tail = rest;
            }
            let (base, tail) = parse_base_unresolved_name(ctx, subs, tail.range_from(1..))?;
            (nest(ctx, so_far, base)?, tail)
        } else {
            let (ty, tail) = parse_unresolved_type(ctx, subs, tail)?;
            let (ty, tail) = if tail.peek() == Some(b'I') {
                let (args, tail) = parse_template_args(ctx, subs, tail, false)?;
                (
                    Node::Template {
                        name: Box::new(ty),
                        args,
                    },
                    tail,
                )
            } else {
                (ty, tail)
            };
            let (base, tail) = parse_base_unresolved_name(ctx, subs, tail)?;
            (nest(ctx, ty, base)?, tail)
        }
    } else {
        parse_base_unresolved_name(ctx, subs, tail)?
    };

    if global {
        Ok((Node::Global(Box::new(name)), tail))
    } else {
        Ok((name, tail))
    }
}

/// `prefix::name`, checking that the growing qualified name stays within
/// the recursion limit.
fn nest(ctx: &ParseContext, prefix: Node, name: Node) -> Result<Node> {
    let nested = Node::Nested {
        prefix: Box::new(prefix),
        name: Box::new(name),
    };
    ctx.check_depth(nested.depth())?;
    Ok(nested)
}

/// The `<unresolved-type>` production. Template arguments following it are
/// parsed by the caller.
///
/// ```text
/// <unresolved-type> ::= <template-param> [ <template-args> ]
///                   ::= <decltype>
///                   ::= <substitution>
/// ```
///
/// GCC also emits `St <simple-id>` here, which is parsed as the class type
/// it is.
fn parse_unresolved_type<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("UnresolvedType", input);
    try_begin_parse!(ctx);

    match input.peek() {
        Some(b'T') => {
            let (param, tail) = parse_template_param(ctx, subs, input)?;
            subs.insert(param.clone());
            Ok((param, tail))
        }
        Some(b'D') => {
            let (decltype, tail) = parse_decltype(ctx, subs, input)?;
            subs.insert(decltype.clone());
            Ok((decltype, tail))
        }
        Some(b'S') if input.peek_second() == Some(b't') => parse_type(ctx, subs, input),
        Some(b'S') => parse_substitution(ctx, subs, input),
        _ => Err(unexpected_text(input)),
    }
}

/// The `<simple-id>` production.
///
/// ```text
/// <simple-id> ::= <source-name> [ <template-args> ]
/// ```
fn parse_simple_id<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("SimpleId", input);
    try_begin_parse!(ctx);

    let (ident, tail) = parse_source_name(input)?;
    let name = Node::Identifier(ident);
    if tail.peek() != Some(b'I') {
        return Ok((name, tail));
    }
    let (args, tail) = parse_template_args(ctx, subs, tail, false)?;
    Ok((
        Node::Template {
            name: Box::new(name),
            args,
        },
        tail,
    ))
}

/// The `<base-unresolved-name>` production.
///
/// ```text
/// <base-unresolved-name> ::= <simple-id>                                # unresolved name
///                        ::= on <operator-name>                         # unresolved operator-function-id
///                        ::= on <operator-name> <template-args>         # unresolved operator template-id
///                        ::= dn <destructor-name>                       # destructor or pseudo-destructor;
///
/// <destructor-name> ::= <unresolved-type>                               # e.g., ~T or ~decltype(f())
///                   ::= <simple-id>                                     # e.g., ~A<2*N>
/// ```
///
/// Older compilers omit the `on`, which is accepted as well.
fn parse_base_unresolved_name<'b>(
    ctx: &ParseContext,
    subs: &mut SubstitutionTable,
    input: IndexStr<'b>,
) -> Result<(Node, IndexStr<'b>)> {
    log_parse!("BaseUnresolvedName", input);
    try_begin_parse!(ctx);

    if input.peek().map_or(false, |c| c.is_ascii_digit()) {
        return parse_simple_id(ctx, subs, input);
    }

    if input.starts_with(b"dn") {
        let tail = input.range_from(2..);
        let (name, tail) = if tail.peek().map_or(false, |c| c.is_ascii_digit()) {
            parse_simple_id(ctx, subs, tail)?
        } else {
            parse_unresolved_type(ctx, subs, tail)?
        };
        return Ok((Node::Dtor(Box::new(name)), tail));
    }

    let tail = if input.starts_with(b"on") {
        input.range_from(2..)
    } else {
        input
    };
    let mut info = NameInfo::default();
    let (mut op, tail) = parse_operator_name(ctx, subs, tail, &mut info)?;
    if tail.peek() != Some(b'I') {
        return Ok((op, tail));
    }
    let (args, tail) = parse_template_args(ctx, subs, tail, false)?;
    if info.ctor_dtor_conversion {
        bind_template_params(ctx, &mut op, &args)?;
    }
    Ok((
        Node::Template {
            name: Box::new(op),
            args,
        },
        tail,
    ))
}

#[cfg(test)]
mod tests {
    use super::{
        parse_encoding, parse_expr_primary, parse_expression, parse_mangled_name, parse_number,
        parse_substitution, parse_template_arg, parse_template_param, parse_type, ParseContext,
    };
    use crate::ast::{
        BuiltinType, CvQualifiers, Dimension, Expression, Function, FunctionType, Node,
        OperatorName, RefQualifier, SpecialName, WellKnownComponent,
    };
    use crate::error::Error;
    use crate::index_str::IndexStr;
    use crate::subs::SubstitutionTable;
    use crate::ParseOptions;

    fn int() -> Node {
        Node::Builtin(BuiltinType::Int)
    }

    fn char_() -> Node {
        Node::Builtin(BuiltinType::Char)
    }

    fn ident(s: &str) -> Node {
        Node::Identifier(s.to_string())
    }

    fn nested(prefix: Node, name: Node) -> Node {
        Node::Nested {
            prefix: Box::new(prefix),
            name: Box::new(name),
        }
    }

    fn pointer(inner: Node) -> Node {
        Node::Pointer(Box::new(inner))
    }

    fn konst(inner: Node) -> Node {
        Node::Qualified {
            quals: CvQualifiers {
                const_: true,
                ..CvQualifiers::default()
            },
            inner: Box::new(inner),
        }
    }

    #[test]
    fn parse_number_bases_and_signs() {
        let (n, tail) = parse_number(10, true, IndexStr::new(b"n42_")).unwrap();
        assert_eq!(n, -42);
        assert_eq!(tail, &b"_"[..]);

        let (n, _) = parse_number(36, false, IndexStr::new(b"1A_")).unwrap();
        assert_eq!(n, 46);

        assert_eq!(
            parse_number(10, false, IndexStr::new(b"n1")),
            Err(Error::InvalidMangledName { offset: 0 })
        );
        assert_eq!(
            parse_number(10, false, IndexStr::new(b"01")),
            Err(Error::InvalidMangledName { offset: 0 })
        );
        assert_eq!(
            parse_number(10, true, IndexStr::new(b"n")),
            Err(Error::InvalidMangledName { offset: 1 })
        );
    }

    #[test]
    fn parse_builtin_and_qualified_types() {
        assert_parse!(parse_type: b"i..." => Ok(int(), b"..."));
        assert_parse!(parse_type: b"Dn" => Ok(Node::Builtin(BuiltinType::Nullptr), b""));
        assert_parse!(parse_type: b"PKc" => Ok(pointer(konst(char_())), b""));
        assert_parse!(parse_type: b"RA3_i" => Ok(
            Node::Reference {
                kind: RefQualifier::LValueRef,
                inner: Box::new(Node::Array {
                    dimension: Dimension::Number(3),
                    element: Box::new(int()),
                }),
            },
            b""
        ));
        assert_parse!(parse_type: b"DF16_" => Ok(Node::VendorType("_Float16".into()), b""));
        assert_parse!(parse_type: b"" => Err(Error::InvalidMangledName { offset: 0 }));
        assert_parse!(parse_type: b"Q" => Err(Error::InvalidMangledName { offset: 0 }));
        assert_parse!(parse_type: b"Dk" => Err(Error::UnsupportedConstruct { offset: 0 }));
        assert_parse!(parse_type: b"Ty" => Err(Error::UnsupportedConstruct { offset: 0 }));
    }

    #[test]
    fn parse_function_types() {
        assert_parse!(parse_type: b"FviE" => Ok(
            Node::FunctionType(FunctionType {
                ret: Box::new(Node::Builtin(BuiltinType::Void)),
                params: vec![int()],
                cv: CvQualifiers::default(),
                ref_qualifier: None,
                noexcept: false,
            }),
            b""
        ));
        assert_parse!(parse_type: b"KDoFvvOE" => Ok(
            Node::FunctionType(FunctionType {
                ret: Box::new(Node::Builtin(BuiltinType::Void)),
                params: vec![],
                cv: CvQualifiers {
                    const_: true,
                    ..CvQualifiers::default()
                },
                ref_qualifier: Some(RefQualifier::RValueRef),
                noexcept: true,
            }),
            b""
        ));
        assert_parse!(parse_type: b"DwiEFvvE" => Err(Error::UnsupportedConstruct { offset: 0 }));
    }

    #[test]
    fn references_collapse() {
        assert_parse!(parse_type with args [Node::Reference {
            kind: RefQualifier::LValueRef,
            inner: Box::new(int()),
        }]: b"OT_" => Ok(
            Node::Reference {
                kind: RefQualifier::LValueRef,
                inner: Box::new(int()),
            },
            b""
        ));
    }

    #[test]
    fn parse_substitutions() {
        assert_parse!(parse_substitution with subs [ident("foo"), ident("bar")]: b"S0_x" => Ok(ident("bar"), b"x"));
        assert_parse!(parse_substitution with subs [ident("foo")]: b"S_" => Ok(ident("foo"), b""));
        assert_parse!(parse_substitution: b"Sa" => Ok(
            Node::WellKnown {
                component: WellKnownComponent::StdAllocator,
                expanded: false,
            },
            b""
        ));
        assert_parse!(parse_substitution with subs [ident("foo")]: b"S0_" => Err(Error::InvalidMangledName { offset: 0 }));
        assert_parse!(parse_substitution: b"S" => Err(Error::InvalidMangledName { offset: 1 }));
    }

    #[test]
    fn parse_template_params() {
        assert_parse!(parse_template_param with args [int(), char_()]: b"T0_" => Ok(char_(), b""));
        assert_parse!(parse_template_param with args [int()]: b"T_" => Ok(int(), b""));
        assert_parse!(parse_template_param with args [int()]: b"T0_" => Err(Error::InvalidMangledName { offset: 0 }));
        assert_parse!(parse_template_param: b"TL0__" => Err(Error::UnsupportedConstruct { offset: 0 }));
    }

    #[test]
    fn parse_template_args_and_packs() {
        assert_parse!(parse_template_arg: b"Li3E" => Ok(
            Node::Literal {
                ty: Box::new(int()),
                value: "3".into(),
            },
            b""
        ));
        assert_parse!(parse_template_arg: b"JicE" => Ok(Node::Pack(vec![int(), char_()]), b""));
        assert_parse!(parse_template_arg: b"JE" => Ok(Node::Pack(vec![]), b""));
    }

    #[test]
    fn parse_literals() {
        assert_parse!(parse_expr_primary: b"Lin5E" => Ok(
            Node::Literal {
                ty: Box::new(int()),
                value: "-5".into(),
            },
            b""
        ));
        assert_parse!(parse_expr_primary: b"LDnE" => Ok(Node::Nullptr, b""));
        assert_parse!(parse_expr_primary: b"Li5" => Err(Error::InvalidMangledName { offset: 3 }));
    }

    #[test]
    fn parse_expressions() {
        assert_parse!(parse_expression: b"plLi1ELi2E" => Ok(
            Node::Expression(Box::new(Expression::Binary(
                OperatorName::Add,
                Box::new(Node::Literal {
                    ty: Box::new(int()),
                    value: "1".into(),
                }),
                Box::new(Node::Literal {
                    ty: Box::new(int()),
                    value: "2".into(),
                }),
            ))),
            b""
        ));
        assert_parse!(parse_expression: b"fp_" => Ok(Node::FunctionParam(1), b""));
        assert_parse!(parse_expression: b"fp0_" => Ok(Node::FunctionParam(2), b""));
        assert_parse!(parse_expression: b"nw_iE" => Err(Error::UnsupportedConstruct { offset: 0 }));
        assert_parse!(parse_expression: b"rqE" => Err(Error::UnsupportedConstruct { offset: 0 }));
        assert_parse!(parse_expression: b"u3foo" => Err(Error::UnsupportedConstruct { offset: 0 }));
    }

    #[test]
    fn parse_encodings() {
        assert_parse!(parse_encoding: b"3fooi" => Ok(
            Node::Function(Function {
                name: Box::new(ident("foo")),
                ret: None,
                params: vec![int()],
                cv: CvQualifiers::default(),
                ref_qualifier: None,
            }),
            b""
        ));
        assert_parse!(parse_encoding: b"3foo" => Ok(ident("foo"), b""));
        assert_parse!(parse_encoding: b"TV3foo" => Ok(
            Node::Special(SpecialName::VirtualTable(Box::new(ident("foo")))),
            b""
        ));
        assert_parse!(parse_encoding: b"3fooUa9enable_ifIXLi1EEEv" => Err(
            Error::UnsupportedConstruct { offset: 4 }
        ));
    }

    #[test]
    fn nested_names_and_substitutions() {
        // The prefix `foo` is a substitution candidate, the whole name is not.
        let ctx = ParseContext::new(&ParseOptions::default(), 0);
        let mut subs = SubstitutionTable::new();
        let (node, tail) =
            parse_mangled_name(&ctx, &mut subs, IndexStr::new(b"_ZN3foo3barE3quxS0_")).unwrap();
        assert!(tail.is_empty());
        assert_eq!(
            node,
            Node::Function(Function {
                name: Box::new(nested(ident("foo"), ident("bar"))),
                ret: None,
                params: vec![ident("qux"), ident("qux")],
                cv: CvQualifiers::default(),
                ref_qualifier: None,
            })
        );
        assert_eq!(subs.len(), 2);
    }

    #[test]
    fn template_frames_resolve_forward_to_args() {
        // `T_` in the return type and parameters refers to the function's own
        // template arguments.
        let ctx = ParseContext::new(&ParseOptions::default(), 0);
        let mut subs = SubstitutionTable::new();
        let (node, _) =
            parse_mangled_name(&ctx, &mut subs, IndexStr::new(b"_Z1fIiET_S0_")).unwrap();
        match node {
            Node::Function(Function { ret, params, .. }) => {
                assert_eq!(ret, Some(Box::new(int())));
                assert_eq!(params, vec![int()]);
            }
            other => panic!("expected a function, got {:?}", other),
        }
    }

    fn parse_function(mangled: &[u8]) -> Function {
        let ctx = ParseContext::new(&ParseOptions::default(), mangled.len());
        let mut subs = SubstitutionTable::new();
        match parse_mangled_name(&ctx, &mut subs, IndexStr::new(mangled)) {
            Ok((Node::Function(func), tail)) => {
                assert!(tail.is_empty());
                func
            }
            other => panic!("expected a function, got {:?}", other),
        }
    }

    #[test]
    fn template_ctors_have_no_return_type() {
        // The first `T_` is the constructor's own template argument, not a
        // return type.
        let func = parse_function(b"_ZNSbIwSt11char_traitsIwESaIwEEC1IPwEET_S5_RKS1_");
        assert_eq!(func.ret, None);
        assert_eq!(func.params.len(), 3);
        assert_eq!(func.params[0], func.params[1]);
        assert_eq!(
            crate::render(&Node::Function(func)),
            "std::basic_string<wchar_t, std::char_traits<wchar_t>, std::allocator<wchar_t> >\
             ::basic_string<wchar_t*>(wchar_t*, wchar_t*, std::allocator<wchar_t> const&)"
        );
    }

    #[test]
    fn conversion_operator_templates_bind_their_type() {
        let func = parse_function(b"_ZN2ns2v11ScvPT_IcEEv");
        assert_eq!(func.ret, None);
        assert!(func.params.is_empty());
        assert_eq!(
            crate::render(&Node::Function(func)),
            "ns::v1::S::operator char*<char>()"
        );
    }

    #[test]
    fn generic_lambda_params_stay_unbound() {
        let func = parse_function(b"_ZZ4genlvENKUlT_T0_E_clIicEEDaS_S0_");
        assert_eq!(func.params, vec![int(), char_()]);
        assert_eq!(
            crate::render(&Node::Function(func)),
            "auto genl()::{lambda(auto:1, auto:2)#1}::operator()<int, char>(int, char) const"
        );
    }

    #[test]
    fn substitutions_bind_unbound_params() {
        assert_parse!(parse_substitution with subs [pointer(Node::TemplateParam(0))] with args [char_()]: b"S_" => Ok(
            pointer(char_()),
            b""
        ));
    }

    #[test]
    fn template_template_params() {
        assert_parse!(parse_type with args [ident("V")]: b"T_IiE" => Ok(
            Node::Template {
                name: Box::new(ident("V")),
                args: vec![int()],
            },
            b""
        ));
    }

    #[test]
    fn sizeof_of_a_bound_pack_is_its_length() {
        assert_parse!(parse_expression with args [Node::Pack(vec![int(), int()])]: b"sZT_" => Ok(
            Node::Expression(Box::new(Expression::PackSize(2))),
            b""
        ));
    }

    #[test]
    fn template_param_without_frame_is_invalid() {
        let ctx = ParseContext::new(&ParseOptions::default(), 0);
        let mut subs = SubstitutionTable::new();
        assert_eq!(
            parse_mangled_name(&ctx, &mut subs, IndexStr::new(b"_Z1fT_")),
            Err(Error::InvalidMangledName { offset: 4 })
        );
    }

    #[test]
    fn recursion_limit() {
        let options = ParseOptions::default().recursion_limit(8);
        let ctx = ParseContext::new(&options, 0);
        let mut subs = SubstitutionTable::new();
        assert_eq!(
            parse_type(&ctx, &mut subs, IndexStr::new(b"PPPPPPPPPPPPi")),
            Err(Error::RecursionLimitExceeded)
        );
    }

    #[test]
    fn expansion_budget() {
        // Every `S<n>_` doubles the size of the previous type. The decoder
        // must give up long before the tree gets huge.
        fn seq_id(mut n: usize) -> String {
            const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
            let mut digits = vec![];
            loop {
                digits.push(DIGITS[n % 36]);
                n /= 36;
                if n == 0 {
                    break;
                }
            }
            digits.reverse();
            String::from_utf8(digits).unwrap()
        }

        let mut mangled = b"_Z1fA1_i".to_vec();
        for i in 0..40 {
            if i == 0 {
                mangled.extend_from_slice(b"MS_S_");
            } else {
                let id = seq_id(i - 1);
                mangled.extend_from_slice(format!("MS{}_S{}_", id, id).as_bytes());
            }
        }
        let ctx = ParseContext::new(&ParseOptions::default(), mangled.len());
        let mut subs = SubstitutionTable::new();
        assert_eq!(
            parse_mangled_name(&ctx, &mut subs, IndexStr::new(&mangled)).map(|_| ()),
            Err(Error::RecursionLimitExceeded)
        );
    }
}
