//! Abstract syntax tree types for demangled symbols.
//!
//! Parsing builds exactly one root [`Node`] per symbol. The tree is strict:
//! every node owns its children, and back references (`S_`, `T_`, ...) are
//! expanded into copies of the nodes they refer to, so a compressed mangling
//! and its fully spelled out equivalent produce equal trees.

use crate::error::{Error, Result};
use crate::index_str::IndexStr;
use crate::parse::{Parse, ParseContext};
use crate::subs::SubstitutionTable;
use std::fmt;

/// Define a "vocabulary" nonterminal, something like `OperatorName` or
/// `BuiltinType` that's basically a big list of constant strings.
///
/// This declares:
///
/// - the enum itself
/// - a `Parse` impl
/// - a `std::fmt::Display` impl
/// - a `printable` accessor
macro_rules! define_vocabulary {
    ( $(#[$attr:meta])* pub enum $typename:ident {
        $($variant:ident ( $mangled:expr, $printable:expr )),*
    } ) => {

        $(#[$attr])*
        pub enum $typename {
            $(
                #[doc=$printable]
                $variant
            ),*
        }

        impl Parse for $typename {
            fn parse<'b>(
                _ctx: &ParseContext,
                _subs: &mut SubstitutionTable,
                input: IndexStr<'b>,
            ) -> Result<($typename, IndexStr<'b>)> {
                let mut found_prefix = false;
                $(
                    if let Some((head, tail)) = input.try_split_at($mangled.len()) {
                        if head.as_ref() == $mangled {
                            return Ok(($typename::$variant, tail));
                        }
                    } else {
                        found_prefix |= 0 < input.len() &&
                            input.len() < $mangled.len() &&
                            input.as_ref() == &$mangled[..input.len()];
                    }
                )*

                let offset = if input.is_empty() || found_prefix {
                    input.index() + input.len()
                } else {
                    input.index()
                };
                Err(Error::InvalidMangledName { offset })
            }
        }

        impl $typename {
            /// The demangled spelling of this component.
            pub fn printable(&self) -> &'static str {
                match *self {
                    $(
                        $typename::$variant => $printable
                    ),*
                }
            }
        }

        impl fmt::Display for $typename {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.printable())
            }
        }
    }
}

define_vocabulary! {
    /// The `<builtin-type>` production, minus the vendor extended `u` form and
    /// the parameterized `DF <number> _` form, which the parser handles
    /// itself.
    #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
    pub enum BuiltinType {
        Void             (b"v",  "void"),
        Wchar            (b"w",  "wchar_t"),
        Bool             (b"b",  "bool"),
        Char             (b"c",  "char"),
        SignedChar       (b"a",  "signed char"),
        UnsignedChar     (b"h",  "unsigned char"),
        Short            (b"s",  "short"),
        UnsignedShort    (b"t",  "unsigned short"),
        Int              (b"i",  "int"),
        UnsignedInt      (b"j",  "unsigned int"),
        Long             (b"l",  "long"),
        UnsignedLong     (b"m",  "unsigned long"),
        LongLong         (b"x",  "long long"),
        UnsignedLongLong (b"y",  "unsigned long long"),
        Int128           (b"n",  "__int128"),
        Uint128          (b"o",  "unsigned __int128"),
        Float            (b"f",  "float"),
        Double           (b"d",  "double"),
        LongDouble       (b"e",  "long double"),
        Float128         (b"g",  "__float128"),
        Ellipsis         (b"z",  "..."),
        DecimalFloat64   (b"Dd", "decimal64"),
        DecimalFloat128  (b"De", "decimal128"),
        DecimalFloat32   (b"Df", "decimal32"),
        DecimalFloat16   (b"Dh", "half"),
        Char32           (b"Di", "char32_t"),
        Char16           (b"Ds", "char16_t"),
        Char8            (b"Du", "char8_t"),
        Auto             (b"Da", "auto"),
        DecltypeAuto     (b"Dc", "decltype(auto)"),
        Nullptr          (b"Dn", "decltype(nullptr)")
    }
}

impl BuiltinType {
    /// The suffix used when printing an integer literal of this type, or
    /// `None` if literals of this type are printed with a cast.
    pub fn literal_suffix(&self) -> Option<&'static str> {
        match *self {
            BuiltinType::Int => Some(""),
            BuiltinType::UnsignedInt => Some("u"),
            BuiltinType::Long => Some("l"),
            BuiltinType::UnsignedLong => Some("ul"),
            BuiltinType::LongLong => Some("ll"),
            BuiltinType::UnsignedLongLong => Some("ull"),
            _ => None,
        }
    }

    /// Is this a floating point type whose literals are mangled as raw hex?
    pub fn is_floating_point(&self) -> bool {
        matches!(
            *self,
            BuiltinType::Float
                | BuiltinType::Double
                | BuiltinType::LongDouble
                | BuiltinType::Float128
        )
    }
}

define_vocabulary! {
    /// The `<operator-name>` production, minus the `cv`, `li` and `v <digit>`
    /// forms, which carry operands and are represented as their own `Node`
    /// variants.
    #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
    pub enum OperatorName {
        // enum variant(mangled form, printable symbol)
        New              (b"nw",  "new"),
        NewArray         (b"na",  "new[]"),
        Delete           (b"dl",  "delete"),
        DeleteArray      (b"da",  "delete[]"),
        CoAwait          (b"aw",  "co_await"),
        UnaryPlus        (b"ps",  "+"),
        Neg              (b"ng",  "-"),
        AddressOf        (b"ad",  "&"),
        Deref            (b"de",  "*"),
        BitNot           (b"co",  "~"),
        Add              (b"pl",  "+"),
        Sub              (b"mi",  "-"),
        Mul              (b"ml",  "*"),
        Div              (b"dv",  "/"),
        Rem              (b"rm",  "%"),
        BitAnd           (b"an",  "&"),
        BitOr            (b"or",  "|"),
        BitXor           (b"eo",  "^"),
        Assign           (b"aS",  "="),
        AddAssign        (b"pL",  "+="),
        SubAssign        (b"mI",  "-="),
        MulAssign        (b"mL",  "*="),
        DivAssign        (b"dV",  "/="),
        RemAssign        (b"rM",  "%="),
        BitAndAssign     (b"aN",  "&="),
        BitOrAssign      (b"oR",  "|="),
        BitXorAssign     (b"eO",  "^="),
        Shl              (b"ls",  "<<"),
        Shr              (b"rs",  ">>"),
        ShlAssign        (b"lS",  "<<="),
        ShrAssign        (b"rS",  ">>="),
        Eq               (b"eq",  "=="),
        Ne               (b"ne",  "!="),
        Less             (b"lt",  "<"),
        Greater          (b"gt",  ">"),
        LessEq           (b"le",  "<="),
        GreaterEq        (b"ge",  ">="),
        Spaceship        (b"ss",  "<=>"),
        Not              (b"nt",  "!"),
        LogicalAnd       (b"aa",  "&&"),
        LogicalOr        (b"oo",  "||"),
        PostInc          (b"pp",  "++"),
        PostDec          (b"mm",  "--"),
        Comma            (b"cm",  ","),
        DerefMemberPtr   (b"pm",  "->*"),
        DerefMember      (b"pt",  "->"),
        Call             (b"cl",  "()"),
        Index            (b"ix",  "[]"),
        Question         (b"qu",  "?"),
        SizeofType       (b"st",  "sizeof"),
        SizeofExpr       (b"sz",  "sizeof"),
        AlignofType      (b"at",  "alignof"),
        AlignofExpr      (b"az",  "alignof")
    }
}

/// How many operands an operator takes in an `<expression>`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Arity {
    /// Prefix operators such as `-x`.
    Unary,
    /// Infix operators such as `x + y`.
    Binary,
    /// The conditional operator.
    Ternary,
    /// Operators with their own expression syntax (`new`, calls, `sizeof`...).
    Special,
}

impl OperatorName {
    /// The operand count of this operator when it appears in an expression.
    pub fn arity(&self) -> Arity {
        use self::OperatorName::*;
        match *self {
            UnaryPlus | Neg | AddressOf | Deref | BitNot | Not | CoAwait => Arity::Unary,
            Question => Arity::Ternary,
            New | NewArray | Delete | DeleteArray | PostInc | PostDec | Call | Index
            | DerefMember | SizeofType | SizeofExpr | AlignofType | AlignofExpr => {
                Arity::Special
            }
            _ => Arity::Binary,
        }
    }
}

define_vocabulary! {
    /// The `<substitution>` variants that are encoded directly in the grammar,
    /// rather than as back references to other components in the substitution
    /// table.
    #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
    pub enum WellKnownComponent {
        Std           (b"St", "std"),
        StdAllocator  (b"Sa", "std::allocator"),
        StdString1    (b"Sb", "std::basic_string"),
        StdString2    (b"Ss", "std::string"),
        StdIstream    (b"Si", "std::istream"),
        StdOstream    (b"So", "std::ostream"),
        StdIostream   (b"Sd", "std::iostream")
    }
}

impl WellKnownComponent {
    /// The spelled out form, used when the component prefixes a constructor
    /// or destructor.
    pub fn expanded(&self) -> &'static str {
        match *self {
            WellKnownComponent::StdString2 => {
                "std::basic_string<char, std::char_traits<char>, std::allocator<char> >"
            }
            WellKnownComponent::StdIstream => "std::basic_istream<char, std::char_traits<char> >",
            WellKnownComponent::StdOstream => "std::basic_ostream<char, std::char_traits<char> >",
            WellKnownComponent::StdIostream => {
                "std::basic_iostream<char, std::char_traits<char> >"
            }
            _ => self.printable(),
        }
    }

    /// The unqualified class name, as used to name its constructors and
    /// destructors. `std` is a namespace and has none.
    pub fn leaf_name(&self) -> Option<&'static str> {
        match *self {
            WellKnownComponent::Std => None,
            WellKnownComponent::StdAllocator => Some("allocator"),
            WellKnownComponent::StdString1 | WellKnownComponent::StdString2 => {
                Some("basic_string")
            }
            WellKnownComponent::StdIstream => Some("basic_istream"),
            WellKnownComponent::StdOstream => Some("basic_ostream"),
            WellKnownComponent::StdIostream => Some("basic_iostream"),
        }
    }
}

/// The `<CV-qualifiers>` production.
///
/// ```text
/// <CV-qualifiers> ::= [r] [V] [K]   # restrict (C99), volatile, const
/// ```
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct CvQualifiers {
    /// Is this `restrict` qualified?
    pub restrict: bool,
    /// Is this `volatile` qualified?
    pub volatile: bool,
    /// Is this `const` qualified?
    pub const_: bool,
}

impl CvQualifiers {
    /// Are there no qualifiers at all?
    pub fn is_empty(&self) -> bool {
        !(self.restrict || self.volatile || self.const_)
    }
}

impl fmt::Display for CvQualifiers {
    /// Prints each qualifier with a leading space, in `const volatile
    /// restrict` order.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.const_ {
            f.write_str(" const")?;
        }
        if self.volatile {
            f.write_str(" volatile")?;
        }
        if self.restrict {
            f.write_str(" restrict")?;
        }
        Ok(())
    }
}

/// The `<ref-qualifier>` production, also used for the kind of a reference
/// type.
///
/// ```text
/// <ref-qualifier> ::= R   # & ref-qualifier
///                 ::= O   # && ref-qualifier
/// ```
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum RefQualifier {
    /// `&`
    LValueRef,
    /// `&&`
    RValueRef,
}

impl RefQualifier {
    /// The printed punctuation.
    pub fn symbol(&self) -> &'static str {
        match *self {
            RefQualifier::LValueRef => "&",
            RefQualifier::RValueRef => "&&",
        }
    }
}

/// The `<call-offset>` production, the `this` or result adjustment of a
/// thunk.
///
/// ```text
/// <call-offset> ::= h <nv-offset> _
///               ::= v <v-offset> _
/// ```
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CallOffset {
    /// A non-virtual offset.
    NonVirtual(isize),
    /// A virtual offset: the fixed offset and the offset of the vcall slot.
    Virtual(isize, isize),
}

/// The dimension of an array or vector type.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Dimension {
    /// `A_ <type>`: an array of unknown bound.
    Unknown,
    /// A literal dimension.
    Number(usize),
    /// A dimension given by an instantiation-dependent expression.
    Expression(Box<Node>),
}

/// The `<special-name>` production: compiler generated artifacts rather than
/// user declared entities.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum SpecialName {
    /// `TV <type>`: a virtual table.
    VirtualTable(Box<Node>),
    /// `TT <type>`: a VTT structure (construction vtable index).
    Vtt(Box<Node>),
    /// `TI <type>`: a typeinfo structure.
    Typeinfo(Box<Node>),
    /// `TS <type>`: a typeinfo name (null-terminated byte string).
    TypeinfoName(Box<Node>),
    /// `TC <derived> <number> _ <base>`: the vtable for `base` when
    /// constructing a `derived`.
    ConstructionVtable {
        /// The complete object type being constructed.
        derived: Box<Node>,
        /// Offset of the base subobject.
        offset: isize,
        /// The base whose vtable this is.
        base: Box<Node>,
    },
    /// `TW <name>`: a thread-local wrapper routine.
    TlsWrapper(Box<Node>),
    /// `TH <name>`: a thread-local initialization routine.
    TlsInit(Box<Node>),
    /// `TA <template-arg>`: a template parameter object.
    TemplateParamObject(Box<Node>),
    /// `T <call-offset> <base encoding>`: a virtual override thunk.
    Thunk {
        /// The `this` adjustment.
        this_adjustment: CallOffset,
        /// The nominal target function of the thunk.
        target: Box<Node>,
    },
    /// `Tc <call-offset> <call-offset> <base encoding>`: a virtual override
    /// thunk with a covariant return type.
    CovariantThunk {
        /// The `this` adjustment.
        this_adjustment: CallOffset,
        /// The result adjustment.
        result_adjustment: CallOffset,
        /// The nominal target function of the thunk.
        target: Box<Node>,
    },
    /// `GV <name>`: a guard variable for one-time initialization.
    GuardVariable(Box<Node>),
    /// `GR <name> [<seq-id>] _`: a lifetime extended temporary.
    ReferenceTemporary {
        /// The variable whose initializer created the temporary.
        name: Box<Node>,
        /// Which temporary, counting from zero.
        index: usize,
    },
    /// `GA <encoding>`: a hidden alias.
    HiddenAlias(Box<Node>),
    /// `GTt <encoding>`: a transaction clone.
    TransactionClone(Box<Node>),
    /// `GTn <encoding>`: a non-transaction clone.
    NonTransactionClone(Box<Node>),
}

/// C-style and named casts.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CastKind {
    /// `cv <type> <expression>`: `(type)(expr)`
    Conversion,
    /// `sc`
    Static,
    /// `dc`
    Dynamic,
    /// `rc`
    Reinterpret,
    /// `cc`
    Const,
}

impl CastKind {
    /// The keyword of a named cast.
    pub fn keyword(&self) -> Option<&'static str> {
        match *self {
            CastKind::Conversion => None,
            CastKind::Static => Some("static_cast"),
            CastKind::Dynamic => Some("dynamic_cast"),
            CastKind::Reinterpret => Some("reinterpret_cast"),
            CastKind::Const => Some("const_cast"),
        }
    }
}

/// The `<expression>` production, as found in template arguments, array
/// dimensions and `decltype`s.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Expression {
    /// A prefix operator: `-x`, `!x`, `++x`, ...
    Unary(OperatorName, Box<Node>),
    /// A postfix increment or decrement.
    Postfix(OperatorName, Box<Node>),
    /// An infix operator.
    Binary(OperatorName, Box<Node>, Box<Node>),
    /// `c ? a : b`
    Ternary(Box<Node>, Box<Node>, Box<Node>),
    /// `a[b]`
    Index(Box<Node>, Box<Node>),
    /// `f(args...)`
    Call(Box<Node>, Vec<Node>),
    /// A cast of one expression.
    Cast(CastKind, Box<Node>, Box<Node>),
    /// `cv <type> _ <expression>* E`: a functional conversion with a list.
    ConversionList(Box<Node>, Vec<Node>),
    /// Member access: `a.b`, `a->b`, `a.*b`.
    Member(Box<Node>, &'static str, Box<Node>),
    /// `sizeof`, `alignof`, `typeid` and `noexcept` applied to a type or an
    /// expression.
    Keyword(&'static str, Box<Node>),
    /// `sizeof...(pack)`
    SizeofPack(Box<Node>),
    /// `sZ` of a template parameter bound to an argument pack: the pack's
    /// length.
    PackSize(usize),
    /// `throw x`, or a rethrow when there is no operand.
    Throw(Option<Box<Node>>),
    /// `delete x`, optionally global and/or array.
    Delete {
        /// Prefixed with `::`.
        global: bool,
        /// `delete[]`.
        array: bool,
        /// The deleted pointer.
        operand: Box<Node>,
    },
    /// A braced initializer list, optionally preceded by the type it
    /// initializes.
    InitList(Option<Box<Node>>, Vec<Node>),
}

/// A function encoding: a function name together with its signature.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Function {
    /// The (possibly qualified, possibly templated) function name.
    pub name: Box<Node>,
    /// The return type, mangled only for template functions.
    pub ret: Option<Box<Node>>,
    /// The parameter types. Empty for `(void)`.
    pub params: Vec<Node>,
    /// `this` qualifiers of a member function.
    pub cv: CvQualifiers,
    /// Ref-qualifier of a member function.
    pub ref_qualifier: Option<RefQualifier>,
}

/// The `<function-type>` production.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct FunctionType {
    /// The return type.
    pub ret: Box<Node>,
    /// The parameter types. Empty for `(void)`.
    pub params: Vec<Node>,
    /// Qualifiers on the function type itself (member function types).
    pub cv: CvQualifiers,
    /// Ref-qualifier of a member function type.
    pub ref_qualifier: Option<RefQualifier>,
    /// `Do`: the function type is `noexcept`.
    pub noexcept: bool,
}

/// A node of the demangled AST.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Node {
    /// Text that is not a mangled name, passed through verbatim.
    Plain(String),
    /// A `<source-name>`.
    Identifier(String),
    /// A builtin type.
    Builtin(BuiltinType),
    /// A vendor extended builtin type (`u <source-name>`), or `_FloatN`.
    VendorType(String),
    /// One of the `std` abbreviations; `expanded` selects the spelled out
    /// form used in front of constructors and destructors.
    WellKnown {
        /// Which abbreviation.
        component: WellKnownComponent,
        /// Print the full template instance instead of the typedef name.
        expanded: bool,
    },
    /// `prefix::name`
    Nested {
        /// The enclosing scope.
        prefix: Box<Node>,
        /// The name within that scope.
        name: Box<Node>,
    },
    /// `::name`
    Global(Box<Node>),
    /// `name<args...>`
    Template {
        /// The template.
        name: Box<Node>,
        /// Its arguments.
        args: Vec<Node>,
    },
    /// `name[abi:tag]`
    AbiTagged {
        /// The tagged name.
        name: Box<Node>,
        /// The ABI tag.
        tag: String,
    },
    /// An overloadable operator's function name.
    Operator(OperatorName),
    /// `v <digit> <source-name>`: a vendor extended operator.
    VendorOperator(String),
    /// `cv <type>`: a conversion operator.
    ConversionOperator(Box<Node>),
    /// `li <source-name>`: a user defined literal operator.
    LiteralOperator(String),
    /// A constructor, named after its class.
    Ctor(Box<Node>),
    /// A destructor, named after its class.
    Dtor(Box<Node>),
    /// `Ut [<number>] _`, holding the 1-based index.
    UnnamedType(usize),
    /// `Ul <lambda-sig> E [<number>] _`
    Closure {
        /// The lambda's parameter types.
        params: Vec<Node>,
        /// The 1-based lambda index within its scope.
        number: usize,
    },
    /// `DC <source-name>+ E`
    StructuredBinding(Vec<String>),
    /// `Z <function encoding> E <entity name>`: an entity local to a function.
    Local {
        /// The enclosing function.
        encoding: Box<Node>,
        /// The local entity.
        entity: Box<Node>,
    },
    /// `Z <encoding> E s`: a string literal local to a function.
    StringLiteral,
    /// `Z <encoding> Ed [<number>] _`: the scope of a default argument,
    /// holding the 1-based parameter index counted from the last one.
    DefaultArg(usize),
    /// A function encoding.
    Function(Function),
    /// A function type.
    FunctionType(FunctionType),
    /// `P <type>`
    Pointer(Box<Node>),
    /// `R <type>` and `O <type>`
    Reference {
        /// Lvalue or rvalue reference.
        kind: RefQualifier,
        /// The referenced type.
        inner: Box<Node>,
    },
    /// A cv-qualified type.
    Qualified {
        /// The qualifiers.
        quals: CvQualifiers,
        /// The qualified type.
        inner: Box<Node>,
    },
    /// `U <source-name> [<template-args>] <type>`: a vendor qualified type.
    VendorQualified {
        /// The qualifier's name.
        qualifier: String,
        /// The qualifier's template arguments.
        args: Vec<Node>,
        /// The qualified type.
        inner: Box<Node>,
    },
    /// `C <type>`: a complex pair.
    Complex(Box<Node>),
    /// `G <type>`: an imaginary number.
    Imaginary(Box<Node>),
    /// `A <dimension> _ <type>`
    Array {
        /// The bound.
        dimension: Dimension,
        /// The element type.
        element: Box<Node>,
    },
    /// `Dv <dimension> _ <type>`: a vector extension type.
    Vector {
        /// The lane count.
        dimension: Dimension,
        /// The lane type.
        element: Box<Node>,
    },
    /// `M <class type> <member type>`
    PointerToMember {
        /// The class.
        class: Box<Node>,
        /// The member's type.
        member: Box<Node>,
    },
    /// `Ts`, `Tu` and `Te`: an elaborated type specifier.
    Elaborated {
        /// `struct`, `union` or `enum`.
        keyword: &'static str,
        /// The named type.
        name: Box<Node>,
    },
    /// `Dt <expression> E` and `DT <expression> E`
    Decltype(Box<Node>),
    /// `J <template-arg>* E`: a template argument pack.
    Pack(Vec<Node>),
    /// `Dp <type>` and `sp <expression>`: a pack expansion.
    PackExpansion(Box<Node>),
    /// A compiler generated artifact.
    Special(SpecialName),
    /// `L <type> <value> E`: a literal. Negative values are stored with a
    /// leading `-`.
    Literal {
        /// The literal's type.
        ty: Box<Node>,
        /// The literal's value text.
        value: String,
    },
    /// `LDnE`
    Nullptr,
    /// An `<expression>`.
    Expression(Box<Expression>),
    /// `fp ... _`: a function parameter reference, holding its 1-based index.
    FunctionParam(usize),
    /// `T_`, `T0_`, ...: a template parameter with no argument bound to it,
    /// holding its 0-based index. Generic lambdas use these for their
    /// invented `auto` parameters. A conversion operator template's type
    /// refers forward to arguments that follow it, and is rebound once they
    /// are parsed.
    TemplateParam(usize),
    /// An encoding with compiler generated clone suffixes attached.
    CloneSuffix {
        /// The original function.
        encoding: Box<Node>,
        /// Each suffix's text, including its leading `.`.
        suffixes: Vec<String>,
    },
}

impl Node {
    /// Call `f` on each direct child of this node, in printing order.
    pub fn for_each_child<F>(&self, f: &mut F)
    where
        F: FnMut(&Node),
    {
        match *self {
            Node::Plain(_)
            | Node::Identifier(_)
            | Node::Builtin(_)
            | Node::VendorType(_)
            | Node::WellKnown { .. }
            | Node::Operator(_)
            | Node::VendorOperator(_)
            | Node::LiteralOperator(_)
            | Node::UnnamedType(_)
            | Node::StructuredBinding(_)
            | Node::StringLiteral
            | Node::DefaultArg(_)
            | Node::Nullptr
            | Node::FunctionParam(_)
            | Node::TemplateParam(_) => {}
            Node::Nested {
                ref prefix,
                ref name,
            } => {
                f(prefix);
                f(name);
            }
            Node::Global(ref inner)
            | Node::ConversionOperator(ref inner)
            | Node::Ctor(ref inner)
            | Node::Dtor(ref inner)
            | Node::Pointer(ref inner)
            | Node::Reference { ref inner, .. }
            | Node::Qualified { ref inner, .. }
            | Node::Complex(ref inner)
            | Node::Imaginary(ref inner)
            | Node::Decltype(ref inner)
            | Node::PackExpansion(ref inner)
            | Node::AbiTagged {
                name: ref inner, ..
            }
            | Node::Elaborated {
                name: ref inner, ..
            }
            | Node::Literal { ty: ref inner, .. }
            | Node::CloneSuffix {
                encoding: ref inner,
                ..
            } => f(inner),
            Node::Template { ref name, ref args } => {
                f(name);
                args.iter().for_each(|arg| f(arg));
            }
            Node::Closure { ref params, .. } => params.iter().for_each(|p| f(p)),
            Node::Pack(ref items) => items.iter().for_each(|item| f(item)),
            Node::Local {
                ref encoding,
                ref entity,
            } => {
                f(encoding);
                f(entity);
            }
            Node::Function(ref func) => {
                if let Some(ref ret) = func.ret {
                    f(ret);
                }
                f(&func.name);
                func.params.iter().for_each(|p| f(p));
            }
            Node::FunctionType(ref ty) => {
                f(&ty.ret);
                ty.params.iter().for_each(|p| f(p));
            }
            Node::VendorQualified {
                ref args,
                ref inner,
                ..
            } => {
                f(inner);
                args.iter().for_each(|arg| f(arg));
            }
            Node::Array {
                ref dimension,
                ref element,
            }
            | Node::Vector {
                ref dimension,
                ref element,
            } => {
                f(element);
                if let Dimension::Expression(ref expr) = *dimension {
                    f(expr);
                }
            }
            Node::PointerToMember {
                ref class,
                ref member,
            } => {
                f(member);
                f(class);
            }
            Node::Special(ref special) => special.for_each_child(f),
            Node::Expression(ref expr) => expr.for_each_child(f),
        }
    }

    /// Call `f` on each direct child of this node, allowing it to be
    /// replaced.
    pub fn for_each_child_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        match *self {
            Node::Plain(_)
            | Node::Identifier(_)
            | Node::Builtin(_)
            | Node::VendorType(_)
            | Node::WellKnown { .. }
            | Node::Operator(_)
            | Node::VendorOperator(_)
            | Node::LiteralOperator(_)
            | Node::UnnamedType(_)
            | Node::StructuredBinding(_)
            | Node::StringLiteral
            | Node::DefaultArg(_)
            | Node::Nullptr
            | Node::FunctionParam(_)
            | Node::TemplateParam(_) => {}
            Node::Nested {
                ref mut prefix,
                ref mut name,
            } => {
                f(prefix);
                f(name);
            }
            Node::Global(ref mut inner)
            | Node::ConversionOperator(ref mut inner)
            | Node::Ctor(ref mut inner)
            | Node::Dtor(ref mut inner)
            | Node::Pointer(ref mut inner)
            | Node::Reference { ref mut inner, .. }
            | Node::Qualified { ref mut inner, .. }
            | Node::Complex(ref mut inner)
            | Node::Imaginary(ref mut inner)
            | Node::Decltype(ref mut inner)
            | Node::PackExpansion(ref mut inner)
            | Node::AbiTagged {
                name: ref mut inner,
                ..
            }
            | Node::Elaborated {
                name: ref mut inner,
                ..
            }
            | Node::Literal {
                ty: ref mut inner, ..
            }
            | Node::CloneSuffix {
                encoding: ref mut inner,
                ..
            } => f(inner),
            Node::Template {
                ref mut name,
                ref mut args,
            } => {
                f(name);
                args.iter_mut().for_each(|arg| f(arg));
            }
            Node::Closure { ref mut params, .. } => params.iter_mut().for_each(|p| f(p)),
            Node::Pack(ref mut items) => items.iter_mut().for_each(|item| f(item)),
            Node::Local {
                ref mut encoding,
                ref mut entity,
            } => {
                f(encoding);
                f(entity);
            }
            Node::Function(ref mut func) => {
                if let Some(ref mut ret) = func.ret {
                    f(ret);
                }
                f(&mut func.name);
                func.params.iter_mut().for_each(|p| f(p));
            }
            Node::FunctionType(ref mut ty) => {
                f(&mut ty.ret);
                ty.params.iter_mut().for_each(|p| f(p));
            }
            Node::VendorQualified {
                ref mut args,
                ref mut inner,
                ..
            } => {
                f(inner);
                args.iter_mut().for_each(|arg| f(arg));
            }
            Node::Array {
                ref mut dimension,
                ref mut element,
            }
            | Node::Vector {
                ref mut dimension,
                ref mut element,
            } => {
                f(element);
                if let Dimension::Expression(ref mut expr) = *dimension {
                    f(expr);
                }
            }
            Node::PointerToMember {
                ref mut class,
                ref mut member,
            } => {
                f(member);
                f(class);
            }
            Node::Special(ref mut special) => special.for_each_child_mut(f),
            Node::Expression(ref mut expr) => expr.for_each_child_mut(f),
        }
    }

    /// The number of nodes in this tree.
    pub fn weight(&self) -> usize {
        let mut weight = 1;
        self.for_each_child(&mut |child| weight += child.weight());
        weight
    }

    /// The length of the longest root-to-leaf path in this tree.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        self.for_each_child(&mut |child| deepest = deepest.max(child.depth()));
        deepest + 1
    }
}

impl SpecialName {
    fn for_each_child<F>(&self, f: &mut F)
    where
        F: FnMut(&Node),
    {
        match *self {
            SpecialName::VirtualTable(ref inner)
            | SpecialName::Vtt(ref inner)
            | SpecialName::Typeinfo(ref inner)
            | SpecialName::TypeinfoName(ref inner)
            | SpecialName::TlsWrapper(ref inner)
            | SpecialName::TlsInit(ref inner)
            | SpecialName::TemplateParamObject(ref inner)
            | SpecialName::GuardVariable(ref inner)
            | SpecialName::HiddenAlias(ref inner)
            | SpecialName::TransactionClone(ref inner)
            | SpecialName::NonTransactionClone(ref inner)
            | SpecialName::Thunk {
                target: ref inner, ..
            }
            | SpecialName::CovariantThunk {
                target: ref inner, ..
            }
            | SpecialName::ReferenceTemporary {
                name: ref inner, ..
            } => f(inner),
            SpecialName::ConstructionVtable {
                ref derived,
                ref base,
                ..
            } => {
                f(base);
                f(derived);
            }
        }
    }
}

impl SpecialName {
    fn for_each_child_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        match *self {
            SpecialName::VirtualTable(ref mut inner)
            | SpecialName::Vtt(ref mut inner)
            | SpecialName::Typeinfo(ref mut inner)
            | SpecialName::TypeinfoName(ref mut inner)
            | SpecialName::TlsWrapper(ref mut inner)
            | SpecialName::TlsInit(ref mut inner)
            | SpecialName::TemplateParamObject(ref mut inner)
            | SpecialName::GuardVariable(ref mut inner)
            | SpecialName::HiddenAlias(ref mut inner)
            | SpecialName::TransactionClone(ref mut inner)
            | SpecialName::NonTransactionClone(ref mut inner)
            | SpecialName::Thunk {
                target: ref mut inner,
                ..
            }
            | SpecialName::CovariantThunk {
                target: ref mut inner,
                ..
            }
            | SpecialName::ReferenceTemporary {
                name: ref mut inner,
                ..
            } => f(inner),
            SpecialName::ConstructionVtable {
                ref mut derived,
                ref mut base,
                ..
            } => {
                f(base);
                f(derived);
            }
        }
    }
}

impl Expression {
    fn for_each_child<F>(&self, f: &mut F)
    where
        F: FnMut(&Node),
    {
        match *self {
            Expression::Unary(_, ref a)
            | Expression::Postfix(_, ref a)
            | Expression::Keyword(_, ref a)
            | Expression::SizeofPack(ref a)
            | Expression::Delete { operand: ref a, .. } => f(a),
            Expression::Binary(_, ref a, ref b)
            | Expression::Index(ref a, ref b)
            | Expression::Cast(_, ref a, ref b)
            | Expression::Member(ref a, _, ref b) => {
                f(a);
                f(b);
            }
            Expression::Ternary(ref a, ref b, ref c) => {
                f(a);
                f(b);
                f(c);
            }
            Expression::Call(ref callee, ref args) => {
                f(callee);
                args.iter().for_each(|arg| f(arg));
            }
            Expression::ConversionList(ref ty, ref args) => {
                f(ty);
                args.iter().for_each(|arg| f(arg));
            }
            Expression::Throw(ref operand) => {
                if let Some(ref operand) = *operand {
                    f(operand);
                }
            }
            Expression::PackSize(_) => {}
            Expression::InitList(ref ty, ref items) => {
                if let Some(ref ty) = *ty {
                    f(ty);
                }
                items.iter().for_each(|item| f(item));
            }
        }
    }
}

impl Expression {
    fn for_each_child_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        match *self {
            Expression::Unary(_, ref mut a)
            | Expression::Postfix(_, ref mut a)
            | Expression::Keyword(_, ref mut a)
            | Expression::SizeofPack(ref mut a)
            | Expression::Delete {
                operand: ref mut a,
                ..
            } => f(a),
            Expression::Binary(_, ref mut a, ref mut b)
            | Expression::Index(ref mut a, ref mut b)
            | Expression::Cast(_, ref mut a, ref mut b)
            | Expression::Member(ref mut a, _, ref mut b) => {
                f(a);
                f(b);
            }
            Expression::Ternary(ref mut a, ref mut b, ref mut c) => {
                f(a);
                f(b);
                f(c);
            }
            Expression::Call(ref mut callee, ref mut args) => {
                f(callee);
                args.iter_mut().for_each(|arg| f(arg));
            }
            Expression::ConversionList(ref mut ty, ref mut args) => {
                f(ty);
                args.iter_mut().for_each(|arg| f(arg));
            }
            Expression::Throw(ref mut operand) => {
                if let Some(ref mut operand) = *operand {
                    f(operand);
                }
            }
            Expression::InitList(ref mut ty, ref mut items) => {
                if let Some(ref mut ty) = *ty {
                    f(ty);
                }
                items.iter_mut().for_each(|item| f(item));
            }
            Expression::PackSize(_) => {}
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&crate::demangle::render(self))
    }
}
