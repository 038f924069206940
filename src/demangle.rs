//! Printing an `ast::Node` tree as C++ source text.
//!
//! Declarators print inside-out, so every node has a left part and a right
//! part: `int (*)[3]` is the pointer's left part `int (*` wrapped around the
//! array's right part ` [3]`. Most nodes only have a left part.

use crate::ast::{
    BuiltinType, CallOffset, CastKind, Dimension, Expression, Function, FunctionType, Node,
    OperatorName, RefQualifier, SpecialName,
};
use crate::DemangleOptions;

/// Render `node` with the default options.
pub fn render(node: &Node) -> String {
    render_with_options(node, &DemangleOptions::default())
}

/// Render `node`. The options apply to the outermost function only; enclosing
/// functions of local names and the targets of thunks print in full.
pub fn render_with_options(node: &Node, options: &DemangleOptions) -> String {
    let mut ctx = DemangleContext::new(options);
    match *node {
        Node::Function(ref func) => ctx.demangle_function(func, true),
        Node::CloneSuffix {
            ref encoding,
            ref suffixes,
        } => {
            match **encoding {
                Node::Function(ref func) => ctx.demangle_function(func, true),
                ref other => ctx.demangle(other),
            }
            ctx.demangle_clone_suffixes(suffixes);
        }
        _ => ctx.demangle(node),
    }
    ctx.out
}

/// The state of one rendering.
struct DemangleContext<'a> {
    options: &'a DemangleOptions,
    out: String,
    // While expanding a `Dp`/`sp` pack expansion, the element of each
    // argument pack to print.
    pack_index: Option<usize>,
}

impl<'a> DemangleContext<'a> {
    fn new(options: &'a DemangleOptions) -> DemangleContext<'a> {
        DemangleContext {
            options,
            out: String::new(),
            pack_index: None,
        }
    }

    #[inline]
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    #[inline]
    fn last_char_is(&self, c: char) -> bool {
        self.out.ends_with(c)
    }

    /// Print both parts of `node`.
    fn demangle(&mut self, node: &Node) {
        self.demangle_left(node);
        if has_rhs(node) {
            self.demangle_right(node);
        }
    }

    /// Print `items` separated by commas. Items that print nothing, like
    /// empty argument packs, get no separator.
    fn demangle_list(&mut self, items: &[Node]) {
        let mut first = true;
        for item in items {
            let mark = self.out.len();
            if !first {
                self.push(", ");
            }
            let start = self.out.len();
            self.demangle(item);
            if self.out.len() == start {
                self.out.truncate(mark);
            } else {
                first = false;
            }
        }
    }

    fn demangle_params(&mut self, params: &[Node]) {
        self.push("(");
        self.demangle_list(params);
        self.push(")");
    }

    fn demangle_template_args(&mut self, args: &[Node]) {
        if self.last_char_is('<') {
            self.push(" ");
        }
        self.push("<");
        self.demangle_list(args);
        if self.last_char_is('>') {
            self.push(" ");
        }
        self.push(">");
    }

    fn demangle_clone_suffixes(&mut self, suffixes: &[String]) {
        for suffix in suffixes {
            self.push(" [clone ");
            self.push(suffix);
            self.push("]");
        }
    }

    fn demangle_function(&mut self, func: &Function, top_level: bool) {
        if top_level && self.options.no_params {
            self.demangle(&func.name);
            return;
        }

        let ret = match func.ret {
            Some(ref ret) if !(top_level && self.options.no_return_type) => Some(ret),
            _ => None,
        };

        if let Some(ret) = ret {
            self.demangle_left(ret);
            if !has_rhs(ret) {
                self.push(" ");
            }
        }
        self.demangle(&func.name);
        self.demangle_params(&func.params);
        if let Some(ret) = ret {
            if has_rhs(ret) {
                self.demangle_right(ret);
            }
        }
        self.push(&func.cv.to_string());
        if let Some(ref_qualifier) = func.ref_qualifier {
            self.push(" ");
            self.push(ref_qualifier.symbol());
        }
    }

    fn demangle_dimension(&mut self, dimension: &Dimension) {
        match *dimension {
            Dimension::Unknown => {}
            Dimension::Number(n) => self.push(&n.to_string()),
            Dimension::Expression(ref expr) => self.demangle(expr),
        }
    }

    fn demangle_left(&mut self, node: &Node) {
        match *node {
            Node::Plain(ref s)
            | Node::Identifier(ref s)
            | Node::VendorType(ref s) => self.push(s),
            Node::Builtin(ty) => self.push(ty.printable()),
            Node::WellKnown {
                component,
                expanded,
            } => {
                if expanded {
                    self.push(component.expanded());
                } else {
                    self.push(component.printable());
                }
            }
            Node::Nested {
                ref prefix,
                ref name,
            } => {
                self.demangle(prefix);
                self.push("::");
                self.demangle(name);
            }
            Node::Global(ref inner) => {
                self.push("::");
                self.demangle(inner);
            }
            Node::Template { ref name, ref args } => {
                self.demangle(name);
                self.demangle_template_args(args);
            }
            Node::AbiTagged { ref name, ref tag } => {
                self.demangle(name);
                self.push("[abi:");
                self.push(tag);
                self.push("]");
            }
            Node::Operator(op) => self.demangle_operator_name(op),
            Node::VendorOperator(ref name) => {
                self.push("operator ");
                self.push(name);
            }
            Node::ConversionOperator(ref ty) => {
                self.push("operator ");
                self.demangle(ty);
            }
            Node::LiteralOperator(ref name) => {
                self.push("operator\"\" ");
                self.push(name);
            }
            Node::Ctor(ref class) => self.demangle(class),
            Node::Dtor(ref class) => {
                self.push("~");
                self.demangle(class);
            }
            Node::UnnamedType(number) => {
                self.push("{unnamed type#");
                self.push(&number.to_string());
                self.push("}");
            }
            Node::Closure {
                ref params,
                number,
            } => {
                self.push("{lambda");
                self.demangle_params(params);
                self.push("#");
                self.push(&number.to_string());
                self.push("}");
            }
            Node::StructuredBinding(ref names) => {
                self.push("[");
                self.push(&names.join(", "));
                self.push("]");
            }
            Node::Local {
                ref encoding,
                ref entity,
            } => {
                self.demangle(encoding);
                self.push("::");
                self.demangle(entity);
            }
            Node::StringLiteral => self.push("string literal"),
            Node::DefaultArg(number) => {
                self.push("{default arg#");
                self.push(&number.to_string());
                self.push("}");
            }
            Node::Function(ref func) => self.demangle_function(func, false),
            Node::FunctionType(ref ty) => {
                self.demangle_left(&ty.ret);
                self.push(" ");
            }
            Node::Pointer(ref inner) => {
                self.demangle_left(inner);
                self.demangle_declarator_open(inner);
                self.push("*");
            }
            Node::Reference {
                kind,
                ref inner,
            } => {
                let (kind, inner) = self.collapse_reference(kind, inner);
                self.demangle_left(inner);
                self.demangle_declarator_open(inner);
                self.push(kind.symbol());
            }
            Node::Qualified {
                quals,
                ref inner,
            } => {
                self.demangle_left(inner);
                self.push(&quals.to_string());
            }
            Node::VendorQualified {
                ref qualifier,
                ref args,
                ref inner,
            } => {
                self.demangle_left(inner);
                self.push(" ");
                self.push(qualifier);
                if !args.is_empty() {
                    self.demangle_template_args(args);
                }
            }
            Node::Complex(ref inner) => {
                self.demangle(inner);
                self.push(" _Complex");
            }
            Node::Imaginary(ref inner) => {
                self.demangle(inner);
                self.push(" _Imaginary");
            }
            Node::Array { ref element, .. } => self.demangle_left(element),
            Node::Vector {
                ref dimension,
                ref element,
            } => {
                self.demangle(element);
                self.push(" __vector(");
                self.demangle_dimension(dimension);
                self.push(")");
            }
            Node::PointerToMember {
                ref class,
                ref member,
            } => {
                self.demangle_left(member);
                if is_array_or_function(member) {
                    self.push("(");
                } else {
                    self.push(" ");
                }
                self.demangle(class);
                self.push("::*");
            }
            Node::Elaborated {
                keyword,
                ref name,
            } => {
                self.push(keyword);
                self.push(" ");
                self.demangle(name);
            }
            Node::Decltype(ref expr) => {
                self.push("decltype (");
                self.demangle(expr);
                self.push(")");
            }
            Node::Pack(ref items) => match self.pack_index {
                Some(idx) => {
                    if let Some(item) = items.get(idx) {
                        self.demangle_left(item);
                    }
                }
                None => self.demangle_list(items),
            },
            Node::PackExpansion(ref inner) => self.demangle_pack_expansion(inner),
            Node::Special(ref special) => self.demangle_special_name(special),
            Node::Literal { ref ty, ref value } => self.demangle_literal(ty, value),
            Node::Nullptr => self.push("nullptr"),
            Node::Expression(ref expr) => self.demangle_expression(expr),
            Node::FunctionParam(number) => {
                self.push("{parm#");
                self.push(&number.to_string());
                self.push("}");
            }
            Node::TemplateParam(idx) => {
                self.push("auto:");
                self.push(&(idx + 1).to_string());
            }
            Node::CloneSuffix {
                ref encoding,
                ref suffixes,
            } => {
                self.demangle(encoding);
                self.demangle_clone_suffixes(suffixes);
            }
        }
    }

    fn demangle_right(&mut self, node: &Node) {
        match *node {
            Node::FunctionType(ref ty) => self.demangle_function_type_right(ty),
            Node::Array {
                ref dimension,
                ref element,
            } => {
                if !self.last_char_is(']') {
                    self.push(" ");
                }
                self.push("[");
                self.demangle_dimension(dimension);
                self.push("]");
                if has_rhs(element) {
                    self.demangle_right(element);
                }
            }
            Node::Pointer(ref inner) => {
                if is_array_or_function(inner) {
                    self.push(")");
                }
                if has_rhs(inner) {
                    self.demangle_right(inner);
                }
            }
            Node::Reference { kind, ref inner } => {
                let (_, inner) = self.collapse_reference(kind, inner);
                if is_array_or_function(inner) {
                    self.push(")");
                }
                if has_rhs(inner) {
                    self.demangle_right(inner);
                }
            }
            Node::PointerToMember { ref member, .. } => {
                if is_array_or_function(member) {
                    self.push(")");
                }
                if has_rhs(member) {
                    self.demangle_right(member);
                }
            }
            Node::Qualified { ref inner, .. } | Node::VendorQualified { ref inner, .. } => {
                if has_rhs(inner) {
                    self.demangle_right(inner);
                }
            }
            Node::Pack(ref items) => {
                if let Some(item) = self.pack_index.and_then(|idx| items.get(idx)) {
                    if has_rhs(item) {
                        self.demangle_right(item);
                    }
                }
            }
            _ => {}
        }
    }

    /// A reference to a reference is a single reference, and `&` wins over
    /// `&&`. The referenced type may be the current element of a pack being
    /// expanded.
    fn collapse_reference<'n>(
        &self,
        mut kind: RefQualifier,
        mut inner: &'n Node,
    ) -> (RefQualifier, &'n Node) {
        loop {
            let next = match *inner {
                Node::Pack(ref items) => match self.pack_index.and_then(|idx| items.get(idx)) {
                    Some(item) => item,
                    None => return (kind, inner),
                },
                ref other => other,
            };
            match *next {
                Node::Reference {
                    kind: inner_kind,
                    inner: ref referenced,
                } => {
                    if inner_kind == RefQualifier::LValueRef {
                        kind = RefQualifier::LValueRef;
                    }
                    inner = &**referenced;
                }
                _ => return (kind, inner),
            }
        }
    }

    /// Pointers and references to arrays and functions need parentheses:
    /// `int (*) [3]`, `void (&)(int)`.
    fn demangle_declarator_open(&mut self, inner: &Node) {
        if !is_array_or_function(inner) {
            return;
        }
        if is_array(inner) {
            self.push(" ");
        }
        self.push("(");
    }

    fn demangle_function_type_right(&mut self, ty: &FunctionType) {
        self.demangle_params(&ty.params);
        if has_rhs(&ty.ret) {
            self.demangle_right(&ty.ret);
        }
        self.push(&ty.cv.to_string());
        if let Some(ref_qualifier) = ty.ref_qualifier {
            self.push(" ");
            self.push(ref_qualifier.symbol());
        }
        if ty.noexcept {
            self.push(" noexcept");
        }
    }

    fn demangle_operator_name(&mut self, op: OperatorName) {
        let symbol = op.printable();
        self.push("operator");
        if symbol.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.push(" ");
        }
        self.push(symbol);
    }

    fn demangle_pack_expansion(&mut self, inner: &Node) {
        let len = match pack_len(inner) {
            Some(len) => len,
            None => {
                self.demangle(inner);
                self.push("...");
                return;
            }
        };

        let saved = self.pack_index;
        let mut first = true;
        for idx in 0..len {
            if !first {
                self.push(", ");
            }
            first = false;
            self.pack_index = Some(idx);
            self.demangle(inner);
        }
        self.pack_index = saved;
    }

    fn demangle_special_name(&mut self, special: &SpecialName) {
        match *special {
            SpecialName::VirtualTable(ref ty) => {
                self.push("vtable for ");
                self.demangle(ty);
            }
            SpecialName::Vtt(ref ty) => {
                self.push("VTT for ");
                self.demangle(ty);
            }
            SpecialName::Typeinfo(ref ty) => {
                self.push("typeinfo for ");
                self.demangle(ty);
            }
            SpecialName::TypeinfoName(ref ty) => {
                self.push("typeinfo name for ");
                self.demangle(ty);
            }
            SpecialName::ConstructionVtable {
                ref derived,
                ref base,
                ..
            } => {
                self.push("construction vtable for ");
                self.demangle(base);
                self.push("-in-");
                self.demangle(derived);
            }
            SpecialName::TlsWrapper(ref name) => {
                self.push("TLS wrapper function for ");
                self.demangle(name);
            }
            SpecialName::TlsInit(ref name) => {
                self.push("TLS init function for ");
                self.demangle(name);
            }
            SpecialName::TemplateParamObject(ref arg) => {
                self.push("template parameter object for ");
                self.demangle(arg);
            }
            SpecialName::Thunk {
                this_adjustment,
                ref target,
            } => {
                match this_adjustment {
                    CallOffset::NonVirtual(_) => self.push("non-virtual thunk to "),
                    CallOffset::Virtual(..) => self.push("virtual thunk to "),
                }
                self.demangle(target);
            }
            SpecialName::CovariantThunk { ref target, .. } => {
                self.push("covariant return thunk to ");
                self.demangle(target);
            }
            SpecialName::GuardVariable(ref name) => {
                self.push("guard variable for ");
                self.demangle(name);
            }
            SpecialName::ReferenceTemporary { ref name, index } => {
                self.push("reference temporary #");
                self.push(&index.to_string());
                self.push(" for ");
                self.demangle(name);
            }
            SpecialName::HiddenAlias(ref encoding) => {
                self.push("hidden alias for ");
                self.demangle(encoding);
            }
            SpecialName::TransactionClone(ref encoding) => {
                self.push("transaction clone for ");
                self.demangle(encoding);
            }
            SpecialName::NonTransactionClone(ref encoding) => {
                self.push("non-transaction clone for ");
                self.demangle(encoding);
            }
        }
    }

    fn demangle_literal(&mut self, ty: &Node, value: &str) {
        if let Node::Builtin(builtin) = *ty {
            if builtin == BuiltinType::Bool {
                match value {
                    "0" => return self.push("false"),
                    "1" => return self.push("true"),
                    _ => {}
                }
            }
            if let Some(suffix) = builtin.literal_suffix() {
                self.push(value);
                self.push(suffix);
                return;
            }
            if builtin.is_floating_point() {
                if !self.options.hide_expression_literal_types {
                    self.push("(");
                    self.push(builtin.printable());
                    self.push(")");
                }
                self.push("[");
                self.push(value);
                self.push("]");
                return;
            }
        }

        if !self.options.hide_expression_literal_types {
            self.push("(");
            self.demangle(ty);
            self.push(")");
        }
        self.push(value);
    }

    /// Print `node` as an operand. Only names, function parameters and
    /// braced lists go without parentheses.
    fn demangle_operand(&mut self, node: &Node) {
        if is_simple_operand(node) {
            self.demangle(node);
        } else {
            self.demangle_parenthesized(node);
        }
    }

    fn demangle_parenthesized(&mut self, node: &Node) {
        self.push("(");
        self.demangle(node);
        self.push(")");
    }

    fn demangle_expression(&mut self, expr: &Expression) {
        match *expr {
            Expression::Unary(op, ref operand) => {
                self.push(op.printable());
                self.demangle_operand(operand);
            }
            Expression::Postfix(op, ref operand) => {
                self.demangle_operand(operand);
                self.push(op.printable());
            }
            Expression::Binary(op, ref lhs, ref rhs) => {
                // Keep a bare `>` from closing an enclosing template argument
                // list.
                let wrap = op == OperatorName::Greater;
                if wrap {
                    self.push("(");
                }
                self.demangle_operand(lhs);
                self.push(op.printable());
                self.demangle_operand(rhs);
                if wrap {
                    self.push(")");
                }
            }
            Expression::Ternary(ref condition, ref consequent, ref alternative) => {
                self.demangle_operand(condition);
                self.push("?");
                self.demangle_operand(consequent);
                self.push(" : ");
                self.demangle_operand(alternative);
            }
            Expression::Index(ref object, ref index) => {
                self.demangle_operand(object);
                self.push("[");
                self.demangle(index);
                self.push("]");
            }
            Expression::Call(ref callee, ref args) => {
                self.demangle(callee);
                self.demangle_params(args);
            }
            Expression::Cast(kind, ref ty, ref operand) => match kind.keyword() {
                Some(keyword) => {
                    self.push(keyword);
                    self.demangle_template_args(std::slice::from_ref(&**ty));
                    self.demangle_parenthesized(operand);
                }
                None => {
                    debug_assert_eq!(kind, CastKind::Conversion);
                    self.demangle_parenthesized(ty);
                    self.demangle_operand(operand);
                }
            },
            Expression::ConversionList(ref ty, ref args) => {
                self.demangle(ty);
                self.demangle_params(args);
            }
            Expression::Member(ref object, op, ref member) => {
                self.demangle(object);
                self.push(op);
                self.demangle(member);
            }
            Expression::Keyword(keyword, ref operand) => {
                self.push(keyword);
                self.push(" ");
                self.demangle_parenthesized(operand);
            }
            Expression::SizeofPack(ref pack) => {
                self.push("sizeof...");
                self.demangle_parenthesized(pack);
            }
            Expression::PackSize(len) => self.push(&len.to_string()),
            Expression::Throw(ref operand) => {
                self.push("throw");
                if let Some(ref operand) = *operand {
                    self.push(" ");
                    self.demangle(operand);
                }
            }
            Expression::Delete {
                global,
                array,
                ref operand,
            } => {
                if global {
                    self.push("::");
                }
                self.push("delete");
                if array {
                    self.push("[]");
                }
                self.push(" ");
                self.demangle(operand);
            }
            Expression::InitList(ref ty, ref items) => {
                if let Some(ref ty) = *ty {
                    self.demangle(ty);
                }
                self.push("{");
                self.demangle_list(items);
                self.push("}");
            }
        }
    }
}

/// Does `node` print anything after the name it declares?
fn has_rhs(node: &Node) -> bool {
    match *node {
        Node::FunctionType(_) | Node::Array { .. } => true,
        Node::Pointer(ref inner)
        | Node::Reference { ref inner, .. }
        | Node::Qualified { ref inner, .. }
        | Node::VendorQualified { ref inner, .. } => has_rhs(inner),
        Node::PointerToMember { ref member, .. } => has_rhs(member),
        Node::Pack(ref items) => items.iter().any(has_rhs),
        _ => false,
    }
}

fn is_simple_operand(node: &Node) -> bool {
    match *node {
        Node::Identifier(_) | Node::Nested { .. } | Node::FunctionParam(_) => true,
        Node::Expression(ref expr) => matches!(**expr, Expression::InitList(..)),
        _ => false,
    }
}

fn is_array(node: &Node) -> bool {
    match *node {
        Node::Array { .. } => true,
        Node::Qualified { ref inner, .. } => is_array(inner),
        _ => false,
    }
}

fn is_array_or_function(node: &Node) -> bool {
    match *node {
        Node::FunctionType(_) => true,
        Node::Qualified { ref inner, .. } => is_array_or_function(inner),
        _ => is_array(node),
    }
}

/// The length of the first argument pack found in `node`.
fn pack_len(node: &Node) -> Option<usize> {
    if let Node::Pack(ref items) = *node {
        return Some(items.len());
    }
    let mut found = None;
    node.for_each_child(&mut |child| {
        if found.is_none() {
            found = pack_len(child);
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::{render, render_with_options};
    use crate::ast::{
        BuiltinType, CallOffset, CastKind, CvQualifiers, Dimension, Expression, Function,
        FunctionType, Node, OperatorName, RefQualifier, SpecialName, WellKnownComponent,
    };
    use crate::DemangleOptions;

    fn builtin(ty: BuiltinType) -> Node {
        Node::Builtin(ty)
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

    fn template(name: Node, args: Vec<Node>) -> Node {
        Node::Template {
            name: Box::new(name),
            args,
        }
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

    fn function(name: Node, ret: Option<Node>, params: Vec<Node>) -> Node {
        Node::Function(Function {
            name: Box::new(name),
            ret: ret.map(Box::new),
            params,
            cv: CvQualifiers::default(),
            ref_qualifier: None,
        })
    }

    fn function_type(ret: Node, params: Vec<Node>) -> FunctionType {
        FunctionType {
            ret: Box::new(ret),
            params,
            cv: CvQualifiers::default(),
            ref_qualifier: None,
            noexcept: false,
        }
    }

    fn std_(name: &str) -> Node {
        nested(
            Node::WellKnown {
                component: WellKnownComponent::Std,
                expanded: false,
            },
            ident(name),
        )
    }

    #[test]
    fn nested_template_closers_get_a_space() {
        let inner = template(std_("vector"), vec![builtin(BuiltinType::Int)]);
        let outer = template(std_("vector"), vec![inner]);
        assert_eq!(render(&outer), "std::vector<std::vector<int> >");
    }

    #[test]
    fn qualifiers_follow_the_base_type() {
        let ty = Node::Pointer(Box::new(konst(builtin(BuiltinType::Char))));
        assert_eq!(render(&ty), "char const*");

        let ty = Node::Reference {
            kind: RefQualifier::RValueRef,
            inner: Box::new(ident("Foo")),
        };
        assert_eq!(render(&ty), "Foo&&");
    }

    #[test]
    fn declarators_print_inside_out() {
        let fn_ptr = Node::Pointer(Box::new(Node::FunctionType(function_type(
            builtin(BuiltinType::Void),
            vec![builtin(BuiltinType::Int)],
        ))));
        assert_eq!(render(&fn_ptr), "void (*)(int)");

        let array_ref = Node::Reference {
            kind: RefQualifier::LValueRef,
            inner: Box::new(Node::Array {
                dimension: Dimension::Number(3),
                element: Box::new(builtin(BuiltinType::Int)),
            }),
        };
        assert_eq!(render(&array_ref), "int (&) [3]");

        let matrix = Node::Array {
            dimension: Dimension::Number(2),
            element: Box::new(Node::Array {
                dimension: Dimension::Number(3),
                element: Box::new(builtin(BuiltinType::Int)),
            }),
        };
        assert_eq!(render(&matrix), "int [2][3]");

        let mut method = function_type(
            builtin(BuiltinType::Void),
            vec![Node::Pointer(Box::new(konst(builtin(BuiltinType::Char))))],
        );
        method.cv.const_ = true;
        let ptm = Node::PointerToMember {
            class: Box::new(ident("Foo")),
            member: Box::new(Node::FunctionType(method)),
        };
        assert_eq!(render(&ptm), "void (Foo::*)(char const*) const");

        let data_member = Node::PointerToMember {
            class: Box::new(ident("Foo")),
            member: Box::new(builtin(BuiltinType::Int)),
        };
        assert_eq!(render(&data_member), "int Foo::*");

        let vector = Node::Vector {
            dimension: Dimension::Number(4),
            element: Box::new(builtin(BuiltinType::Float)),
        };
        assert_eq!(render(&vector), "float __vector(4)");
    }

    #[test]
    fn function_encodings() {
        let f = function(
            template(ident("f"), vec![builtin(BuiltinType::Int)]),
            Some(builtin(BuiltinType::Void)),
            vec![builtin(BuiltinType::Int), builtin(BuiltinType::Ellipsis)],
        );
        assert_eq!(render(&f), "void f<int>(int, ...)");
        assert_eq!(
            render_with_options(&f, &DemangleOptions::new().no_return_type()),
            "f<int>(int, ...)"
        );
        assert_eq!(
            render_with_options(&f, &DemangleOptions::new().no_params()),
            "f<int>"
        );

        let dtor = function(
            nested(std_("condition_variable_any"), Node::Dtor(Box::new(ident("condition_variable_any")))),
            None,
            vec![],
        );
        assert_eq!(
            render(&dtor),
            "std::condition_variable_any::~condition_variable_any()"
        );
    }

    #[test]
    fn expanded_std_abbreviations() {
        let ctor = function(
            nested(
                Node::WellKnown {
                    component: WellKnownComponent::StdString2,
                    expanded: true,
                },
                Node::Ctor(Box::new(ident("basic_string"))),
            ),
            None,
            vec![],
        );
        assert_eq!(
            render(&ctor),
            "std::basic_string<char, std::char_traits<char>, std::allocator<char> >::basic_string()"
        );

        let plain = Node::WellKnown {
            component: WellKnownComponent::StdString2,
            expanded: false,
        };
        assert_eq!(render(&plain), "std::string");
    }

    #[test]
    fn special_names() {
        let vtable = Node::Special(SpecialName::VirtualTable(Box::new(ident("Foo"))));
        assert_eq!(render(&vtable), "vtable for Foo");

        let thunk = Node::Special(SpecialName::Thunk {
            this_adjustment: CallOffset::Virtual(0, -24),
            target: Box::new(function(ident("f"), None, vec![])),
        });
        assert_eq!(render(&thunk), "virtual thunk to f()");

        let ctor_vtable = Node::Special(SpecialName::ConstructionVtable {
            derived: Box::new(ident("B")),
            offset: 0,
            base: Box::new(ident("A")),
        });
        assert_eq!(render(&ctor_vtable), "construction vtable for A-in-B");

        let temp = Node::Special(SpecialName::ReferenceTemporary {
            name: Box::new(ident("x")),
            index: 1,
        });
        assert_eq!(render(&temp), "reference temporary #1 for x");
    }

    #[test]
    fn local_names_and_unnamed_entities() {
        let main = function(ident("main"), None, vec![]);
        let lambda = Node::Local {
            encoding: Box::new(main.clone()),
            entity: Box::new(Node::Closure {
                params: vec![],
                number: 1,
            }),
        };
        assert_eq!(render(&lambda), "main()::{lambda()#1}");

        let literal = Node::Local {
            encoding: Box::new(main.clone()),
            entity: Box::new(Node::StringLiteral),
        };
        assert_eq!(render(&literal), "main()::string literal");

        let binding = Node::StructuredBinding(vec!["a".into(), "b".into()]);
        assert_eq!(render(&binding), "[a, b]");

        let tagged = Node::AbiTagged {
            name: Box::new(ident("f")),
            tag: "cxx11".into(),
        };
        assert_eq!(render(&tagged), "f[abi:cxx11]");

        let cloned = Node::CloneSuffix {
            encoding: Box::new(main),
            suffixes: vec![".constprop.0".into(), ".isra.1".into()],
        };
        assert_eq!(
            render(&cloned),
            "main() [clone .constprop.0] [clone .isra.1]"
        );
    }

    #[test]
    fn literals() {
        let lit = |ty: BuiltinType, value: &str| Node::Literal {
            ty: Box::new(builtin(ty)),
            value: value.into(),
        };
        assert_eq!(render(&lit(BuiltinType::Bool, "1")), "true");
        assert_eq!(render(&lit(BuiltinType::Bool, "0")), "false");
        assert_eq!(render(&lit(BuiltinType::Int, "-5")), "-5");
        assert_eq!(render(&lit(BuiltinType::UnsignedLong, "5")), "5ul");
        assert_eq!(render(&lit(BuiltinType::Char, "97")), "(char)97");
        assert_eq!(
            render_with_options(
                &lit(BuiltinType::Char, "97"),
                &DemangleOptions::new().hide_expression_literal_types()
            ),
            "97"
        );
        assert_eq!(render(&Node::Nullptr), "nullptr");
    }

    #[test]
    fn expressions() {
        let one = Node::Literal {
            ty: Box::new(builtin(BuiltinType::Int)),
            value: "1".into(),
        };
        let sum = Node::Expression(Box::new(Expression::Binary(
            OperatorName::Add,
            Box::new(one.clone()),
            Box::new(Node::FunctionParam(1)),
        )));
        assert_eq!(render(&sum), "(1)+{parm#1}");
        assert_eq!(
            render(&Node::Decltype(Box::new(sum))),
            "decltype ((1)+{parm#1})"
        );

        let greater = Node::Expression(Box::new(Expression::Binary(
            OperatorName::Greater,
            Box::new(one.clone()),
            Box::new(one.clone()),
        )));
        assert_eq!(
            render(&template(ident("A"), vec![greater])),
            "A<((1)>(1))>"
        );

        let choice = Node::Expression(Box::new(Expression::Ternary(
            Box::new(Node::Literal {
                ty: Box::new(builtin(BuiltinType::Bool)),
                value: "1".into(),
            }),
            Box::new(one.clone()),
            Box::new(Node::Literal {
                ty: Box::new(builtin(BuiltinType::Int)),
                value: "2".into(),
            }),
        )));
        assert_eq!(render(&choice), "(true)?(1) : (2)");

        let cast = Node::Expression(Box::new(Expression::Cast(
            CastKind::Static,
            Box::new(builtin(BuiltinType::Long)),
            Box::new(ident("x")),
        )));
        assert_eq!(render(&cast), "static_cast<long>(x)");

        let negated = Node::Expression(Box::new(Expression::Unary(
            OperatorName::Neg,
            Box::new(nested(ident("A"), ident("value"))),
        )));
        assert_eq!(render(&negated), "-A::value");

        let size = Node::Expression(Box::new(Expression::Keyword(
            "sizeof",
            Box::new(builtin(BuiltinType::Int)),
        )));
        assert_eq!(render(&size), "sizeof (int)");
    }

    #[test]
    fn packs_and_expansions() {
        let pack = Node::Pack(vec![builtin(BuiltinType::Int), builtin(BuiltinType::Char)]);
        let expansion = Node::PackExpansion(Box::new(Node::Reference {
            kind: RefQualifier::LValueRef,
            inner: Box::new(pack.clone()),
        }));
        let f = function(ident("f"), None, vec![expansion]);
        assert_eq!(render(&f), "f(int&, char&)");

        let empty = template(ident("g"), vec![Node::Pack(vec![])]);
        assert_eq!(render(&empty), "g<>");

        assert_eq!(render(&template(ident("h"), vec![pack])), "h<int, char>");

        let sized = template(ident("I"), vec![Node::Expression(Box::new(Expression::PackSize(2)))]);
        assert_eq!(render(&sized), "I<2>");
    }

    #[test]
    fn forwarding_references_collapse_per_pack_element() {
        let pack = Node::Pack(vec![
            builtin(BuiltinType::Int),
            Node::Reference {
                kind: RefQualifier::LValueRef,
                inner: Box::new(builtin(BuiltinType::Char)),
            },
        ]);
        let expansion = Node::PackExpansion(Box::new(Node::Reference {
            kind: RefQualifier::RValueRef,
            inner: Box::new(pack),
        }));
        let f = function(
            template(ident("pk"), vec![]),
            Some(builtin(BuiltinType::Void)),
            vec![expansion],
        );
        assert_eq!(render(&f), "void pk<>(int&&, char&)");
    }

    #[test]
    fn unbound_template_params_print_as_auto() {
        let lambda = Node::Closure {
            params: vec![Node::TemplateParam(0), Node::TemplateParam(1)],
            number: 1,
        };
        assert_eq!(render(&lambda), "{lambda(auto:1, auto:2)#1}");
    }

    #[test]
    fn operator_names() {
        let less = template(Node::Operator(OperatorName::Less), vec![ident("T")]);
        assert_eq!(render(&less), "operator< <T>");
        assert_eq!(render(&Node::Operator(OperatorName::New)), "operator new");
        assert_eq!(
            render(&Node::ConversionOperator(Box::new(builtin(BuiltinType::Bool)))),
            "operator bool"
        );
    }
}
