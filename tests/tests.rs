#![allow(non_snake_case)]

use cxxfilt::{DemangleOptions, Demangler, Error, ItaniumDemangler, ParseOptions};
use std::io::Write;
use std::thread;

fn print_diff(expected: &str, actual: &str) {
    println!();
    println!("Diff:");
    println!("--- expected");
    print!("+++ actual");

    let mut last = None;
    for cmp in diff::chars(expected, actual) {
        match (last, cmp.clone()) {
            (Some(diff::Result::Left(_)), diff::Result::Left(_))
            | (Some(diff::Result::Both(..)), diff::Result::Both(..))
            | (Some(diff::Result::Right(_)), diff::Result::Right(_)) => {}

            (_, diff::Result::Left(_)) => print!("\n-"),
            (_, diff::Result::Both(..)) => print!("\n "),
            (_, diff::Result::Right(_)) => print!("\n+"),
        };
        match cmp.clone() {
            diff::Result::Left(c) | diff::Result::Both(c, _) | diff::Result::Right(c) => {
                print!("{}", c)
            }
        }
        last = Some(cmp);
    }
    println!();
}

fn assert_demangles_as(mangled: &str, expected: &str) {
    let sym = cxxfilt::BorrowedSymbol::new(mangled.as_bytes())
        .expect("should parse mangled symbol ok");

    let mut actual = vec![];
    write!(&mut actual, "{}", sym).expect("should demangle symbol ok");
    let actual = String::from_utf8(actual).expect("should demangle to valid utf-8");

    if expected != actual {
        print_diff(expected, &actual);
    }

    assert_eq!(expected, actual);
}

fn assert_does_not_demangle(s: &str) {
    if let Ok(sym) = cxxfilt::BorrowedSymbol::new(s.as_bytes()) {
        panic!("Unexpectedly demangled '{}' as '{}'", s, sym);
    }
}

macro_rules! demangles {
    ( $mangled:ident , $demangled:expr ) => {
        #[test]
        fn $mangled() {
            assert_demangles_as(stringify!($mangled), $demangled);
        }
    };
}

macro_rules! does_not_demangle {
    ( $name:ident , $s:expr ) => {
        #[test]
        fn $name() {
            assert_does_not_demangle($s);
        }
    };
}

// This should definitely not parse and demangle as
// `operator()(unsigned __int128, short, long double)`.
does_not_demangle!(close_should_not_demangle, "close");
does_not_demangle!(malformed_after_prefix, "_ZQQ");
does_not_demangle!(bare_prefix, "_Z");

demangles!(
    _ZNSt22condition_variable_anyD2Ev,
    "std::condition_variable_any::~condition_variable_any()"
);
demangles!(
    _ZN4_VTVISt13bad_exceptionE12__vtable_mapE,
    "_VTV<std::bad_exception>::__vtable_map"
);

demangles!(
    _Z20instantiate_with_intI3FooET_IiEv,
    "Foo<int> instantiate_with_int<Foo>()"
);
demangles!(_Z3fooISt6vectorIiEEvv, "void foo<std::vector<int> >()");
demangles!(__ZN3foo3barE3quxS0_, "foo::bar(qux, qux)");
demangles!(__ZN3foo3barE3quxS_, "foo::bar(qux, foo)");

demangles!(
    _ZN4funcI2TyEEN6ResultIT_EES3_,
    "Result<Ty> func<Ty>(Result<Ty>)"
);
demangles!(_ZN4funcI2TyEEN6ResultIT_EES2_, "Result<Ty> func<Ty>(Ty)");
demangles!(
    _ZN4funcI2TyEEN6ResultIT_EES1_,
    "Result<Ty> func<Ty>(Result)"
);
demangles!(_ZN4funcI2TyEEN6ResultIT_EES0_, "Result<Ty> func<Ty>(Ty)");
demangles!(_ZN4funcI2TyEEN6ResultIT_EES_, "Result<Ty> func<Ty>(func)");

demangles!(
    _ZN2Ty6methodIS_EEvMT_FvPKcES_,
    "void Ty::method<Ty>(void (Ty::*)(char const*), Ty)"
);
demangles!(
    _ZN2Ty6methodIS_EEvMT_FvPKcES0_,
    "void Ty::method<Ty>(void (Ty::*)(char const*), Ty::method)"
);
demangles!(
    _ZN2Ty6methodIS_EEvMT_FvPKcES1_,
    "void Ty::method<Ty>(void (Ty::*)(char const*), Ty)"
);
demangles!(
    _ZN2Ty6methodIS_EEvMT_FvPKcES2_,
    "void Ty::method<Ty>(void (Ty::*)(char const*), char const)"
);
demangles!(
    _ZN2Ty6methodIS_EEvMT_FvPKcES3_,
    "void Ty::method<Ty>(void (Ty::*)(char const*), char const*)"
);
demangles!(
    _ZN2Ty6methodIS_EEvMT_FvPKcES4_,
    "void Ty::method<Ty>(void (Ty::*)(char const*), void (char const*))"
);
demangles!(
    _ZN2Ty6methodIS_EEvMT_FvPKcES5_,
    "void Ty::method<Ty>(void (Ty::*)(char const*), void (Ty::*)(char const*))"
);

demangles!(_ZNK1fB5cxx11Ev, "f[abi:cxx11]() const");

demangles!(
    _ZN4base8internal14CheckedSubImplIlEENSt9enable_ifIXsrSt14numeric_limitsIT_E10is_integerEbE4typeES4_S4_PS4_,
    "std::enable_if<std::numeric_limits<long>::is_integer, bool>::type base::internal::CheckedSubImpl<long>(long, long, long*)"
);

demangles!(
    _ZZN7mozilla12EMEDecryptor5FlushEvENUlvE_D4Ev,
    "mozilla::EMEDecryptor::Flush()::{lambda()#1}::~{lambda()#1}()"
);

demangles!(
    _ZSt4copyIPKcPcET0_T_S4_S3_,
    "char* std::copy<char const*, char*>(char const*, char const*, char*)"
);

demangles!(
    _Z9_mm_or_psDv4_fS_,
    "_mm_or_ps(float __vector(4), float __vector(4))"
);

demangles!(
    _ZN5space20templated_trampolineIPFvvEEEvT_,
    "void space::templated_trampoline<void (*)()>(void (*)())"
);

demangles!(
    _Z18convertCase_helperIN14QUnicodeTables14CasefoldTraitsEtET0_S2_,
    "unsigned short convertCase_helper<QUnicodeTables::CasefoldTraits, unsigned short>(unsigned short)"
);

demangles!(
    _ZnwmRKSt9nothrow_t,
    "operator new(unsigned long, std::nothrow_t const&)"
);

demangles!(
    _ZGRL13MozLangGroups_,
    "reference temporary #0 for MozLangGroups"
);

demangles!(_ZN11InstrumentsL8gSessionE, "Instruments::gSession");
demangles!(_ZTWN2js10TlsContextE, "TLS wrapper function for js::TlsContext");

demangles!(_Z3fooILb0EEvi, "void foo<false>(int)");
demangles!(_Z3fooILb1EEvi, "void foo<true>(int)");
demangles!(_Z3fooILb2EEvi, "void foo<(bool)2>(int)");
demangles!(_Z3fooILb999999EEvi, "void foo<(bool)999999>(int)");

demangles!(
    _ZNSbIwSt11char_traitsIwESaIwEEC1IPwEET_S5_RKS1_,
    "std::basic_string<wchar_t, std::char_traits<wchar_t>, std::allocator<wchar_t> >::basic_string<wchar_t*>(wchar_t*, wchar_t*, std::allocator<wchar_t> const&)"
);
demangles!(_ZN2ns2v11ScvPT_IcEEv, "ns::v1::S::operator char*<char>()");
demangles!(_Z2pkIJiRcEEvDpOT_, "void pk<int, char&>(int&&, char&)");
demangles!(
    _ZZ4genlvENKUlT_T0_E_clIicEEDaS_S0_,
    "auto genl()::{lambda(auto:1, auto:2)#1}::operator()<int, char>(int, char) const"
);
demangles!(_Z2fiILi3EEv1IIXplT_Li1EEE, "void fi<3>(I<(3)+(1)>)");
demangles!(_Z1gILb1EEv1IIXquT_Li1ELi2EEE, "void g<true>(I<(true)?(1) : (2)>)");
demangles!(_Z3szpIJiiEEv1IIXsZT_EE, "void szp<int, int>(I<2>)");

// Inputs that once confused other demanglers.

demangles!(
    _Z5ccc_Z5cccmmmml,
    "ccc_Z(cccmm, unsigned long, unsigned long, long)"
);
demangles!(
    __Z3S_Z3SGffffjjjjjjjjjjzjjjjjjojjjjjjjj,
    "S_Z(SGf, float, float, float, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, ..., unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned __int128, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int, unsigned int)"
);
demangles!(
    __Z3SGfDdedddd,
    "SGf(decimal64, long double, double, double, double, double)"
);
demangles!(
    __ZN6ISiS_Z3b_dE1ES0_7__dIFFFdhl,
    "ISiS_Z::b_d(E, E, __dIFFF, double, unsigned char, long)"
);

#[test]
fn external_only_passes_plain_symbols_through() {
    for plain in &["main", "printf", "", "Z4mainEUlvE_", "__libc_start_main"] {
        assert_eq!(cxxfilt::demangle(plain, true).as_deref(), Ok(*plain));
        assert_eq!(
            cxxfilt::demangle_bytes(plain.as_bytes(), true),
            Ok(plain.as_bytes().to_vec())
        );
    }
}

#[test]
fn internal_names_decode_as_types() {
    assert_eq!(
        cxxfilt::demangle("N3foo12BarExceptionE", false).as_deref(),
        Ok("foo::BarException")
    );
    assert_eq!(cxxfilt::demangle("a", false).as_deref(), Ok("signed char"));
    assert_eq!(
        cxxfilt::demangle("St13bad_exception", false).as_deref(),
        Ok("std::bad_exception")
    );

    let lambda = cxxfilt::demangle("Z4mainEUlvE_", false).expect("should demangle lambda");
    assert!(lambda.contains("main::"), "{}", lambda);
    assert!(lambda.contains("{lambda"), "{}", lambda);
}

#[test]
fn main_is_not_a_type() {
    assert!(cxxfilt::demangle("main", false).is_err());
}

#[test]
fn errors_carry_the_failing_offset() {
    match cxxfilt::demangle("_ZQQ", true) {
        Err(Error::InvalidMangledName { offset }) => assert_eq!(offset, 2),
        otherwise => panic!("unexpected result {:?}", otherwise),
    }
    assert!(cxxfilt::demangle_bytes(b"_Z3foo\xff", true).is_err());
}

#[test]
fn deep_nesting_hits_the_recursion_limit() {
    let mut mangled = String::from("_Z1f");
    mangled.push_str(&"P".repeat(200));
    mangled.push('i');

    assert_eq!(
        cxxfilt::demangle(&mangled, true),
        Err(Error::RecursionLimitExceeded)
    );

    let demangler = ItaniumDemangler::new()
        .with_parse_options(ParseOptions::new().recursion_limit(1024));
    let demangled = demangler
        .demangle(&mangled, true)
        .expect("a raised limit should accept the symbol");
    assert!(demangled.starts_with("f(int*"), "{}", demangled);
    assert!(demangled.ends_with("*)"), "{}", demangled);
}

#[test]
fn doubling_back_references_hit_the_expansion_budget() {
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

    let mut mangled = String::from("_Z1fA1_iMS_S_");
    for i in 0..39 {
        let id = seq_id(i);
        mangled.push_str(&format!("MS{}_S{}_", id, id));
    }

    assert_eq!(
        cxxfilt::decode(mangled.as_bytes(), true),
        Err(Error::RecursionLimitExceeded)
    );
}

#[test]
fn back_references_match_their_expansion() {
    let pairs = [
        ("_ZN3foo3barE3quxS0_", "_ZN3foo3barE3qux3qux"),
        ("_ZSt4copyIPKcPcET0_T_S4_S3_", "_ZSt4copyIPKcPcEPcPKcPKcPc"),
        ("_Z9_mm_or_psDv4_fS_", "_Z9_mm_or_psDv4_fDv4_f"),
    ];
    for &(compressed, expanded) in &pairs {
        let compressed_ast = cxxfilt::decode(compressed.as_bytes(), true)
            .expect("compressed form should decode");
        let expanded_ast =
            cxxfilt::decode(expanded.as_bytes(), true).expect("expanded form should decode");
        assert_eq!(compressed_ast, expanded_ast, "{} vs {}", compressed, expanded);
    }
}

#[test]
fn parallel_decodes_are_independent() {
    let symbols = [
        "_ZNSt22condition_variable_anyD2Ev",
        "_ZN4funcI2TyEEN6ResultIT_EES3_",
        "_ZSt4copyIPKcPcET0_T_S4_S3_",
        "_ZN2Ty6methodIS_EEvMT_FvPKcES5_",
    ];
    let expected: Vec<String> = symbols
        .iter()
        .map(|s| cxxfilt::demangle(s, true).unwrap())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(move || {
                (0..50)
                    .flat_map(|_| symbols.iter())
                    .map(|s| cxxfilt::demangle(s, true).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let results = handle.join().unwrap();
        for chunk in results.chunks(symbols.len()) {
            assert_eq!(chunk, &expected[..]);
        }
    }
}

#[test]
fn demangler_options_shape_the_output() {
    let demangler = ItaniumDemangler::new().with_demangle_options(DemangleOptions::new().no_params());
    assert_eq!(
        demangler.demangle("_ZSt4copyIPKcPcET0_T_S4_S3_", true).as_deref(),
        Ok("std::copy<char const*, char*>")
    );

    let demangler =
        ItaniumDemangler::new().with_demangle_options(DemangleOptions::new().no_return_type());
    assert_eq!(
        demangler.demangle("_ZSt4copyIPKcPcET0_T_S4_S3_", true).as_deref(),
        Ok("std::copy<char const*, char*>(char const*, char const*, char*)")
    );
}
