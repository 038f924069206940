use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{self, Path};

fn get_crate_dir() -> io::Result<path::PathBuf> {
    Ok(path::PathBuf::from(
        env::var("CARGO_MANIFEST_DIR")
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "no CARGO_MANIFEST_DIR"))?,
    ))
}

fn get_out_dir() -> io::Result<path::PathBuf> {
    Ok(path::PathBuf::from(env::var("OUT_DIR").map_err(|_| {
        io::Error::new(io::ErrorKind::Other, "no OUT_DIR")
    })?))
}

fn get_test_path(file_name: &str) -> io::Result<path::PathBuf> {
    let mut test_path = get_out_dir()?;
    assert!(test_path.is_dir());
    test_path.push(file_name);
    Ok(test_path)
}

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Generate tests that ensure that we don't panic when parsing and demangling
/// the seed test cases that we pass to AFL.rs (including the failing test
/// cases historically found by AFL.rs).
fn generate_sanity_tests_from_afl_seeds() -> io::Result<()> {
    let test_path = get_test_path("afl_seeds.rs")?;
    let mut test_file = fs::File::create(test_path)?;

    let mut in_dir = get_crate_dir()?;
    in_dir.push("in");
    if !in_dir.is_dir() {
        // We are in `cargo publish` and the `in/` directory isn't included in
        // the distributed package.
        return Ok(());
    }

    println!("cargo:rerun-if-changed=in");

    let mut entries = fs::read_dir(in_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        let file_name = path
            .file_name()
            .ok_or_else(|| invalid_data("no file name for AFL.rs seed test case"))?;
        println!("cargo:rerun-if-changed=in/{}", Path::new(file_name).display());

        let test_name: String = file_name
            .to_string_lossy()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        writeln!(
            &mut test_file,
            r#"
#[test]
fn test_afl_seed_{}() {{
    let contents = std::fs::read(r"{}").unwrap();
    if let Ok(sym) = cxxfilt::Symbol::new(&contents[..]) {{
        let _ = sym.to_string();
    }}
    let _ = cxxfilt::demangle_bytes(&contents, true);
    let _ = cxxfilt::demangle_bytes(&contents, false);
}}
"#,
            test_name,
            path.to_string_lossy()
        )?;
    }

    Ok(())
}

/// One case from `tests/demangle-expected`.
struct GoldenCase {
    options: String,
    mangled: String,
    demangled: String,
    without_params: Option<String>,
}

fn read_golden_cases(path: &Path) -> io::Result<Vec<GoldenCase>> {
    let file = io::BufReader::new(fs::File::open(path)?);
    let mut lines = file
        .lines()
        .filter(|line| line.as_ref().map(|l| !l.starts_with('#')).unwrap_or(true));

    let mut cases = vec![];
    loop {
        let options = match lines.next() {
            None => break,
            Some(line) => line?,
        };
        let mangled = lines
            .next()
            .ok_or_else(|| invalid_data("expected a line with a mangled symbol"))??;
        let demangled = lines
            .next()
            .ok_or_else(|| invalid_data("expected a line with the demangled symbol"))??;
        let without_params = if options.contains("--no-params") {
            Some(lines.next().ok_or_else(|| {
                invalid_data("expected a line with the demangled symbol without parameters")
            })??)
        } else {
            None
        };

        cases.push(GoldenCase {
            options,
            mangled: mangled.trim().to_string(),
            demangled: demangled.trim().to_string(),
            without_params: without_params.map(|l| l.trim().to_string()),
        });
    }
    Ok(cases)
}

fn demangle_options_expr(options: &str, no_params: bool) -> String {
    let mut expr = String::from("cxxfilt::DemangleOptions::new()");
    if no_params {
        expr.push_str(".no_params()");
    }
    if options.contains("--no-return-type") {
        expr.push_str(".no_return_type()");
    }
    if options.contains("--hide-expression-literal-types") {
        expr.push_str(".hide_expression_literal_types()");
    }
    expr
}

fn write_golden_test(
    test_file: &mut fs::File,
    name: &str,
    mangled: &str,
    expected: &str,
    options: &str,
) -> io::Result<()> {
    writeln!(
        test_file,
        r###"
#[test]
fn {}() {{
    let mangled = br#"{}"#;
    let expected = r#"{}"#;
    let sym = cxxfilt::Symbol::new(&mangled[..])
        .expect("should parse golden mangled symbol");
    let actual = sym.demangle(&{});
    assert_demangled(&mangled[..], expected, &actual);
}}
"###,
        name, mangled, expected, options
    )
}

/// Read `tests/demangle-expected`, parse its input mangled symbols and
/// expected output demangled symbols, and generate test cases for them.
///
/// Only `--format=gnu-v3` (the Itanium C++ ABI) cases are understood; legacy
/// and other language formats are skipped.
fn generate_golden_tests() -> io::Result<()> {
    let test_path = get_test_path("golden.rs")?;
    let mut test_file = fs::File::create(test_path)?;

    let mut expected_path = get_crate_dir()?;
    expected_path.push("tests");
    expected_path.push("demangle-expected");
    if !expected_path.is_file() {
        // We are in `cargo publish` and the `tests/` directory isn't included
        // in the distributed package.
        return Ok(());
    }

    println!("cargo:rerun-if-changed=tests/demangle-expected");

    for (n, case) in read_golden_cases(&expected_path)?.iter().enumerate() {
        if !case.options.contains("--format=gnu-v3") {
            continue;
        }

        write_golden_test(
            &mut test_file,
            &format!("test_golden_demangle_{}", n),
            &case.mangled,
            &case.demangled,
            &demangle_options_expr(&case.options, false),
        )?;

        if let Some(ref without_params) = case.without_params {
            write_golden_test(
                &mut test_file,
                &format!("test_golden_demangle_{}_no_params", n),
                &case.mangled,
                without_params,
                &demangle_options_expr(&case.options, true),
            )?;
        }
    }

    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    generate_sanity_tests_from_afl_seeds()
        .expect("should generate sanity tests from AFL.rs seed test cases");

    generate_golden_tests().expect("should generate golden tests from tests/demangle-expected");
}
