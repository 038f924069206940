//! Tests generated by `build.rs` from `tests/demangle-expected` and the AFL.rs
//! seed inputs in `in/`.

fn assert_demangled(mangled: &[u8], expected: &str, actual: &str) {
    println!("Parsing mangled symbol: {}", String::from_utf8_lossy(mangled));
    println!("     Expect demangled symbol: {}", expected);
    println!("Actually demangled symbol as: {}", actual);

    if expected != actual {
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

    assert_eq!(expected, actual);
}

include!(concat!(env!("OUT_DIR"), "/golden.rs"));

mod afl_seeds {
    include!(concat!(env!("OUT_DIR"), "/afl_seeds.rs"));
}
