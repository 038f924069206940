fn main() {
    afl::fuzz!(|bytes: &[u8]| {
        if let Ok(sym) = cxxfilt::BorrowedSymbol::new(bytes) {
            let _ = sym.to_string();
        }
        let _ = cxxfilt::demangle_bytes(bytes, false);
    });
}
