#![no_main]

use cxxfilt::{DemangleOptions, Symbol};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(sym) = Symbol::new(data) {
        let _ = sym.to_string();
        let _ = sym.demangle(&DemangleOptions::new().no_params());
        let _ = sym.demangle(&DemangleOptions::new().hide_expression_literal_types());
    }
});
