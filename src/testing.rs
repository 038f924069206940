/// Try to parse something with one of the parser's production functions, and
/// check the result. For example:
///
///     assert_parse!(parse_type: b"PKcE" => Ok(expected_node, b"E"));
///     assert_parse!(parse_type: b"Q" => Err(Error::InvalidMangledName { offset: 0 }));
///
/// This asserts that calling `parse_type` on `"PKcE"` succeeds, producing
/// `expected_node`, and leaving the unparsed text `"E"`.
///
/// The substitution table can be seeded with `with subs [...]`, and a
/// template argument frame holding the given arguments pushed with
/// `with args [...]`:
///
///     assert_parse!(parse_type with subs [foo] with args [int]: b"S_" => Ok(foo, b""));
macro_rules! assert_parse {
    ($production:ident
     $(with subs [$($sub:expr),* $(,)?])?
     $(with args [$($arg:expr),* $(,)?])? :
     $input:expr => Ok($ex_value:expr, $ex_tail:expr)) => {{
        let input = $input as &[u8];
        let input_printable = String::from_utf8_lossy(input).into_owned();
        let ex_value = $ex_value;
        let ex_tail = $ex_tail as &[u8];

        let ctx = $crate::parse::ParseContext::new(&$crate::ParseOptions::default(), input.len());
        #[allow(unused_mut, unused_assignments)]
        let mut subs = $crate::subs::SubstitutionTable::new();
        $( subs = vec![$($sub),*].into_iter().collect(); )?
        let _frame = ctx.push_template_frame();
        $( ctx.set_template_args(&[$($arg),*]); )?

        match $production(&ctx, &mut subs, $crate::index_str::IndexStr::new(input)) {
            Err(e) => panic!("Parsing {:?} with {} failed: {}",
                             input_printable, stringify!($production), e),
            Ok((value, tail)) => {
                if value != ex_value {
                    panic!("Parsing {:?} with {} produced {:?}, expected {:?}",
                           input_printable, stringify!($production), value, ex_value);
                }
                if tail != ex_tail {
                    panic!("Parsing {:?} with {} left a tail of {:?}, expected {:?}",
                           input_printable, stringify!($production), tail, ex_tail);
                }
            }
        }
    }};

    ($production:ident
     $(with subs [$($sub:expr),* $(,)?])?
     $(with args [$($arg:expr),* $(,)?])? :
     $input:expr => Err($ex_error:expr)) => {{
        let input = $input as &[u8];
        let input_printable = String::from_utf8_lossy(input).into_owned();
        let ex_error = $ex_error;

        let ctx = $crate::parse::ParseContext::new(&$crate::ParseOptions::default(), input.len());
        #[allow(unused_mut, unused_assignments)]
        let mut subs = $crate::subs::SubstitutionTable::new();
        $( subs = vec![$($sub),*].into_iter().collect(); )?
        let _frame = ctx.push_template_frame();
        $( ctx.set_template_args(&[$($arg),*]); )?

        match $production(&ctx, &mut subs, $crate::index_str::IndexStr::new(input)) {
            Err(err) => {
                if err != ex_error {
                    panic!("Parsing {:?} with {} should fail with {:?},\n\
                            failed with {:?} instead",
                           input_printable, stringify!($production), ex_error, err);
                }
            }
            Ok((value, tail)) => {
                panic!("Parsing {:?} with {} should fail with {:?},\n\
                        but succeeded with value {:?}, tail {:?}",
                       input_printable, stringify!($production), ex_error, value, tail);
            }
        }
    }};
}
