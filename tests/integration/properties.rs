//! Property tests spanning the compiler, reader, and command-line helpers.

use ark::cli::repl::hex_dump;
use ark::language::{BytecodeReader, compile, disassemble, generate, parse, serialize};
use proptest::prelude::*;

/// Symbols start with `v` so they never collide with a keyword.
fn atom() -> impl Strategy<Value = String> {
    prop_oneof![
        "v[a-z]{0,3}",
        (-1000i64..1000).prop_map(|n| n.to_string()),
        "[a-z]{0,4}".prop_map(|s| format!("\"{s}\"")),
    ]
}

fn form() -> impl Strategy<Value = String> {
    atom().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, e)| format!("(if {c} {t} {e})")),
            ("v[a-z]{0,2}", inner.clone()).prop_map(|(n, e)| format!("(def {n} {e})")),
            ("v[a-z]{0,2}", inner.clone()).prop_map(|(p, b)| format!("(fun ({p}) {b})")),
            (inner.clone(), inner.clone()).prop_map(|(c, b)| format!("(while {c} {b})")),
            prop::collection::vec(inner, 1..3)
                .prop_map(|args| format!("(f {})", args.join(" "))),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The bytes written for a program are the bytes of its generated pools and pages.
    #[test]
    fn compile_equals_generate_then_serialize(forms in prop::collection::vec(form(), 1..4)) {
        let source = forms.join("\n");
        let program = generate(&parse(&source).unwrap()).unwrap();
        prop_assert_eq!(compile(&source).unwrap(), serialize(&program).unwrap());
    }

    /// Every page of a compiled program shows up in its listing.
    #[test]
    fn listing_covers_every_page(forms in prop::collection::vec(form(), 1..4)) {
        let bytes = compile(&forms.join("\n")).unwrap();
        let image = BytecodeReader::read(&bytes).unwrap();
        let text = disassemble(&image);
        for idx in 0..image.pages.len() {
            let header = format!("page {idx} (");
            prop_assert!(text.contains(&header));
        }
    }

    /// The hex dump shows every byte of the image.
    #[test]
    fn hex_dump_covers_image(forms in prop::collection::vec(form(), 0..3)) {
        let bytes = compile(&forms.join("\n")).unwrap();
        let dump = hex_dump(&bytes);
        prop_assert_eq!(dump.lines().count(), bytes.len().div_ceil(16));
        let pairs: usize = dump.lines().map(|l| l.split_whitespace().count() - 1).sum();
        prop_assert_eq!(pairs, bytes.len());
    }
}
