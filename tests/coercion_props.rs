// tests/coercion_props.rs

use ddcutils::config::{Item, Value, coerce};
use proptest::prelude::*;

fn item_strategy() -> impl Strategy<Value = Item> {
    prop_oneof![
        (0i64..=i64::MAX).prop_map(Item::Int),
        "[a-z][a-z0-9_./-]{0,8}".prop_map(Item::Str),
    ]
}

proptest! {
    #[test]
    fn digit_strings_become_ints(n in 0i64..=i64::MAX) {
        prop_assert_eq!(coerce(Some(&n.to_string())).unwrap(), Value::Int(n));
    }

    #[test]
    fn lists_keep_source_order(items in proptest::collection::vec(item_strategy(), 2..8)) {
        let raw = items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
        prop_assert_eq!(coerce(Some(&raw)).unwrap(), Value::List(items.clone()));

        let quoted = format!("\"{raw}\"");
        prop_assert_eq!(coerce(Some(&quoted)).unwrap(), Value::List(items.clone()));

        let each_quoted = items.iter().map(|i| format!("\"{i}\"")).collect::<Vec<_>>().join(", ");
        prop_assert_eq!(coerce(Some(&each_quoted)).unwrap(), Value::List(items));
    }

    #[test]
    fn plain_words_are_trimmed_strings(word in "[a-zA-Z][a-zA-Z ]{0,12}[a-zA-Z]") {
        let padded = format!("  {word}\t");
        prop_assert_eq!(coerce(Some(&padded)).unwrap(), Value::Str(word));
    }

    #[test]
    fn whitespace_only_is_absent(ws in "[ \t]{0,6}") {
        prop_assert_eq!(coerce(Some(&ws)).unwrap(), Value::Absent);
    }
}
