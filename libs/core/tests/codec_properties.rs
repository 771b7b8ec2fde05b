use proptest::collection::vec;
use proptest::prelude::*;
use tbx_core::{ShareReference, extract, normalize};

fn with_case(key: &str, upper: &[bool]) -> String {
    key.chars()
        .zip(upper.iter().cycle())
        .map(|(c, up)| {
            if *up {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

fn cookie_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.%=-]{1,24}"
}

fn spacing() -> impl Strategy<Value = String> {
    "[ \t]{0,3}"
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(";"), Just("\n"), Just("\r\n")]
}

/// Unrelated `name=value` cookie segments.
fn filler() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", "[a-z0-9]{0,8}")
        .prop_filter("not a credential key", |(key, _)| {
            key != "bduss" && key != "stoken"
        })
        .prop_map(|(key, value)| format!("{key}={value}"))
}

fn field(
    key: &str,
    value: &str,
    upper: &[bool],
    pad: &(String, String, String, String),
) -> String {
    format!(
        "{}{}{}={}{}{}",
        pad.0,
        with_case(key, upper),
        pad.1,
        pad.2,
        value,
        pad.3
    )
}

fn padding() -> impl Strategy<Value = (String, String, String, String)> {
    (spacing(), spacing(), spacing(), spacing())
}

proptest! {
    #[test]
    fn both_fields_in_any_order_case_and_spacing_give_canonical_form(
        bduss in cookie_value(),
        stoken in cookie_value(),
        bduss_case in vec(any::<bool>(), 5),
        stoken_case in vec(any::<bool>(), 6),
        bduss_pad in padding(),
        stoken_pad in padding(),
        stoken_first in any::<bool>(),
        before in vec(filler(), 0..3),
        between in vec(filler(), 0..3),
        after in vec(filler(), 0..3),
        sep in separator(),
        trailing in any::<bool>(),
    ) {
        let b = field("BDUSS", &bduss, &bduss_case, &bduss_pad);
        let s = field("STOKEN", &stoken, &stoken_case, &stoken_pad);
        let (first, second) = if stoken_first { (s, b) } else { (b, s) };

        let mut segments = before;
        segments.push(first);
        segments.extend(between);
        segments.push(second);
        segments.extend(after);
        let mut raw = segments.join(sep);
        if trailing {
            raw.push_str(sep);
        }

        let expected = format!("BDUSS={bduss}; STOKEN={stoken};");
        let normalized = normalize(&raw);
        prop_assert_eq!(&normalized, &expected);
        prop_assert_eq!(normalize(&normalized), expected);
    }

    #[test]
    fn missing_either_field_returns_trimmed_input(
        fillers in vec(filler(), 0..4),
        lone in prop_oneof![Just(None), Just(Some("BDUSS")), Just(Some("STOKEN"))],
        value in cookie_value(),
        upper in vec(any::<bool>(), 6),
        lead in "[ \n]{0,3}",
        tail in "[ \n]{0,3}",
        sep in separator(),
    ) {
        let mut segments = fillers;
        if let Some(key) = lone {
            segments.push(format!("{}={value}", with_case(key, &upper)));
        }
        let raw = format!("{lead}{}{tail}", segments.join(sep));

        prop_assert_eq!(normalize(&raw), raw.trim());
    }

    #[test]
    fn query_form_wins_over_path_form(
        share_id in "[0-9]{1,12}",
        owner_id in "[0-9]{1,12}",
        token in "[A-Za-z0-9_-]{1,16}",
        owner_key in prop_oneof![Just("uk"), Just("from_uk")],
        path_first in any::<bool>(),
    ) {
        let text = if path_first {
            format!("https://www.terabox.com/s/{token}?shareid={share_id}&{owner_key}={owner_id}")
        } else {
            format!(
                "https://www.terabox.com/sharing/link?shareid={share_id}&{owner_key}={owner_id}&next=/s/{token}"
            )
        };

        prop_assert_eq!(
            extract(&text),
            Some(ShareReference::Pair { share_id, owner_id })
        );
    }

    #[test]
    fn path_form_alone_yields_token(
        token in "[A-Za-z0-9_-]{1,16}",
        suffix in prop_oneof![Just(""), Just("?pwd=ab12"), Just("/"), Just(" thanks")],
    ) {
        let text = format!("https://terabox.app/s/{token}{suffix}");
        prop_assert_eq!(
            extract(&text),
            Some(ShareReference::Token { share_token: token })
        );
    }
}
