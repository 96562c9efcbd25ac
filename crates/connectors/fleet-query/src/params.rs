//! Decode the query string of a list request into raw parameters.

use url::form_urlencoded;

use query_engine_translation::translation::request::{ParamValue, RawParams};

/// Decode a query string. Keys keep the order of their first occurrence.
///
/// A key given more than once, or written with a `[]` or `[<index>]` suffix, holds a list.
/// The suffix is stripped, so `id[]=1&id[]=2` and `id=1&id=2` decode the same way.
pub fn parse_query_string(query: &str) -> RawParams {
    let mut params = RawParams::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let (key, is_list) = strip_list_suffix(&key);
        let value = value.into_owned();
        match params.get_mut(key) {
            None if is_list => {
                params.insert(key.to_string(), ParamValue::List(vec![value]));
            }
            None => {
                params.insert(key.to_string(), ParamValue::Single(value));
            }
            Some(existing) => {
                *existing = match std::mem::replace(existing, ParamValue::List(vec![])) {
                    ParamValue::Single(first) => ParamValue::List(vec![first, value]),
                    ParamValue::List(mut values) => {
                        values.push(value);
                        ParamValue::List(values)
                    }
                };
            }
        }
    }
    params
}

fn strip_list_suffix(key: &str) -> (&str, bool) {
    match key.strip_suffix(']').and_then(|rest| rest.rsplit_once('[')) {
        Some((name, index))
            if !name.is_empty() && index.chars().all(|c| c.is_ascii_digit()) =>
        {
            (name, true)
        }
        _ => (key, false),
    }
}
