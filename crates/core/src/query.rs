//! Query string rewriting for bound element URLs.

use regex::{Captures, Regex};

use crate::ListenError;

/// Set `key=value` on `uri`.
///
/// The first existing occurrence of `key` (matched case-insensitively) is
/// replaced in place; otherwise the pair is appended with `?` or `&`
/// depending on whether a query string already exists. A `#fragment` stays
/// at the end. Keys and values are percent-encoded.
pub fn update_query_parameter(uri: &str, key: &str, value: &str) -> Result<String, ListenError> {
    let (base, fragment) = match uri.find('#') {
        Some(idx) => uri.split_at(idx),
        None => (uri, ""),
    };

    let key = urlencoding::encode(key);
    let value = urlencoding::encode(value);
    let pattern = format!(r"(?i)([?&]){}=.*?(&|$)", regex::escape(&key));
    let re = Regex::new(&pattern)
        .map_err(|e| ListenError::parsing_error(format!("Bad query key '{}': {}", key, e)))?;

    let rewritten = if re.is_match(base) {
        re.replacen(base, 1, |caps: &Captures| {
            format!("{}{}={}{}", &caps[1], key, value, &caps[2])
        })
        .into_owned()
    } else {
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}={}", base, separator, key, value)
    };

    Ok(format!("{}{}", rewritten, fragment))
}

/// Apply every pair in order.
pub fn update_query_parameters<'a, I>(uri: &str, pairs: I) -> Result<String, ListenError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .try_fold(uri.to_string(), |acc, (k, v)| update_query_parameter(&acc, k, v))
}

/// Read the first value of `key` from a query string, decoded.
pub fn query_parameter(uri: &str, key: &str) -> Option<String> {
    let base = uri.split('#').next()?;
    let (_, query) = base.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let k = urlencoding::decode(k).ok()?;
        if k.eq_ignore_ascii_case(key) {
            urlencoding::decode(v).ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}
