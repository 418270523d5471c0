use percent_encoding::percent_decode_str;

/// Decoded query string parameters, keeping repeated keys in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses `a=1&b=two&b=three`. `+` decodes to a space; a key without `=` has an
    /// empty value.
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_query_component(key), decode_query_component(value))
            })
            .collect();
        Self { pairs }
    }

    /// The last value for `key`; a repeated scalar parameter keeps its final value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order of appearance.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

fn decode_query_component(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Decodes a single path segment. `+` is kept literally.
pub(crate) fn decode_path_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_keys() {
        let params = QueryParams::parse(Some("query=book&tags=a&tags=b&exact=true"));
        assert_eq!(params.get("query"), Some("book"));
        assert_eq!(params.get_all("tags"), vec!["a", "b"]);
        assert_eq!(params.get("exact"), Some("true"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_repeated_scalar_key_keeps_last_value() {
        let params = QueryParams::parse(Some("query=a&query=bb"));
        assert_eq!(params.get("query"), Some("bb"));
        assert_eq!(params.get_all("query"), vec!["a", "bb"]);
    }

    #[test]
    fn test_decoding() {
        let params = QueryParams::parse(Some("message=hello+world%21&k%C3%A9y=%E2%9C%93"));
        assert_eq!(params.get("message"), Some("hello world!"));
        assert_eq!(params.get("kéy"), Some("✓"));
    }

    #[test]
    fn test_empty_and_bare_keys() {
        assert_eq!(QueryParams::parse(None), QueryParams::default());
        assert_eq!(QueryParams::parse(Some("")), QueryParams::default());
        let params = QueryParams::parse(Some("flag&x="));
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("x"), Some(""));
    }

    #[test]
    fn test_path_segment_keeps_plus() {
        assert_eq!(decode_path_segment("Ana%20Mar%C3%ADa+1"), "Ana María+1");
    }
}
