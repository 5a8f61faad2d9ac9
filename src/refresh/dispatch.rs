use std::time::{Duration, Instant};

use super::{content_hash, Endpoint};
use crate::error::FetchError;
use crate::source::Fetcher;

/// Everything one fetch attempt produced.
///
/// On a transport error only `name`, `error` and `elapsed` are set.  On a
/// decode error `hash` and `raw` are still filled in: the endpoint was
/// reached even though its content could not be understood.
#[derive(Debug)]
pub struct FetchResult<T> {
    pub name: String,
    pub data: Option<T>,
    pub error: Option<FetchError>,
    pub elapsed: Duration,
    pub hash: Option<String>,
    pub raw: Option<Vec<u8>>,
}

/// Fetch, hash and decode a single endpoint.
///
/// `elapsed` covers the network call only, matching what a user waits for.
pub fn fetch_endpoint<T>(fetcher: &dyn Fetcher, endpoint: &Endpoint<T>) -> FetchResult<T> {
    let start = Instant::now();
    let fetched = fetcher.get(endpoint.url());
    let elapsed = start.elapsed();

    let raw = match fetched {
        Ok(raw) => raw,
        Err(e) => {
            return FetchResult {
                name: endpoint.name().to_string(),
                data: None,
                error: Some(e),
                elapsed,
                hash: None,
                raw: None,
            }
        }
    };

    let hash = content_hash(&raw);
    let (data, error) = match endpoint.decode(&raw) {
        Ok(data) => (Some(data), None),
        Err(e) => (None, Some(FetchError::Decode(format!("{e:#}")))),
    };

    FetchResult {
        name: endpoint.name().to_string(),
        data,
        error,
        elapsed,
        hash: Some(hash),
        raw: Some(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::scripted::ScriptedFetcher;

    fn number(raw: &[u8]) -> anyhow::Result<u32> {
        Ok(std::str::from_utf8(raw)?.trim().parse()?)
    }

    #[test]
    fn success_carries_data_hash_and_raw() {
        let fetcher = ScriptedFetcher::new().body("http://t/n", "42");
        let ep = Endpoint::new("Number", "http://t/n", number);

        let result = fetch_endpoint(&fetcher, &ep);

        assert!(result.error.is_none());
        assert_eq!(result.name, "Number");
        assert_eq!(result.data, Some(42));
        assert_eq!(result.hash.as_deref(), Some(content_hash(b"42").as_str()));
        assert_eq!(result.raw.as_deref(), Some(&b"42"[..]));
    }

    #[test]
    fn transport_error_has_no_hash_or_raw() {
        let fetcher =
            ScriptedFetcher::new().error("http://t/n", FetchError::Network("refused".into()));
        let ep = Endpoint::new("Number", "http://t/n", number);

        let result = fetch_endpoint(&fetcher, &ep);

        assert_eq!(result.error, Some(FetchError::Network("refused".into())));
        assert!(result.data.is_none());
        assert!(result.hash.is_none());
        assert!(result.raw.is_none());
    }

    #[test]
    fn decode_error_keeps_hash_and_raw() {
        let fetcher = ScriptedFetcher::new().body("http://t/n", "not a number");
        let ep = Endpoint::new("Number", "http://t/n", number);

        let result = fetch_endpoint(&fetcher, &ep);

        assert!(matches!(result.error, Some(FetchError::Decode(_))));
        assert!(result.data.is_none());
        assert!(!result.hash.as_deref().unwrap_or_default().is_empty());
        assert_eq!(result.raw.as_deref(), Some(&b"not a number"[..]));
    }

    #[test]
    fn elapsed_includes_the_network_wait() {
        let fetcher = ScriptedFetcher::new()
            .with_delay(Duration::from_millis(20))
            .body("http://t/n", "1");
        let ep = Endpoint::new("Number", "http://t/n", number);

        let result = fetch_endpoint(&fetcher, &ep);
        assert!(result.elapsed >= Duration::from_millis(20));
    }
}
