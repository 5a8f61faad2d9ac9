use std::fmt;
use std::sync::Arc;

/// Decoder shared between clones of an [`Endpoint`].
pub type Decode<T> = Arc<dyn Fn(&[u8]) -> anyhow::Result<T> + Send + Sync>;

/// One logical remote data source.
///
/// `name` is the stable key used for change detection; `url` may differ
/// between calls for the same name (e.g. another season), which is what
/// [`with_url`](Endpoint::with_url) is for.
pub struct Endpoint<T> {
    name: String,
    url: String,
    decode: Decode<T>,
}

impl<T> Endpoint<T> {
    pub fn new<F>(name: impl Into<String>, url: impl Into<String>, decode: F) -> Self
    where
        F: Fn(&[u8]) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            url: url.into(),
            decode: Arc::new(decode),
        }
    }

    /// Same name and decoder, different URL.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            url: url.into(),
            decode: Arc::clone(&self.decode),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn decode(&self, raw: &[u8]) -> anyhow::Result<T> {
        (self.decode)(raw)
    }
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        self.with_url(self.url.clone())
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(raw: &[u8]) -> anyhow::Result<String> {
        Ok(std::str::from_utf8(raw)?.to_string())
    }

    #[test]
    fn with_url_keeps_name_and_decoder() {
        let ep = Endpoint::new("Schedule", "http://a/2024.json", utf8);
        let other = ep.with_url("http://a/2025.json");

        assert_eq!(other.name(), "Schedule");
        assert_eq!(other.url(), "http://a/2025.json");
        assert_eq!(other.decode(b"hi").unwrap(), "hi");
        assert_eq!(ep.url(), "http://a/2024.json", "original is untouched");
    }

    #[test]
    fn decoder_errors_surface() {
        let ep = Endpoint::new("x", "http://a", utf8);
        assert!(ep.decode(&[0xff, 0xfe]).is_err());
    }
}
