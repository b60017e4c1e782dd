use url::Url;

/// Just a wrapper around a URL and credentials
#[derive(Clone, Debug)]
pub struct Resource {
    url: Url,
    api_key: Option<String>,
}

impl Resource {
    pub fn new(url: Url, api_key: Option<String>) -> Self {
        Self { url, api_key }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn api_key(&self) -> Option<&str> { self.api_key.as_deref() }

    /// Build a new Resource by keeping the same credentials, scheme and server from `base` but appending a path segment
    pub fn join(&self, segment: &str) -> Resource {
        let mut built = (*self).clone();
        if let Ok(mut segments) = built.url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        built
    }

    /// Attach the credentials (if any) to a request
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            None => request,
            Some(key) => request.bearer_auth(key),
        }
    }
}
