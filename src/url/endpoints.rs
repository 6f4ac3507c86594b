use crate::config::ArchiveConfig;
use url::Url;

/// Builds index and snapshot URLs against a pair of archive base URLs
#[derive(Debug, Clone)]
pub struct ArchiveEndpoints {
    index: Url,
    snapshot_base: String,
}

impl ArchiveEndpoints {
    /// Creates endpoints from the two base URLs
    ///
    /// # Arguments
    ///
    /// * `index_url` - Base URL of the CDX index service
    /// * `snapshot_url` - Base URL of the replay service
    pub fn new(index_url: &str, snapshot_url: &str) -> Result<Self, url::ParseError> {
        let index = Url::parse(index_url)?;
        // Reject an unparsable snapshot base up front rather than on the first snapshot.
        Url::parse(snapshot_url)?;

        Ok(Self {
            index,
            snapshot_base: snapshot_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates endpoints from the archive section of the configuration
    pub fn from_config(config: &ArchiveConfig) -> Result<Self, url::ParseError> {
        Self::new(&config.index_url, &config.snapshot_url)
    }

    /// Index query listing up to `limit` capture timestamps of `<domain>/robots.txt`
    ///
    /// # Examples
    ///
    /// ```
    /// use wayback_robots::url::ArchiveEndpoints;
    ///
    /// let endpoints = ArchiveEndpoints::new(
    ///     "https://web.archive.org/cdx/search/cdx",
    ///     "http://web.archive.org/web",
    /// ).unwrap();
    /// let url = endpoints.index_url("example.com", 5);
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://web.archive.org/cdx/search/cdx?url=example.com%2Frobots.txt&fl=timestamp&limit=5"
    /// );
    /// ```
    pub fn index_url(&self, domain: &str, limit: u32) -> Url {
        let mut url = self.index.clone();
        url.query_pairs_mut()
            .append_pair("url", &format!("{}/robots.txt", domain))
            .append_pair("fl", "timestamp")
            .append_pair("limit", &limit.to_string());
        url
    }

    /// Replay URL of `http://<domain>/robots.txt` captured at `timestamp`
    ///
    /// The timestamp is opaque and inserted verbatim.
    pub fn snapshot_url(&self, timestamp: &str, domain: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/{}/http://{}/robots.txt",
            self.snapshot_base, timestamp, domain
        ))
    }
}
