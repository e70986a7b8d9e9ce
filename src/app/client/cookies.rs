//! Browser cookie jar import
//!
//! The catalog only serves file headers and bodies to a logged-in session.
//! Logging in is left to the operator, who exports the session cookies from a
//! browser as a Netscape `cookies.txt` file. This module loads that file into
//! a `reqwest` cookie jar.
//!
//! Each data line holds seven tab-separated fields:
//!
//! ```text
//! domain  include_subdomains  path  secure  expiry  name  value
//! ```
//!
//! Lines starting with `#HttpOnly_` are cookies with the HttpOnly prefix on
//! the domain; any other `#` line is a comment.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::cookie::Jar;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::CookieError;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// One cookie entry from a `cookies.txt` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetscapeCookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix timestamp, 0 for a session cookie
    pub expires: u64,
    pub name: String,
    pub value: String,
    pub http_only: bool,
}

impl NetscapeCookie {
    /// Parse a single line; comments, blank and malformed lines give `None`
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None => (line, false),
        };

        if line.trim().is_empty() || line.starts_with('#') {
            return None;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 7 {
            debug!("Skipping malformed cookie line with {} fields", fields.len());
            return None;
        }

        Some(Self {
            domain: fields[0].to_string(),
            include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
            path: fields[2].to_string(),
            secure: fields[3].eq_ignore_ascii_case("TRUE"),
            expires: fields[4].parse().unwrap_or(0),
            name: fields[5].to_string(),
            value: fields[6..].join("\t"),
            http_only,
        })
    }

    /// Whether the cookie expired before `now` (Unix seconds)
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires != 0 && self.expires < now
    }

    /// Host name without the leading dot used for domain cookies
    fn host(&self) -> &str {
        self.domain.trim_start_matches('.')
    }

    /// URL the cookie is registered against
    pub fn origin_url(&self) -> Option<Url> {
        let scheme = if self.secure { "https" } else { "http" };
        let path = if self.path.starts_with('/') {
            self.path.as_str()
        } else {
            "/"
        };
        Url::parse(&format!("{}://{}{}", scheme, self.host(), path)).ok()
    }

    /// `Set-Cookie` style representation accepted by [`Jar::add_cookie_str`]
    pub fn to_set_cookie(&self) -> String {
        let mut cookie = format!("{}={}; Path={}", self.name, self.value, self.path);
        if self.include_subdomains {
            cookie.push_str(&format!("; Domain={}", self.host()));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie
    }
}

/// Parse every usable, unexpired cookie in a `cookies.txt` body
pub fn parse_cookie_file(content: &str, now: u64) -> Vec<NetscapeCookie> {
    content
        .lines()
        .filter_map(NetscapeCookie::parse_line)
        .filter(|cookie| {
            let expired = cookie.is_expired(now);
            if expired {
                debug!("Skipping expired cookie {} for {}", cookie.name, cookie.domain);
            }
            !expired
        })
        .collect()
}

/// Load a cookie jar from disk
///
/// A missing file is not an error: the run continues without a session and
/// the catalog's responses decide what happens next.
///
/// # Errors
///
/// Returns `CookieError::Io` if the file exists but cannot be read
pub fn load_cookie_jar(path: &Path) -> Result<Arc<Jar>, CookieError> {
    let jar = Jar::default();

    if !path.exists() {
        warn!(
            "Cookie file {} not found; continuing without an authenticated session",
            path.display()
        );
        return Ok(Arc::new(jar));
    }

    let content = std::fs::read_to_string(path).map_err(|source| CookieError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);

    let mut loaded = 0;
    for cookie in parse_cookie_file(&content, now) {
        match cookie.origin_url() {
            Some(url) => {
                jar.add_cookie_str(&cookie.to_set_cookie(), &url);
                loaded += 1;
            }
            None => debug!("Skipping cookie {} with unusable domain", cookie.name),
        }
    }

    info!("Loaded {} cookies from {}", loaded, path.display());
    Ok(Arc::new(jar))
}
