//! Cookie records.
//!
//! These are plain data records; turning them into `Cookie` and
//! `Set-Cookie` header values is left to the HTTP layer.

use serde::{Deserialize, Serialize};

/// Cookie specification version used when none is given.
pub const DEFAULT_VERSION: u32 = 1;

/// A cookie sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cookie {
	pub name: String,
	pub value: String,
	pub path: Option<String>,
	pub domain: Option<String>,
	pub version: u32,
}

impl Cookie {
	/// Creates a cookie without path or domain, using [`DEFAULT_VERSION`].
	///
	/// # Examples
	///
	/// ```
	/// use waypoint_http::Cookie;
	///
	/// let cookie = Cookie::new("session", "abc123").with_path("/app");
	/// assert_eq!(cookie.name, "session");
	/// assert_eq!(cookie.path.as_deref(), Some("/app"));
	/// assert_eq!(cookie.version, 1);
	/// ```
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			path: None,
			domain: None,
			version: DEFAULT_VERSION,
		}
	}

	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	pub fn with_version(mut self, version: u32) -> Self {
		self.version = version;
		self
	}
}

/// A cookie a server asks the client to store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewCookie {
	#[serde(flatten)]
	pub cookie: Cookie,
	pub comment: Option<String>,
	/// Lifetime in seconds. Negative means the cookie lives until the
	/// client session ends, zero asks the client to delete it.
	pub max_age: i32,
	pub secure: bool,
}

impl NewCookie {
	/// Max-age of a session-scoped cookie.
	pub const DEFAULT_MAX_AGE: i32 = -1;

	/// Creates a session-scoped, non-secure cookie.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self::from_cookie(Cookie::new(name, value))
	}

	/// Wraps an existing cookie with default settings.
	pub fn from_cookie(cookie: Cookie) -> Self {
		Self {
			cookie,
			comment: None,
			max_age: Self::DEFAULT_MAX_AGE,
			secure: false,
		}
	}

	/// Wraps an existing cookie with explicit settings.
	pub fn with_settings(cookie: Cookie, comment: Option<String>, max_age: i32, secure: bool) -> Self {
		Self {
			cookie,
			comment,
			max_age,
			secure,
		}
	}

	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	pub fn with_max_age(mut self, max_age: i32) -> Self {
		self.max_age = max_age;
		self
	}

	pub fn with_secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	pub fn name(&self) -> &str {
		&self.cookie.name
	}

	pub fn value(&self) -> &str {
		&self.cookie.value
	}

	/// Whether the cookie expires with the client session.
	pub fn is_session(&self) -> bool {
		self.max_age < 0
	}

	/// Whether the cookie asks the client to delete it immediately.
	pub fn is_expired(&self) -> bool {
		self.max_age == 0
	}

	/// The cookie without its server-side settings.
	pub fn to_cookie(&self) -> Cookie {
		self.cookie.clone()
	}
}

impl From<Cookie> for NewCookie {
	fn from(cookie: Cookie) -> Self {
		Self::from_cookie(cookie)
	}
}
