//! A structurally validated URI reference.

use crate::encode::{self, Component};
use crate::error::{UriError, UriResult};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// RFC 3986 appendix B.
pub(crate) static URI_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:([^:/?#]+):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
		.expect("URI reference regex is valid")
});

/// A parsed URI reference.
///
/// Components are stored in their encoded form. A `Uri` can only be
/// obtained through [`Uri::parse`] or a builder, so every component holds
/// only characters legal for it or well-formed `%XX` octets.
///
/// # Examples
///
/// ```
/// use waypoint_uri::Uri;
///
/// let uri = Uri::parse("https://alice@example.com:8443/a/b?x=1#top").unwrap();
/// assert_eq!(uri.scheme(), Some("https"));
/// assert_eq!(uri.user_info(), Some("alice"));
/// assert_eq!(uri.host(), Some("example.com"));
/// assert_eq!(uri.port(), Some(8443));
/// assert_eq!(uri.path(), "/a/b");
/// assert_eq!(uri.query(), Some("x=1"));
/// assert_eq!(uri.fragment(), Some("top"));
/// assert_eq!(uri.to_string(), "https://alice@example.com:8443/a/b?x=1#top");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
	scheme: Option<String>,
	user_info: Option<String>,
	host: Option<String>,
	port: Option<u16>,
	has_authority: bool,
	path: String,
	query: Option<String>,
	fragment: Option<String>,
}

impl Uri {
	/// Parses and validates a URI reference.
	///
	/// # Errors
	///
	/// Returns [`UriError::MalformedUri`] when a component holds characters
	/// that are not legal for it, or when the scheme or port is malformed.
	pub fn parse(input: &str) -> UriResult<Self> {
		let captures = URI_REFERENCE
			.captures(input)
			.ok_or_else(|| UriError::malformed(input, "not a URI reference"))?;
		let part = |index: usize| captures.get(index).map(|m| m.as_str());

		let scheme = part(1);
		let authority = part(2);
		let path = part(3).unwrap_or_default();
		let query = part(4);
		let fragment = part(5);

		if let Some(scheme) = scheme {
			let mut chars = scheme.chars();
			let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
				&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
			if !valid {
				return Err(UriError::malformed(input, format!("invalid scheme '{}'", scheme)));
			}
		}

		let (user_info, host, port) = match authority {
			Some(authority) => Self::parse_authority(input, authority)?,
			None => (None, None, None),
		};

		Self::check(input, Component::Path, path)?;
		if let Some(query) = query {
			Self::check(input, Component::Query, query)?;
		}
		if let Some(fragment) = fragment {
			Self::check(input, Component::Fragment, fragment)?;
		}

		Ok(Self {
			scheme: scheme.map(str::to_string),
			user_info: user_info.map(str::to_string),
			host: host.map(str::to_string),
			port,
			has_authority: authority.is_some(),
			path: path.to_string(),
			query: query.map(str::to_string),
			fragment: fragment.map(str::to_string),
		})
	}

	fn parse_authority<'a>(
		input: &str,
		authority: &'a str,
	) -> UriResult<(Option<&'a str>, Option<&'a str>, Option<u16>)> {
		let (user_info, host_port) = match authority.rsplit_once('@') {
			Some((user_info, rest)) => (Some(user_info), rest),
			None => (None, authority),
		};

		// An IP literal may itself contain ':'
		let port_sep = match host_port.rfind(']') {
			Some(end) => host_port[end..].find(':').map(|i| end + i),
			None => host_port.rfind(':'),
		};
		let (host, port) = match port_sep {
			Some(index) => (&host_port[..index], Some(&host_port[index + 1..])),
			None => (host_port, None),
		};

		if let Some(user_info) = user_info {
			Self::check(input, Component::UserInfo, user_info)?;
		}
		Self::check(input, Component::Host, host)?;

		let port = match port {
			None | Some("") => None,
			Some(digits) => Some(
				digits
					.parse::<u16>()
					.map_err(|_| UriError::malformed(input, format!("invalid port '{}'", digits)))?,
			),
		};

		Ok((user_info, Some(host), port))
	}

	fn check(input: &str, component: Component, value: &str) -> UriResult<()> {
		if encode::is_legal(component, value) {
			Ok(())
		} else {
			Err(UriError::malformed(
				input,
				format!("illegal characters in {} '{}'", component, value),
			))
		}
	}

	pub fn scheme(&self) -> Option<&str> {
		self.scheme.as_deref()
	}

	pub fn user_info(&self) -> Option<&str> {
		self.user_info.as_deref()
	}

	pub fn host(&self) -> Option<&str> {
		self.host.as_deref()
	}

	pub fn port(&self) -> Option<u16> {
		self.port
	}

	/// The authority, `[user-info@]host[:port]`, if the URI has one.
	pub fn authority(&self) -> Option<String> {
		if !self.has_authority {
			return None;
		}
		let mut out = String::new();
		if let Some(user_info) = &self.user_info {
			out.push_str(user_info);
			out.push('@');
		}
		if let Some(host) = &self.host {
			out.push_str(host);
		}
		if let Some(port) = self.port {
			out.push(':');
			out.push_str(&port.to_string());
		}
		Some(out)
	}

	/// The encoded path, possibly empty.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The path segments, with matrix parameters still attached.
	pub fn path_segments(&self) -> impl Iterator<Item = &str> {
		self.path.strip_prefix('/').unwrap_or(&self.path).split('/')
	}

	pub fn query(&self) -> Option<&str> {
		self.query.as_deref()
	}

	pub fn fragment(&self) -> Option<&str> {
		self.fragment.as_deref()
	}

	/// Whether the URI has a scheme.
	pub fn is_absolute(&self) -> bool {
		self.scheme.is_some()
	}

	/// The path and query as they appear in a request line.
	pub fn path_and_query(&self) -> String {
		match &self.query {
			Some(query) => format!("{}?{}", self.path, query),
			None => self.path.clone(),
		}
	}
}

impl fmt::Display for Uri {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(scheme) = &self.scheme {
			write!(f, "{}:", scheme)?;
		}
		if let Some(authority) = self.authority() {
			write!(f, "//{}", authority)?;
		}
		f.write_str(&self.path)?;
		if let Some(query) = &self.query {
			write!(f, "?{}", query)?;
		}
		if let Some(fragment) = &self.fragment {
			write!(f, "#{}", fragment)?;
		}
		Ok(())
	}
}

impl FromStr for Uri {
	type Err = UriError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
