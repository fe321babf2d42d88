//! Slash-separated path normalization.
//!
//! A path like `"/info/images/"` and a field like `"hero"` normalize to the
//! segment sequence `["info", "images", "hero"]`. Normalized string forms are
//! also used as identity keys when comparing recorded actions, so every path
//! that enters the engine goes through [`normalize`] or [`join`] first.

const SEPARATOR: char = '/';

/// Normalizes a path: strips leading/trailing separators and collapses empty
/// segments left behind by doubled separators.
pub fn normalize(path: &str) -> String {
	path.split(SEPARATOR)
		.filter(|segment| !segment.is_empty())
		.collect::<Vec<_>>()
		.join("/")
}

/// Joins a base path and a field name into one normalized path.
///
/// Either part may be empty; `join("/", "title")` yields `"title"`.
pub fn join(base: &str, field: &str) -> String {
	let base = normalize(base);
	let field = normalize(field);
	match (base.is_empty(), field.is_empty()) {
		(true, _) => field,
		(_, true) => base,
		_ => format!("{base}/{field}"),
	}
}

/// Splits a normalized path into its segments.
///
/// An empty path (the document root) yields no segments.
pub fn segments(path: &str) -> Vec<String> {
	path.split(SEPARATOR)
		.filter(|segment| !segment.is_empty())
		.map(str::to_owned)
		.collect()
}

/// Returns `true` if `path` equals `base` or addresses a location inside it.
///
/// Both arguments are normalized before comparison, so `"/a/b"` falls under
/// `"a"` but not under `"a/bc"`.
pub fn starts_with(path: &str, base: &str) -> bool {
	let path = normalize(path);
	let base = normalize(base);
	if base.is_empty() {
		return true;
	}
	match path.strip_prefix(&base) {
		Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
		None => false,
	}
}

/// Returns the segments of `path` below `base`, or `None` if `path` does not
/// fall under `base`.
pub fn strip_base(path: &str, base: &str) -> Option<Vec<String>> {
	if !starts_with(path, base) {
		return None;
	}
	let path = segments(path);
	let base_len = segments(base).len();
	Some(path[base_len..].to_vec())
}
