//! Get/set/remove over nested [`serde_json::Value`] documents.
//!
//! Lookups return `None` when any intermediate segment is absent; assignment
//! creates intermediate mappings as needed. Paths only resolve against
//! existing structure except for the final leaf, so sequences are indexed
//! when they already exist but are never created implicitly.

use serde_json::Value;

/// Resolves `segments` against `doc`, returning the addressed value.
///
/// Sequence elements are addressed by decimal-index segments. Returns `None`
/// if any segment is absent or addresses into a scalar.
pub fn get<'a>(doc: &'a Value, segments: &[String]) -> Option<&'a Value> {
	let mut current = doc;
	for segment in segments {
		current = match current {
			Value::Object(map) => map.get(segment)?,
			Value::Array(list) => list.get(segment.parse::<usize>().ok()?)?,
			_ => return None,
		};
	}
	Some(current)
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(doc: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
	let mut current = doc;
	for segment in segments {
		current = match current {
			Value::Object(map) => map.get_mut(segment)?,
			Value::Array(list) => list.get_mut(segment.parse::<usize>().ok()?)?,
			_ => return None,
		};
	}
	Some(current)
}

/// Assigns `value` at `segments`, creating intermediate mappings as needed.
///
/// An existing sequence on the way down is indexed in place; anything else
/// that is not a mapping is replaced by one so the leaf can be created. With
/// no segments the whole document is replaced.
pub fn set(doc: &mut Value, segments: &[String], value: Value) {
	let Some((leaf, intermediate)) = segments.split_last() else {
		*doc = value;
		return;
	};

	let mut current = doc;
	for segment in intermediate {
		current = match current {
			Value::Array(list) => {
				match segment.parse::<usize>().ok().filter(|&i| i < list.len()) {
					Some(index) => &mut list[index],
					None => return,
				}
			}
			other => {
				if !other.is_object() {
					*other = Value::Object(Default::default());
				}
				match other {
					Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
					_ => unreachable!("just replaced with an object"),
				}
			}
		};
	}

	match current {
		Value::Array(list) => {
			if let Some(index) = leaf.parse::<usize>().ok().filter(|&i| i < list.len()) {
				list[index] = value;
			}
		}
		other => {
			if !other.is_object() {
				*other = Value::Object(Default::default());
			}
			if let Value::Object(map) = other {
				map.insert(leaf.clone(), value);
			}
		}
	}
}

/// Removes the leaf addressed by `segments`, returning the removed value.
///
/// Restores "absent": a subsequent [`get`] on the same path yields `None`.
/// Removing a sequence element shifts later elements down. Returns `None` if
/// the path does not resolve.
pub fn remove(doc: &mut Value, segments: &[String]) -> Option<Value> {
	let (leaf, intermediate) = segments.split_last()?;
	let parent = get_mut(doc, intermediate)?;
	match parent {
		Value::Object(map) => map.remove(leaf),
		Value::Array(list) => {
			let index = leaf.parse::<usize>().ok().filter(|&i| i < list.len())?;
			Some(list.remove(index))
		}
		_ => None,
	}
}
