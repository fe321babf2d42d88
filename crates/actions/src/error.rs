//! Engine error types.

use curator_client::ClientError;
use thiserror::Error;

/// Errors raised by store mutation entry points.
///
/// Range violations are contract errors: the caller passed an index that
/// does not address an element, the operation aborts, and neither the
/// document nor the stacks change. Client errors bubble up from link
/// resolution and save replay.
#[derive(Debug, Error)]
pub enum ActionError {
	/// A list operation addressed an element outside the list.
	#[error("list index {index} out of range for list of length {len}")]
	IndexOutOfRange {
		/// The offending index.
		index: usize,
		/// Length of the list at the time of the operation.
		len: usize,
	},

	/// A list operation that requires an index was called without one.
	#[error("missing index for {operation}")]
	MissingIndex {
		/// The operation that needed the index.
		operation: &'static str,
	},

	/// A remote call failed during link resolution or save replay.
	#[error(transparent)]
	Client(#[from] ClientError),
}
