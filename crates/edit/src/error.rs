//! Save error types.

use curator_actions::ActionError;
use curator_client::ClientError;
use thiserror::Error;

/// A per-entity save failure.
///
/// Caught at the coordinator, per entity: the failed entity's transaction
/// handle is discarded and its action stack kept, and the batch continues
/// with the next entity.
#[derive(Debug, Error)]
pub enum SaveError {
	/// Transaction open or finalize failed.
	#[error(transparent)]
	Client(#[from] ClientError),

	/// Replaying the entity's recorded writes failed.
	#[error(transparent)]
	Replay(#[from] ActionError),
}
