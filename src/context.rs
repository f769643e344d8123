//! Per-invocation context handed to every tool handler.

use std::fmt;
use std::sync::Arc;

use crate::credential::TokenCredential;
use crate::types::{ArmConfig, RequestId};

/// Carries the shared credential into one tool call. Lives only as long as
/// that call.
#[derive(Clone)]
pub struct InvocationContext {
    credential: Arc<dyn TokenCredential>,
    arm: Arc<ArmConfig>,
    request_id: RequestId,
}

impl InvocationContext {
    pub fn new(credential: Arc<dyn TokenCredential>, arm: Arc<ArmConfig>) -> Self {
        Self {
            credential,
            arm,
            request_id: RequestId::new(),
        }
    }

    pub fn credential(&self) -> &Arc<dyn TokenCredential> {
        &self.credential
    }

    pub fn arm(&self) -> &ArmConfig {
        &self.arm
    }

    /// Sent to ARM as `x-ms-client-request-id` for correlation.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("endpoint", &self.arm.endpoint)
            .field("request_id", &self.request_id)
            .finish()
    }
}
