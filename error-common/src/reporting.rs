// Error reporting utilities
// This module provides error reporting and monitoring integration

use crate::types::RustCareError;

pub struct ErrorReporter {
    // Implementation for error reporting
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {}
    }
    
    pub async fn report_error(&self, error: &RustCareError) -> Result<(), Box<dyn std::error::Error>> {
        // TODO: Implement error reporting to external systems
        tracing::error!(
            error = %error,
            "Error reported"
        );
        Ok(())
    }
}