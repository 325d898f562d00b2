use async_trait::async_trait;

use crate::{Notifier, NotifyError};

/// Prints the report to stdout instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, report: &str) -> Result<usize, NotifyError> {
        println!("{report}");
        Ok(1)
    }
}
