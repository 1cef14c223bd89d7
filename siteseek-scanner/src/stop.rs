use tokio_util::sync::CancellationToken;

/// Cloneable stop flag shared between a crawler and whoever may cancel it.
///
/// Once stopped it stays stopped.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`StopSignal::stop`] has been called.
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }
}
