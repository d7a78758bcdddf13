use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Runnable: Send + Sync + 'static {
    fn run(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_impl(cancel).await })
    }

    async fn run_impl(self: Arc<Self>, cancel: CancellationToken);
}
