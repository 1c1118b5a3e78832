use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by the async ports (engine activation, discard prompts).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
