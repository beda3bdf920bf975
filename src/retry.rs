use crate::arguments::Arguments;
use crate::marker::{AsyncNext, CallResult, Marker, MethodMarker};
use crate::protocol::Protocol;
use futures::future::BoxFuture;

/// Method marker re-invoking the bound call after transport errors.
///
/// `attempts` counts the first call. Argument, binding and decoding errors
/// are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    attempts: u32,
}

impl Retry {
    pub fn attempts(attempts: u32) -> Self {
        Self { attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.attempts
    }
}

impl<P: Protocol> MethodMarker<P> for Retry {
    fn around_blocking(
        &self,
        arguments: Arguments,
        next: &dyn Fn(Arguments) -> CallResult,
    ) -> CallResult {
        let mut attempt = 1;
        loop {
            match next(arguments.clone()) {
                Err(error) if error.is_transport() && attempt < self.attempts => {
                    tracing::warn!("Attempt {} of {} failed: {}", attempt, self.attempts, error);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn around_async(&self, arguments: Arguments, next: AsyncNext) -> BoxFuture<'static, CallResult> {
        let attempts = self.attempts;
        Box::pin(async move {
            let mut attempt = 1;
            loop {
                match next(arguments.clone()).await {
                    Err(error) if error.is_transport() && attempt < attempts => {
                        tracing::warn!("Attempt {} of {} failed: {}", attempt, attempts, error);
                        attempt += 1;
                    }
                    result => return result,
                }
            }
        })
    }

    fn check(&self, _parameters: &[&str]) -> Result<(), String> {
        if self.attempts == 0 {
            return Err("retry needs at least one attempt".to_owned());
        }
        Ok(())
    }
}

impl<P: Protocol> From<Retry> for Marker<P> {
    fn from(retry: Retry) -> Self {
        Marker::method(retry)
    }
}
