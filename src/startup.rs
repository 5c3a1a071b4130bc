use crate::errors::Result;
use futures::future::{FutureExt, LocalBoxFuture};
use std::future::Future;
use tracing::{debug, info};

type Step<'a, C> = Box<dyn FnOnce(&'a C) -> LocalBoxFuture<'a, Result<()>> + 'a>;

/// Initialization steps run once, in the order they were added.
pub struct Startup<'a, C> {
    steps: Vec<(&'static str, Step<'a, C>)>,
}

impl<'a, C> Default for Startup<'a, C> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<'a, C> Startup<'a, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F, Fut>(mut self, name: &'static str, step: F) -> Self
    where
        F: FnOnce(&'a C) -> Fut + 'a,
        Fut: Future<Output = Result<()>> + 'a,
    {
        self.steps
            .push((name, Box::new(move |ctx: &'a C| step(ctx).boxed_local())));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step against `ctx`; stops at the first error.
    pub async fn run(self, ctx: &'a C) -> Result<()> {
        let total = self.steps.len();
        for (name, step) in self.steps {
            debug!(step = name, "startup");
            step(ctx).await?;
        }
        info!(steps = total, "startup complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use std::sync::Mutex;

    type Log = Mutex<Vec<&'static str>>;

    #[tokio::test]
    async fn steps_run_once_in_order() {
        let log: Log = Mutex::new(Vec::new());
        let startup = Startup::<Log>::new()
            .add("first", |log| async move {
                log.lock().unwrap().push("first");
                Ok(())
            })
            .add("second", |log| async move {
                log.lock().unwrap().push("second");
                Ok(())
            });
        assert_eq!(startup.len(), 2);

        startup.run(&log).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn failing_step_stops_the_sequence() {
        let log: Log = Mutex::new(Vec::new());
        let result = Startup::<Log>::new()
            .add("fails", |_| async { Err(ClientError::config("nope")) })
            .add("never", |log| async move {
                log.lock().unwrap().push("never");
                Ok(())
            })
            .run(&log)
            .await;

        assert!(matches!(result, Err(ClientError::Config(_))));
        assert!(log.lock().unwrap().is_empty());
    }
}
