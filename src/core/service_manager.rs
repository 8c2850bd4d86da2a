use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct Error(String);

impl Error {
    pub fn new(s: &str) -> Error {
        Error(s.to_string())
    }

    pub fn from<E: std::error::Error>(e: E) -> Self {
        Self(e.to_string())
    }
}

#[async_trait]
pub trait Service {
    type Context: Clone + Send;
    async fn new(context: Self::Context) -> Self;
    async fn run(self) -> Result<(), Error>;
}

pub struct ServiceManager<C> {
    context: C,
    services: JoinSet<Result<(), Error>>,
}

impl<C> ServiceManager<C>
where
    C: 'static + Clone + Send,
{
    pub fn new(context: C) -> Self {
        Self {
            context,
            services: JoinSet::new(),
        }
    }

    // Services run once; a failed service is logged and ends the manager's wait
    pub fn spawn<T>(&mut self)
    where
        T: Service<Context = C> + Send + 'static,
    {
        let context = self.context.clone();
        self.services.spawn(async move {
            let service = T::new(context).await;
            service.run().await.inspect_err(|e| {
                error!(error = %e, "Service stopped with error");
            })
        });
    }

    // Returns when the first service finishes
    pub async fn wait(&mut self) -> Result<(), Error> {
        match self.services.join_next().await {
            Some(Ok(result)) => result,
            Some(Err(e)) => Err(Error::from(e)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Finishes(bool);

    #[async_trait]
    impl Service for Finishes {
        type Context = bool;

        async fn new(context: bool) -> Self {
            Self(context)
        }

        async fn run(self) -> Result<(), Error> {
            if self.0 {
                Ok(())
            } else {
                Err(Error::new("boom"))
            }
        }
    }

    #[tokio::test]
    async fn test_wait_reports_service_outcome() {
        let mut ok = ServiceManager::new(true);
        ok.spawn::<Finishes>();
        assert!(ok.wait().await.is_ok());

        let mut failing = ServiceManager::new(false);
        failing.spawn::<Finishes>();
        let err = failing.wait().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_wait_without_services() {
        let mut manager = ServiceManager::new(true);
        assert!(manager.wait().await.is_ok());
    }
}
