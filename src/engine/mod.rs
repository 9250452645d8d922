//! Traits for the external model loader and inference engine.
//!
//! The session never looks inside a model; it loads one through
//! [`ModelLoader`], hands prompts and an options snapshot to [`TextModel`],
//! and drops the handle to release it.

use std::path::Path;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChatError;
use crate::types::PredictOptions;

/// Streaming prediction: an ordered sequence of text fragments.
pub type PredictStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// A loaded model that can serve prediction requests.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Produce the whole completion for `prompt` at once.
    async fn predict(
        &self,
        prompt: &str,
        options: &PredictOptions,
    ) -> Result<String, ChatError>;

    /// Produce the completion as a stream of fragments.
    ///
    /// The default delivers the whole completion as a single fragment, so
    /// engines without native streaming still work in streaming sessions.
    async fn predict_stream(
        &self,
        prompt: &str,
        options: &PredictOptions,
    ) -> Result<PredictStream, ChatError> {
        let text = self.predict(prompt, options).await?;
        let s = async_stream::stream! {
            yield Ok::<String, ChatError>(text);
        };
        Ok(Box::pin(s))
    }

    /// One-line self-description shown after a successful load.
    fn describe(&self) -> String {
        String::new()
    }
}

/// Loads models from filesystem paths.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load the model at `path`. Dropping the returned handle releases the
    /// model.
    async fn load(&self, path: &Path) -> Result<Box<dyn TextModel>, ChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    struct WholeOnly;

    #[async_trait]
    impl TextModel for WholeOnly {
        async fn predict(
            &self,
            prompt: &str,
            _options: &PredictOptions,
        ) -> Result<String, ChatError> {
            Ok(format!("echo:{prompt}"))
        }
    }

    #[test]
    fn default_stream_yields_the_whole_completion() {
        tokio_test::block_on(async {
            let model = WholeOnly;
            let options = PredictOptions::default();
            let mut stream = model.predict_stream("hi", &options).await.unwrap();
            assert_eq!(stream.next().await.unwrap().unwrap(), "echo:hi");
            assert!(stream.next().await.is_none());
        });
    }
}
