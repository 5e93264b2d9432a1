//! Identification pipeline: classify, then resolve.

use crate::config::XrayConfig;
use crate::error::GatewayResult;
use crate::gateway::{ClassifierBackend, ClassifierGateway, RemoteBackend};
use crate::probe::{ProbeOutcome, Prober};
use crate::resolver::Resolver;
use crate::settings::EndpointSettings;
use xray_lens_types::{CatalogRecord, ImageInput};

pub struct XrayService<B: ClassifierBackend = RemoteBackend> {
    gateway: ClassifierGateway<B>,
    resolver: Resolver,
}

impl XrayService<RemoteBackend> {
    /// Remote-backed service reading its endpoint from `settings`
    pub fn from_config(config: &XrayConfig, settings: EndpointSettings) -> Self {
        let backend = RemoteBackend::new(settings, config.connect_timeout())
            .with_max_upload_edge(config.max_upload_edge());
        Self::new(
            ClassifierGateway::new(backend, config.request_timeout()),
            Resolver::new(config.min_confidence),
        )
    }

    pub fn settings(&self) -> &EndpointSettings {
        self.gateway.backend().settings()
    }

    /// Probe the currently configured endpoint
    pub async fn probe(&self, prober: &Prober) -> ProbeOutcome {
        prober.probe(&self.settings().get()).await
    }
}

impl<B: ClassifierBackend> XrayService<B> {
    pub fn new(gateway: ClassifierGateway<B>, resolver: Resolver) -> Self {
        Self { gateway, resolver }
    }

    pub fn gateway(&self) -> &ClassifierGateway<B> {
        &self.gateway
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Like [`identify`](Self::identify) but keeps gateway failures visible.
    /// `Ok(None)` means the backend recognised nothing.
    pub async fn classify_and_resolve(
        &self,
        image: &ImageInput,
    ) -> GatewayResult<Option<CatalogRecord>> {
        let predictions = self.gateway.classify(image).await?;
        if predictions.is_empty() {
            tracing::warn!(image = %image.describe(), "Backend returned no predictions");
        }
        Ok(self.resolver.resolve(&predictions))
    }

    /// Identify the object in `image`. Never fails: any gateway error is logged
    /// and reported as "no object identified".
    pub async fn identify(&self, image: &ImageInput) -> Option<CatalogRecord> {
        tracing::info!(image = %image.describe(), "Starting object identification");

        match self.classify_and_resolve(image).await {
            Ok(Some(record)) => {
                tracing::info!(
                    id = %record.id,
                    name = %record.name,
                    synthesized = record.is_synthesized(),
                    "Object identified"
                );
                Some(record)
            }
            Ok(None) => {
                tracing::warn!("Could not identify object");
                None
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Object identification failed");
                None
            }
        }
    }
}
