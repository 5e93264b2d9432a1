//! xray-lens
//!
//! Turns a photo of an everyday object into an "X-ray" description of its
//! internal components.
//!
//! ## Pipeline
//!
//! 1. The [`ClassifierGateway`](gateway::ClassifierGateway) sends the image to a
//!    classification backend and returns ranked predictions. The backend is
//!    loaded lazily and exactly once, even under concurrent callers.
//! 2. The [`Resolver`](resolver::Resolver) maps those predictions onto the
//!    static [`catalog`], or synthesizes a record for unknown objects.
//!
//! The [`Prober`](probe::Prober) checks the backend independently, e.g. from a
//! settings screen.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xray_lens::{EndpointSettings, XrayConfig, XrayService};
//! use xray_lens::types::ImageInput;
//!
//! let config = XrayConfig::from_env()?;
//! let settings = EndpointSettings::new(&config.endpoint)?;
//! let service = XrayService::from_config(&config, settings);
//! match service.identify(&ImageInput::from_uri("file:///tmp/photo.jpg")).await {
//!     Some(record) => println!("{}", record.name),
//!     None => println!("Object not identified, try again."),
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod probe;
pub mod resolver;
pub mod service;
pub mod settings;

pub use xray_lens_types as types;

pub use config::XrayConfig;
pub use error::{ConfigError, ConfigResult, GatewayError, GatewayResult};
pub use gateway::{ClassifierBackend, ClassifierGateway, RemoteBackend};
pub use probe::{ProbeOutcome, Prober, UnreachableReason};
pub use resolver::Resolver;
pub use service::XrayService;
pub use settings::{EndpointSettings, normalize_endpoint};
