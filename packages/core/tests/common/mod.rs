//! Local axum server standing in for the classification backend.
#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use xray_lens::{EndpointSettings, XrayConfig, XrayService};

#[derive(Clone)]
pub enum Behavior {
    Json(serde_json::Value),
    Status(StatusCode, String),
    Slow(Duration),
}

impl Behavior {
    pub fn predictions(items: &[(&str, f32)]) -> Self {
        let predictions: Vec<_> = items
            .iter()
            .map(|(label, p)| serde_json::json!({ "className": label, "probability": p }))
            .collect();
        Behavior::Json(serde_json::json!({ "predictions": predictions }))
    }

    pub fn online() -> Self {
        Behavior::Json(serde_json::json!({
            "status": "online",
            "message": "Object Recognition API is running"
        }))
    }

    async fn respond(&self) -> Response {
        match self {
            Behavior::Json(value) => Json(value.clone()).into_response(),
            Behavior::Status(code, body) => (*code, body.clone()).into_response(),
            Behavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Json(serde_json::json!({ "predictions": [] })).into_response()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

struct ServerState {
    predict: Behavior,
    root: Behavior,
    uploads: Mutex<Vec<ReceivedUpload>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    state: Arc<ServerState>,
}

impl MockServer {
    pub async fn start(predict: Behavior, root: Behavior) -> Self {
        let state = Arc::new(ServerState {
            predict,
            root,
            uploads: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/", get(root_handler))
            .route("/predict", post(predict_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub async fn predicting(predict: Behavior) -> Self {
        Self::start(predict, Behavior::online()).await
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/predict", self.addr)
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }
}

async fn root_handler(State(state): State<Arc<ServerState>>) -> Response {
    state.root.respond().await
}

async fn predict_handler(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let upload = ReceivedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            len: 0,
        };
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state
            .uploads
            .lock()
            .unwrap()
            .push(ReceivedUpload { len, ..upload });
    }
    state.predict.respond().await
}

/// An endpoint nothing listens on
pub async fn closed_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/predict", addr)
}

pub fn service_for(endpoint: &str, request_timeout: Duration) -> XrayService {
    let config = XrayConfig {
        request_timeout_ms: request_timeout.as_millis() as u64,
        ..XrayConfig::default()
    };
    XrayService::from_config(&config, EndpointSettings::new(endpoint).unwrap())
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([220, 20, 60]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
