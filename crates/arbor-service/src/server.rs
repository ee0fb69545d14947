//! HTTP server implementation.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use arbor_bridge::{BridgeError, GenerationContext};
use arbor_engine::GenerationEngine;
use glam::Affine3A;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::info;

use crate::dto::{
    AttrInfoDto, ErrorResponse, GenerateRequest, HealthResponse, RuleDto, RuleInfoResponse,
    ShapeDataDto, ShapeResultDto, apply_attribute_overrides,
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to bind to {address}: {error}")]
    BindError { address: String, error: String },
}

/// HTTP server for the generation API.
/// Runs on a background thread so the owning process stays responsive.
pub struct BridgeServer {
    address: String,
    port: u16,
    actual_port: Option<u16>,
    handle: Option<JoinHandle<()>>,
}

impl BridgeServer {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            actual_port: None,
            handle: None,
        }
    }

    pub fn start<E: GenerationEngine + 'static>(
        &mut self,
        context: Arc<Mutex<GenerationContext<E>>>,
    ) -> Result<(), ServiceError> {
        let address = format!("{}:{}", self.address, self.port);
        let server = Server::http(&address).map_err(|e| ServiceError::BindError {
            address: address.clone(),
            error: e.to_string(),
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);
        info!(address = %address, port = actual_port, "generation service listening");

        let handle = thread::spawn(move || {
            Self::run_server(server, context);
        });

        self.handle = Some(handle);
        Ok(())
    }

    pub fn stop(&mut self) {
        // tiny_http doesn't support graceful shutdown, so we just detach the
        // thread. It terminates when the server is dropped or the process ends.
        if let Some(handle) = self.handle.take() {
            // Don't wait for the thread to join as it may be blocked in incoming_requests()
            std::mem::forget(handle);
        }
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    fn run_server<E: GenerationEngine>(server: Server, context: Arc<Mutex<GenerationContext<E>>>) {
        let started = Instant::now();
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, &context, started) {
                tracing::error!("request handling failed: {e}");
            }
        }
    }

    fn handle_request<E: GenerationEngine>(
        mut request: Request,
        context: &Arc<Mutex<GenerationContext<E>>>,
        started: Instant,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = match (request.method(), request.url()) {
            (&Method::Get, "/health") => {
                let response = HealthResponse {
                    status: "ok".to_string(),
                    uptime_seconds: started.elapsed().as_secs_f64(),
                };
                json_response(&response)?
            }
            (&Method::Get, "/rules") => {
                let mut ctx = context.lock().unwrap();
                let rules: Vec<RuleDto> = ctx
                    .start_rules()
                    .iter()
                    .map(|name| RuleDto {
                        name: name.clone(),
                        parameters: Vec::new(),
                    })
                    .collect();
                let attributes: Vec<AttrInfoDto> = ctx
                    .attributes()
                    .iter()
                    .map(|attr| AttrInfoDto {
                        name: attr.name.clone(),
                        return_type: attr.kind().as_str().to_string(),
                    })
                    .collect();
                json_response(&RuleInfoResponse { rules, attributes })?
            }
            (&Method::Post, "/generate") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                let generate: GenerateRequest = serde_json::from_str(&body)?;

                let mut ctx = context.lock().unwrap();
                if let Some(overrides) = &generate.attributes
                    && let Some(attrs) = ctx.attributes_mut()
                {
                    apply_attribute_overrides(attrs, overrides);
                }

                match ctx.generate(&generate.vertices, &generate.indices, &Affine3A::IDENTITY) {
                    Ok(result) => {
                        let shape = ShapeResultDto {
                            uids: vec![generate.uid.unwrap_or_else(|| "shape0".to_string())],
                            data: ShapeDataDto::from(result),
                        };
                        json_response(&vec![shape])?
                    }
                    Err(error) => error_response(&error)?,
                }
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response)?;
        Ok(())
    }
}

fn json_response<T: Serialize>(
    body: &T,
) -> Result<Response<std::io::Cursor<Vec<u8>>>, serde_json::Error> {
    let json = serde_json::to_string(body)?;
    Ok(Response::from_string(json).with_header(
        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
    ))
}

fn error_response(
    error: &BridgeError,
) -> Result<Response<std::io::Cursor<Vec<u8>>>, serde_json::Error> {
    let body = ErrorResponse {
        error: error.to_string(),
    };
    Ok(json_response(&body)?.with_status_code(422))
}

impl Drop for BridgeServer {
    fn drop(&mut self) {
        self.stop();
    }
}
