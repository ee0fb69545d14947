//! HTTP projection of the generation bridge.
//!
//! Exposes one generation context as a small JSON API: rule and attribute
//! discovery on `GET /rules`, generation on `POST /generate`, and a health
//! probe on `GET /health`. The server runs on a background thread and
//! serializes access to the context through a mutex.

pub mod demo;
mod dto;
mod server;

pub use dto::{
    AttrInfoDto, GenerateRequest, MaterialDto, MeshDto, ParamDto, RuleDto, RuleInfoResponse,
    ShapeDataDto, ShapeResultDto, SubMeshDto, apply_attribute_overrides,
};
pub use server::{BridgeServer, ServiceError};

#[cfg(test)]
mod tests;
