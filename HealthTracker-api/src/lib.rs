// HealthTracker API
//
// HTTP layer: routes, handlers, request/response entities and the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;
