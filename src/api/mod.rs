//! Request/response API.
//!
//! A transport-agnostic router for the dashboard's JSON endpoints.  On the
//! device the HTTP adapter pushes each request into
//! [`channels::REQUEST_CHANNEL`]; the control loop drains it between ticks
//! through [`router::ApiRouter`], so every state change is made by the
//! loop that owns the controllers.
//!
//! ```text
//! ┌──────────────┐  ApiRequest   ┌──────────────┐
//! │  HTTP task   │──────────────▶│ Control Loop │
//! │ (esp-idf-svc)│◀──────────────│  ApiRouter   │
//! └──────────────┘  ApiResponse  └──────────────┘
//! ```

pub mod channels;
pub mod query;
pub mod router;
