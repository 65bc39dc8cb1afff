//! Health-Card Export Worker Library
//!
//! This library renders migrant-worker health cards to single-page PDFs with
//! an embedded QR identity symbol, and provides the queue plumbing for the
//! worker service around it.
//!
//! ## Module Overview
//!
//! - `card`: Health-card record model
//! - `qr`: QR identity payload and in-memory symbol rendering
//! - `render`: One-page card layout as SVG markup
//! - `generator`: Card-to-PDF pipeline (usvg + svg2pdf)
//! - `job`: Job models and state management
//! - `queue`: Redis-based job queue operations
//! - `telemetry`: OpenTelemetry integration and structured logging
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use healthcard_export::{card::HealthCardRecord, generator::HealthCardGenerator};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = HealthCardGenerator::new();
//!
//!     let record = HealthCardRecord {
//!         health_id: "HLTH9341863BJHOX".to_string(),
//!         full_name: "Raj Kumar".to_string(),
//!         blood_group: "O+".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let doc = generator.generate(&record)?;
//!     std::fs::write("card.pdf", doc.as_bytes())?;
//!     Ok(())
//! }
//! ```

pub mod card;
pub mod generator;
pub mod job;
pub mod qr;
pub mod queue;
pub mod render;
pub mod telemetry;
