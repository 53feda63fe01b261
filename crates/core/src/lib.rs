//! Core types for the Numera numerical-methods client.
//!
//! This crate holds everything that does not touch the network or a display:
//!
//! - [`Form`] — raw named fields and cell grids, with typed extraction
//! - [`Matrix`] and [`ColumnVector`] — the linear-system payload shapes
//! - [`Method`] — a descriptor tying an endpoint path to its request and
//!   response schemas
//! - [`MethodKind`] — the runtime registry of every supported method
//! - [`PageState`] — the per-page request/render lifecycle
//! - [`symbolic`] — derivatives for forms that leave them blank
//!
//! The numerical methods themselves run on a remote service; the request and
//! response types here mirror its JSON contract.

mod cell;
mod form;
mod linalg;
mod state;

pub mod method;
pub mod symbolic;

pub use cell::{cell_number, cell_text};
pub use form::{Choice, Form, FormError, Grid, MAX_POINTS, MAX_SIZE, MIN_POINTS, MIN_SIZE, parse_grid};
pub use linalg::{ColumnVector, Matrix};
pub use method::{Family, Method, MethodKind};
pub use state::PageState;
