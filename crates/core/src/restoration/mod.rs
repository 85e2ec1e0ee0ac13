//! Remote restoration: one image in, one restored image (or typed failure) out.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     RestorationClient Trait                  │
//! │                                                              │
//! │   restore(EncodedImage, RestorationMode) -> RestoredImage    │
//! │                                                              │
//! │  ┌──────────────────┐          ┌─────────────────────────┐   │
//! │  │   GeminiClient   │          │  MockRestorationClient  │   │
//! │  │  (reqwest, HTTPS)│          │  (testing module)       │   │
//! │  └──────────────────┘          └─────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modes
//!
//! - **Standard**: crop, repair, keep colours. No explicit output size.
//! - **Ultra**: as standard, plus super-resolution with a fixed square output.
//!
//! The instruction text for each mode is fixed; see [`instructions_for`].

mod error;
mod gemini;
mod prompts;
mod traits;
mod types;

pub use error::RestorationError;
pub use gemini::GeminiClient;
pub use prompts::instructions_for;
pub use traits::RestorationClient;
pub use types::{EncodedImage, ImagePayload, RestorationMode, RestoredImage};
