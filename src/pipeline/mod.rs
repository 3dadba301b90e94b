//! Pipeline stages for turning uploads into slides.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//!              ┌──▶ normalize ──┐
//! input ──────┤                 ├──▶ compose ──▶ pptx
//! (dispatch)   └──▶ render ─────┘    (layout)    (package)
//!                  (pdfium, per page)
//! ```
//!
//! 1. [`input`]     — uploaded blobs and extension-based dispatch
//! 2. [`normalize`] — decode, apply EXIF orientation, cap at 1920×1080, PNG
//! 3. [`render`]    — rasterise PDF pages and feed each to the normaliser;
//!    synchronous, so async callers go through `spawn_blocking`
//! 4. [`compose`]   — one centred, letterboxed picture per slide

pub mod compose;
pub mod input;
pub mod normalize;
pub mod render;
