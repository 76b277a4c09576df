//! Sprite atlas sidecar parsing.
//!
//! An atlas is an XML file next to a `.tex` texture that names rectangular
//! regions of it in normalized, bottom-left origin coordinates. [`parse`]
//! maps those onto the pixel grid of the decoded texture.
//!
//! # Example
//!
//! ```
//! use ktex_atlas::{parse, PixelRect};
//!
//! let xml = r#"<Atlas><Elements>
//!     <Element name="icon.tex" u1="0.0" u2="0.5" v1="0.5" v2="1.0"/>
//! </Elements></Atlas>"#;
//!
//! let atlas = parse(xml, 256, 256);
//! assert_eq!(atlas.elements[0].rect, PixelRect::new(0, 0, 128, 128));
//! assert!(atlas.warnings.is_empty());
//! ```

mod element;
mod parse;

pub use element::{AtlasElement, PixelRect, UvRect, HALF_PIXEL_MARGIN};
pub use parse::{parse, parse_bytes, AtlasParse, AtlasWarning, UNKNOWN_NAME};
