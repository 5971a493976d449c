//! Output rendering.
//!
//! The portal page and the service worker are produced from text templates
//! with `%%TOKEN%%` placeholders. Record data is embedded as JSON.
//!
//! # Example
//!
//! ```
//! use portail::render::{Substitutions, Template};
//!
//! let template = Template::new("<b>%%NB_ETALONS%%</b> %%OTHER%%");
//! let subs = Substitutions::new().with("NB_ETALONS", "7");
//! assert_eq!(template.render(&subs), "<b>7</b> %%OTHER%%");
//! ```

mod inject;
mod json;
mod page;
mod template;
mod worker;

pub use inject::{inject_sources, source_records, DATA_SOURCES};
pub use json::to_embedded_json;
pub use page::{render_page, tokens, PageData};
pub use template::{Substitutions, Template};
pub use worker::{cache_entries, render_worker, WorkerVersion, SW_FILES, SW_VERSION};
