//! Convenient re-exports for common usage.
//!
//! ## Usage
//!
//! ```rust
//! use errstack::prelude::*;
//!
//! fn inner() -> Result<(), Error> {
//!     Err(errorf!("disk full"))
//! }
//!
//! fn outer() -> Result<(), Error> {
//!     inner().errorf("saving report")?;
//!     Ok(())
//! }
//!
//! assert_eq!(outer().unwrap_err().depth(), 2);
//! ```

pub use crate::Cause;
pub use crate::Error;
pub use crate::OptionErrExt;
pub use crate::ResultErrExt;
pub use crate::errorf;
pub use crate::{get_inner, get_inner_most};
