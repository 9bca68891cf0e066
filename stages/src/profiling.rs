//! Profiling support via Tracy.
//!
//! Enable the `profiling` feature to record scheduler scopes in the
//! [Tracy profiler](https://github.com/wolfpld/tracy):
//!
//! ```bash
//! cargo run --features profiling
//! ```
//!
//! The application must start a [`tracy_client::Client`] before the first
//! scope is entered. When the feature is disabled (the default), all macros
//! compile to nothing.
//!
//! ```ignore
//! use redlilium_stages::profiling::{profile_function, profile_scope};
//!
//! fn rebuild_pool() {
//!     profile_function!();
//!     {
//!         profile_scope!("create_images");
//!         // ...
//!     }
//! }
//! ```

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, plot as tracy_plot, span};

/// Profile the enclosing scope under the given name.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Profile the enclosing scope (no-op when profiling is disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Profile the enclosing function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Profile the enclosing function (no-op when profiling is disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Plot a numeric value over time.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a numeric value over time (no-op when profiling is disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

// Re-export macros at module level
pub use profile_function;
pub use profile_plot;
pub use profile_scope;
