//! Defines Tempo Runtime macros.

#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

extern crate proc_macro;

use proc_macro::TokenStream;

use crate::internals::{runtime_macro, TokioMode};

mod internals;

/// Macro definition for Tempo Runtime.
///
/// This macro should be used once only in a project.
///
/// _Runs the function within a tokio runtime (re-exported by `tempo`) and waits for every task
/// started with `task::run` (animation runs included) before the function returns._
///
/// # Example
/// ```
/// #[tempo::runtime]
/// async fn main() {
///     // whatever
/// }
/// ```
#[proc_macro_attribute]
pub fn runtime(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item.into(), TokioMode::Main).into()
}

/// Same as `#[tempo::runtime]` but for tests.
#[proc_macro_attribute]
pub fn test(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item.into(), TokioMode::Test).into()
}

#[cfg(doctest)]
mod doctests {
    //! Rust doesn't provide a standard way to test for failure to compile, but Rustdoc does. So tests like
    //! that can be put here.
    //!
    //! ```
    //! // Confirm that the file exists.
    //! include_bytes!("../tests/compile-fail/incorrect_runtime.rs");
    //! ```
    //! ```compile_fail
    //! // Including the file as code is enough to cause a compilation failure.
    //! include!("../tests/compile-fail/incorrect_runtime.rs");
    //! ```
}
