use quote::ToTokens;
use syn::{LitStr, Path};

/// Determines the path used to refer to `tempo` from the expanded code.
///
/// `tempo` aliases itself (`extern crate self as tempo`): the same path resolves from within the
/// crate, from its doctests and from any dependent crate.
pub fn tempo_crate_path() -> Path {
    syn::parse_quote!(tempo)
}

/// Determines the path given to the tokio `crate = "..."` option: tokio is re-exported by
/// `tempo::utils` so that dependent crates do not need it as a direct dependency.
pub fn tokio_crate_path(tempo: &Path) -> LitStr {
    let path = format!("{}::utils::tokio", tempo.to_token_stream()).replace(' ', "");
    LitStr::new(&path, proc_macro2::Span::call_site())
}
