use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemFn, ReturnType, Stmt};

use crate::internals::helpers::{tempo_crate_path, tokio_crate_path};

mod helpers;

pub enum TokioMode {
    Main,
    Test,
}

/// Internal redefinition of `#[tempo::runtime]` with the proc_macro_attribute signature.
///
/// Used for runtime macro expansion (coverage) through the runtime-macros crate.
#[cfg(test)]
pub fn runtime_macro_internal(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item, TokioMode::Main)
}

/// Internal redefinition of `#[tempo_macros::test]` with the proc_macro_attribute signature.
#[cfg(test)]
pub fn test_macro_internal(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item, TokioMode::Test)
}

/// See `#[tempo::runtime]` for details.
///
/// This method uses proc_macro2 TokenStream in order to allow expansion outside a macro context
/// (tests and coverage).
pub fn runtime_macro(item: TokenStream, tokio: TokioMode) -> TokenStream {
    let tempo = tempo_crate_path();
    let tokio_path = tokio_crate_path(&tempo);

    // Parse the input tokens into a syntax tree
    let input: ItemFn = match syn::parse2(item) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            sig.fn_token,
            "the `async` keyword is missing from the function declaration",
        )
        .to_compile_error();
    }

    let mut stmts = block.stmts;

    // Check if the function has an explicit (non unit) return type
    let has_return_type = match &sig.output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => match &**ty {
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => false,
            _ => true,
        },
    };

    // The trailing expression (if any) is the value returned once all tasks are done.
    let return_expr = if has_return_type {
        match stmts.pop() {
            Some(Stmt::Expr(expr, None)) => Some(expr),
            Some(stmt) => {
                stmts.push(stmt);
                None
            }
            None => None,
        }
    } else {
        None
    };

    let tokio_attr = match tokio {
        TokioMode::Main => quote! {#[#tempo::utils::tokio::main(crate = #tokio_path)]},
        TokioMode::Test => quote! {#[#tempo::utils::tokio::test(crate = #tokio_path)]},
    };

    let mut body = vec![quote! {
        #tempo::utils::task::init_task_channel().await;
    }];

    // A null "()" expression is dropped: nothing may follow the waiting of the tasks.
    body.extend(stmts.into_iter().map(|stmt| match stmt {
        Stmt::Expr(syn::Expr::Tuple(ref tuple), _) if tuple.elems.is_empty() => quote!(),
        _ => quote! { #stmt },
    }));

    body.push(quote! {
        #tempo::utils::task::wait_task_channel().await;
    });

    if let Some(return_expr) = return_expr {
        body.push(quote! { #return_expr });
    }

    quote! {
        #tokio_attr
        #(#attrs)*
        #vis #sig {
            #(#body)*
        }
    }
}

#[cfg(test)]
mod tests {
    use proc_macro2::TokenStream;
    use quote::quote;
    use runtime_macros::emulate_attributelike_macro_expansion;

    use crate::internals::{runtime_macro, runtime_macro_internal, test_macro_internal, TokioMode};

    fn before() -> TokenStream {
        quote! {tempo::utils::task::init_task_channel().await;}
    }
    fn after() -> TokenStream {
        quote! {tempo::utils::task::wait_task_channel().await;}
    }

    #[test]
    fn test_runtime_macro_result() {
        let before = before();
        let after = after();

        let input = quote! {
            async fn main() -> Result<(), Error> {
                let x = 3;
                Ok(())
            }
        };

        let control = quote! {
            #[tempo::utils::tokio::main(crate = "tempo::utils::tokio")]
            async fn main() -> Result<(), Error> {
                #before
                let x = 3;
                #after
                Ok(())
            }
        };

        let output = runtime_macro(input, TokioMode::Main);
        assert_eq!(
            output.to_string(),
            control.to_string(),
            "Macro expansion for runtime should be correct with Ok(())."
        );
    }

    #[test]
    fn test_runtime_macro_no_result() {
        let before = before();
        let after = after();

        let input = quote! {
            async fn main() {
                let x = 3;
                blabla.await;
            }
        };

        let control = quote! {
            #[tempo::utils::tokio::main(crate = "tempo::utils::tokio")]
            async fn main() {
                #before
                let x = 3;
                blabla.await;
                #after
            }
        };

        let output = runtime_macro(input, TokioMode::Main);
        assert_eq!(output.to_string(), control.to_string());
    }

    #[test]
    fn test_runtime_macro_explicit_void() {
        let before = before();
        let after = after();

        let input = quote! {
            async fn main() -> () {
                let x = 3;
                ()
            }
        };

        let control = quote! {
            #[tempo::utils::tokio::main(crate = "tempo::utils::tokio")]
            async fn main() -> () {
                #before
                let x = 3;
                #after
            }
        };

        let output = runtime_macro(input, TokioMode::Main);
        assert_eq!(output.to_string(), control.to_string());
    }

    #[test]
    fn test_runtime_macro_test() {
        let before = before();
        let after = after();

        let input = quote! {
            #[ignore]
            async fn my_test() { }
        };

        let control = quote! {
            #[tempo::utils::tokio::test(crate = "tempo::utils::tokio")]
            #[ignore]
            async fn my_test() {
                #before
                #after
            }
        };

        let output = runtime_macro(input, TokioMode::Test);
        assert_eq!(output.to_string(), control.to_string());
    }

    #[test]
    fn test_runtime_macro_errors() {
        let output = runtime_macro(quote! { struct Whatever; }, TokioMode::Main);
        assert!(output.to_string().contains("compile_error"));

        let output = runtime_macro(quote! { fn main() {} }, TokioMode::Main);
        assert!(output.to_string().contains("the `async` keyword is missing"));
    }

    #[test]
    fn code_coverage() {
        // Macro expansion at run time, to let tarpaulin measure code coverage for the macro.
        let file = std::fs::File::open("tests/runtime_macro.rs").unwrap();
        emulate_attributelike_macro_expansion(file, &[("runtime", runtime_macro_internal)])
            .unwrap();

        let file = std::fs::File::open("tests/runtime_macro.rs").unwrap();
        emulate_attributelike_macro_expansion(file, &[("test", test_macro_internal)]).unwrap()
    }

    #[test]
    fn syntax_error() {
        let file = std::fs::File::open("tests/compile-fail/incorrect_runtime.rs").unwrap();
        emulate_attributelike_macro_expansion(file, &[("runtime", runtime_macro_internal)])
            .unwrap();
    }
}
