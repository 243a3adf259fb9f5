//! Procedural macro for registering Joy interpreter primitives
//!
//! Provides the `#[primitive]` attribute macro used throughout
//! `src/primitives/*` to bind a Rust function operating on the evaluator's
//! stack to a Joy symbol, without hand-maintaining a master dispatch table.
//! Annotated functions are collected with `inventory` and installed into
//! the environment once at interpreter startup (see `src/primitives/mod.rs`).

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Parse `name = "..."` out of the attribute token stream.
///
/// Kept as simple substring parsing (rather than a full `syn::Meta` parse)
/// to match the attribute-argument style already used for builtin
/// registration in this codebase.
fn parse_primitive_name(attr_stream: TokenStream, fallback: &str) -> String {
    let attr_str = attr_stream.to_string();
    if let Some(start) = attr_str.find("name = \"") {
        let rest = &attr_str[start + 8..];
        if let Some(end) = rest.find('"') {
            return rest[..end].to_string();
        }
    }
    fallback.to_string()
}

/// Attribute macro for defining a Joy primitive.
///
/// # Example
///
/// ```ignore
/// #[primitive(name = "+")]
/// /// Sum of the top two numeric stack cells.
/// pub fn add(m: &mut Machine) -> Result<(), JoyError> {
///     // ...
/// }
/// ```
///
/// Expands to the function itself plus an `inventory::submit!` registering
/// `(name, function pointer)` as a `crate::primitives::PrimitiveEntry`, so
/// `crate::primitives::install_all` can populate the environment without a
/// hand-written list of every primitive.
#[proc_macro_attribute]
pub fn primitive(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    let fn_name = func.sig.ident.clone();
    let joy_name = parse_primitive_name(attr, &fn_name.to_string());

    let expanded = quote! {
        #func

        ::inventory::submit! {
            crate::primitives::PrimitiveEntry {
                name: #joy_name,
                func: #fn_name,
            }
        }
    };

    TokenStream::from(expanded)
}
