use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Ident, ItemFn};

/// Proc macro to denote a Scenario
///
/// The annotated function is the iteration body: every virtual user calls it in a loop. It must
/// be an `async fn` taking no arguments and returning nothing.
///
/// See the `Scenario` struct for more information on the methods this macro provides on functions.
///
/// # Example
/// ```ignore
/// use rampage::prelude::*;
///
/// #[scenario]
/// async fn my_scenario() {
/// }
/// ```
#[proc_macro_attribute]
pub fn scenario(attr: TokenStream, item: TokenStream) -> TokenStream {
    scenario_internal(attr, item).into()
}

fn scenario_internal(_attr: TokenStream, item: TokenStream) -> TokenStream2 {
    let input = match syn::parse::<ItemFn>(item) {
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
        return syn::Error::new_spanned(sig.fn_token, "#[scenario] requires an async fn")
            .to_compile_error();
    }

    if !sig.inputs.is_empty() {
        return syn::Error::new_spanned(&sig.inputs, "#[scenario] functions take no arguments")
            .to_compile_error();
    }

    let stmts = &block.stmts;

    let new_name = Ident::new(&format!("__rampage_{}", sig.ident), Span::call_site());
    let mut new_sig = sig.clone();
    new_sig.ident = new_name.clone();

    let mut scen_sig = sig.clone();
    let scen_name = sig.ident.clone();
    scen_sig.asyncness = None;
    scen_sig.output = syn::parse_quote! {
        -> impl ::rampage::scenario::ConfigurableScenario<::rampage::RunResult>
    };

    quote! {
        #(#attrs)* #vis #scen_sig {
            ::rampage::scenario::Scenario::new(stringify!(#scen_name), #new_name)
        }

        #(#attrs)* #vis #new_sig {
            #(#stmts)*
        }
    }
}
