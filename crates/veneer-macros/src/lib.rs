// veneer-macros: code generation for interception proxies
//
// Provides one attribute:
// - #[interface] - Makes a trait proxyable
//
// Example:
// ```
// use veneer::interface;
//
// #[interface]
// pub trait Calculator {
//     fn add(&self, a: i32, b: i32) -> i32;
//
//     #[property]
//     fn precision(&self) -> u32;
//     #[property]
//     fn set_precision(&mut self, digits: u32);
// }
// ```

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod expand;
mod model;

/// Makes a trait proxyable.
///
/// The trait is re-emitted unchanged (minus `#[property]` markers) and
/// the following are generated next to it:
/// - `impl veneer::Interface for dyn Trait`: the member descriptor and
///   target dispatch
/// - `impl Trait for veneer::Proxy<I, H>`: one forwarding body per member,
///   each routing the call through the proxy's controller
/// - `impl veneer::Bind<H> for dyn Trait`: so `Proxy::instance()` can hand
///   out `&dyn Trait`
///
/// Members must take `&self` or `&mut self` and owned or `&T` parameters.
/// Generic, `async` and reference-returning members are rejected at compile
/// time, as are associated types and constants. Supertraits other than
/// `Send` and `Sync` must be `#[interface]` traits themselves.
///
/// # Properties
///
/// Mark a getter (`fn name(&self) -> T`) or a setter
/// (`fn set_name(&mut self, value: T)`) with `#[property]`.
///
/// # Example
///
/// ```ignore
/// #[interface]
/// pub trait Greeter: Send {
///     fn greet(&self, name: &str) -> String;
/// }
/// ```
#[proc_macro_attribute]
pub fn interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    let item = parse_macro_input!(item as syn::Item);
    model::InterfaceModel::parse(attr, item)
        .map(|model| expand::expand_interface(&model))
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Marks a property accessor inside an `#[interface]` trait.
///
/// Only meaningful on trait methods; `#[interface]` consumes it.
#[proc_macro_attribute]
pub fn property(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = proc_macro2::TokenStream::from(item);
    syn::Error::new(
        proc_macro2::Span::call_site(),
        "`#[property]` is only valid on methods of an `#[interface]` trait",
    )
    .to_compile_error()
    .into_iter()
    .chain(item)
    .collect::<proc_macro2::TokenStream>()
    .into()
}
