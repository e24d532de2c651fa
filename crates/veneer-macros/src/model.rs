// Parsed and validated form of an #[interface] trait
//
// Everything the generated code can't carry is rejected here with a span
// pointing at the offending member.

use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::spanned::Spanned;
use syn::{
    Error, FnArg, Ident, Item, ItemTrait, Pat, Path, Result, ReturnType, TraitItem, TraitItemFn, Type,
    TypeParamBound, WherePredicate,
};

/// Receiver borrow of a member
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Shared,
    Exclusive,
}

/// Role of a member
#[derive(Clone, PartialEq, Eq)]
pub enum Role {
    Method,
    Getter(String),
    Setter(String),
}

pub struct Param {
    pub ident: Ident,
    pub ty: Type,
    /// `&T` parameters travel as `T::Owned`
    pub by_ref: bool,
    /// Type stored in the argument list
    pub owned: Type,
}

pub struct Member {
    pub ident: Ident,
    pub slot: usize,
    pub receiver: Receiver,
    pub role: Role,
    pub params: Vec<Param>,
    /// `None` for unit
    pub output: Option<Type>,
    pub sig: syn::Signature,
}

pub struct InterfaceModel {
    pub item: ItemTrait,
    pub ident: Ident,
    pub bases: Vec<Path>,
    pub send: bool,
    pub sync: bool,
    pub members: Vec<Member>,
}

fn unsupported(span: impl ToTokens, interface: &Ident, member: &Ident, reason: &str) -> Error {
    Error::new_spanned(
        span,
        format!("unsupported member `{}::{}`: {}", interface, member, reason),
    )
}

impl InterfaceModel {
    pub fn parse(attr: TokenStream, item: Item) -> Result<Self> {
        if !attr.is_empty() {
            return Err(Error::new_spanned(attr, "`#[interface]` takes no arguments"));
        }

        let mut item = match item {
            Item::Trait(item) => item,
            other => {
                let name = item_name(&other).unwrap_or_else(|| "item".to_string());
                return Err(Error::new_spanned(
                    other,
                    format!("`{}` is not an interface: `#[interface]` applies to traits only", name),
                ));
            }
        };
        let ident = item.ident.clone();

        if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
            return Err(Error::new_spanned(
                &item.generics,
                format!("interface `{}` cannot be generic", ident),
            ));
        }
        if let Some(auto) = &item.auto_token {
            return Err(Error::new_spanned(auto, "auto traits cannot be interfaces"));
        }
        if let Some(unsafety) = &item.unsafety {
            return Err(Error::new_spanned(unsafety, "unsafe traits cannot be interfaces"));
        }

        let mut bases = Vec::new();
        let (mut send, mut sync) = (false, false);
        for bound in &item.supertraits {
            match bound {
                TypeParamBound::Trait(t) => {
                    let last = t.path.segments.last().map(|s| s.ident.to_string());
                    match last.as_deref() {
                        Some("Send") => send = true,
                        Some("Sync") => sync = true,
                        Some("Sized") => {
                            return Err(Error::new_spanned(t, "interfaces cannot require `Sized`"));
                        }
                        _ => {
                            if t.path.segments.iter().any(|s| !s.arguments.is_empty()) || t.lifetimes.is_some() {
                                return Err(Error::new_spanned(t, "generic supertraits are not supported"));
                            }
                            bases.push(t.path.clone());
                        }
                    }
                }
                TypeParamBound::Lifetime(_) => {}
                other => {
                    return Err(Error::new_spanned(other, "unsupported supertrait bound"));
                }
            }
        }

        let mut members = Vec::new();
        for trait_item in item.items.iter_mut() {
            match trait_item {
                TraitItem::Fn(f) => {
                    let is_property = take_property_attr(f)?;
                    if let Some(member) = parse_member(&ident, f, members.len(), is_property)? {
                        members.push(member);
                    }
                }
                TraitItem::Type(t) => {
                    return Err(unsupported(&*t, &ident, &t.ident, "associated types are not supported"));
                }
                TraitItem::Const(c) => {
                    return Err(unsupported(&*c, &ident, &c.ident, "associated constants are not supported"));
                }
                other => {
                    return Err(Error::new_spanned(other, "unsupported item in an interface"));
                }
            }
        }

        Ok(InterfaceModel {
            item,
            ident,
            bases,
            send,
            sync,
            members,
        })
    }
}

fn item_name(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Struct(s) => &s.ident,
        Item::Enum(e) => &e.ident,
        Item::Union(u) => &u.ident,
        Item::Fn(f) => &f.sig.ident,
        Item::Type(t) => &t.ident,
        Item::Mod(m) => &m.ident,
        Item::TraitAlias(t) => &t.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

/// Strip `#[property]` from a method, reporting whether it was there
fn take_property_attr(f: &mut TraitItemFn) -> Result<bool> {
    let mut found = false;
    let mut error = None;
    f.attrs.retain(|attr| {
        if !attr.path().is_ident("property") {
            return true;
        }
        if !matches!(attr.meta, syn::Meta::Path(_)) {
            error = Some(Error::new_spanned(attr, "`#[property]` takes no arguments"));
        }
        found = true;
        false
    });
    match error {
        Some(e) => Err(e),
        None => Ok(found),
    }
}

/// `where Self: Sized` opts a method out of the interface
fn requires_sized(f: &TraitItemFn) -> bool {
    let Some(clause) = &f.sig.generics.where_clause else {
        return false;
    };
    clause.predicates.iter().any(|p| match p {
        WherePredicate::Type(pt) => {
            matches!(&pt.bounded_ty, Type::Path(tp) if tp.path.is_ident("Self"))
                && pt
                    .bounds
                    .iter()
                    .any(|b| matches!(b, TypeParamBound::Trait(t) if t.path.is_ident("Sized")))
        }
        _ => false,
    })
}

fn parse_member(interface: &Ident, f: &TraitItemFn, slot: usize, is_property: bool) -> Result<Option<Member>> {
    let sig = &f.sig;
    let name = &sig.ident;

    if requires_sized(f) {
        if f.default.is_none() {
            return Err(unsupported(
                sig,
                interface,
                name,
                "methods bounded by `Self: Sized` need a default body",
            ));
        }
        if is_property {
            return Err(unsupported(sig, interface, name, "a property cannot be bounded by `Self: Sized`"));
        }
        // Not callable through `dyn`, so not part of the interface
        return Ok(None);
    }

    if let Some(asyncness) = &sig.asyncness {
        return Err(unsupported(asyncness, interface, name, "async members are not supported"));
    }
    if let Some(unsafety) = &sig.unsafety {
        return Err(unsupported(unsafety, interface, name, "unsafe members are not supported"));
    }
    if let Some(abi) = &sig.abi {
        return Err(unsupported(abi, interface, name, "extern members are not supported"));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(unsupported(variadic, interface, name, "variadic members are not supported"));
    }
    if let Some(param) = sig.generics.lifetimes().next() {
        return Err(unsupported(
            param,
            interface,
            name,
            "explicit lifetime parameters are not supported",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(unsupported(&sig.generics, interface, name, "generic members are not supported"));
    }
    if let Some(clause) = &sig.generics.where_clause {
        return Err(unsupported(clause, interface, name, "where clauses are not supported"));
    }

    let mut inputs = sig.inputs.iter();
    let receiver = match inputs.next() {
        Some(FnArg::Receiver(r)) if r.colon_token.is_none() => match &r.reference {
            Some((_, None)) if r.mutability.is_some() => Receiver::Exclusive,
            Some((_, None)) => Receiver::Shared,
            Some((_, Some(lifetime))) => {
                return Err(unsupported(lifetime, interface, name, "receiver lifetimes are not supported"));
            }
            None => {
                return Err(unsupported(r, interface, name, "receiver must be `&self` or `&mut self`"));
            }
        },
        Some(FnArg::Receiver(r)) => {
            return Err(unsupported(r, interface, name, "receiver must be `&self` or `&mut self`"));
        }
        _ => {
            return Err(unsupported(sig, interface, name, "members need a `&self` or `&mut self` receiver"));
        }
    };

    let mut params = Vec::new();
    for (i, input) in inputs.enumerate() {
        let FnArg::Typed(pat_type) = input else {
            return Err(unsupported(input, interface, name, "unexpected receiver"));
        };
        let ident = match &*pat_type.pat {
            Pat::Ident(p) if p.by_ref.is_none() && p.subpat.is_none() => p.ident.clone(),
            Pat::Wild(_) => format_ident!("__arg{}", i),
            other => {
                return Err(unsupported(
                    other,
                    interface,
                    name,
                    "parameter patterns must be plain identifiers",
                ));
            }
        };
        let ty = (*pat_type.ty).clone();
        let (by_ref, owned) = param_shape(interface, name, &ty)?;
        params.push(Param {
            ident,
            ty,
            by_ref,
            owned,
        });
    }

    let output = match &sig.output {
        ReturnType::Default => None,
        ReturnType::Type(_, ty) => match &**ty {
            Type::Tuple(t) if t.elems.is_empty() => None,
            Type::Reference(r) => {
                return Err(unsupported(r, interface, name, "reference returns are not supported"));
            }
            other if contains_impl_trait(other) => {
                return Err(unsupported(other, interface, name, "`impl Trait` returns are not supported"));
            }
            other => Some(other.clone()),
        },
    };

    let role = if is_property {
        property_role(interface, sig, receiver, params.len(), output.is_some())?
    } else {
        Role::Method
    };

    Ok(Some(Member {
        ident: name.clone(),
        slot,
        receiver,
        role,
        params,
        output,
        sig: strip_patterns(sig),
    }))
}

fn param_shape(interface: &Ident, member: &Ident, ty: &Type) -> Result<(bool, Type)> {
    if contains_impl_trait(ty) {
        return Err(unsupported(ty, interface, member, "`impl Trait` parameters are not supported"));
    }
    match ty {
        Type::Reference(r) => {
            if r.mutability.is_some() {
                return Err(unsupported(ty, interface, member, "`&mut` parameters are not supported"));
            }
            if r.lifetime.is_some() {
                return Err(unsupported(ty, interface, member, "explicit lifetimes are not supported"));
            }
            let elem = &r.elem;
            let owned: Type = syn::parse_quote!(<#elem as ::std::borrow::ToOwned>::Owned);
            Ok((true, owned))
        }
        other => Ok((false, other.clone())),
    }
}

fn contains_impl_trait(ty: &Type) -> bool {
    match ty {
        Type::ImplTrait(_) => true,
        Type::Reference(r) => contains_impl_trait(&r.elem),
        Type::Paren(p) => contains_impl_trait(&p.elem),
        Type::Group(g) => contains_impl_trait(&g.elem),
        Type::Slice(s) => contains_impl_trait(&s.elem),
        Type::Array(a) => contains_impl_trait(&a.elem),
        Type::Tuple(t) => t.elems.iter().any(contains_impl_trait),
        Type::Path(p) => p.path.segments.iter().any(|s| match &s.arguments {
            syn::PathArguments::AngleBracketed(args) => args.args.iter().any(|a| match a {
                syn::GenericArgument::Type(t) => contains_impl_trait(t),
                _ => false,
            }),
            _ => false,
        }),
        _ => false,
    }
}

fn property_role(
    interface: &Ident,
    sig: &syn::Signature,
    receiver: Receiver,
    arity: usize,
    returns_value: bool,
) -> Result<Role> {
    let name = &sig.ident;
    let text = name.to_string();
    if let Some(property) = text.strip_prefix("set_").filter(|p| !p.is_empty()) {
        if arity != 1 || returns_value {
            return Err(unsupported(
                sig,
                interface,
                name,
                "a property setter takes exactly one value and returns `()`",
            ));
        }
        return Ok(Role::Setter(property.to_string()));
    }
    if arity != 0 || !returns_value || receiver != Receiver::Shared {
        return Err(unsupported(
            sig,
            interface,
            name,
            "a property getter takes only `&self` and returns a value",
        ));
    }
    Ok(Role::Getter(text))
}

/// Signature for the forwarding body: wildcard patterns get names
fn strip_patterns(sig: &syn::Signature) -> syn::Signature {
    let mut sig = sig.clone();
    for (i, input) in sig.inputs.iter_mut().skip(1).enumerate() {
        if let FnArg::Typed(pat_type) = input {
            let ident = match &*pat_type.pat {
                Pat::Ident(p) => p.ident.clone(),
                _ => format_ident!("__arg{}", i),
            };
            *pat_type.pat = Pat::Verbatim(quote!(#ident));
        }
    }
    sig
}

/// Type as readable text: `Vec<String>`, `&str`, `Result<u8, String>`
pub fn render_type(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let chars: Vec<char> = raw.chars().collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '\'';
    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        match c {
            ' ' => {
                let prev = out.chars().last();
                let next = chars.get(i + 1).copied();
                if let (Some(p), Some(n)) = (prev, next) {
                    if is_word(p) && is_word(n) {
                        out.push(' ');
                    }
                }
            }
            ',' => out.push_str(", "),
            ';' => out.push_str("; "),
            _ => out.push(c),
        }
    }
    out
}

impl Member {
    pub fn span(&self) -> proc_macro2::Span {
        self.sig.span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: TokenStream) -> Result<InterfaceModel> {
        InterfaceModel::parse(TokenStream::new(), syn::parse2(src).unwrap())
    }

    fn error(src: TokenStream) -> String {
        match parse(src) {
            Ok(_) => panic!("expected an error"),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn test_parse_members_in_order() {
        let model = parse(quote! {
            pub trait Calculator: Named + Send {
                fn add(&self, a: i32, b: i32) -> i32;
                fn reset(&mut self);
                fn greet(&self, name: &str) -> String;
            }
        })
        .unwrap();
        assert_eq!(model.ident, "Calculator");
        assert!(model.send);
        assert!(!model.sync);
        assert_eq!(model.bases.len(), 1);
        let names: Vec<_> = model.members.iter().map(|m| m.ident.to_string()).collect();
        assert_eq!(names, vec!["add", "reset", "greet"]);
        assert!(model.members[1].receiver == Receiver::Exclusive);
        assert!(model.members[1].output.is_none());
        assert!(model.members[2].params[0].by_ref);
        assert_eq!(model.members[2].slot, 2);
    }

    #[test]
    fn test_properties() {
        let model = parse(quote! {
            trait Account {
                #[property]
                fn balance(&self) -> u64;
                #[property]
                fn set_balance(&mut self, value: u64);
            }
        })
        .unwrap();
        assert!(model.members[0].role == Role::Getter("balance".into()));
        assert!(model.members[1].role == Role::Setter("balance".into()));
        let reemitted = model.item.to_token_stream().to_string();
        assert!(!reemitted.contains("property"));
    }

    #[test]
    fn test_sized_methods_are_skipped() {
        let model = parse(quote! {
            trait Shape {
                fn area(&self) -> f64;
                fn boxed(self) -> Box<Self> where Self: Sized { Box::new(self) }
            }
        })
        .unwrap();
        assert_eq!(model.members.len(), 1);
    }

    #[test]
    fn test_wildcard_parameter_gets_a_name() {
        let model = parse(quote! {
            trait Sink {
                fn accept(&self, _: u8);
            }
        })
        .unwrap();
        assert_eq!(model.members[0].params[0].ident, "__arg0");
    }

    #[test]
    fn test_rejections() {
        let cases = [
            (quote! { trait T { fn f<X>(&self, x: X); } }, "generic members"),
            (quote! { trait T { fn f<'a>(&self, x: &'a str); } }, "lifetime parameters"),
            (quote! { trait T { async fn f(&self); } }, "async"),
            (quote! { trait T { fn f(self); } }, "receiver must be"),
            (quote! { trait T { fn f(); } }, "receiver"),
            (quote! { trait T { fn f(&self, x: &mut u8); } }, "`&mut` parameters"),
            (quote! { trait T { fn f(&self) -> &str; } }, "reference returns"),
            (quote! { trait T { fn f(&self, x: impl Into<u8>); } }, "`impl Trait` parameters"),
            (quote! { trait T { fn f(&self) -> Vec<impl Copy>; } }, "`impl Trait` returns"),
            (quote! { trait T { fn f(&self, (a, b): (u8, u8)); } }, "plain identifiers"),
            (quote! { trait T { type Item; } }, "associated types"),
            (quote! { trait T { const N: usize; } }, "associated constants"),
            (quote! { trait T<X> { fn f(&self); } }, "cannot be generic"),
            (quote! { trait T { #[property] fn f(&self, x: u8) -> u8; } }, "property getter"),
            (quote! { trait T { #[property] fn set_f(&mut self); } }, "property setter"),
            (quote! { struct S; }, "`S` is not an interface"),
        ];
        for (src, expected) in cases {
            let message = error(src);
            assert!(message.contains(expected), "{:?} does not mention {:?}", message, expected);
        }
    }

    #[test]
    fn test_render_type() {
        let cases: [(Type, &str); 4] = [
            (syn::parse_quote!(Vec<String>), "Vec<String>"),
            (syn::parse_quote!(&str), "&str"),
            (syn::parse_quote!(Result<u8, String>), "Result<u8, String>"),
            (syn::parse_quote!(Option<Box<dyn Fn()>>), "Option<Box<dyn Fn()>>"),
        ];
        for (ty, expected) in cases {
            assert_eq!(render_type(&ty), expected);
        }
    }
}
