// #[interface] code generation
//
// For a trait `Calculator` with members `add` (slot 0) and `reset` (slot 1):
//
// ```ignore
// impl ::veneer::Interface for dyn Calculator {
//     fn descriptor() -> ::veneer::InterfaceDescriptor { /* members, bases */ }
//     fn dispatch(target, member, args) -> ::veneer::ProxyResult<::veneer::Value> {
//         // own members by slot, inherited members through the base
//     }
// }
//
// impl<__I, __H> Calculator for ::veneer::Proxy<__I, __H> where __H: ::veneer::Handler<__I> {
//     fn add(&self, a: i32, b: i32) -> i32 {
//         let mut args = ::veneer::Arguments::with_capacity(2);
//         args.push(a);
//         args.push(b);
//         complete::<i32>(self.controller().trigger(Slot::of::<dyn Calculator>(0), args))
//     }
//     fn reset(&mut self) { /* trigger_mut, slot 1 */ }
// }
//
// impl<__H: 'static> ::veneer::Bind<__H> for dyn Calculator { /* &Proxy -> &dyn Calculator */ }
// ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};

use crate::model::{render_type, InterfaceModel, Member, Receiver, Role};

pub fn expand_interface(model: &InterfaceModel) -> TokenStream {
    let item = &model.item;
    let forwarding = forwarding_impl(model);
    let dispatch = dispatch_fn(model);
    let expansion = quote!(#forwarding #dispatch).to_string();
    let descriptor = descriptor_fn(model, &expansion);
    let bind = bind_impl(model);
    let ident = &model.ident;

    quote! {
        #item

        impl ::veneer::Interface for dyn #ident {
            #descriptor
            #dispatch
        }

        #forwarding

        #bind
    }
}

fn descriptor_fn(model: &InterfaceModel, expansion: &str) -> TokenStream {
    let ident = &model.ident;
    let name = ident.to_string();

    let bases = model.bases.iter().map(|base| {
        let base_name = base
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default();
        quote! { .extends::<dyn #base>(#base_name) }
    });

    let members = model.members.iter().map(|m| {
        let member_name = m.ident.to_string();
        let receiver = match m.receiver {
            Receiver::Shared => quote!(::veneer::Receiver::Shared),
            Receiver::Exclusive => quote!(::veneer::Receiver::Exclusive),
        };
        let spec = match &m.role {
            Role::Method => quote!(::veneer::MemberSpec::method(#member_name, #receiver)),
            Role::Getter(property) => quote!(::veneer::MemberSpec::getter(#member_name, #property)),
            Role::Setter(property) => {
                quote!(::veneer::MemberSpec::setter(#member_name, #property).receiver(#receiver))
            }
        };
        let params = m.params.iter().map(|p| {
            let param_name = p.ident.to_string();
            let ty = render_type(&p.ty);
            quote!(.param(#param_name, #ty))
        });
        let returns = m.output.as_ref().map(|ty| {
            let rendered = render_type(ty);
            quote!(.returns::<#ty>(#rendered))
        });
        quote! {
            .member(#spec #(#params)* #returns)
        }
    });

    quote! {
        fn descriptor() -> ::veneer::InterfaceDescriptor {
            let descriptor = ::veneer::InterfaceDescriptor::interface::<dyn #ident>(#name)
                .in_module(::std::module_path!())
                #(#bases)*
                #(#members)*;
            #[cfg(debug_assertions)]
            let descriptor = descriptor.with_expansion(#expansion);
            descriptor
        }
    }
}

fn dispatch_fn(model: &InterfaceModel) -> TokenStream {
    let ident = &model.ident;
    let name = ident.to_string();

    let arms = model.members.iter().map(|m| dispatch_arm(ident, m));

    let delegations = model.bases.iter().map(|base| {
        quote! {
            if ::veneer::registry::reaches::<dyn #base>(declaring)? {
                fn shared<'a>(t: &'a (dyn #ident + 'static)) -> &'a (dyn #base + 'static) {
                    t
                }
                fn exclusive<'a>(t: &'a mut (dyn #ident + 'static)) -> &'a mut (dyn #base + 'static) {
                    t
                }
                return <dyn #base as ::veneer::Interface>::dispatch(
                    target.upcast(shared, exclusive),
                    member,
                    args,
                );
            }
        }
    });

    quote! {
        #[allow(unused_variables)]
        fn dispatch(
            target: ::veneer::Target<'_, Self>,
            member: &::veneer::MemberDescriptor,
            args: &::veneer::Arguments,
        ) -> ::veneer::ProxyResult<::veneer::Value> {
            let declaring = member.declaring();
            if declaring == ::veneer::__private::TypeId::of::<dyn #ident>() {
                return match member.slot() {
                    #(#arms)*
                    slot => ::std::result::Result::Err(::veneer::ProxyError::UnknownSlot {
                        interface: #name.to_string(),
                        declaring: #name.to_string(),
                        slot,
                    }),
                };
            }
            #(#delegations)*
            ::std::result::Result::Err(::veneer::ProxyError::UnknownSlot {
                interface: #name.to_string(),
                declaring: member.interface().to_string(),
                slot: member.slot(),
            })
        }
    }
}

fn dispatch_arm(ident: &syn::Ident, m: &Member) -> TokenStream {
    let slot = m.slot;
    let method = &m.ident;

    // Positional locals, so parameter names can't shadow `target` or `args`
    let locals: Vec<_> = (0..m.params.len()).map(|i| format_ident!("__p{}", i)).collect();
    let extractions = m.params.iter().zip(&locals).enumerate().map(|(i, (p, local))| {
        let owned = &p.owned;
        quote! {
            let #local: #owned = args.arg(member, #i)?;
        }
    });
    let call_args = m.params.iter().zip(&locals).map(|(p, local)| {
        if p.by_ref {
            quote!(&#local)
        } else {
            quote!(#local)
        }
    });
    let receiver = match m.receiver {
        Receiver::Shared => quote!(target.shared(member)?),
        Receiver::Exclusive => quote!(target.exclusive(member)?),
    };

    quote_spanned! {m.span()=>
        #slot => {
            #(#extractions)*
            let output = <dyn #ident as #ident>::#method(#receiver, #(#call_args),*);
            ::std::result::Result::Ok(::veneer::IntoValue::into_value(output))
        }
    }
}

fn forwarding_impl(model: &InterfaceModel) -> TokenStream {
    let ident = &model.ident;
    let bases = &model.bases;

    let mut bounds = Vec::new();
    if model.send {
        bounds.push(quote!(Self: ::std::marker::Send));
    }
    if model.sync {
        bounds.push(quote!(Self: ::std::marker::Sync));
    }
    for base in bases {
        bounds.push(quote!(Self: #base));
    }

    let methods = model.members.iter().map(|m| forwarding_method(ident, m));

    quote! {
        impl<__I, __H> #ident for ::veneer::Proxy<__I, __H>
        where
            __I: ?::std::marker::Sized + ::veneer::Interface,
            __H: ::veneer::Handler<__I>,
            #(#bounds,)*
        {
            #(#methods)*
        }
    }
}

fn forwarding_method(ident: &syn::Ident, m: &Member) -> TokenStream {
    let sig = &m.sig;
    let slot = m.slot;
    let args = format_ident!("__veneer_args");
    let count = m.params.len();

    let pushes = m.params.iter().map(|p| {
        let local = &p.ident;
        if p.by_ref {
            quote!(#args.push(::veneer::__private::ToOwned::to_owned(#local));)
        } else {
            quote!(#args.push(#local);)
        }
    });
    let build = if count == 0 {
        quote!(let #args = ::veneer::Arguments::new();)
    } else {
        quote! {
            let mut #args = ::veneer::Arguments::with_capacity(#count);
            #(#pushes)*
        }
    };

    let trigger = match m.receiver {
        Receiver::Shared => quote! {
            self.controller().trigger(::veneer::Slot::of::<dyn #ident>(#slot), #args)
        },
        Receiver::Exclusive => quote! {
            self.controller_mut().trigger_mut(::veneer::Slot::of::<dyn #ident>(#slot), #args)
        },
    };
    let output = match &m.output {
        Some(ty) => quote!(#ty),
        None => quote!(()),
    };

    quote_spanned! {m.span()=>
        #sig {
            #build
            ::veneer::__private::complete::<#output>(#trigger)
        }
    }
}

fn bind_impl(model: &InterfaceModel) -> TokenStream {
    let ident = &model.ident;
    quote! {
        impl<__H: 'static> ::veneer::Bind<__H> for dyn #ident
        where
            ::veneer::Proxy<dyn #ident, __H>: #ident,
        {
            fn view(proxy: &::veneer::Proxy<Self, __H>) -> &Self {
                proxy
            }

            fn view_mut(proxy: &mut ::veneer::Proxy<Self, __H>) -> &mut Self {
                proxy
            }
        }
    }
}
