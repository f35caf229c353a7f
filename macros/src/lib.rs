use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, Meta, Token, Type, Visibility,
    parse_macro_input,
};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(syn::LitStr),
    Bool(bool),
    Flag,
}

/// Derive `envdecode::Config` for a struct with named fields.
///
/// Every `pub` field becomes a leaf bound to one environment variable, unless it
/// is marked `#[field(nested)]`, in which case the walk recurses into it.
#[proc_macro_derive(Config, attributes(field, config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_config(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_config(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let prefix = parse_struct_prefix(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Config can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Config can only be derived for structs",
            ));
        }
    };

    let mut visits = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let config = parse_field_config(&field.attrs)?;

        // Private fields cannot be set from outside and are left at their default.
        if matches!(field.vis, Visibility::Inherited) || config.mode == FieldMode::Skip {
            continue;
        }

        let name = field_name.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name).to_string();
        let field_type = &field.ty;

        if is_pointer_type(field_type) {
            let type_name = quote!(#field_type).to_string().replace(' ', "");
            visits.push(quote! {
                walker.pointer(#name, #type_name)?;
            });
            continue;
        }

        let meta = field_meta_tokens(&config);
        let visit = match config.mode {
            FieldMode::Leaf => quote! {
                walker.leaf::<#field_type>(#name, #meta, &mut self.#field_name)?;
            },
            FieldMode::Registered => quote! {
                walker.registered::<#field_type>(#name, #meta, &mut self.#field_name)?;
            },
            FieldMode::Nested => quote! {
                walker.nested::<#field_type>(#name, #meta, &mut self.#field_name)?;
            },
            FieldMode::Skip => unreachable!("skipped fields are filtered above"),
        };
        visits.push(visit);
    }

    let prefix_const = prefix.map(|prefix| {
        quote! {
            const PREFIX: &'static str = #prefix;
        }
    });

    Ok(quote! {
        impl #impl_generics ::envdecode::Config for #struct_name #ty_generics #where_clause {
            #prefix_const

            fn visit<'__envdecode>(
                &'__envdecode mut self,
                walker: &mut ::envdecode::Walker<'__envdecode>,
            ) -> ::core::result::Result<(), ::envdecode::SchemaError> {
                #(#visits)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

#[derive(Debug)]
struct FieldConfig {
    required: bool,
    default: Option<syn::LitStr>,
    doc: String,
    mode: FieldMode,
}

#[derive(Debug, PartialEq, Eq)]
enum FieldMode {
    Leaf,
    Registered,
    Nested,
    Skip,
}

fn field_meta_tokens(config: &FieldConfig) -> proc_macro2::TokenStream {
    let mut meta = quote! { ::envdecode::FieldMeta::new() };
    if config.required {
        meta = quote! { #meta.required() };
    }
    if let Some(default) = &config.default {
        meta = quote! { #meta.default_value(#default) };
    }
    if !config.doc.is_empty() {
        let doc = &config.doc;
        meta = quote! { #meta.doc(#doc) };
    }
    meta
}

/// Parse `#[config(prefix = "APP_")]` on the struct itself
fn parse_struct_prefix(attrs: &[Attribute]) -> syn::Result<Option<syn::LitStr>> {
    let mut prefix = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("config")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("prefix") {
                prefix = Some(meta.value()?.parse::<syn::LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported config attribute, expected `prefix = \"...\"`"))
            }
        })?;
    }
    Ok(prefix)
}

/// Parse #[field(required, default = "x", doc = "y", nested)] syntax
fn parse_field_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;

            match meta.input.parse::<Lit>()? {
                Lit::Str(value) => values.insert(key, MetaValue::Str(value)),
                Lit::Bool(value) => values.insert(key, MetaValue::Bool(value.value)),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected a string or boolean literal",
                    ));
                }
            };
        } else {
            values.insert(key, MetaValue::Flag);
        }

        Ok(())
    })?;

    Ok(values)
}

fn parse_field_config(attrs: &[Attribute]) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig {
        required: false,
        default: None,
        doc: doc_comment(attrs),
        mode: FieldMode::Leaf,
    };

    let Some(field_attr) = attrs.iter().find(|attr| attr.path().is_ident("field")) else {
        return Ok(config);
    };

    let parsed = match &field_attr.meta {
        Meta::List(list) => parse_field_list(list)?,
        _ => {
            return Err(syn::Error::new_spanned(
                field_attr,
                "field attribute must be a list: #[field(required, default = \"...\")]",
            ));
        }
    };

    for (key, value) in parsed {
        match (key.as_str(), value) {
            ("required", MetaValue::Flag) => config.required = true,
            ("required", MetaValue::Bool(required)) => config.required = required,
            ("default", MetaValue::Str(default)) => config.default = Some(default),
            ("doc", MetaValue::Str(doc)) => config.doc = doc.value().trim().to_string(),
            ("nested", MetaValue::Flag) => {
                config.mode = set_mode(field_attr, &config.mode, FieldMode::Nested)?
            }
            ("registered", MetaValue::Flag) => {
                config.mode = set_mode(field_attr, &config.mode, FieldMode::Registered)?
            }
            ("skip", MetaValue::Flag) => {
                config.mode = set_mode(field_attr, &config.mode, FieldMode::Skip)?
            }
            ("required", _) => {
                return Err(syn::Error::new_spanned(
                    field_attr,
                    "required must be a flag or a boolean: required = true",
                ));
            }
            ("default" | "doc", _) => {
                return Err(syn::Error::new_spanned(
                    field_attr,
                    format!("{key} must be a string literal"),
                ));
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    field_attr,
                    format!(
                        "unknown field option `{key}`, expected one of: \
                         required, default, doc, nested, registered, skip"
                    ),
                ));
            }
        }
    }

    Ok(config)
}

fn set_mode(attr: &Attribute, current: &FieldMode, next: FieldMode) -> syn::Result<FieldMode> {
    if *current != FieldMode::Leaf {
        return Err(syn::Error::new_spanned(
            attr,
            "only one of nested, registered or skip may be given",
        ));
    }
    Ok(next)
}

/// Collect `///` comments into a single line description
fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Box, Rc, Arc, references and raw pointers alias storage the decoder does not own
fn is_pointer_type(ty: &Type) -> bool {
    match ty {
        Type::Ptr(_) | Type::Reference(_) => true,
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| {
                matches!(segment.ident.to_string().as_str(), "Box" | "Rc" | "Arc")
            }),
        Type::Paren(inner) => is_pointer_type(&inner.elem),
        Type::Group(inner) => is_pointer_type(&inner.elem),
        _ => false,
    }
}
